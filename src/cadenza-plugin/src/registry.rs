use crate::contract::Plugin;
use cadenza_core::CommandHelp;

/// Identity record for a registered plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRegistration {
    pub plugin_id: String,
    pub name: String,
    /// Invocable command alias, user-configurable.
    pub alias: String,
    pub initialized: bool,
    pub paginated_commands: Vec<String>,
}

/// Why a plugin was excluded at load time. Never fatal to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub plugin_id: String,
    pub reason: String,
}

struct RegistryEntry {
    registration: PluginRegistration,
    plugin: Box<dyn Plugin>,
}

/// Holds every loaded plugin and routes alias lookups.
///
/// Alias collisions resolve first-registered-wins; the later plugin is
/// recorded as a load failure with the collision reason.
#[derive(Default)]
pub struct PluginRegistry {
    entries: Vec<RegistryEntry>,
    failures: Vec<LoadFailure>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructed plugin. `alias_override` comes from
    /// configuration and falls back to the plugin's default alias.
    pub fn register(&mut self, plugin: Box<dyn Plugin>, alias_override: Option<&str>) {
        let plugin_id = plugin.id().to_string();

        if !plugin.initialized() {
            let reason = "plugin reported not initialized".to_string();
            tracing::warn!(plugin_id = %plugin_id, %reason, "excluding plugin");
            self.failures.push(LoadFailure { plugin_id, reason });
            return;
        }

        let alias = alias_override
            .unwrap_or_else(|| plugin.default_alias())
            .to_string();

        if let Some(holder) = self
            .entries
            .iter()
            .find(|entry| entry.registration.alias == alias)
        {
            let reason = format!(
                "command alias '{}' already taken by plugin '{}'",
                alias, holder.registration.plugin_id
            );
            tracing::warn!(plugin_id = %plugin_id, %reason, "excluding plugin");
            self.failures.push(LoadFailure { plugin_id, reason });
            return;
        }

        let registration = PluginRegistration {
            plugin_id: plugin_id.clone(),
            name: plugin.name().to_string(),
            alias: alias.clone(),
            initialized: true,
            paginated_commands: plugin.paginated_commands(),
        };
        tracing::info!(plugin_id = %plugin_id, %alias, "registered plugin");
        self.entries.push(RegistryEntry {
            registration,
            plugin,
        });
    }

    /// Record a construction failure for a plugin that never produced an
    /// instance.
    pub fn record_failure(&mut self, plugin_id: impl Into<String>, reason: impl Into<String>) {
        let failure = LoadFailure {
            plugin_id: plugin_id.into(),
            reason: reason.into(),
        };
        tracing::warn!(plugin_id = %failure.plugin_id, reason = %failure.reason, "plugin failed to load");
        self.failures.push(failure);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index_of_alias(&self, alias: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.registration.alias == alias)
    }

    pub fn index_of_id(&self, plugin_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.registration.plugin_id == plugin_id)
    }

    pub fn registration(&self, index: usize) -> &PluginRegistration {
        &self.entries[index].registration
    }

    pub fn plugin(&self, index: usize) -> &dyn Plugin {
        self.entries[index].plugin.as_ref()
    }

    pub fn plugin_mut(&mut self, index: usize) -> &mut dyn Plugin {
        self.entries[index].plugin.as_mut()
    }

    pub fn registrations(&self) -> impl Iterator<Item = &PluginRegistration> {
        self.entries.iter().map(|entry| &entry.registration)
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Run a closure over every registered plugin, used for event fan-out.
    pub fn for_each_plugin_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&PluginRegistration, &mut dyn Plugin),
    {
        for entry in &mut self.entries {
            f(&entry.registration, entry.plugin.as_mut());
        }
    }

    /// Help sections grouped by plugin name, in registration order.
    pub fn help_sections(&self) -> Vec<(String, Vec<CommandHelp>)> {
        self.entries
            .iter()
            .map(|entry| {
                (
                    format!(
                        "{} ({})",
                        entry.registration.name, entry.registration.alias
                    ),
                    entry.plugin.command_help(),
                )
            })
            .collect()
    }

    /// Fire `on_shutdown` on every plugin, in registration order.
    pub fn shutdown_all(&mut self) {
        for entry in &mut self.entries {
            tracing::debug!(plugin_id = %entry.registration.plugin_id, "shutting down plugin");
            entry.plugin.on_shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::PlayArgs;
    use crate::contract::{CommandOutcome, PluginResult};
    use cadenza_core::{PlaybackInfo, PlaybackUpdate};

    struct StubPlugin {
        id: String,
        alias: String,
        initialized: bool,
        shutdowns: u32,
    }

    impl StubPlugin {
        fn new(id: &str, alias: &str) -> Self {
            Self {
                id: id.to_string(),
                alias: alias.to_string(),
                initialized: true,
                shutdowns: 0,
            }
        }
    }

    impl Plugin for StubPlugin {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            "Stub"
        }

        fn default_alias(&self) -> &str {
            &self.alias
        }

        fn initialized(&self) -> bool {
            self.initialized
        }

        fn paginated_commands(&self) -> Vec<String> {
            vec!["search".into()]
        }

        fn play(&mut self, _args: PlayArgs) -> PluginResult<()> {
            Ok(())
        }

        fn pause(&mut self) -> PluginResult<()> {
            Ok(())
        }

        fn stop(&mut self) -> PluginResult<()> {
            Ok(())
        }

        fn set_volume(&mut self, level: i64) -> PluginResult<()> {
            crate::contract::validate_volume(level).map(|_| ())
        }

        fn update_playback_info(&mut self) -> Option<PlaybackUpdate> {
            None
        }

        fn get_current_playback(&self) -> Option<PlaybackInfo> {
            None
        }

        fn command_help(&self) -> Vec<CommandHelp> {
            vec![CommandHelp::new("play", "play something")]
        }

        fn invoke(&mut self, command: &str, _args: &[String]) -> PluginResult<CommandOutcome> {
            Ok(CommandOutcome::Message(format!("ran {command}")))
        }

        fn on_shutdown(&mut self) {
            self.shutdowns += 1;
        }
    }

    #[test]
    fn alias_collision_keeps_first_and_records_failure() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(StubPlugin::new("spotify", "sp")), None);
        registry.register(Box::new(StubPlugin::new("spodcast", "sp")), None);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.registration(0).plugin_id, "spotify");
        assert_eq!(registry.failures().len(), 1);
        assert_eq!(registry.failures()[0].plugin_id, "spodcast");
        assert!(registry.failures()[0].reason.contains("'sp'"));
    }

    #[test]
    fn alias_override_wins_over_default() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(StubPlugin::new("spotify", "spotify")), Some("sp"));

        assert_eq!(registry.registration(0).alias, "sp");
        assert!(registry.index_of_alias("sp").is_some());
        assert!(registry.index_of_alias("spotify").is_none());
    }

    #[test]
    fn uninitialized_plugin_excluded() {
        let mut registry = PluginRegistry::new();
        let mut stub = StubPlugin::new("broken", "br");
        stub.initialized = false;
        registry.register(Box::new(stub), None);

        assert!(registry.is_empty());
        assert_eq!(registry.failures()[0].plugin_id, "broken");
    }

    #[test]
    fn freed_alias_of_excluded_plugin_stays_unroutable() {
        let mut registry = PluginRegistry::new();
        let mut stub = StubPlugin::new("broken", "br");
        stub.initialized = false;
        registry.register(Box::new(stub), None);

        assert!(registry.index_of_alias("br").is_none());
    }

    #[test]
    fn help_sections_group_by_plugin() {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(StubPlugin::new("spotify", "sp")), None);
        let sections = registry.help_sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "Stub (sp)");
        assert_eq!(sections[0].1[0].command, "play");
    }
}
