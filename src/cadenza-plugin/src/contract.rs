use crate::args::PlayArgs;
use cadenza_core::{CommandHelp, CoreError, PlaybackInfo, PlaybackUpdate, SelectionItem, SpecialAction};
use thiserror::Error;

/// Failures a plugin may surface from any of its operations.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin '{plugin_id}' is not ready: {reason}")]
    NotReady { plugin_id: String, reason: String },
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
    #[error("volume {value} out of range [0, 100]")]
    OutOfRange { value: i64 },
    #[error("unknown command: {command}")]
    UnknownCommand { command: String },
    /// Network/decode failure inside the provider.
    #[error("{message}")]
    Provider { message: String },
}

pub type PluginResult<T> = Result<T, PluginError>;

impl PluginError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        PluginError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        PluginError::Provider {
            message: message.into(),
        }
    }
}

impl From<PluginError> for CoreError {
    fn from(err: PluginError) -> Self {
        match err {
            PluginError::InvalidArgument { message } => CoreError::InvalidArgument { message },
            PluginError::OutOfRange { value } => CoreError::OutOfRange {
                value,
                min: 0,
                max: 100,
            },
            PluginError::UnknownCommand { command } => CoreError::CommandRouting { input: command },
            PluginError::NotReady { plugin_id, reason } => CoreError::PluginLoad {
                plugin_id,
                reason,
            },
            PluginError::Provider { message } => CoreError::Provider { message },
        }
    }
}

/// What a plugin command produced.
#[derive(Debug)]
pub enum CommandOutcome {
    /// Side effect only.
    Done,
    /// A line to show the user.
    Message(String),
    /// A browsable result set; the dispatcher routes this through the
    /// pagination engine when the command is flagged as paginated.
    Selection {
        title: String,
        items: Vec<SelectionItem>,
        special_actions: Vec<SpecialAction>,
    },
}

/// Shared bounds check for `set_volume`, so every provider rejects the same
/// range the same way.
pub fn validate_volume(level: i64) -> PluginResult<u8> {
    if (0..=100).contains(&level) {
        Ok(level as u8)
    } else {
        Err(PluginError::OutOfRange { value: level })
    }
}

/// Capability contract every playback provider satisfies.
///
/// A plugin is usable only once `initialized()` reports true; the registry
/// excludes anything else and records why without aborting the load.
pub trait Plugin {
    /// Stable plugin identifier (e.g. "local" or "spotify").
    fn id(&self) -> &str;

    /// Human-friendly name for help and status output.
    fn name(&self) -> &str;

    /// Command alias used when configuration does not override it.
    fn default_alias(&self) -> &str;

    /// True once required setup finished. A plugin that leaves this false is
    /// excluded from dispatch and from the exclusive-playback pool.
    fn initialized(&self) -> bool;

    /// Subcommand names whose results are routed through pagination.
    fn paginated_commands(&self) -> Vec<String>;

    fn play(&mut self, args: PlayArgs) -> PluginResult<()>;

    fn pause(&mut self) -> PluginResult<()>;

    fn stop(&mut self) -> PluginResult<()>;

    /// Level is validated against [0, 100]; out-of-range input fails without
    /// touching playback state.
    fn set_volume(&mut self, level: i64) -> PluginResult<()>;

    /// Pull current status from the provider. Polled on the refresh cadence,
    /// so implementations must be non-blocking or bounded-time. Returns
    /// `None` when the plugin has nothing playing.
    fn update_playback_info(&mut self) -> Option<PlaybackUpdate>;

    /// Point-in-time read of the latest known playback state, without
    /// forcing a refresh.
    fn get_current_playback(&self) -> Option<PlaybackInfo>;

    /// Entries merged into the global help menu.
    fn command_help(&self) -> Vec<CommandHelp>;

    /// Provider-specific subcommands beyond the required operations.
    fn invoke(&mut self, command: &str, args: &[String]) -> PluginResult<CommandOutcome> {
        let _ = args;
        Err(PluginError::UnknownCommand {
            command: command.to_string(),
        })
    }

    /// Special-action callback from an active pagination session.
    fn special_action(&mut self, key: char, item: &SelectionItem) -> PluginResult<CommandOutcome> {
        let _ = item;
        Err(PluginError::UnknownCommand {
            command: key.to_string(),
        })
    }

    // Event hooks, fired on global transitions so every plugin can react
    // even when another plugin owns playback.

    fn on_play(&mut self, _info: &PlaybackInfo) {}

    fn on_pause(&mut self, _info: &PlaybackInfo) {}

    fn on_stop(&mut self, _info: &PlaybackInfo) {}

    fn on_shutdown(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_bounds() {
        assert_eq!(validate_volume(0).unwrap(), 0);
        assert_eq!(validate_volume(100).unwrap(), 100);
        assert!(matches!(
            validate_volume(150),
            Err(PluginError::OutOfRange { value: 150 })
        ));
        assert!(matches!(
            validate_volume(-1),
            Err(PluginError::OutOfRange { value: -1 })
        ));
    }

    #[test]
    fn plugin_error_maps_to_core_taxonomy() {
        let err: CoreError = PluginError::OutOfRange { value: 150 }.into();
        assert!(matches!(err, CoreError::OutOfRange { value: 150, .. }));

        let err: CoreError = PluginError::provider("timeout").into();
        assert!(matches!(err, CoreError::Provider { .. }));
    }
}
