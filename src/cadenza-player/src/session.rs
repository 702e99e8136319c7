use crate::arbiter::Arbiter;
use cadenza_core::{CoreError, PlaybackInfo, PlaybackStatus, PlaybackUpdate};
use cadenza_plugin::{CommandOutcome, PlayArgs, PluginError, PluginRegistry, PluginResult};

/// The coordination core: owns the canonical [`PlaybackInfo`], the exclusive
/// playback token, and the plugin registry.
///
/// All commands pass through here one at a time, so plugin calls,
/// arbitration, and state updates within one command are atomic with
/// respect to other commands. Plugins never write the shared state; they
/// submit reports through [`Session::report`] and the periodic poll.
pub struct Session {
    registry: PluginRegistry,
    arbiter: Arbiter,
    info: PlaybackInfo,
}

impl Session {
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry,
            arbiter: Arbiter::new(),
            info: PlaybackInfo::default(),
        }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn current_holder(&self) -> Option<&str> {
        self.arbiter.current_holder()
    }

    /// Snapshot for rendering. An `Error` status stays visible for exactly
    /// one read, then folds to `Stopped`.
    pub fn now_playing(&mut self) -> PlaybackInfo {
        let snapshot = self.info.clone();
        if self.info.status == PlaybackStatus::Error {
            self.info.status = PlaybackStatus::Stopped;
            self.info.error = None;
        }
        snapshot
    }

    /// Start playback for the plugin at `index`: arbitration first, then the
    /// plugin's play path, then the shared state update and `on_play`
    /// fan-out.
    pub fn play(&mut self, index: usize, args: PlayArgs) -> Result<(), CoreError> {
        let plugin_id = self.registry.registration(index).plugin_id.clone();

        let was_holder = self.arbiter.is_holder(&plugin_id);
        let grant = self.arbiter.request_exclusive(&plugin_id);
        if let Some(previous) = grant.evicted {
            self.silence_evicted(&previous);
        }

        if let Err(err) = self.registry.plugin_mut(index).play(args) {
            return Err(self.fail_play(&plugin_id, err, was_holder));
        }

        // A successful play starts a new track: the previous track's fields
        // must not leak through the patch semantics of later reports.
        self.info = PlaybackInfo {
            status: PlaybackStatus::Loading,
            source: Some(plugin_id),
            ..PlaybackInfo::default()
        };
        if let Some(current) = self.registry.plugin(index).get_current_playback() {
            self.info.track_name = current.track_name;
            self.info.artist = current.artist;
            self.info.album = current.album;
            self.info.position_seconds = current.position_seconds;
            self.info.duration_seconds = current.duration_seconds;
        }
        self.absorb_report(index);
        self.fire_on_play();
        Ok(())
    }

    pub fn pause(&mut self, index: usize) -> Result<(), CoreError> {
        let plugin_id = self.registry.registration(index).plugin_id.clone();
        self.registry.plugin_mut(index).pause()?;
        if self.arbiter.is_holder(&plugin_id) {
            self.info
                .apply(&PlaybackUpdate::status(PlaybackStatus::Paused));
        }
        self.fire_on_pause();
        Ok(())
    }

    pub fn stop(&mut self, index: usize) -> Result<(), CoreError> {
        let plugin_id = self.registry.registration(index).plugin_id.clone();
        self.registry.plugin_mut(index).stop()?;
        self.mark_stopped(&plugin_id);
        Ok(())
    }

    /// Volume passthrough; out-of-range input fails before any state change.
    pub fn set_volume(&mut self, index: usize, level: i64) -> Result<(), CoreError> {
        self.registry.plugin_mut(index).set_volume(level)?;
        Ok(())
    }

    /// Provider-specific subcommand, no shared-state involvement.
    pub fn invoke(
        &mut self,
        index: usize,
        command: &str,
        args: &[String],
    ) -> PluginResult<CommandOutcome> {
        self.registry.plugin_mut(index).invoke(command, args)
    }

    pub fn special_action(
        &mut self,
        index: usize,
        key: char,
        item: &cadenza_core::SelectionItem,
    ) -> PluginResult<CommandOutcome> {
        self.registry.plugin_mut(index).special_action(key, item)
    }

    /// Accept a playback report from a plugin.
    ///
    /// A report claiming activity from a plugin that is not the exclusive
    /// holder while a holder is active is stale: it must not hijack the
    /// displayed source, so it is dropped.
    pub fn report(&mut self, plugin_id: &str, update: PlaybackUpdate) {
        let reported_active = update
            .status
            .map(|status| status.is_active())
            .unwrap_or(false);
        let holder = self.arbiter.current_holder();

        if reported_active && holder.is_some() && holder != Some(plugin_id) {
            tracing::debug!(
                reporter = %plugin_id,
                holder = %holder.unwrap_or_default(),
                "ignoring stale playback report from non-holder"
            );
            return;
        }

        // Reports from a non-holder are only reachable here when nothing
        // holds the token, or when they report inactivity about themselves.
        if reported_active && holder.is_none() {
            self.info = PlaybackInfo::default();
            self.info.source = Some(plugin_id.to_string());
        }
        if self.info.source.as_deref() != Some(plugin_id) && holder == Some(plugin_id) {
            self.info.source = Some(plugin_id.to_string());
        }
        if self.info.source.as_deref() != Some(plugin_id) && !reported_active {
            // Inactivity report about a source we are not displaying.
            return;
        }

        self.info.apply(&update);

        match self.info.status {
            PlaybackStatus::Stopped => {
                let id = plugin_id.to_string();
                self.mark_stopped(&id);
            }
            PlaybackStatus::Error => {
                let cause = self
                    .info
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown provider failure".to_string());
                let id = plugin_id.to_string();
                self.mark_error(&id, &cause);
            }
            _ => {}
        }
    }

    /// Periodic status poll, run on the render/refresh cadence. Every plugin
    /// gets asked; stale reports are filtered by [`Session::report`].
    pub fn poll(&mut self) {
        for index in 0..self.registry.len() {
            self.absorb_report(index);
        }
    }

    /// Synchronous read of the holder's own playback snapshot, without
    /// forcing a refresh. `None` when nothing holds the token or the holder
    /// has nothing playing.
    pub fn current_playback(&self) -> Option<PlaybackInfo> {
        let holder = self.arbiter.current_holder()?;
        let index = self.registry.index_of_id(holder)?;
        self.registry.plugin(index).get_current_playback()
    }

    /// Record a provider failure against the shared state. The token is
    /// released immediately; the cause stays visible for one render read.
    pub fn mark_error(&mut self, plugin_id: &str, cause: &str) {
        tracing::warn!(plugin = %plugin_id, %cause, "playback error");
        self.arbiter.release(plugin_id);
        self.info.status = PlaybackStatus::Error;
        self.info.error = Some(cause.to_string());
        self.info.source = Some(plugin_id.to_string());
    }

    /// Graceful teardown: silence the holder, notify every plugin.
    pub fn shutdown(&mut self) {
        if let Some(holder) = self.arbiter.current_holder().map(str::to_string) {
            if let Some(index) = self.registry.index_of_id(&holder) {
                if let Err(err) = self.registry.plugin_mut(index).stop() {
                    tracing::warn!(plugin = %holder, error = %err, "stop during shutdown failed");
                }
            }
            self.arbiter.release(&holder);
        }
        self.registry.shutdown_all();
    }

    fn absorb_report(&mut self, index: usize) {
        let plugin_id = self.registry.registration(index).plugin_id.clone();
        if let Some(update) = self.registry.plugin_mut(index).update_playback_info() {
            self.report(&plugin_id, update);
        }
    }

    fn mark_stopped(&mut self, plugin_id: &str) {
        self.arbiter.release(plugin_id);
        if self.info.source.as_deref() == Some(plugin_id) {
            self.info
                .apply(&PlaybackUpdate::status(PlaybackStatus::Stopped));
        }
        self.fire_on_stop();
    }

    /// Best-effort stop of a plugin that just lost the token. Failure is an
    /// exclusivity conflict: logged, not fatal, and the new grant stands.
    fn silence_evicted(&mut self, previous: &str) {
        let Some(index) = self.registry.index_of_id(previous) else {
            return;
        };
        if let Err(err) = self.registry.plugin_mut(index).stop() {
            let conflict = CoreError::ExclusivityConflict {
                previous: previous.to_string(),
                reason: err.to_string(),
            };
            tracing::warn!("{conflict}");
        }
    }

    fn fail_play(&mut self, plugin_id: &str, err: PluginError, was_holder: bool) -> CoreError {
        match &err {
            PluginError::Provider { message } => {
                let cause = message.clone();
                self.mark_error(plugin_id, &cause);
            }
            _ => {
                // Malformed input: playback state stays untouched. The token
                // must not stay parked on a plugin that never started, but a
                // holder that was already mid-track keeps it.
                if !was_holder {
                    self.arbiter.release(plugin_id);
                }
            }
        }
        err.into()
    }

    fn fire_on_play(&mut self) {
        let info = self.info.clone();
        self.registry
            .for_each_plugin_mut(|_, plugin| plugin.on_play(&info));
    }

    fn fire_on_pause(&mut self) {
        let info = self.info.clone();
        self.registry
            .for_each_plugin_mut(|_, plugin| plugin.on_pause(&info));
    }

    fn fire_on_stop(&mut self) {
        let info = self.info.clone();
        self.registry
            .for_each_plugin_mut(|_, plugin| plugin.on_stop(&info));
    }
}
