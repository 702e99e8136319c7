//! Local filesystem provider: scans a music directory into a persisted media
//! index, plays files through the audio engine, and keeps plain-text
//! playlists.

pub mod index;
pub mod playlist;
pub mod scan;

use std::collections::VecDeque;
use std::path::PathBuf;

use cadenza_core::{
    CommandHelp, PlaybackInfo, PlaybackStatus, PlaybackUpdate, SelectionItem, SortOrder,
    SpecialAction,
};
use cadenza_plugin::{CommandOutcome, PlayArgs, Plugin, PluginError, PluginResult};
use cadenza_audio::{AudioEngine, AudioHandle, AudioSource, AudioState};
use rand::Rng;

use crate::index::{load_index, save_index};
use crate::playlist::PlaylistStore;
use crate::scan::{scan_library, sort_tracks, LocalTrack};

pub const PLUGIN_ID: &str = "local";

/// Playlist that the `a` special action appends to.
const QUICK_ADD_PLAYLIST: &str = "favorites";

#[derive(Debug, Clone)]
pub struct LocalPluginOptions {
    pub library_path: Option<PathBuf>,
    pub playlist_dir: PathBuf,
    pub index_path: PathBuf,
    pub default_volume: u8,
    pub sort_order: SortOrder,
}

pub struct LocalPlugin {
    options: LocalPluginOptions,
    engine: Box<dyn AudioEngine>,
    tracks: Vec<LocalTrack>,
    playlists: PlaylistStore,
    handle: Option<AudioHandle>,
    /// Index into `tracks` of the track the handle is playing.
    current: Option<usize>,
    /// Upcoming tracks when a playlist is being played through.
    queue: VecDeque<usize>,
    /// Previously played tracks, newest last; drives `prev`.
    history: Vec<usize>,
    shuffle: bool,
    volume: u8,
    info: Option<PlaybackInfo>,
}

impl LocalPlugin {
    pub fn new(options: LocalPluginOptions, engine: Box<dyn AudioEngine>) -> Self {
        let playlists = PlaylistStore::new(options.playlist_dir.clone());
        let mut plugin = Self {
            tracks: Vec::new(),
            playlists,
            handle: None,
            current: None,
            queue: VecDeque::new(),
            history: Vec::new(),
            shuffle: false,
            volume: options.default_volume.min(100),
            info: None,
            engine,
            options,
        };
        plugin.load_library();
        plugin
    }

    fn load_library(&mut self) {
        match load_index(&self.options.index_path) {
            Ok(Some(tracks)) => {
                self.tracks = tracks;
                sort_tracks(&mut self.tracks, self.options.sort_order);
                tracing::info!(tracks = self.tracks.len(), "loaded media index");
            }
            Ok(None) => {
                if let Err(err) = self.rescan() {
                    tracing::warn!(error = %err, "initial library scan failed");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "media index unreadable, rescanning");
                if let Err(err) = self.rescan() {
                    tracing::warn!(error = %err, "library scan failed");
                }
            }
        }
    }

    /// Rescan the library root and persist the refreshed index.
    fn rescan(&mut self) -> PluginResult<usize> {
        let Some(root) = self.options.library_path.clone() else {
            return Err(PluginError::invalid_argument(
                "no library path configured; set library_path or pass --library",
            ));
        };
        let mut tracks =
            scan_library(&root).map_err(|err| PluginError::provider(err.to_string()))?;
        sort_tracks(&mut tracks, self.options.sort_order);
        if let Err(err) = save_index(&self.options.index_path, &tracks) {
            tracing::warn!(error = %err, "failed to persist media index");
        }
        let count = tracks.len();
        self.tracks = tracks;
        tracing::info!(tracks = count, root = %root.display(), "library scanned");
        Ok(count)
    }

    fn listing(&self) -> Vec<SelectionItem> {
        self.tracks.iter().map(track_item).collect()
    }

    fn find_by_path(&self, path: &str) -> Option<usize> {
        self.tracks
            .iter()
            .position(|t| t.path.to_string_lossy() == path)
    }

    fn start_track(&mut self, index: usize) -> PluginResult<()> {
        if let Some(previous) = self.current {
            self.history.push(previous);
        }
        self.start_track_unlogged(index)
    }

    /// Start without recording the outgoing track, used by `prev` so going
    /// back does not grow the history it is consuming.
    fn start_track_unlogged(&mut self, index: usize) -> PluginResult<()> {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
        let track = &self.tracks[index];
        let handle = self
            .engine
            .play(AudioSource::File(track.path.clone()), self.volume)
            .map_err(|err| PluginError::provider(err.to_string()))?;
        tracing::debug!(title = %track.title, "started local playback");
        self.info = Some(PlaybackInfo {
            track_name: Some(track.title.clone()),
            artist: Some(track.artist.clone()),
            album: track.album.clone(),
            position_seconds: 0.0,
            duration_seconds: None,
            source: Some(PLUGIN_ID.to_string()),
            status: PlaybackStatus::Playing,
            error: None,
        });
        self.handle = Some(handle);
        self.current = Some(index);
        Ok(())
    }

    fn play_item(&mut self, item: &SelectionItem) -> PluginResult<()> {
        let kind = item.metadata.get("kind").and_then(|v| v.as_str());
        if kind == Some("playlist") {
            return self.play_playlist(&item.item_id);
        }
        let index = self.find_by_path(&item.item_id).ok_or_else(|| {
            PluginError::invalid_argument(format!("track not in library: {}", item.item_id))
        })?;
        self.queue.clear();
        self.start_track(index)
    }

    fn play_playlist(&mut self, name: &str) -> PluginResult<()> {
        let paths = self
            .playlists
            .load(name)
            .map_err(|err| PluginError::provider(err.to_string()))?;
        let mut indices: VecDeque<usize> = paths
            .iter()
            .filter_map(|p| {
                let found = self.find_by_path(&p.to_string_lossy());
                if found.is_none() {
                    tracing::warn!(path = %p.display(), playlist = name, "playlist entry not in library");
                }
                found
            })
            .collect();
        let Some(first) = indices.pop_front() else {
            return Err(PluginError::invalid_argument(format!(
                "playlist '{name}' has no playable tracks"
            )));
        };
        self.queue = indices;
        self.start_track(first)
    }

    fn next_index(&mut self) -> Option<usize> {
        if let Some(next) = self.queue.pop_front() {
            return Some(next);
        }
        if self.tracks.is_empty() {
            return None;
        }
        if self.shuffle {
            return Some(rand::thread_rng().gen_range(0..self.tracks.len()));
        }
        match self.current {
            Some(i) if i + 1 < self.tracks.len() => Some(i + 1),
            _ => None,
        }
    }

    fn clear_playback(&mut self) {
        self.handle = None;
        self.current = None;
        self.queue.clear();
        self.history.clear();
        self.info = None;
    }

    fn set_info_status(&mut self, status: PlaybackStatus) {
        if let Some(info) = &mut self.info {
            info.status = status;
        }
    }

    /// Full status report for the current track. Carrying the metadata on
    /// every report keeps the shared display correct across track switches.
    fn report_with(&mut self, status: PlaybackStatus) -> PlaybackUpdate {
        let position = self
            .handle
            .as_ref()
            .map(|h| h.position().as_secs_f64())
            .unwrap_or(0.0);
        if let Some(info) = &mut self.info {
            info.position_seconds = position;
        }
        let mut update = PlaybackUpdate::status(status);
        update.position_seconds = Some(position);
        if let Some(info) = &self.info {
            update.track_name = info.track_name.clone();
            update.artist = info.artist.clone();
            update.album = info.album.clone();
        }
        update
    }

    fn skip_next(&mut self) -> PluginResult<CommandOutcome> {
        let Some(next) = self.next_index() else {
            return Ok(CommandOutcome::Message("End of queue".to_string()));
        };
        self.start_track(next)?;
        Ok(CommandOutcome::Message(format!(
            "Playing {}",
            self.tracks[next].title
        )))
    }

    fn skip_prev(&mut self) -> PluginResult<CommandOutcome> {
        let Some(prev) = self.history.pop() else {
            return Ok(CommandOutcome::Message("No previous track".to_string()));
        };
        self.start_track_unlogged(prev)?;
        Ok(CommandOutcome::Message(format!(
            "Playing {}",
            self.tracks[prev].title
        )))
    }

    fn manage_playlist(&mut self, args: &[String]) -> PluginResult<CommandOutcome> {
        match args {
            [action, name] if action.as_str() == "create" => {
                self.playlists
                    .create(name)
                    .map_err(|err| PluginError::invalid_argument(err.to_string()))?;
                Ok(CommandOutcome::Message(format!("Created playlist '{name}'")))
            }
            [action, name] if action.as_str() == "remove" => {
                self.playlists
                    .remove(name)
                    .map_err(|err| PluginError::invalid_argument(err.to_string()))?;
                Ok(CommandOutcome::Message(format!("Removed playlist '{name}'")))
            }
            _ => Err(PluginError::invalid_argument(
                "usage: playlist create|remove <name>",
            )),
        }
    }

    fn track_selection(&self, title: &str, items: Vec<SelectionItem>) -> CommandOutcome {
        CommandOutcome::Selection {
            title: title.to_string(),
            items,
            special_actions: vec![SpecialAction::new('a', "Add to favorites")],
        }
    }
}

fn track_item(track: &LocalTrack) -> SelectionItem {
    SelectionItem::new(
        format!("{} - {}", track.title, track.artist),
        track.path.to_string_lossy(),
    )
    .with_metadata(serde_json::json!({ "kind": "track" }))
}

impl Plugin for LocalPlugin {
    fn id(&self) -> &str {
        PLUGIN_ID
    }

    fn name(&self) -> &str {
        "Local Library"
    }

    fn default_alias(&self) -> &str {
        "local"
    }

    fn initialized(&self) -> bool {
        true
    }

    fn paginated_commands(&self) -> Vec<String> {
        vec!["list".into(), "search".into(), "playlists".into()]
    }

    fn play(&mut self, args: PlayArgs) -> PluginResult<()> {
        match args {
            PlayArgs::Default => {
                if let Some(handle) = &self.handle {
                    match handle.state() {
                        AudioState::Paused => {
                            handle.resume();
                            self.set_info_status(PlaybackStatus::Playing);
                            return Ok(());
                        }
                        AudioState::Playing => return Ok(()),
                        _ => {}
                    }
                }
                if self.tracks.is_empty() {
                    return Err(PluginError::invalid_argument("library is empty"));
                }
                let index = if self.shuffle {
                    rand::thread_rng().gen_range(0..self.tracks.len())
                } else {
                    0
                };
                self.queue.clear();
                self.start_track(index)
            }
            PlayArgs::Item(item) => self.play_item(&item),
            args @ PlayArgs::Tokens(_) => {
                let item = args.resolve(&self.listing())?;
                self.play_item(&item)
            }
        }
    }

    fn pause(&mut self) -> PluginResult<()> {
        let Some(handle) = &self.handle else {
            return Err(PluginError::invalid_argument("nothing to pause"));
        };
        handle.pause();
        self.set_info_status(PlaybackStatus::Paused);
        Ok(())
    }

    fn stop(&mut self) -> PluginResult<()> {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
        self.clear_playback();
        Ok(())
    }

    fn set_volume(&mut self, level: i64) -> PluginResult<()> {
        let level = cadenza_plugin::validate_volume(level)?;
        self.volume = level;
        if let Some(handle) = &self.handle {
            handle.set_volume(level);
        }
        Ok(())
    }

    fn update_playback_info(&mut self) -> Option<PlaybackUpdate> {
        let state = self.handle.as_ref().map(|h| h.state())?;
        match state {
            AudioState::Playing => Some(self.report_with(PlaybackStatus::Playing)),
            AudioState::Paused => Some(self.report_with(PlaybackStatus::Paused)),
            AudioState::Completed => match self.next_index() {
                Some(next) => match self.start_track(next) {
                    Ok(()) => Some(self.report_with(PlaybackStatus::Playing)),
                    Err(err) => {
                        tracing::warn!(error = %err, "auto-advance failed");
                        self.clear_playback();
                        Some(PlaybackUpdate::error(err.to_string()))
                    }
                },
                None => {
                    self.clear_playback();
                    Some(PlaybackUpdate::status(PlaybackStatus::Stopped))
                }
            },
            AudioState::Stopped | AudioState::Idle => {
                self.clear_playback();
                Some(PlaybackUpdate::status(PlaybackStatus::Stopped))
            }
            AudioState::Error => {
                self.clear_playback();
                Some(PlaybackUpdate::error("audio backend failure"))
            }
        }
    }

    fn get_current_playback(&self) -> Option<PlaybackInfo> {
        let mut info = self.info.clone()?;
        if let Some(handle) = &self.handle {
            info.position_seconds = handle.position().as_secs_f64();
        }
        Some(info)
    }

    fn command_help(&self) -> Vec<CommandHelp> {
        vec![
            CommandHelp::new("play [track#]", "play a track, or resume when paused"),
            CommandHelp::new("pause", "pause playback"),
            CommandHelp::new("stop", "stop playback"),
            CommandHelp::new("volume <0-100>", "set playback volume"),
            CommandHelp::new("list", "browse the library"),
            CommandHelp::new("search <query>", "search titles, artists and albums"),
            CommandHelp::new("next", "skip to the next track in the queue"),
            CommandHelp::new("prev", "go back to the previously played track"),
            CommandHelp::new("playlists", "browse playlists; select one to play it"),
            CommandHelp::new("playlist create|remove <name>", "manage playlist files"),
            CommandHelp::new("scan", "rescan the library directory"),
            CommandHelp::new("shuffle", "toggle shuffle for auto-advance"),
        ]
    }

    fn invoke(&mut self, command: &str, args: &[String]) -> PluginResult<CommandOutcome> {
        match command {
            "list" => {
                if self.tracks.is_empty() {
                    return Ok(CommandOutcome::Message("Library is empty".to_string()));
                }
                Ok(self.track_selection("Library", self.listing()))
            }
            "search" => {
                let query = args.join(" ").to_lowercase();
                if query.is_empty() {
                    return Err(PluginError::invalid_argument("search needs a query"));
                }
                let items: Vec<SelectionItem> = self
                    .tracks
                    .iter()
                    .filter(|t| {
                        t.title.to_lowercase().contains(&query)
                            || t.artist.to_lowercase().contains(&query)
                            || t.album
                                .as_deref()
                                .is_some_and(|a| a.to_lowercase().contains(&query))
                    })
                    .map(track_item)
                    .collect();
                if items.is_empty() {
                    return Ok(CommandOutcome::Message(format!("No matches for '{query}'")));
                }
                Ok(self.track_selection(&format!("Search: {query}"), items))
            }
            "playlists" => {
                let names = self.playlists.names();
                if names.is_empty() {
                    return Ok(CommandOutcome::Message("No playlists yet".to_string()));
                }
                let items = names
                    .into_iter()
                    .map(|name| {
                        SelectionItem::new(name.clone(), name)
                            .with_metadata(serde_json::json!({ "kind": "playlist" }))
                    })
                    .collect();
                Ok(CommandOutcome::Selection {
                    title: "Playlists".to_string(),
                    items,
                    special_actions: Vec::new(),
                })
            }
            "next" => self.skip_next(),
            "prev" | "previous" => self.skip_prev(),
            "playlist" => self.manage_playlist(args),
            "scan" => {
                let count = self.rescan()?;
                Ok(CommandOutcome::Message(format!(
                    "Scanned {count} tracks"
                )))
            }
            "shuffle" => {
                self.shuffle = !self.shuffle;
                Ok(CommandOutcome::Message(format!(
                    "Shuffle {}",
                    if self.shuffle { "on" } else { "off" }
                )))
            }
            other => Err(PluginError::UnknownCommand {
                command: other.to_string(),
            }),
        }
    }

    fn special_action(&mut self, key: char, item: &SelectionItem) -> PluginResult<CommandOutcome> {
        match key {
            'a' => {
                self.playlists
                    .append(QUICK_ADD_PLAYLIST, std::path::Path::new(&item.item_id))
                    .map_err(|err| PluginError::provider(err.to_string()))?;
                Ok(CommandOutcome::Message(format!(
                    "Added '{}' to {QUICK_ADD_PLAYLIST}",
                    item.display
                )))
            }
            other => Err(PluginError::UnknownCommand {
                command: other.to_string(),
            }),
        }
    }

    fn on_shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
        self.clear_playback();
    }
}
