use serde::{Deserialize, Serialize};

/// Playback status shared by every plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Loading,
    Playing,
    Paused,
    Error,
}

impl PlaybackStatus {
    /// True while a track is audibly or imminently underway.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PlaybackStatus::Playing | PlaybackStatus::Paused | PlaybackStatus::Loading
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlaybackStatus::Stopped => "stopped",
            PlaybackStatus::Loading => "loading",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
            PlaybackStatus::Error => "error",
        }
    }
}

/// Canonical snapshot of what is currently playing.
///
/// Owned by the player session; plugins never mutate this directly, they
/// submit [`PlaybackUpdate`] reports instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlaybackInfo {
    pub track_name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Position in seconds from track start.
    pub position_seconds: f64,
    /// Duration in seconds when the source knows it.
    pub duration_seconds: Option<f64>,
    /// Id of the plugin this snapshot came from (display only).
    pub source: Option<String>,
    pub status: PlaybackStatus,
    /// Human-readable cause, set only while `status` is `Error`.
    pub error: Option<String>,
}

impl PlaybackInfo {
    /// Apply a partial report: explicit fields overwrite, unspecified fields
    /// retain their prior values.
    pub fn apply(&mut self, update: &PlaybackUpdate) {
        if let Some(track_name) = &update.track_name {
            self.track_name = Some(track_name.clone());
        }
        if let Some(artist) = &update.artist {
            self.artist = Some(artist.clone());
        }
        if let Some(album) = &update.album {
            self.album = Some(album.clone());
        }
        if let Some(position) = update.position_seconds {
            self.position_seconds = position.max(0.0);
        }
        if let Some(duration) = update.duration_seconds {
            self.duration_seconds = Some(duration.max(0.0));
        }
        if let Some(status) = update.status {
            self.status = status;
            if status != PlaybackStatus::Error {
                self.error = None;
            }
        }
        if let Some(error) = &update.error {
            self.error = Some(error.clone());
        }
    }
}

/// Partial playback report submitted by a plugin.
///
/// `None` means "no opinion", not "clear the field".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlaybackUpdate {
    pub track_name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub position_seconds: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub status: Option<PlaybackStatus>,
    pub error: Option<String>,
}

impl PlaybackUpdate {
    pub fn status(status: PlaybackStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn error(cause: impl Into<String>) -> Self {
        Self {
            status: Some(PlaybackStatus::Error),
            error: Some(cause.into()),
            ..Self::default()
        }
    }
}

/// One selectable row in a paginated result set.
///
/// `metadata` is opaque to the core and passed through verbatim to whichever
/// plugin consumes the selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionItem {
    pub display: String,
    pub item_id: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl SelectionItem {
    pub fn new(display: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            item_id: item_id.into(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A single-key action a plugin registers on a pagination session, e.g.
/// `a` = add the highlighted item to a playlist. Invoking one performs the
/// side effect without ending the browse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAction {
    pub key: char,
    pub label: String,
}

impl SpecialAction {
    pub fn new(key: char, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
        }
    }
}

/// One entry in a plugin's contribution to the global help menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHelp {
    pub command: String,
    pub description: String,
}

impl CommandHelp {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_overwrites_only_explicit_fields() {
        let mut info = PlaybackInfo {
            track_name: Some("First".into()),
            artist: Some("Band".into()),
            position_seconds: 12.0,
            status: PlaybackStatus::Playing,
            ..PlaybackInfo::default()
        };

        info.apply(&PlaybackUpdate {
            position_seconds: Some(13.5),
            ..PlaybackUpdate::default()
        });

        assert_eq!(info.track_name.as_deref(), Some("First"));
        assert_eq!(info.artist.as_deref(), Some("Band"));
        assert_eq!(info.position_seconds, 13.5);
        assert_eq!(info.status, PlaybackStatus::Playing);
    }

    #[test]
    fn apply_clamps_negative_position() {
        let mut info = PlaybackInfo::default();
        info.apply(&PlaybackUpdate {
            position_seconds: Some(-3.0),
            ..PlaybackUpdate::default()
        });
        assert_eq!(info.position_seconds, 0.0);
    }

    #[test]
    fn leaving_error_clears_cause() {
        let mut info = PlaybackInfo::default();
        info.apply(&PlaybackUpdate::error("decode failed"));
        assert_eq!(info.status, PlaybackStatus::Error);
        assert_eq!(info.error.as_deref(), Some("decode failed"));

        info.apply(&PlaybackUpdate::status(PlaybackStatus::Playing));
        assert!(info.error.is_none());
    }

    #[test]
    fn selection_item_metadata_defaults_to_null() {
        let item: SelectionItem =
            serde_json::from_str(r#"{"display":"Song","item_id":"1"}"#).unwrap();
        assert!(item.metadata.is_null());
    }
}
