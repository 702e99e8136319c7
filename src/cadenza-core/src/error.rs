use thiserror::Error;

/// Failure taxonomy shared across the coordination core.
///
/// None of these abort the dispatch loop; they are converted to user-visible
/// messages at the dispatcher boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Plugin construction/initialization failed; the plugin is excluded and
    /// the registry keeps loading.
    #[error("plugin '{plugin_id}' failed to load: {reason}")]
    PluginLoad { plugin_id: String, reason: String },

    /// Unknown alias or subcommand; reported with no state change.
    #[error("unknown command: {input}")]
    CommandRouting { input: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("value {value} out of range [{min}, {max}]")]
    OutOfRange { value: i64, min: i64, max: i64 },

    /// Best-effort stop of the previous exclusive holder failed. The token
    /// transfers anyway.
    #[error("could not silence previous source '{previous}': {reason}")]
    ExclusivityConflict { previous: String, reason: String },

    /// Network/decode failure inside a plugin; surfaces as playback state
    /// `Error` with the cause string.
    #[error("provider failure: {message}")]
    Provider { message: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CoreError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        CoreError::Provider {
            message: message.into(),
        }
    }
}
