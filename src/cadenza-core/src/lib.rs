pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod paths;

pub use config::{env_or, Config, ConfigError, LogLevel, LoggingConfig, SortOrder, ValidationError};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use models::{
    CommandHelp, PlaybackInfo, PlaybackStatus, PlaybackUpdate, SelectionItem, SpecialAction,
};
pub use paths::{AppDirs, DirsError};

pub const APP_NAME: &str = "cadenza";
pub const APP_AUTHOR: &str = "Cadenza";
pub const APP_QUALIFIER: &str = "io";
