use crate::paths::AppDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

const CURRENT_CONFIG_VERSION: u32 = 1;

pub const DEFAULT_VOLUME: u8 = 70;
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub config_version: u32,
    /// Root directory of the local media library.
    #[serde(default)]
    pub library_path: Option<PathBuf>,
    #[serde(default = "default_volume")]
    pub default_volume: u8,
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Items per pagination page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Per-plugin settings keyed by plugin id.
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginSettings>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            library_path: None,
            default_volume: default_volume(),
            sort_order: SortOrder::default(),
            page_size: default_page_size(),
            logging: LoggingConfig::default(),
            plugins: BTreeMap::new(),
        }
    }
}

/// Settings a user may override per plugin.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PluginSettings {
    /// Command alias overriding the plugin's default (e.g. `sp` for Spotify).
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Title,
    Artist,
    Path,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
    #[serde(default = "default_stdout_enabled")]
    pub stdout: bool,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_log_files: default_max_log_files(),
            stdout: default_stdout_enabled(),
            file_name: None,
        }
    }
}

impl LoggingConfig {
    /// Stem the rolling appender names log files after.
    pub fn file_stem(&self) -> &str {
        self.file_name.as_deref().unwrap_or("cadenza.log")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config validation failed: {0}")]
    Validation(ValidationError),
    #[error("failed to prepare configuration directories: {0}")]
    Directories(#[from] crate::paths::DirsError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unsupported config_version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("default_volume {found} exceeds 100")]
    VolumeOutOfRange { found: u8 },
    #[error("page_size must be at least 1")]
    ZeroPageSize,
}

impl Config {
    pub fn load_or_default(dirs: &AppDirs) -> Result<Self, ConfigError> {
        dirs.ensure_exists()?;
        let path = Self::config_path(dirs);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    pub fn config_path(dirs: &AppDirs) -> PathBuf {
        dirs.config_dir().join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.config_version != CURRENT_CONFIG_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.config_version,
                expected: CURRENT_CONFIG_VERSION,
            });
        }
        if self.default_volume > 100 {
            return Err(ValidationError::VolumeOutOfRange {
                found: self.default_volume,
            });
        }
        if self.page_size == 0 {
            return Err(ValidationError::ZeroPageSize);
        }
        Ok(())
    }

    /// Alias configured for a plugin, if any.
    pub fn plugin_alias(&self, plugin_id: &str) -> Option<&str> {
        self.plugins.get(plugin_id)?.alias.as_deref()
    }

    pub fn plugin_enabled(&self, plugin_id: &str) -> bool {
        self.plugins
            .get(plugin_id)
            .map(|settings| settings.enabled)
            .unwrap_or(true)
    }
}

/// Environment lookup with a default, the shape plugins use for their own
/// aliases and provider credentials.
pub fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_volume() -> u8 {
    DEFAULT_VOLUME
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_enabled() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_max_log_files() -> usize {
    7
}

fn default_stdout_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_volume, 70);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.sort_order, SortOrder::Title);
        assert!(config.library_path.is_none());
    }

    #[test]
    fn invalid_version_rejected() {
        let mut config = Config::default();
        config.config_version = CURRENT_CONFIG_VERSION + 1;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn volume_over_hundred_rejected() {
        let mut config = Config::default();
        config.default_volume = 150;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::VolumeOutOfRange { found: 150 })
        ));
    }

    #[test]
    fn plugin_alias_lookup() {
        let toml = r#"
            [plugins.spotify]
            alias = "sp"

            [plugins.podcast]
            enabled = false
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.plugin_alias("spotify"), Some("sp"));
        assert_eq!(config.plugin_alias("podcast"), None);
        assert!(!config.plugin_enabled("podcast"));
        assert!(config.plugin_enabled("unknown"));
    }

    #[test]
    fn env_or_falls_back_to_default() {
        assert_eq!(env_or("CADENZA_TEST_UNSET_VAR", "fallback"), "fallback");
    }
}
