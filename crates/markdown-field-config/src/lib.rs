use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for `{key}` in {config_path}: {reason}")]
    InvalidValue {
        config_path: PathBuf,
        key: &'static str,
        reason: String,
    },
}

/// Which modifier key convention to use for shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformSetting {
    /// Decide from the operating system at startup
    #[default]
    Auto,
    Mac,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the mirrored form field
    pub field_name: String,
    /// Quiet period before an edit is recorded in history
    pub debounce_ms: u64,
    /// Maximum history entries; 0 keeps everything
    pub history_limit: usize,
    pub platform: PlatformSetting,
    /// File opened when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            field_name: "markdown".to_string(),
            debounce_ms: 300,
            history_limit: 500,
            platform: PlatformSetting::Auto,
            default_file: None,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.validate(config_path)?;

        // Expand shell variables and tilde in the default file path
        config.default_file = config
            .default_file
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Default location, `~/.config/markdown-field/config.toml`
    pub fn config_path() -> PathBuf {
        PathBuf::from(shellexpand::tilde("~/.config/markdown-field").into_owned())
            .join("config.toml")
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// History bound, `None` when unbounded
    pub fn history_limit(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.history_limit)
    }

    fn validate(&self, config_path: &Path) -> Result<(), ConfigError> {
        if self.field_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                config_path: config_path.to_path_buf(),
                key: "field_name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// `~` and `$VAR` expansion; `None` when a variable is unset
    fn expand_path(path: &Path) -> Option<PathBuf> {
        shellexpand::full(&path.to_string_lossy())
            .ok()
            .map(|expanded| PathBuf::from(expanded.into_owned()))
    }
}
