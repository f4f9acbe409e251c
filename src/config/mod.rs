use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::history::DEFAULT_MAX_HISTORY;

mod error;

pub use error::{map_api_result, ConfigError, ConfigErrorCode, ConfigResult};

pub const ENV_MAX_ENTRIES: &str = "FS_HISTORY_MAX_ENTRIES";
pub const ENV_LOG_DIR: &str = "FS_HISTORY_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "FS_HISTORY_LOG_LEVEL";

const APP_DIR: &str = "fs-history";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Oldest entries are evicted beyond this many.
    pub max_entries: usize,
    pub logging: LoggingConfig,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_HISTORY,
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Falls back to `<data dir>/fs-history/logs`.
    pub directory: Option<PathBuf>,
    pub file_name: String,
    pub default_directive: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: "fs-history.log".into(),
            default_directive: "info".into(),
        }
    }
}

impl LoggingConfig {
    pub fn log_dir(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            dirs_next::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR)
                .join("logs")
        })
    }
}

impl HistoryConfig {
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|e| {
            ConfigError::new(
                ConfigErrorCode::ParseFailed,
                format!("Failed to parse history config: {e}"),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `FS_HISTORY_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_ENTRIES) {
            self.max_entries = raw.trim().parse().map_err(|_| {
                ConfigError::new(
                    ConfigErrorCode::InvalidValue,
                    format!("Invalid value for {ENV_MAX_ENTRIES}: {raw}"),
                )
            })?;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|d| !d.trim().is_empty()) {
            self.logging.directory = Some(PathBuf::from(dir));
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|l| !l.trim().is_empty()) {
            self.logging.default_directive = level;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_entries == 0 {
            return Err(ConfigError::new(
                ConfigErrorCode::InvalidValue,
                "History must keep at least one entry",
            ));
        }
        if self.logging.file_name.trim().is_empty() {
            return Err(ConfigError::new(
                ConfigErrorCode::InvalidValue,
                "Log file name cannot be empty",
            ));
        }
        if let Some(dir) = &self.logging.directory {
            if !dir.is_absolute() {
                return Err(ConfigError::new(
                    ConfigErrorCode::InvalidValue,
                    "Log directory must be an absolute path",
                ));
            }
        }
        Ok(())
    }
}
