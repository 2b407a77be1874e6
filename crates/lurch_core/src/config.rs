//! Core runtime configuration.
//!
//! # Responsibility
//! - Load JSON configuration with per-field defaults.
//! - Validate directories before logging or storage is started.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_NOTIFICATION_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid { field: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "config is not valid JSON: {err}"),
            Self::Invalid { field, message } => write!(f, "invalid `{field}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Settings shared by the library and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub log_level: String,
    /// Absolute directory for rolling logs; logging stays off when absent.
    pub log_dir: Option<PathBuf>,
    /// SQLite file for the key-value store; in-memory when absent.
    pub storage_path: Option<PathBuf>,
    /// Target directory for the offline download backend.
    pub downloads_dir: Option<PathBuf>,
    pub notification_timeout_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            storage_path: None,
            downloads_dir: None,
            notification_timeout_ms: DEFAULT_NOTIFICATION_TIMEOUT_MS,
        }
    }
}

impl CoreConfig {
    /// Reads and validates a JSON config file. Missing fields use defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects empty or relative directories.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_dir("log_dir", self.log_dir.as_deref())?;
        check_dir("downloads_dir", self.downloads_dir.as_deref())?;
        if let Some(path) = self.storage_path.as_deref() {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "storage_path",
                    message: "cannot be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }
}

fn check_dir(field: &'static str, dir: Option<&Path>) -> Result<(), ConfigError> {
    let Some(dir) = dir else {
        return Ok(());
    };
    if dir.as_os_str().is_empty() {
        return Err(ConfigError::Invalid {
            field,
            message: "cannot be empty".to_string(),
        });
    }
    if !dir.is_absolute() {
        return Err(ConfigError::Invalid {
            field,
            message: format!("must be an absolute path, got `{}`", dir.display()),
        });
    }
    Ok(())
}
