//! Hushwatch runtime configuration schema.
//!
//! Every field is optional on disk; [`crate::apply_all_defaults`] fills the
//! gaps and the accessors below read the filled-in values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::defaults::{
    DEFAULT_HISTORY_SIZE, DEFAULT_JSON_PATH, DEFAULT_LEADERBOARD_SIZE, DEFAULT_LOG_LEVEL,
    DEFAULT_SEED_SECONDS, DEFAULT_SQLITE_PATH,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HushwatchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Record tracking and display knobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<TrackingConfig>,
}

impl HushwatchConfig {
    pub fn bot_token(&self) -> Option<&str> {
        self.telegram
            .as_ref()
            .and_then(|t| t.bot_token.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub fn bot_username(&self) -> Option<&str> {
        self.telegram.as_ref().and_then(|t| t.bot_username.as_deref())
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.as_ref().and_then(|s| s.backend).unwrap_or_default()
    }

    /// Data file for the configured backend. Empty for `memory`.
    pub fn storage_path(&self) -> &str {
        if let Some(path) = self.storage.as_ref().and_then(|s| s.path.as_deref()) {
            return path;
        }
        match self.storage_backend() {
            StorageBackend::Json => DEFAULT_JSON_PATH,
            StorageBackend::Sqlite => DEFAULT_SQLITE_PATH,
            StorageBackend::Memory => "",
        }
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn seed_seconds(&self) -> f64 {
        self.tracking
            .as_ref()
            .and_then(|t| t.seed_seconds)
            .unwrap_or(DEFAULT_SEED_SECONDS)
    }

    pub fn leaderboard_size(&self) -> usize {
        self.tracking
            .as_ref()
            .and_then(|t| t.leaderboard_size)
            .unwrap_or(DEFAULT_LEADERBOARD_SIZE)
    }

    pub fn history_size(&self) -> usize {
        self.tracking
            .as_ref()
            .and_then(|t| t.history_size)
            .unwrap_or(DEFAULT_HISTORY_SIZE)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    /// Without it the username is asked from Telegram at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<StorageBackend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Json => "json",
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StorageBackend::Json),
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{other}' (json, sqlite, memory)")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `hushwatch_engine=debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for daily-rotated log files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaderboard_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_size: Option<usize>,
}
