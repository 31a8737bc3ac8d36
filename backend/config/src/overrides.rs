//! Environment overrides applied on top of the config file.
//!
//! | variable             | overrides            |
//! |----------------------|----------------------|
//! | `TELEGRAM_BOT_TOKEN` | `telegram.botToken`  |
//! | `HUSHWATCH_STORAGE`  | `storage.backend`    |
//! | `HUSHWATCH_DB`       | `storage.path`       |
//! | `RUST_LOG`           | `logging.level`      |

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use tracing::debug;

use crate::schema::{HushwatchConfig, LoggingConfig, StorageBackend, StorageConfig, TelegramConfig};

pub fn apply_env_overrides(config: HushwatchConfig) -> Result<HushwatchConfig> {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

pub fn apply_env_overrides_with(
    mut config: HushwatchConfig,
    env: &HashMap<String, String>,
) -> Result<HushwatchConfig> {
    let get = |key: &str| env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
        debug!("Bot token taken from TELEGRAM_BOT_TOKEN");
        config.telegram.get_or_insert_with(TelegramConfig::default).bot_token = Some(token.to_string());
    }
    if let Some(backend) = get("HUSHWATCH_STORAGE") {
        let backend: StorageBackend =
            backend.parse().map_err(|e| anyhow!("HUSHWATCH_STORAGE: {e}"))?;
        let storage = config.storage.get_or_insert_with(StorageConfig::default);
        if storage.backend != Some(backend) {
            // A path chosen for another backend would point at the wrong file format.
            storage.path = None;
        }
        storage.backend = Some(backend);
    }
    if let Some(path) = get("HUSHWATCH_DB") {
        config.storage.get_or_insert_with(StorageConfig::default).path = Some(path.to_string());
    }
    if let Some(level) = get("RUST_LOG") {
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(level.to_string());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn token_override_wins() {
        let cfg = HushwatchConfig {
            telegram: Some(TelegramConfig { bot_token: Some("file".into()), bot_username: None }),
            ..Default::default()
        };
        let cfg = apply_env_overrides_with(cfg, &env(&[("TELEGRAM_BOT_TOKEN", "env")])).unwrap();
        assert_eq!(cfg.bot_token(), Some("env"));
    }

    #[test]
    fn storage_overrides() {
        let cfg = apply_env_overrides_with(
            HushwatchConfig::default(),
            &env(&[("HUSHWATCH_STORAGE", "sqlite"), ("HUSHWATCH_DB", "/tmp/h.db")]),
        )
        .unwrap();
        assert_eq!(cfg.storage_backend(), StorageBackend::Sqlite);
        assert_eq!(cfg.storage_path(), "/tmp/h.db");
    }

    #[test]
    fn switching_backend_drops_stale_path() {
        let cfg = HushwatchConfig {
            storage: Some(StorageConfig {
                backend: Some(StorageBackend::Json),
                path: Some("data.json".into()),
            }),
            ..Default::default()
        };
        let cfg = apply_env_overrides_with(cfg, &env(&[("HUSHWATCH_STORAGE", "sqlite")])).unwrap();
        assert_eq!(cfg.storage_path(), crate::defaults::DEFAULT_SQLITE_PATH);
    }

    #[test]
    fn unknown_backend_is_an_error() {
        let err = apply_env_overrides_with(
            HushwatchConfig::default(),
            &env(&[("HUSHWATCH_STORAGE", "redis")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("HUSHWATCH_STORAGE"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let cfg = apply_env_overrides_with(
            HushwatchConfig::default(),
            &env(&[("TELEGRAM_BOT_TOKEN", "  "), ("RUST_LOG", "")]),
        )
        .unwrap();
        assert_eq!(cfg, HushwatchConfig::default());
    }
}
