//! Config defaults: fills unset values after loading.

use crate::schema::{
    HushwatchConfig, LoggingConfig, StorageConfig, TelegramConfig, TrackingConfig,
};

pub const DEFAULT_JSON_PATH: &str = "hushwatch.json";
pub const DEFAULT_SQLITE_PATH: &str = "hushwatch.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Initial record set by `/seed` without an argument (ten minutes).
pub const DEFAULT_SEED_SECONDS: f64 = 600.0;
pub const DEFAULT_LEADERBOARD_SIZE: usize = 5;
pub const DEFAULT_HISTORY_SIZE: usize = 5;

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: HushwatchConfig) -> HushwatchConfig {
    let config = apply_storage_defaults(config);
    let config = apply_logging_defaults(config);
    apply_tracking_defaults(config)
}

fn apply_storage_defaults(mut config: HushwatchConfig) -> HushwatchConfig {
    let path = config.storage_path().to_string();
    let storage = config.storage.get_or_insert_with(StorageConfig::default);
    storage.backend.get_or_insert_with(Default::default);
    if storage.path.is_none() && !path.is_empty() {
        storage.path = Some(path);
    }
    config
}

fn apply_logging_defaults(mut config: HushwatchConfig) -> HushwatchConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.json.is_none() {
        logging.json = Some(false);
    }
    config
}

fn apply_tracking_defaults(mut config: HushwatchConfig) -> HushwatchConfig {
    let tracking = config.tracking.get_or_insert_with(TrackingConfig::default);
    if tracking.seed_seconds.is_none() {
        tracking.seed_seconds = Some(DEFAULT_SEED_SECONDS);
    }
    if tracking.leaderboard_size.is_none() {
        tracking.leaderboard_size = Some(DEFAULT_LEADERBOARD_SIZE);
    }
    if tracking.history_size.is_none() {
        tracking.history_size = Some(DEFAULT_HISTORY_SIZE);
    }
    config
}

/// Config written by `hushwatch config init`. The token is left as an env
/// reference so the file itself holds no secret.
pub fn starter_config() -> HushwatchConfig {
    let config = HushwatchConfig {
        telegram: Some(TelegramConfig {
            bot_token: Some("${TELEGRAM_BOT_TOKEN}".to_string()),
            bot_username: None,
        }),
        ..Default::default()
    };
    apply_all_defaults(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StorageBackend;

    #[test]
    fn fills_every_section() {
        let cfg = apply_all_defaults(HushwatchConfig::default());
        let storage = cfg.storage.clone().unwrap();
        assert_eq!(storage.backend, Some(StorageBackend::Json));
        assert_eq!(storage.path.as_deref(), Some(DEFAULT_JSON_PATH));
        assert_eq!(cfg.logging.clone().unwrap().level.as_deref(), Some("info"));
        assert_eq!(cfg.tracking.unwrap().seed_seconds, Some(DEFAULT_SEED_SECONDS));
    }

    #[test]
    fn memory_backend_gets_no_path() {
        let cfg = HushwatchConfig {
            storage: Some(StorageConfig { backend: Some(StorageBackend::Memory), path: None }),
            ..Default::default()
        };
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.storage.unwrap().path, None);
    }

    #[test]
    fn does_not_override_user_values() {
        let cfg = HushwatchConfig {
            tracking: Some(TrackingConfig {
                seed_seconds: Some(60.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.seed_seconds(), 60.0);
        assert_eq!(cfg.leaderboard_size(), DEFAULT_LEADERBOARD_SIZE);
    }

    #[test]
    fn starter_references_token_env_var() {
        let cfg = starter_config();
        assert_eq!(cfg.bot_token(), Some("${TELEGRAM_BOT_TOKEN}"));
    }
}
