use std::path::{Path, PathBuf};

use hushwatch_commands::DisplayOptions;
use hushwatch_config::{HushwatchConfig, StorageBackend};
use hushwatch_logging::LogOptions;
use hushwatch_storage::GatewayKind;

/// Runtime pieces derived from the loaded config file.
#[derive(Debug, Clone)]
pub struct Runtime {
    pub gateway: GatewayKind,
    pub display: DisplayOptions,
    pub logging: LogOptions,
    pub bot_token: Option<String>,
    pub bot_username: Option<String>,
}

impl Runtime {
    /// Relative storage and log paths resolve against `base` (the config directory).
    pub fn from_config(config: &HushwatchConfig, base: &Path) -> Self {
        let resolve = |p: &str| -> PathBuf {
            let path = PathBuf::from(p);
            if path.is_absolute() { path } else { base.join(path) }
        };

        let gateway = match config.storage_backend() {
            StorageBackend::Memory => GatewayKind::Memory,
            StorageBackend::Json => GatewayKind::Json(resolve(config.storage_path())),
            StorageBackend::Sqlite => GatewayKind::Sqlite(resolve(config.storage_path())),
        };

        Self {
            gateway,
            display: DisplayOptions {
                leaderboard_size: config.leaderboard_size(),
                history_size: config.history_size(),
                seed_seconds: config.seed_seconds(),
            },
            logging: LogOptions {
                level: config.log_level().to_string(),
                dir: config.log_dir().map(resolve),
                json_console: config.log_json(),
            },
            bot_token: config.bot_token().map(str::to_string),
            bot_username: config.bot_username().map(|u| u.trim_start_matches('@').to_string()),
        }
    }
}
