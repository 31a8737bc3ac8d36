//! Config validation with path-tagged messages.

use crate::schema::{HushwatchConfig, StorageBackend};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

pub fn validate(config: &HushwatchConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_telegram(config, &mut report);
    validate_storage(config, &mut report);
    validate_tracking(config, &mut report);
    report
}

/// A missing token only matters for `hushwatch run`, so it is a warning here.
fn validate_telegram(config: &HushwatchConfig, report: &mut ValidationReport) {
    match config.bot_token() {
        None => report.warn("telegram.botToken", "No Telegram bot token; the bot cannot start"),
        Some(token) if !token.contains(':') => {
            report.warn("telegram.botToken", "Token does not look like '<id>:<secret>'")
        }
        Some(_) => {}
    }
    if let Some(name) = config.bot_username() {
        if name.trim_start_matches('@').is_empty() {
            report.error("telegram.botUsername", "Bot username cannot be empty");
        }
    }
}

fn validate_storage(config: &HushwatchConfig, report: &mut ValidationReport) {
    match config.storage_backend() {
        StorageBackend::Memory => {
            report.warn("storage.backend", "In-memory storage loses all records on restart")
        }
        _ if config.storage_path().trim().is_empty() => {
            report.error("storage.path", "A file path is required for this backend")
        }
        _ => {}
    }
}

fn validate_tracking(config: &HushwatchConfig, report: &mut ValidationReport) {
    let seed = config.seed_seconds();
    if !seed.is_finite() || seed <= 0.0 {
        report.error("tracking.seedSeconds", "seedSeconds must be a positive number");
    }
    if config.leaderboard_size() == 0 {
        report.error("tracking.leaderboardSize", "leaderboardSize must be >= 1");
    }
    if config.history_size() == 0 {
        report.error("tracking.historySize", "historySize must be >= 1");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{StorageConfig, TelegramConfig, TrackingConfig};

    #[test]
    fn defaults_are_valid_but_warn_about_token() {
        let report = validate(&crate::apply_all_defaults(HushwatchConfig::default()));
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert_eq!(report.warnings[0].path, "telegram.botToken");
    }

    #[test]
    fn zero_sizes_and_seed_are_errors() {
        let cfg = HushwatchConfig {
            tracking: Some(TrackingConfig {
                seed_seconds: Some(0.0),
                leaderboard_size: Some(0),
                history_size: Some(0),
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn empty_path_is_error() {
        let cfg = HushwatchConfig {
            storage: Some(StorageConfig { backend: Some(StorageBackend::Sqlite), path: Some(" ".into()) }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.errors.iter().any(|e| e.path == "storage.path"));
    }

    #[test]
    fn well_formed_token_has_no_warning() {
        let cfg = HushwatchConfig {
            telegram: Some(TelegramConfig { bot_token: Some("123:abc".into()), bot_username: None }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.warnings.iter().all(|w| w.path != "telegram.botToken"));
    }
}
