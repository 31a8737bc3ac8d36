//! Structured Logger
//!
//! Wraps `tracing` with a console layer, an optional rolling NDJSON file
//! layer, and `RUST_LOG`-overridable level control.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name prefix of the rotated log files (`hushwatch.log.YYYY-MM-DD`).
const LOG_FILE_PREFIX: &str = "hushwatch.log";

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for rotated NDJSON files. `None` logs to the console only.
    pub dir: Option<PathBuf>,
    /// Emit console lines as JSON instead of the human format.
    pub json_console: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self { level: "info".to_string(), dir: None, json_console: false }
    }
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global subscriber. Calling it twice is harmless; the second
/// call leaves the first subscriber in place.
pub fn init_logger(options: &LogOptions) {
    let console_layer = if options.json_console {
        fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(true)
            .boxed()
    };

    let file_layer = options.dir.as_ref().map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer()
            .json()
            .with_writer(appender)
            .with_ansi(false)
            .boxed()
    });

    let _ = tracing_subscriber::registry()
        .with(build_filter(&options.level))
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_log_info_to_console() {
        let options = LogOptions::default();
        assert_eq!(options.level, "info");
        assert!(options.dir.is_none());
        assert!(!options.json_console);
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_logger(&LogOptions::default());
        init_logger(&LogOptions::default());
    }
}
