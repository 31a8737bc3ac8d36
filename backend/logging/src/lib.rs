//! Structured logging for Hushwatch.
//!
//! Console output plus optional daily-rotated NDJSON files, and a dedicated
//! event line for every record break.

pub mod logger;
pub mod record_log;

pub use logger::{LogOptions, init_logger};
pub use record_log::{RecordLog, RecordLogEntry};
