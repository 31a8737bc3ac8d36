//! Record Event Logger
//!
//! One structured line per record break, under the `record_events` target so
//! it can be filtered or shipped separately.

use chrono::{DateTime, TimeZone, Utc};
use hushwatch_core::{GroupId, RecordEntry};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct RecordLogEntry {
    pub group_id: GroupId,
    pub record_seconds: f64,
    pub previous_record_seconds: Option<f64>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub last_user_id: i64,
    pub breaker_user_id: i64,
}

impl RecordLogEntry {
    pub fn from_entry(group_id: GroupId, entry: &RecordEntry, previous: Option<f64>) -> Self {
        let micros = (entry.timestamp * 1_000_000.0) as i64;
        Self {
            group_id,
            record_seconds: entry.record_seconds,
            previous_record_seconds: previous,
            recorded_at: Utc.timestamp_micros(micros).single(),
            last_user_id: entry.last_user.id,
            breaker_user_id: entry.breaker_user.id,
        }
    }
}

pub struct RecordLog;

impl RecordLog {
    /// Emit the record break. User names stay out of the log line; ids are enough.
    pub fn log_record(group_id: GroupId, entry: &RecordEntry, previous: Option<f64>) {
        let line = RecordLogEntry::from_entry(group_id, entry, previous);
        let payload = match serde_json::to_string(&line) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(group_id, "Failed to serialize record event: {e}");
                String::new()
            }
        };
        info!(
            target: "record_events",
            group_id,
            record_seconds = line.record_seconds,
            previous = ?previous,
            event = %payload,
            "New inactivity record"
        );
    }
}
