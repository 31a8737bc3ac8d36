//! Reply text for group chats. Plain text only, so names never need escaping.

use chrono::{TimeZone, Utc};
use hushwatch_core::{Board, Leaderboards, RecordEntry, UserRef};

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Render a duration as "1 day, 2 hours, 3 minutes, 4 seconds".
///
/// Zero-valued units are omitted, fractional seconds are dropped and
/// negative or non-finite input renders as "0 seconds".
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds.floor() as u64 } else { 0 };
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(plural(minutes, "minute"));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(plural(secs, "second"));
    }
    parts.join(", ")
}

fn format_timestamp(timestamp: f64) -> String {
    Utc.timestamp_micros((timestamp * 1_000_000.0) as i64)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown time".to_string())
}

pub fn record_announcement(seconds: f64, previous: &UserRef, breaker: &UserRef) -> String {
    format!(
        "🎉 New inactivity record! 🎉\n\n\
         The new record is {}.\n\
         🤫 Last word: {}\n\
         🔔 Silence broken by: {}",
        format_duration(seconds),
        previous,
        breaker
    )
}

pub fn current_record(seconds: f64) -> String {
    format!(
        "The current inactivity record for this group is:\n{}",
        format_duration(seconds)
    )
}

fn board_section(boards: &Leaderboards, board: Board, title: &str, limit: usize) -> String {
    let mut lines = vec![title.to_string()];
    let top = boards.top(board, limit);
    if top.is_empty() {
        lines.push("No entries yet.".to_string());
    }
    for (rank, (_, entry)) in top.iter().enumerate() {
        lines.push(format!("{}. {} ({})", rank + 1, entry.name, entry.score));
    }
    lines.join("\n")
}

/// Top `limit` of both boards.
pub fn leaderboards(boards: &Leaderboards, limit: usize) -> String {
    if boards.is_empty() {
        return "🏆 No records have been broken in this group yet.".to_string();
    }
    format!(
        "🏆 Leaderboards\n\n{}\n\n{}",
        board_section(boards, Board::LastWord, "🤫 Last word before a record silence:", limit),
        board_section(boards, Board::SilenceBreaker, "🔔 Silence breakers:", limit),
    )
}

/// The `limit` most recent entries, newest first. `history` is oldest first.
pub fn history(history: &[RecordEntry], limit: usize) -> String {
    if history.is_empty() {
        return "📜 No record history for this group yet.".to_string();
    }
    let mut lines = vec!["📜 Recent records (newest first):".to_string()];
    for (i, entry) in history.iter().rev().take(limit).enumerate() {
        lines.push(format!(
            "{}. {} on {}\n   {} → {}",
            i + 1,
            format_duration(entry.record_seconds),
            format_timestamp(entry.timestamp),
            entry.last_user,
            entry.breaker_user
        ));
    }
    lines.join("\n")
}

pub fn announcements_toggled(enabled: bool) -> String {
    let status = if enabled { "✅ Enabled" } else { "❌ Disabled" };
    format!("📢 New record announcements are now {status} for this group.")
}

pub fn seeded(seconds: f64) -> String {
    format!("✅ Initial record has been set to {}.", format_duration(seconds))
}
