//! Offline record administration against the configured store.

use anyhow::{bail, Result};
use chrono::{TimeZone, Utc};
use hushwatch_commands::{format_duration, parse_seed_seconds, DisplayOptions};
use hushwatch_core::{Board, GroupId, Leaderboards, RecordEntry};
use hushwatch_engine::{GroupSettingsStore, RecordEngine};

use crate::terminal_output::{note_success, note_warn, render_table, Column};

pub async fn record(engine: &RecordEngine, group: GroupId) -> Result<()> {
    let seconds = engine.current_record(group).await?;
    println!("Group {group}: {} ({seconds:.0}s)", format_duration(seconds));
    Ok(())
}

fn board_rows(boards: &Leaderboards, board: Board, limit: usize) -> Vec<Vec<String>> {
    boards
        .top(board, limit)
        .into_iter()
        .enumerate()
        .map(|(i, (id, entry))| {
            vec![(i + 1).to_string(), entry.name, id.to_string(), entry.score.to_string()]
        })
        .collect()
}

pub async fn leaderboard(engine: &RecordEngine, group: GroupId, limit: usize) -> Result<()> {
    let boards = engine.leaderboards(group).await?;
    if boards.is_empty() {
        println!("Group {group} has no leaderboard entries yet.");
        return Ok(());
    }
    let columns = || {
        vec![Column::right("#"), Column::left("Name"), Column::right("User"), Column::right("Score")]
    };
    for board in Board::ALL {
        let title = match board {
            Board::LastWord => "Last word",
            Board::SilenceBreaker => "Silence breakers",
        };
        println!("{title}:");
        print!("{}", render_table(&columns(), &board_rows(&boards, board, limit)));
        println!();
    }
    Ok(())
}

fn history_rows(history: &[RecordEntry], limit: usize) -> Vec<Vec<String>> {
    history
        .iter()
        .rev()
        .take(limit)
        .map(|entry| {
            let when = Utc
                .timestamp_micros((entry.timestamp * 1_000_000.0) as i64)
                .single()
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            vec![
                when,
                format_duration(entry.record_seconds),
                entry.last_user.name.clone(),
                entry.breaker_user.name.clone(),
            ]
        })
        .collect()
}

pub async fn history(engine: &RecordEngine, group: GroupId, limit: usize) -> Result<()> {
    let history = engine.history(group).await?;
    if history.is_empty() {
        println!("Group {group} has no record history yet.");
        return Ok(());
    }
    let columns = [
        Column::left("When (UTC)"),
        Column::left("Record"),
        Column::left("Last word"),
        Column::left("Breaker"),
    ];
    print!("{}", render_table(&columns, &history_rows(&history, limit)));
    if history.len() > limit {
        println!("  ({} older entries not shown)", history.len() - limit);
    }
    Ok(())
}

pub async fn seed(
    engine: &RecordEngine,
    group: GroupId,
    seconds: Option<&str>,
    display: &DisplayOptions,
) -> Result<()> {
    let seconds = parse_seed_seconds(seconds, display.seed_seconds)?;
    engine.seed_record(group, seconds).await?;
    note_success(&format!("Group {group} record set to {}", format_duration(seconds)));
    Ok(())
}

pub async fn reset(engine: &RecordEngine, group: GroupId, confirmed: bool) -> Result<()> {
    if !confirmed {
        note_warn(&format!("This erases every record, leaderboard and setting of group {group}."));
        bail!("refusing to reset without --yes");
    }
    engine.reset_group(group).await?;
    note_success(&format!("Group {group} reset"));
    Ok(())
}

pub async fn toggle_announcements(settings: &GroupSettingsStore, group: GroupId) -> Result<()> {
    let enabled = settings.toggle_announcements(group).await?;
    let state = if enabled { "enabled" } else { "disabled" };
    note_success(&format!("Record announcements {state} for group {group}"));
    Ok(())
}
