/// Built-in command handlers.
///
/// Each handler is a concrete struct implementing `CommandHandler` and
/// talks to the record engine or the settings store for the invoking group.
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use hushwatch_core::HushError;
use hushwatch_engine::{GroupSettingsStore, RecordEngine};
use tracing::info;

use crate::dispatch::{CommandContext, CommandHandler, CommandResponse};
use crate::format;
use crate::registry::CommandRegistry;
use crate::types::CommandInvocation;

/// How much the read-only commands show, and the default seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayOptions {
    pub leaderboard_size: usize,
    pub history_size: usize,
    pub seed_seconds: f64,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self { leaderboard_size: 5, history_size: 5, seed_seconds: 600.0 }
    }
}

/// Parse the optional `/seed` argument.
///
/// Missing means `default`. Anything that is not a finite number above zero
/// is rejected.
pub fn parse_seed_seconds(arg: Option<&str>, default: f64) -> hushwatch_core::Result<f64> {
    let Some(raw) = arg.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    let seconds: f64 = raw
        .parse()
        .map_err(|_| HushError::invalid_input(format!("'{raw}' is not a number of seconds.")))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(HushError::invalid_input("The seed must be more than zero seconds."));
    }
    Ok(seconds)
}

// ---------------------------------------------------------------------------
// /start, /help
// ---------------------------------------------------------------------------

pub struct StartHandler;

#[async_trait]
impl CommandHandler for StartHandler {
    async fn handle(&self, _ctx: &CommandContext, _inv: &CommandInvocation) -> Result<CommandResponse> {
        Ok(CommandResponse::ok(
            "🤫 Hi! I keep track of the longest silence in this group.\n\
             Whoever breaks a record silence gets the credit, and so does \
             whoever had the last word before it.\n\
             Send /help to see what I can do.",
        ))
    }
}

pub struct HelpHandler {
    pub registry: CommandRegistry,
}

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn handle(&self, _ctx: &CommandContext, _inv: &CommandInvocation) -> Result<CommandResponse> {
        let mut lines = vec!["Available commands:".to_string()];
        for cmd in self.registry.all() {
            let admin = if cmd.admin_only { " (admins only)" } else { "" };
            lines.push(format!("{} - {}{}", cmd.usage(), cmd.description, admin));
        }
        Ok(CommandResponse::ok(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// /record, /leaderboard, /history
// ---------------------------------------------------------------------------

pub struct RecordHandler {
    pub engine: Arc<RecordEngine>,
}

#[async_trait]
impl CommandHandler for RecordHandler {
    async fn handle(&self, ctx: &CommandContext, _inv: &CommandInvocation) -> Result<CommandResponse> {
        let seconds = self.engine.current_record(ctx.group_id).await?;
        Ok(CommandResponse::ok(format::current_record(seconds)))
    }
}

pub struct LeaderboardHandler {
    pub engine: Arc<RecordEngine>,
    pub limit: usize,
}

#[async_trait]
impl CommandHandler for LeaderboardHandler {
    async fn handle(&self, ctx: &CommandContext, _inv: &CommandInvocation) -> Result<CommandResponse> {
        let boards = self.engine.leaderboards(ctx.group_id).await?;
        Ok(CommandResponse::ok(format::leaderboards(&boards, self.limit)))
    }
}

pub struct HistoryHandler {
    pub engine: Arc<RecordEngine>,
    pub limit: usize,
}

#[async_trait]
impl CommandHandler for HistoryHandler {
    async fn handle(&self, ctx: &CommandContext, _inv: &CommandInvocation) -> Result<CommandResponse> {
        let history = self.engine.history(ctx.group_id).await?;
        Ok(CommandResponse::ok(format::history(&history, self.limit)))
    }
}

// ---------------------------------------------------------------------------
// Admin: /toggle_announcements, /seed, /clean
// ---------------------------------------------------------------------------

pub struct ToggleAnnouncementsHandler {
    pub settings: Arc<GroupSettingsStore>,
}

#[async_trait]
impl CommandHandler for ToggleAnnouncementsHandler {
    async fn handle(&self, ctx: &CommandContext, _inv: &CommandInvocation) -> Result<CommandResponse> {
        let enabled = self.settings.toggle_announcements(ctx.group_id).await?;
        Ok(CommandResponse::ok(format::announcements_toggled(enabled)))
    }
}

pub struct SeedHandler {
    pub engine: Arc<RecordEngine>,
    pub default_seconds: f64,
}

#[async_trait]
impl CommandHandler for SeedHandler {
    async fn handle(&self, ctx: &CommandContext, inv: &CommandInvocation) -> Result<CommandResponse> {
        let seconds = parse_seed_seconds(inv.args.first().map(String::as_str), self.default_seconds)?;
        self.engine.seed_record(ctx.group_id, seconds).await?;
        info!(group_id = ctx.group_id, user_id = ctx.sender.id, seconds, "[Commands] Record seeded");
        Ok(CommandResponse::ok(format::seeded(seconds)))
    }
}

pub struct CleanHandler {
    pub engine: Arc<RecordEngine>,
}

#[async_trait]
impl CommandHandler for CleanHandler {
    async fn handle(&self, ctx: &CommandContext, _inv: &CommandInvocation) -> Result<CommandResponse> {
        self.engine.reset_group(ctx.group_id).await?;
        info!(group_id = ctx.group_id, user_id = ctx.sender.id, "[Commands] Group cleaned");
        Ok(CommandResponse::ok(
            "🧹 All records, leaderboards, history and settings for this group have been erased.",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_defaults_when_missing() {
        assert_eq!(parse_seed_seconds(None, 600.0).unwrap(), 600.0);
        assert_eq!(parse_seed_seconds(Some("  "), 600.0).unwrap(), 600.0);
        assert_eq!(parse_seed_seconds(Some("90.5"), 600.0).unwrap(), 90.5);
    }

    #[test]
    fn seed_rejects_bad_values() {
        for bad in ["0", "-3", "abc", "inf", "NaN"] {
            let err = parse_seed_seconds(Some(bad), 600.0).unwrap_err();
            assert!(matches!(err, HushError::InvalidInput(_)), "{bad} should be rejected");
        }
    }
}
