//! Telegram command menu.
//!
//! Publishes the registry through `setMyCommands` so clients can offer
//! completion for every slash command.

use anyhow::Result;
use hushwatch_commands::CommandRegistry;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tracing::info;

/// One menu entry per registered command, without the leading slash.
pub fn bot_commands(registry: &CommandRegistry) -> Vec<BotCommand> {
    registry
        .all()
        .iter()
        .map(|def| {
            let name = def.primary_alias().trim_start_matches('/');
            BotCommand::new(name, def.description.clone())
        })
        .collect()
}

pub async fn publish(bot: &Bot, registry: &CommandRegistry) -> Result<()> {
    let commands = bot_commands(registry);
    let count = commands.len();
    bot.set_my_commands(commands).await?;
    info!(count, "Published Telegram command menu");
    Ok(())
}
