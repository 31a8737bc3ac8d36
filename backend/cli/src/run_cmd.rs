//! `hushwatch run`: wire the store, engine, commands and Telegram together.

use std::sync::Arc;

use anyhow::{Context, Result};
use hushwatch_channels::{ChannelAdapter, MessageRouter, TelegramAdapter};
use hushwatch_commands::build_dispatcher;
use hushwatch_storage::open_gateway;
use tracing::info;

use crate::config::Runtime;

pub async fn run(runtime: Runtime) -> Result<()> {
    let token = runtime
        .bot_token
        .clone()
        .context("No Telegram bot token configured (telegram.botToken or TELEGRAM_BOT_TOKEN)")?;

    let gateway = open_gateway(&runtime.gateway).await?;
    let (engine, settings) = hushwatch_engine::build(gateway);
    let dispatcher = build_dispatcher(Arc::clone(&engine), Arc::clone(&settings), runtime.display);

    let router = Arc::new(MessageRouter::new(engine, settings, dispatcher));
    if let Some(username) = &runtime.bot_username {
        router.set_bot_username(username.clone());
    }

    let adapter = TelegramAdapter::new(token);
    info!(adapter = adapter.name(), storage = ?runtime.gateway, "Starting Hushwatch");
    adapter.start(router).await
}
