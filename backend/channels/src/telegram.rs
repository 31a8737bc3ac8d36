use std::sync::Arc;

use async_trait::async_trait;
use hushwatch_core::{GroupId, UserId, UserRef};
use teloxide::prelude::*;
use teloxide::types::{Message, ReplyParameters, UserId as TgUserId};
use tracing::{error, info, warn};

use crate::router::{AdminCheck, InboundMessage, MessageRouter};
use crate::{telegram_commands, ChannelAdapter};

pub struct TelegramAdapter {
    bot: Bot,
}

impl TelegramAdapter {
    pub fn new(token: String) -> Self {
        Self { bot: Bot::new(token) }
    }
}

/// Admin lookups through `getChatMember`.
pub struct TelegramAdmins {
    bot: Bot,
}

impl TelegramAdmins {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl AdminCheck for TelegramAdmins {
    async fn is_admin(&self, group: GroupId, user: UserId) -> anyhow::Result<bool> {
        // In a private chat the chat id is the user id.
        if group == user {
            return Ok(true);
        }
        let member = self.bot.get_chat_member(ChatId(group), TgUserId(user as u64)).await?;
        Ok(member.kind.is_privileged())
    }
}

fn to_inbound(msg: &Message) -> Option<InboundMessage> {
    let from = msg.from.as_ref()?;
    Some(InboundMessage {
        group_id: msg.chat.id.0,
        timestamp: msg.date.timestamp() as f64,
        sender: UserRef::new(from.id.0 as i64, from.full_name()),
        text: msg.text().map(str::to_string),
    })
}

async fn handle_update(bot: Bot, msg: Message, router: Arc<MessageRouter>) -> ResponseResult<()> {
    let Some(inbound) = to_inbound(&msg) else {
        return respond(());
    };
    let admins = TelegramAdmins::new(bot.clone());
    match router.route(&inbound, &admins).await {
        Ok(Some(reply)) => {
            let mut request = bot.send_message(msg.chat.id, reply.text);
            if reply.quote {
                request = request.reply_parameters(ReplyParameters::new(msg.id));
            }
            if let Err(e) = request.await {
                warn!(group_id = inbound.group_id, "Failed to send Telegram reply: {e}");
            }
        }
        Ok(None) => {}
        Err(e) => error!(group_id = inbound.group_id, "Failed to process message: {e:#}"),
    }
    respond(())
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self, router: Arc<MessageRouter>) -> anyhow::Result<()> {
        info!("Starting Telegram adapter");

        let bot = self.bot.clone();
        if router.bot_username().is_none() {
            let me = bot.get_me().await?;
            info!(username = me.username(), "Resolved bot username");
            router.set_bot_username(me.username());
        }

        if let Err(e) = telegram_commands::publish(&bot, router.registry()).await {
            warn!("Could not publish command menu: {e:#}");
        }

        let handler = Update::filter_message().endpoint(handle_update);

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![router])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram adapter stopped");
        Ok(())
    }
}

