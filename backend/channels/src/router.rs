//! Transport-agnostic handling of one inbound chat message.
//!
//! Plain text feeds the record engine; slash commands go to the command
//! dispatcher and are never tracked. Adapters only translate their native
//! updates into [`InboundMessage`] and send back whatever reply comes out.

use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use hushwatch_commands::{
    detect_command, format, is_command_like, CommandContext, CommandDispatcher,
    CommandRegistry,
};
use hushwatch_core::{GroupId, MessageEvent, Outcome, UserId, UserRef};
use hushwatch_engine::{GroupSettingsStore, RecordEngine};
use tracing::{debug, error, warn};

/// Answers whether a user administers a group. Only consulted for
/// admin-only commands.
#[async_trait]
pub trait AdminCheck: Send + Sync {
    async fn is_admin(&self, group: GroupId, user: UserId) -> Result<bool>;
}

#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub group_id: GroupId,
    /// Unix seconds the transport stamped on the message.
    pub timestamp: f64,
    pub sender: UserRef,
    /// `None` for stickers, photos and other non-text messages.
    pub text: Option<String>,
}

/// Text to post back, and whether it answers the triggering message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quote: bool,
}

impl Reply {
    fn broadcast(text: String) -> Self {
        Self { text, quote: false }
    }

    fn to_sender(text: String) -> Self {
        Self { text, quote: true }
    }
}

pub struct MessageRouter {
    engine: Arc<RecordEngine>,
    settings: Arc<GroupSettingsStore>,
    dispatcher: CommandDispatcher,
    bot_username: OnceLock<String>,
}

impl MessageRouter {
    pub fn new(
        engine: Arc<RecordEngine>,
        settings: Arc<GroupSettingsStore>,
        dispatcher: CommandDispatcher,
    ) -> Self {
        Self { engine, settings, dispatcher, bot_username: OnceLock::new() }
    }

    /// Username commands must be addressed to in the `/cmd@name` form.
    /// The first call wins.
    pub fn set_bot_username(&self, username: impl Into<String>) {
        let _ = self.bot_username.set(username.into());
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.dispatcher.registry()
    }

    pub fn bot_username(&self) -> Option<&str> {
        self.bot_username.get().map(String::as_str)
    }

    /// Handle one message and return the reply to post, if any.
    ///
    /// Tracking failures are returned as errors. Command failures are logged
    /// and answered with a generic apology so the chat is never left hanging.
    pub async fn route(&self, msg: &InboundMessage, admins: &dyn AdminCheck) -> Result<Option<Reply>> {
        let Some(text) = msg.text.as_deref() else {
            debug!(group_id = msg.group_id, "Ignoring non-text message");
            return Ok(None);
        };

        if is_command_like(text) {
            return Ok(self.run_command(msg, text, admins).await);
        }

        let event = MessageEvent::new(msg.group_id, msg.timestamp, msg.sender.clone());
        let outcome = self.engine.handle_event(&event).await?;

        let Outcome::NewRecord { seconds, previous_user, breaker_user } = outcome else {
            return Ok(None);
        };
        if !self.settings.is_announcement_enabled(msg.group_id).await? {
            debug!(group_id = msg.group_id, "Announcements disabled; staying quiet");
            return Ok(None);
        }
        Ok(Some(Reply::broadcast(format::record_announcement(
            seconds,
            &previous_user,
            &breaker_user,
        ))))
    }

    async fn run_command(&self, msg: &InboundMessage, text: &str, admins: &dyn AdminCheck) -> Option<Reply> {
        let inv = detect_command(text, self.dispatcher.registry(), self.bot_username())?;

        let is_admin = if self.dispatcher.requires_admin(&inv.key) {
            match admins.is_admin(msg.group_id, msg.sender.id).await {
                Ok(is_admin) => is_admin,
                Err(e) => {
                    warn!(group_id = msg.group_id, user_id = msg.sender.id, "Admin lookup failed: {e:#}");
                    false
                }
            }
        } else {
            false
        };

        let ctx = CommandContext { group_id: msg.group_id, sender: msg.sender.clone(), is_admin };
        match self.dispatcher.dispatch(&ctx, &inv).await {
            Ok(response) if response.ephemeral => Some(Reply::to_sender(response.text)),
            Ok(response) => Some(Reply::broadcast(response.text)),
            Err(e) => {
                error!(group_id = msg.group_id, command = %inv.key, "Command failed: {e:#}");
                Some(Reply::to_sender("⚠️ Something went wrong, please try again later.".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hushwatch_commands::{build_dispatcher, DisplayOptions};
    use hushwatch_storage::InMemoryGateway;

    struct Admins(Vec<UserId>);

    #[async_trait]
    impl AdminCheck for Admins {
        async fn is_admin(&self, _group: GroupId, user: UserId) -> Result<bool> {
            Ok(self.0.contains(&user))
        }
    }

    struct Unreachable;

    #[async_trait]
    impl AdminCheck for Unreachable {
        async fn is_admin(&self, _group: GroupId, _user: UserId) -> Result<bool> {
            anyhow::bail!("network down")
        }
    }

    fn router() -> MessageRouter {
        let (engine, settings) = hushwatch_engine::build(Arc::new(InMemoryGateway::new()));
        let dispatcher =
            build_dispatcher(Arc::clone(&engine), Arc::clone(&settings), DisplayOptions::default());
        MessageRouter::new(engine, settings, dispatcher)
    }

    fn text(ts: f64, user: UserId, body: &str) -> InboundMessage {
        InboundMessage {
            group_id: -42,
            timestamp: ts,
            sender: UserRef::new(user, format!("user{user}")),
            text: Some(body.to_string()),
        }
    }

    #[tokio::test]
    async fn record_break_is_announced() {
        let router = router();
        let admins = Admins(vec![]);
        assert_eq!(router.route(&text(0.0, 1, "hi"), &admins).await.unwrap(), None);
        let reply = router.route(&text(700.0, 2, "anyone?"), &admins).await.unwrap().unwrap();
        assert!(reply.text.contains("New inactivity record"));
        assert!(reply.text.contains("Last word: user1"));
        assert!(!reply.quote);
    }

    #[tokio::test]
    async fn disabled_announcements_stay_quiet_but_track() {
        let router = router();
        router.settings.toggle_announcements(-42).await.unwrap();
        let admins = Admins(vec![]);
        router.route(&text(0.0, 1, "hi"), &admins).await.unwrap();
        assert_eq!(router.route(&text(700.0, 2, "yo"), &admins).await.unwrap(), None);
        assert_eq!(router.engine.current_record(-42).await.unwrap(), 700.0);
    }

    #[tokio::test]
    async fn commands_are_not_tracked() {
        let router = router();
        let admins = Admins(vec![]);
        router.route(&text(0.0, 1, "hi"), &admins).await.unwrap();
        router.route(&text(500.0, 2, "/record"), &admins).await.unwrap();
        router.route(&text(600.0, 3, "/unknown"), &admins).await.unwrap();
        // The gap is measured from the last plain message at t=0.
        router.route(&text(900.0, 4, "back"), &admins).await.unwrap();
        assert_eq!(router.engine.current_record(-42).await.unwrap(), 900.0);
    }

    #[tokio::test]
    async fn non_text_is_ignored() {
        let router = router();
        let mut sticker = text(10.0, 1, "");
        sticker.text = None;
        assert_eq!(router.route(&sticker, &Admins(vec![])).await.unwrap(), None);
        assert!(router.engine.history(-42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_commands_consult_admin_check() {
        let router = router();
        let refused = router.route(&text(0.0, 5, "/seed 900"), &Admins(vec![])).await.unwrap().unwrap();
        assert!(refused.text.contains("Only group admins"));
        assert!(refused.quote);

        let accepted = router.route(&text(0.0, 5, "/seed 900"), &Admins(vec![5])).await.unwrap().unwrap();
        assert!(accepted.text.contains("15 minutes"));
        assert!(!accepted.quote);
        assert_eq!(router.engine.current_record(-42).await.unwrap(), 900.0);
    }

    #[tokio::test]
    async fn failed_admin_lookup_refuses() {
        let router = router();
        let reply = router.route(&text(0.0, 5, "/clean"), &Unreachable).await.unwrap().unwrap();
        assert!(reply.text.contains("Only group admins"));
    }

    #[tokio::test]
    async fn read_only_commands_skip_admin_lookup() {
        let router = router();
        let reply = router.route(&text(0.0, 5, "/record"), &Unreachable).await.unwrap().unwrap();
        assert!(reply.text.contains("0 seconds"));
        assert!(!reply.quote);
    }

    #[tokio::test]
    async fn commands_for_other_bots_are_ignored() {
        let router = router();
        router.set_bot_username("HushBot");
        let admins = Admins(vec![]);
        assert_eq!(router.route(&text(0.0, 1, "/record@OtherBot"), &admins).await.unwrap(), None);
        assert!(router.route(&text(0.0, 1, "/record@HushBot"), &admins).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn usage_errors_answer_the_invoker() {
        let router = router();
        let reply = router.route(&text(0.0, 5, "/seed soon"), &Admins(vec![5])).await.unwrap().unwrap();
        assert!(reply.text.contains("Usage: /seed [seconds]"));
        assert!(reply.quote);
        assert_eq!(router.engine.current_record(-42).await.unwrap(), 0.0);
    }
}
