use std::sync::Arc;

use async_trait::async_trait;

pub mod router;
pub mod telegram;
pub mod telegram_commands;

pub use router::{AdminCheck, InboundMessage, MessageRouter, Reply};
pub use telegram::{TelegramAdapter, TelegramAdmins};

/// All channel adapters implement this trait.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Run the adapter until shutdown, feeding every inbound message through `router`.
    async fn start(&self, router: Arc<MessageRouter>) -> anyhow::Result<()>;
}
