/// Command dispatch: route detected commands to handlers, enforcing the
/// admin gate first.
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use hushwatch_core::{GroupId, HushError, UserRef};
use tracing::{info, warn};

use crate::registry::CommandRegistry;
use crate::types::CommandInvocation;

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// Context passed to every command handler.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub group_id: GroupId,
    pub sender: UserRef,
    /// Whether the sender administers the group. Transports only need to
    /// resolve this for admin-only commands.
    pub is_admin: bool,
}

/// Text reply for the invoker.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResponse {
    pub text: String,
    /// Meant for the invoker only (refusals, usage errors). Transports answer
    /// the invoking message instead of posting to the whole chat.
    pub ephemeral: bool,
}

impl CommandResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: false }
    }
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: true }
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &CommandContext, inv: &CommandInvocation) -> Result<CommandResponse>;
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct CommandDispatcher {
    registry: CommandRegistry,
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandDispatcher {
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry, handlers: HashMap::new() }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn register(&mut self, key: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(key.into(), handler);
    }

    /// Whether running `key` requires the sender to be an admin.
    pub fn requires_admin(&self, key: &str) -> bool {
        self.registry.find_by_key(key).is_some_and(|def| def.admin_only)
    }

    /// Run the handler for `inv`.
    ///
    /// Non-admins get a refusal for admin-only commands and nothing is
    /// executed. Invalid arguments become a usage reply; any other failure
    /// is returned to the caller.
    pub async fn dispatch(
        &self,
        ctx: &CommandContext,
        inv: &CommandInvocation,
    ) -> Result<CommandResponse> {
        if self.requires_admin(&inv.key) && !ctx.is_admin {
            warn!(
                group_id = ctx.group_id,
                user_id = ctx.sender.id,
                command = %inv.key,
                "Refused admin command from non-admin"
            );
            return Ok(CommandResponse::ephemeral(format!(
                "⛔ Only group admins can use /{}.",
                inv.key
            )));
        }

        let Some(handler) = self.handlers.get(&inv.key) else {
            return Ok(CommandResponse::ephemeral(format!(
                "❓ No handler registered for command /{}",
                inv.key
            )));
        };

        info!(group_id = ctx.group_id, user_id = ctx.sender.id, "[Commands] Dispatching /{}", inv.key);
        match handler.handle(ctx, inv).await {
            Ok(response) => Ok(response),
            Err(err) => match err.downcast_ref::<HushError>() {
                Some(HushError::InvalidInput(msg)) => {
                    let usage = self
                        .registry
                        .find_by_key(&inv.key)
                        .map(|def| def.usage())
                        .unwrap_or_else(|| format!("/{}", inv.key));
                    Ok(CommandResponse::ephemeral(format!("❌ {msg}\nUsage: {usage}")))
                }
                _ => Err(err),
            },
        }
    }
}
