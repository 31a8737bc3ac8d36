use serde::{Deserialize, Serialize};

use crate::types::{GroupId, UserRef};

/// A tracked message, as handed over by the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub group_id: GroupId,
    /// Unix seconds of the message.
    pub timestamp: f64,
    pub user: UserRef,
}

impl MessageEvent {
    pub fn new(group_id: GroupId, timestamp: f64, user: UserRef) -> Self {
        Self { group_id, timestamp, user }
    }
}

/// What processing a message produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    NoChange,
    NewRecord {
        seconds: f64,
        previous_user: UserRef,
        breaker_user: UserRef,
    },
}

impl Outcome {
    pub fn is_new_record(&self) -> bool {
        matches!(self, Outcome::NewRecord { .. })
    }
}
