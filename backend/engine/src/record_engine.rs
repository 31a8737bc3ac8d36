use std::sync::Arc;

use hushwatch_core::{
    Clock, GroupId, Leaderboards, MessageEvent, Outcome, RecordEntry, Result, SystemClock, UserRef,
};
use hushwatch_logging::RecordLog;
use hushwatch_storage::{MessageCommit, PersistenceGateway};
use tracing::{debug, info, warn};

use crate::locks::GroupLocks;

/// Decides when a message ends a record-long silence and applies the
/// consequences: new record, leaderboard credit, history entry.
pub struct RecordEngine {
    gateway: Arc<dyn PersistenceGateway>,
    locks: GroupLocks,
    clock: Arc<dyn Clock>,
}

/// Whether a gap qualifies as a new record.
///
/// Ties never count. Gaps of zero or less (duplicate or out-of-order
/// timestamps) never count either, even when the group has no record yet.
pub fn beats_record(interval: f64, record: Option<f64>) -> bool {
    interval > 0.0 && record.map_or(true, |current| interval > current)
}

impl RecordEngine {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, locks: GroupLocks) -> Self {
        Self { gateway, locks, clock: Arc::new(SystemClock) }
    }

    /// Replace the wall clock used for history timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn handle_event(&self, event: &MessageEvent) -> Result<Outcome> {
        self.process_message(event.group_id, event.timestamp, event.user.clone())
            .await
    }

    /// Track one message and report whether it broke the group's record.
    ///
    /// The last-message timestamp and sender are always overwritten. All
    /// writes of one call reach the gateway as a single commit.
    pub async fn process_message(
        &self,
        group: GroupId,
        timestamp: f64,
        user: UserRef,
    ) -> Result<Outcome> {
        let _guard = self.locks.acquire(group).await;

        let previous_timestamp = self.gateway.get_last_message_timestamp(group).await?;
        let previous_user = self.gateway.get_last_user(group).await?;
        let commit = MessageCommit::tracking(timestamp, user.clone());

        let (Some(previous_timestamp), Some(previous_user)) = (previous_timestamp, previous_user)
        else {
            self.gateway.commit(group, &commit).await?;
            debug!(group_id = group, "First tracked message for group");
            return Ok(Outcome::NoChange);
        };

        let interval = timestamp - previous_timestamp;
        if interval < 0.0 {
            warn!(
                group_id = group,
                interval,
                "Message is older than the previous one; not a record candidate"
            );
        }

        let record = self.gateway.get_record(group).await?;
        if !beats_record(interval, record) {
            self.gateway.commit(group, &commit).await?;
            debug!(group_id = group, interval, record = ?record, "No new record");
            return Ok(Outcome::NoChange);
        }

        let entry = RecordEntry {
            record_seconds: interval,
            timestamp: self.clock.now(),
            last_user: previous_user.clone(),
            breaker_user: user.clone(),
        };
        self.gateway
            .commit(group, &commit.with_record(entry.clone()))
            .await?;

        RecordLog::log_record(group, &entry, record);

        Ok(Outcome::NewRecord {
            seconds: interval,
            previous_user,
            breaker_user: user,
        })
    }

    /// Current record in seconds, `0.0` when none has been set.
    pub async fn current_record(&self, group: GroupId) -> Result<f64> {
        let _guard = self.locks.acquire(group).await;
        Ok(self.gateway.get_record(group).await?.unwrap_or(0.0))
    }

    /// Set the record directly, leaving history, leaderboards and tracking
    /// state untouched. `seconds > 0` is the caller's responsibility.
    pub async fn seed_record(&self, group: GroupId, seconds: f64) -> Result<()> {
        let _guard = self.locks.acquire(group).await;
        self.gateway.set_record(group, seconds).await?;
        info!(group_id = group, seconds, "Record seeded");
        Ok(())
    }

    pub async fn leaderboards(&self, group: GroupId) -> Result<Leaderboards> {
        let _guard = self.locks.acquire(group).await;
        self.gateway.get_leaderboards(group).await
    }

    /// Full history, oldest first.
    pub async fn history(&self, group: GroupId) -> Result<Vec<RecordEntry>> {
        let _guard = self.locks.acquire(group).await;
        self.gateway.get_history(group).await
    }

    /// Drop every piece of state kept for the group.
    pub async fn reset_group(&self, group: GroupId) -> Result<()> {
        let _guard = self.locks.acquire(group).await;
        self.gateway.delete_group(group).await?;
        info!(group_id = group, "Group state reset");
        Ok(())
    }
}
