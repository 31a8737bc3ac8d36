use std::collections::HashMap;

use async_trait::async_trait;
use hushwatch_core::{
    Board, GroupConfig, GroupId, GroupState, Leaderboards, RecordEntry, Result, UserId, UserRef,
};
use tokio::sync::RwLock;

use crate::gateway::{apply_commit, MessageCommit, PersistenceGateway};

/// Process-local gateway. Nothing survives a restart; used by tests and the
/// `memory` backend.
#[derive(Default)]
pub struct InMemoryGateway {
    groups: RwLock<HashMap<GroupId, GroupState>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of groups that have been touched at least once.
    pub async fn group_count(&self) -> usize {
        self.groups.read().await.len()
    }

    async fn with_group<R>(&self, group: GroupId, f: impl FnOnce(&mut GroupState) -> R) -> R {
        let mut groups = self.groups.write().await;
        f(groups.entry(group).or_default())
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_record(&self, group: GroupId) -> Result<Option<f64>> {
        Ok(self.with_group(group, |s| s.record_seconds).await)
    }

    async fn set_record(&self, group: GroupId, seconds: f64) -> Result<()> {
        self.with_group(group, |s| s.record_seconds = Some(seconds)).await;
        Ok(())
    }

    async fn get_last_message_timestamp(&self, group: GroupId) -> Result<Option<f64>> {
        Ok(self.with_group(group, |s| s.last_message_timestamp).await)
    }

    async fn set_last_message_timestamp(&self, group: GroupId, timestamp: f64) -> Result<()> {
        self.with_group(group, |s| s.last_message_timestamp = Some(timestamp))
            .await;
        Ok(())
    }

    async fn get_last_user(&self, group: GroupId) -> Result<Option<UserRef>> {
        Ok(self.with_group(group, |s| s.last_user.clone()).await)
    }

    async fn set_last_user(&self, group: GroupId, user: &UserRef) -> Result<()> {
        self.with_group(group, |s| s.last_user = Some(user.clone())).await;
        Ok(())
    }

    async fn get_config(&self, group: GroupId) -> Result<GroupConfig> {
        Ok(self.with_group(group, |s| s.config).await)
    }

    async fn set_config(&self, group: GroupId, config: GroupConfig) -> Result<()> {
        self.with_group(group, |s| s.config = config).await;
        Ok(())
    }

    async fn get_leaderboards(&self, group: GroupId) -> Result<Leaderboards> {
        Ok(self.with_group(group, |s| s.leaderboards.clone()).await)
    }

    async fn increment_leaderboard(
        &self,
        group: GroupId,
        user_id: UserId,
        user_name: &str,
        board: Board,
    ) -> Result<()> {
        self.with_group(group, |s| s.leaderboards.increment(board, user_id, user_name))
            .await;
        Ok(())
    }

    async fn get_history(&self, group: GroupId) -> Result<Vec<RecordEntry>> {
        Ok(self.with_group(group, |s| s.history.clone()).await)
    }

    async fn append_history(&self, group: GroupId, entry: RecordEntry) -> Result<()> {
        self.with_group(group, |s| s.history.push(entry)).await;
        Ok(())
    }

    async fn delete_group(&self, group: GroupId) -> Result<()> {
        self.groups.write().await.remove(&group);
        Ok(())
    }

    async fn load_group(&self, group: GroupId) -> Result<GroupState> {
        Ok(self.with_group(group, |s| s.clone()).await)
    }

    async fn commit(&self, group: GroupId, commit: &MessageCommit) -> Result<()> {
        self.with_group(group, |s| apply_commit(s, commit)).await;
        Ok(())
    }
}
