use async_trait::async_trait;
use hushwatch_core::{
    Board, GroupConfig, GroupId, GroupState, Leaderboards, RecordEntry, Result, UserId, UserRef,
};

/// Storage contract for per-group state.
///
/// Every getter materializes default state for a group it has never seen, so
/// callers never get a "not found". Setters must be durable when they return
/// `Ok`; a write that could not be made durable is reported as
/// `HushError::Persistence`.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    async fn get_record(&self, group: GroupId) -> Result<Option<f64>>;
    async fn set_record(&self, group: GroupId, seconds: f64) -> Result<()>;

    async fn get_last_message_timestamp(&self, group: GroupId) -> Result<Option<f64>>;
    async fn set_last_message_timestamp(&self, group: GroupId, timestamp: f64) -> Result<()>;

    async fn get_last_user(&self, group: GroupId) -> Result<Option<UserRef>>;
    async fn set_last_user(&self, group: GroupId, user: &UserRef) -> Result<()>;

    async fn get_config(&self, group: GroupId) -> Result<GroupConfig>;
    async fn set_config(&self, group: GroupId, config: GroupConfig) -> Result<()>;

    async fn get_leaderboards(&self, group: GroupId) -> Result<Leaderboards>;
    async fn increment_leaderboard(
        &self,
        group: GroupId,
        user_id: UserId,
        user_name: &str,
        board: Board,
    ) -> Result<()>;

    async fn get_history(&self, group: GroupId) -> Result<Vec<RecordEntry>>;
    async fn append_history(&self, group: GroupId, entry: RecordEntry) -> Result<()>;

    /// Forget everything about a group. The next read sees defaults again.
    async fn delete_group(&self, group: GroupId) -> Result<()>;

    /// Full snapshot of one group.
    async fn load_group(&self, group: GroupId) -> Result<GroupState> {
        Ok(GroupState {
            record_seconds: self.get_record(group).await?,
            last_message_timestamp: self.get_last_message_timestamp(group).await?,
            last_user: self.get_last_user(group).await?,
            leaderboards: self.get_leaderboards(group).await?,
            history: self.get_history(group).await?,
            config: self.get_config(group).await?,
        })
    }

    /// Apply everything one processed message changes.
    ///
    /// The default goes through the fine-grained setters one by one. Backends
    /// that can write several fields at once should override this so a crash
    /// cannot leave half of a record break on disk.
    async fn commit(&self, group: GroupId, commit: &MessageCommit) -> Result<()> {
        self.set_last_message_timestamp(group, commit.timestamp).await?;
        self.set_last_user(group, &commit.user).await?;
        if let Some(entry) = &commit.record_break {
            self.set_record(group, entry.record_seconds).await?;
            let last = &entry.last_user;
            let breaker = &entry.breaker_user;
            self.increment_leaderboard(group, last.id, &last.name, Board::LastWord)
                .await?;
            self.increment_leaderboard(group, breaker.id, &breaker.name, Board::SilenceBreaker)
                .await?;
            self.append_history(group, entry.clone()).await?;
        }
        Ok(())
    }
}

/// The writes produced by one `process_message` call.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageCommit {
    pub timestamp: f64,
    pub user: UserRef,
    /// Set when the message broke the record; the entry is appended to history.
    pub record_break: Option<RecordEntry>,
}

impl MessageCommit {
    pub fn tracking(timestamp: f64, user: UserRef) -> Self {
        Self { timestamp, user, record_break: None }
    }

    pub fn with_record(mut self, entry: RecordEntry) -> Self {
        self.record_break = Some(entry);
        self
    }
}

/// Apply a commit to an in-memory group state.
///
/// Shared by the backends that hold the whole state in memory.
pub(crate) fn apply_commit(state: &mut GroupState, commit: &MessageCommit) {
    state.last_message_timestamp = Some(commit.timestamp);
    state.last_user = Some(commit.user.clone());
    if let Some(entry) = &commit.record_break {
        state.record_seconds = Some(entry.record_seconds);
        state
            .leaderboards
            .increment(Board::LastWord, entry.last_user.id, &entry.last_user.name);
        state.leaderboards.increment(
            Board::SilenceBreaker,
            entry.breaker_user.id,
            &entry.breaker_user.name,
        );
        state.history.push(entry.clone());
    }
}
