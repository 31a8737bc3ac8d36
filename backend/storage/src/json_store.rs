//! JSON-file gateway.
//!
//! The whole dataset lives in memory and is rewritten to disk on every
//! mutating call:
//!
//! ```json
//! {"groups": {"-1001": {"record_seconds": 700.0, "last_message_timestamp": ..., ...}}}
//! ```
//!
//! Writes go to a temp file that is renamed over the target, and a mutation is
//! applied to a copy of the dataset that only replaces the live one once the
//! file write succeeded.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hushwatch_core::{
    Board, GroupConfig, GroupId, GroupState, HushError, Leaderboards, RecordEntry, Result, UserId,
    UserRef,
};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::gateway::{apply_commit, MessageCommit, PersistenceGateway};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Dataset {
    #[serde(default)]
    groups: BTreeMap<String, GroupState>,
}

pub struct JsonFileGateway {
    path: PathBuf,
    data: Mutex<Dataset>,
}

impl JsonFileGateway {
    /// Load the dataset at `path`.
    ///
    /// A missing, unreadable or corrupt file yields an empty dataset; the
    /// problem is logged and the file is replaced on the next write.
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let data = load_dataset(&path).await;
        info!(path = %path.display(), groups = data.groups.len(), "JSON store opened");
        Self { path, data: Mutex::new(data) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read<R>(&self, group: GroupId, f: impl FnOnce(&GroupState) -> R) -> R {
        let mut data = self.data.lock().await;
        f(data.groups.entry(group.to_string()).or_default())
    }

    async fn mutate(&self, group: GroupId, f: impl FnOnce(&mut GroupState)) -> Result<()> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        f(next.groups.entry(group.to_string()).or_default());
        self.persist(&next).await?;
        *data = next;
        Ok(())
    }

    async fn persist(&self, data: &Dataset) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    HushError::Persistence(format!(
                        "create {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let body = serde_json::to_vec_pretty(data).map_err(HushError::persistence)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &body).await.map_err(|e| {
            HushError::Persistence(format!("write {}: {e}", tmp_path.display()))
        })?;
        fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            HushError::Persistence(format!("rename to {}: {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), bytes = body.len(), "JSON store saved");
        Ok(())
    }
}

async fn load_dataset(path: &Path) -> Dataset {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No JSON store yet; starting empty");
            return Dataset::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable JSON store; starting empty");
            return Dataset::default();
        }
    };

    match serde_json::from_slice(&raw) {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Corrupt JSON store; starting empty");
            Dataset::default()
        }
    }
}

#[async_trait]
impl PersistenceGateway for JsonFileGateway {
    fn name(&self) -> &str {
        "json"
    }

    async fn get_record(&self, group: GroupId) -> Result<Option<f64>> {
        Ok(self.read(group, |s| s.record_seconds).await)
    }

    async fn set_record(&self, group: GroupId, seconds: f64) -> Result<()> {
        self.mutate(group, |s| s.record_seconds = Some(seconds)).await
    }

    async fn get_last_message_timestamp(&self, group: GroupId) -> Result<Option<f64>> {
        Ok(self.read(group, |s| s.last_message_timestamp).await)
    }

    async fn set_last_message_timestamp(&self, group: GroupId, timestamp: f64) -> Result<()> {
        self.mutate(group, |s| s.last_message_timestamp = Some(timestamp))
            .await
    }

    async fn get_last_user(&self, group: GroupId) -> Result<Option<UserRef>> {
        Ok(self.read(group, |s| s.last_user.clone()).await)
    }

    async fn set_last_user(&self, group: GroupId, user: &UserRef) -> Result<()> {
        self.mutate(group, |s| s.last_user = Some(user.clone())).await
    }

    async fn get_config(&self, group: GroupId) -> Result<GroupConfig> {
        Ok(self.read(group, |s| s.config).await)
    }

    async fn set_config(&self, group: GroupId, config: GroupConfig) -> Result<()> {
        self.mutate(group, |s| s.config = config).await
    }

    async fn get_leaderboards(&self, group: GroupId) -> Result<Leaderboards> {
        Ok(self.read(group, |s| s.leaderboards.clone()).await)
    }

    async fn increment_leaderboard(
        &self,
        group: GroupId,
        user_id: UserId,
        user_name: &str,
        board: Board,
    ) -> Result<()> {
        self.mutate(group, |s| s.leaderboards.increment(board, user_id, user_name))
            .await
    }

    async fn get_history(&self, group: GroupId) -> Result<Vec<RecordEntry>> {
        Ok(self.read(group, |s| s.history.clone()).await)
    }

    async fn append_history(&self, group: GroupId, entry: RecordEntry) -> Result<()> {
        self.mutate(group, |s| s.history.push(entry)).await
    }

    async fn delete_group(&self, group: GroupId) -> Result<()> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        if next.groups.remove(&group.to_string()).is_none() {
            return Ok(());
        }
        self.persist(&next).await?;
        *data = next;
        Ok(())
    }

    async fn load_group(&self, group: GroupId) -> Result<GroupState> {
        Ok(self.read(group, |s| s.clone()).await)
    }

    async fn commit(&self, group: GroupId, commit: &MessageCommit) -> Result<()> {
        self.mutate(group, |s| apply_commit(s, commit)).await
    }
}
