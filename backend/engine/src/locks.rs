use std::collections::HashMap;
use std::sync::Arc;

use hushwatch_core::GroupId;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// One async mutex per group id.
///
/// Cloning shares the table. Entries are never removed: a group that was
/// reset keeps its mutex so a waiter and a newcomer can never end up holding
/// two different locks for the same group.
#[derive(Clone, Default)]
pub struct GroupLocks {
    table: Arc<Mutex<HashMap<GroupId, Arc<Mutex<()>>>>>,
}

impl GroupLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `group`. Released when the guard drops.
    pub async fn acquire(&self, group: GroupId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.table.lock().await;
            Arc::clone(table.entry(group).or_default())
        };
        trace!(group_id = group, "Waiting for group lock");
        lock.lock_owned().await
    }

    pub async fn group_count(&self) -> usize {
        self.table.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_group_is_exclusive() {
        let locks = GroupLocks::new();
        let guard = locks.acquire(1).await;

        let other = locks.clone();
        let waiter = tokio::spawn(async move {
            let _g = other.acquire(1).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn different_groups_do_not_block() {
        let locks = GroupLocks::new();
        let _a = locks.acquire(1).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2)).await;
        assert!(b.is_ok());
        assert_eq!(locks.group_count().await, 2);
    }
}
