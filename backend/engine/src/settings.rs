use std::sync::Arc;

use hushwatch_core::{GroupId, Result};
use hushwatch_storage::PersistenceGateway;
use tracing::info;

use crate::locks::GroupLocks;

/// Per-group settings. Today that is only the record announcement toggle.
pub struct GroupSettingsStore {
    gateway: Arc<dyn PersistenceGateway>,
    locks: GroupLocks,
}

impl GroupSettingsStore {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, locks: GroupLocks) -> Self {
        Self { gateway, locks }
    }

    /// Whether new records are announced in the group. Defaults to `true`.
    pub async fn is_announcement_enabled(&self, group: GroupId) -> Result<bool> {
        let _guard = self.locks.acquire(group).await;
        Ok(self.gateway.get_config(group).await?.announce_records)
    }

    /// Flip the announcement setting and return the new value.
    ///
    /// Every call flips; callers wanting "enable" or "disable" semantics
    /// check [`Self::is_announcement_enabled`] first.
    pub async fn toggle_announcements(&self, group: GroupId) -> Result<bool> {
        let _guard = self.locks.acquire(group).await;
        let mut config = self.gateway.get_config(group).await?;
        config.announce_records = !config.announce_records;
        self.gateway.set_config(group, config).await?;
        info!(group_id = group, enabled = config.announce_records, "Announcements toggled");
        Ok(config.announce_records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hushwatch_storage::InMemoryGateway;

    fn store() -> GroupSettingsStore {
        GroupSettingsStore::new(Arc::new(InMemoryGateway::new()), GroupLocks::new())
    }

    #[tokio::test]
    async fn enabled_by_default() {
        assert!(store().is_announcement_enabled(-4).await.unwrap());
    }

    #[tokio::test]
    async fn toggle_flips_and_persists() {
        let store = store();
        assert!(!store.toggle_announcements(-4).await.unwrap());
        assert!(!store.is_announcement_enabled(-4).await.unwrap());
        assert!(store.toggle_announcements(-4).await.unwrap());
        assert!(store.is_announcement_enabled(-4).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_toggles_all_apply() {
        let store = Arc::new(store());
        let mut tasks = Vec::new();
        for _ in 0..10 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move { store.toggle_announcements(1).await.unwrap() }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        // An even number of flips lands back on the default.
        assert!(store.is_announcement_enabled(1).await.unwrap());
    }

    #[tokio::test]
    async fn reset_restores_default() {
        let gateway = Arc::new(InMemoryGateway::new());
        let (engine, settings) = crate::build(gateway);
        settings.toggle_announcements(9).await.unwrap();
        engine.reset_group(9).await.unwrap();
        assert!(settings.is_announcement_enabled(9).await.unwrap());
    }
}
