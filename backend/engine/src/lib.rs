//! Inactivity tracking for Hushwatch.
//!
//! [`RecordEngine`] turns the message stream of each group into records,
//! leaderboard credit and history. [`GroupSettingsStore`] owns the per-group
//! announcement toggle. Both share one [`GroupLocks`] so every operation on a
//! group is serialized while different groups proceed in parallel.

pub mod locks;
pub mod record_engine;
pub mod settings;

pub use locks::GroupLocks;
pub use record_engine::RecordEngine;
pub use settings::GroupSettingsStore;

use std::sync::Arc;

use hushwatch_storage::PersistenceGateway;

/// Build an engine and a settings store that share one gateway and one lock table.
pub fn build(gateway: Arc<dyn PersistenceGateway>) -> (Arc<RecordEngine>, Arc<GroupSettingsStore>) {
    let locks = GroupLocks::new();
    let engine = RecordEngine::new(Arc::clone(&gateway), locks.clone());
    let settings = GroupSettingsStore::new(gateway, locks);
    (Arc::new(engine), Arc::new(settings))
}
