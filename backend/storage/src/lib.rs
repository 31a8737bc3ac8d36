//! Durable per-group state for Hushwatch.
//!
//! The engine only talks to [`PersistenceGateway`]; backends decide how the
//! state is laid out on disk.

pub mod gateway;
pub mod json_store;
pub mod memory;
pub mod sqlite_store;

#[cfg(test)]
mod contract_tests;

pub use gateway::{MessageCommit, PersistenceGateway};
pub use json_store::JsonFileGateway;
pub use memory::InMemoryGateway;
pub use sqlite_store::SqliteGateway;

use std::path::PathBuf;
use std::sync::Arc;

use hushwatch_core::Result;
use tracing::info;

/// Which backend to open, with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayKind {
    Memory,
    Json(PathBuf),
    Sqlite(PathBuf),
}

/// Open the configured backend behind a shared trait object.
pub async fn open_gateway(kind: &GatewayKind) -> Result<Arc<dyn PersistenceGateway>> {
    let gateway: Arc<dyn PersistenceGateway> = match kind {
        GatewayKind::Memory => Arc::new(InMemoryGateway::new()),
        GatewayKind::Json(path) => Arc::new(JsonFileGateway::open(path).await),
        GatewayKind::Sqlite(path) => Arc::new(SqliteGateway::open(path)?),
    };
    info!(backend = gateway.name(), "Persistence gateway ready");
    Ok(gateway)
}
