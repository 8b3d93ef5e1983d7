//! SurrealDB-backed graph store and the offline demo fallback.
//!
//! `connect_or_demo` is the entry point the pipeline uses: it tries to open
//! the configured backend and silently downgrades to the demo store when the
//! backend is unavailable, so a missing database never fails a job.

pub mod client;
pub mod demo;
pub mod store;

pub use client::{SurrealClient, SurrealConfig};
pub use demo::DemoGraphStore;
pub use store::{SurrealGraphStore, NODE_BATCH_SIZE};

use graphloom_core::GraphStore;
use std::sync::Arc;
use tracing::warn;

/// Open the configured store, or fall back to the demo store.
pub async fn connect_or_demo(config: SurrealConfig) -> Arc<dyn GraphStore> {
    match SurrealClient::connect(config).await {
        Ok(client) => Arc::new(SurrealGraphStore::new(client)),
        Err(err) => {
            warn!(error = %err, "graph store unavailable, falling back to demo mode");
            Arc::new(DemoGraphStore::new())
        }
    }
}
