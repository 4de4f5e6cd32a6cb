//! Durable snapshot storage for the knowledge graph.
//!
//! A persistence backend stores whole-graph snapshots. The graph store calls
//! [`GraphPersistence::save`] after each ingestion batch and
//! [`GraphPersistence::load`] once at startup.

mod mirror;
mod schema;
mod sqlite;

use crate::graph::GraphSnapshot;
use lexgraph_core::error::LexGraphResult;

pub use mirror::{write_mirror, MIRROR_FILE_NAME};
pub use sqlite::{SqliteSnapshotStore, SNAPSHOT_FILE_NAME};

/// Snapshot storage backend.
pub trait GraphPersistence: Send + Sync {
    /// Durably replace the stored snapshot.
    fn save(&self, snapshot: &GraphSnapshot) -> LexGraphResult<()>;

    /// Load the stored snapshot; `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> LexGraphResult<Option<GraphSnapshot>>;
}

/// Backend that keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPersistence;

impl GraphPersistence for NullPersistence {
    fn save(&self, _snapshot: &GraphSnapshot) -> LexGraphResult<()> {
        Ok(())
    }

    fn load(&self) -> LexGraphResult<Option<GraphSnapshot>> {
        Ok(None)
    }
}
