//! Owned, thread-safe graph store with an injected persistence backend.
//!
//! The graph sits behind an `RwLock`. Every write path also takes a separate
//! writer mutex for the whole merge-then-save sequence, so snapshots are
//! written in merge order while readers only wait for the in-memory merge.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lexgraph_core::error::{LexGraphError, LexGraphResult};
use lexgraph_core::types::{ExtractedEntity, ExtractedRelationship, ExtractionResult};

use crate::graph::{GraphStats, GraphView, KnowledgeGraph, MergeStats};
use crate::persistence::{GraphPersistence, NullPersistence};

/// The knowledge graph plus its persistence backend.
pub struct GraphStore {
    graph: RwLock<KnowledgeGraph>,
    writer: Mutex<()>,
    persistence: Arc<dyn GraphPersistence>,
}

impl GraphStore {
    /// Open a store, loading the latest snapshot.
    ///
    /// A missing snapshot starts an empty graph. An unreadable snapshot is
    /// logged and also starts an empty graph; the next save replaces it.
    pub fn open(persistence: Arc<dyn GraphPersistence>) -> Self {
        let graph = match persistence.load() {
            Ok(Some(snapshot)) => match KnowledgeGraph::from_snapshot(snapshot) {
                Ok(graph) => graph,
                Err(e) => {
                    tracing::warn!("Discarding inconsistent graph snapshot: {}", e);
                    KnowledgeGraph::new()
                }
            },
            Ok(None) => {
                tracing::debug!("No graph snapshot found, starting empty");
                KnowledgeGraph::new()
            }
            Err(e) => {
                tracing::warn!("Failed to load graph snapshot, starting empty: {}", e);
                KnowledgeGraph::new()
            }
        };

        Self {
            graph: RwLock::new(graph),
            writer: Mutex::new(()),
            persistence,
        }
    }

    /// A store that persists nothing.
    pub fn in_memory() -> Self {
        Self::open(Arc::new(NullPersistence))
    }

    /// Merge entities and relationships from `source_file` without saving.
    pub fn merge(
        &self,
        entities: &[ExtractedEntity],
        relationships: &[ExtractedRelationship],
        source_file: &str,
    ) -> LexGraphResult<MergeStats> {
        let _writer = self.lock_writer()?;
        let mut graph = self.write()?;
        Ok(graph.merge(entities, relationships, source_file))
    }

    /// Merge several batches from one source as a single update, without
    /// saving. Readers see either none or all of them.
    pub fn merge_all(
        &self,
        batches: &[ExtractionResult],
        source_file: &str,
    ) -> LexGraphResult<MergeStats> {
        let _writer = self.lock_writer()?;
        self.apply(batches, source_file)
    }

    /// Merge batches from one source and save the resulting snapshot.
    ///
    /// On a save failure the merged data stays in memory and the error is
    /// returned to the caller.
    pub fn merge_and_persist(
        &self,
        batches: &[ExtractionResult],
        source_file: &str,
    ) -> LexGraphResult<MergeStats> {
        let _writer = self.lock_writer()?;
        let stats = self.apply(batches, source_file)?;
        self.persist()?;
        Ok(stats)
    }

    /// Save the current graph.
    pub fn save(&self) -> LexGraphResult<()> {
        let _writer = self.lock_writer()?;
        self.persist()
    }

    /// Read access to the graph. Hold the guard for the whole of one query to
    /// see a consistent graph.
    pub fn read(&self) -> LexGraphResult<RwLockReadGuard<'_, KnowledgeGraph>> {
        self.graph
            .read()
            .map_err(|e| LexGraphError::internal(e.to_string()))
    }

    pub fn stats(&self) -> LexGraphResult<GraphStats> {
        Ok(self.read()?.stats())
    }

    pub fn view(&self, limit: usize) -> LexGraphResult<GraphView> {
        Ok(self.read()?.view(limit))
    }

    fn lock_writer(&self) -> LexGraphResult<MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|e| LexGraphError::internal(e.to_string()))
    }

    fn write(&self) -> LexGraphResult<RwLockWriteGuard<'_, KnowledgeGraph>> {
        self.graph
            .write()
            .map_err(|e| LexGraphError::internal(e.to_string()))
    }

    fn apply(&self, batches: &[ExtractionResult], source_file: &str) -> LexGraphResult<MergeStats> {
        let mut graph = self.write()?;

        let mut stats = MergeStats::default();
        for batch in batches {
            stats.absorb(graph.merge(&batch.entities, &batch.relationships, source_file));
        }
        Ok(stats)
    }

    /// Caller holds the writer mutex.
    fn persist(&self) -> LexGraphResult<()> {
        let snapshot = self.read()?.to_snapshot();
        self.persistence.save(&snapshot)
    }
}
