//! SQLite-backed snapshot store.
//!
//! `knowledge_graph.db` is the authoritative snapshot. A save builds a
//! complete database next to it inside one transaction and renames it into
//! place, so readers only ever see the previous or the new snapshot. The JSON
//! mirror is written afterwards as a separate file.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags};

use lexgraph_core::error::{LexGraphError, LexGraphResult};
use lexgraph_core::types::PropertyMap;

use super::mirror::write_mirror;
use super::schema::{init_schema, SCHEMA_VERSION};
use super::GraphPersistence;
use crate::graph::{EdgeRecord, GraphSnapshot, NodeRecord};

/// File name of the authoritative snapshot inside the graph directory.
pub const SNAPSHOT_FILE_NAME: &str = "knowledge_graph.db";

/// Snapshot store rooted at a graph directory.
#[derive(Debug, Clone)]
pub struct SqliteSnapshotStore {
    dir: PathBuf,
}

impl SqliteSnapshotStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The graph directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the authoritative snapshot.
    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE_NAME)
    }

    fn write_database(&self, path: &Path, snapshot: &GraphSnapshot) -> LexGraphResult<()> {
        let mut conn = Connection::open(path)?;
        init_schema(&conn)?;

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM edges", [])?;
        tx.execute("DELETE FROM nodes", [])?;
        tx.execute("DELETE FROM snapshot_meta", [])?;

        {
            let mut insert_node = tx.prepare(
                "INSERT INTO nodes (position, id, entity_type, entity_name, properties, source_files)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, node) in snapshot.nodes.iter().enumerate() {
                insert_node.execute(params![
                    position as i64,
                    node.id,
                    node.entity_type,
                    node.entity_name,
                    serde_json::to_string(&node.properties)?,
                    serde_json::to_string(&node.source_files)?,
                ])?;
            }

            let mut insert_edge = tx.prepare(
                "INSERT INTO edges (position, source_id, target_id, relationship_type, relationship_types, properties, source_files)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, edge) in snapshot.edges.iter().enumerate() {
                insert_edge.execute(params![
                    position as i64,
                    edge.source,
                    edge.target,
                    edge.relationship_type,
                    serde_json::to_string(&edge.relationship_types)?,
                    serde_json::to_string(&edge.properties)?,
                    serde_json::to_string(&edge.source_files)?,
                ])?;
            }

            let mut insert_meta =
                tx.prepare("INSERT INTO snapshot_meta (key, value) VALUES (?1, ?2)")?;
            insert_meta.execute(params!["schema_version", SCHEMA_VERSION])?;
            insert_meta.execute(params!["saved_at", chrono::Utc::now().to_rfc3339()])?;
        }

        tx.commit()?;
        Ok(())
    }
}

impl GraphPersistence for SqliteSnapshotStore {
    fn save(&self, snapshot: &GraphSnapshot) -> LexGraphResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let final_path = self.snapshot_path();
        let tmp_path = self.dir.join(format!("{}.tmp", SNAPSHOT_FILE_NAME));
        if tmp_path.exists() {
            std::fs::remove_file(&tmp_path)?;
        }

        if let Err(e) = self.write_database(&tmp_path, snapshot) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }
        std::fs::rename(&tmp_path, &final_path)?;

        write_mirror(&self.dir, snapshot)?;

        tracing::info!(
            "Saved graph snapshot to {}: {} nodes, {} edges",
            final_path.display(),
            snapshot.nodes.len(),
            snapshot.edges.len()
        );
        Ok(())
    }

    fn load(&self) -> LexGraphResult<Option<GraphSnapshot>> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(None);
        }

        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| corrupted(&path, e))?;
        let snapshot = read_snapshot(&conn).map_err(|e| corrupted(&path, e))?;

        tracing::info!(
            "Loaded graph snapshot from {}: {} nodes, {} edges",
            path.display(),
            snapshot.nodes.len(),
            snapshot.edges.len()
        );
        Ok(Some(snapshot))
    }
}

fn corrupted(path: &Path, err: impl std::fmt::Display) -> LexGraphError {
    LexGraphError::snapshot_corrupted(format!(
        "Unreadable graph snapshot {}: {}",
        path.display(),
        err
    ))
}

/// Read every node and edge in insertion order.
fn read_snapshot(conn: &Connection) -> LexGraphResult<GraphSnapshot> {
    let mut stmt = conn.prepare(
        "SELECT id, entity_type, entity_name, properties, source_files FROM nodes ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut nodes = Vec::new();
    for row in rows {
        let (id, entity_type, entity_name, properties, source_files) = row?;
        nodes.push(NodeRecord {
            id,
            entity_type,
            entity_name,
            properties: serde_json::from_str::<PropertyMap>(&properties)?,
            source_files: serde_json::from_str(&source_files)?,
        });
    }

    let mut stmt = conn.prepare(
        "SELECT source_id, target_id, relationship_type, relationship_types, properties, source_files
         FROM edges ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut edges = Vec::new();
    for row in rows {
        let (source, target, relationship_type, relationship_types, properties, source_files) =
            row?;
        edges.push(EdgeRecord {
            source,
            target,
            relationship_type,
            relationship_types: serde_json::from_str(&relationship_types)?,
            properties: serde_json::from_str::<PropertyMap>(&properties)?,
            source_files: serde_json::from_str(&source_files)?,
        });
    }

    Ok(GraphSnapshot { nodes, edges })
}
