//! SQLite schema for graph snapshots.
//!
//! - `nodes`: one row per node, in insertion order
//! - `edges`: one row per ordered pair, in insertion order
//! - `snapshot_meta`: key/value facts about the snapshot (format, save time)
//!
//! Property maps are JSON objects; sets are JSON arrays in sorted order.

use rusqlite::Connection;

use lexgraph_core::error::LexGraphResult;

/// Snapshot format written to `snapshot_meta`.
pub const SCHEMA_VERSION: &str = "1";

pub const CREATE_NODES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    position INTEGER PRIMARY KEY,
    id TEXT NOT NULL UNIQUE,
    entity_type TEXT NOT NULL,
    entity_name TEXT NOT NULL,
    properties TEXT NOT NULL DEFAULT '{}',
    source_files TEXT NOT NULL DEFAULT '[]'
)
"#;

pub const CREATE_EDGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS edges (
    position INTEGER PRIMARY KEY,
    source_id TEXT NOT NULL REFERENCES nodes(id),
    target_id TEXT NOT NULL REFERENCES nodes(id),
    relationship_type TEXT NOT NULL,
    relationship_types TEXT NOT NULL DEFAULT '[]',
    properties TEXT NOT NULL DEFAULT '{}',
    source_files TEXT NOT NULL DEFAULT '[]',
    UNIQUE(source_id, target_id)
)
"#;

/// Index for traversal from source.
pub const CREATE_EDGES_SOURCE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source_id)
"#;

/// Index for traversal to target.
pub const CREATE_EDGES_TARGET_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id)
"#;

pub const CREATE_META_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS snapshot_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
"#;

/// Initialize the snapshot schema. Safe to call multiple times.
pub fn init_schema(conn: &Connection) -> LexGraphResult<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(CREATE_NODES_TABLE, [])?;
    conn.execute(CREATE_EDGES_TABLE, [])?;
    conn.execute(CREATE_META_TABLE, [])?;

    conn.execute(CREATE_EDGES_SOURCE_INDEX, [])?;
    conn.execute(CREATE_EDGES_TARGET_INDEX, [])?;

    Ok(())
}
