//! Human-readable JSON mirror of the snapshot.
//!
//! Written for inspection only and never read back. Node and edge properties
//! are flattened next to the fixed keys.

use std::path::Path;

use serde_json::{json, Map, Value};

use lexgraph_core::error::LexGraphResult;
use lexgraph_core::types::{
    PropertyMap, ENTITY_NAME_KEY, ENTITY_TYPE_KEY, RELATIONSHIP_TYPES_KEY, RELATIONSHIP_TYPE_KEY,
    SOURCE_FILES_KEY,
};

use crate::graph::{EdgeRecord, GraphSnapshot, NodeRecord};

/// File name of the mirror inside the graph directory.
pub const MIRROR_FILE_NAME: &str = "knowledge_graph.json";

/// Write `<dir>/knowledge_graph.json` through a temp file and rename.
pub fn write_mirror(dir: &Path, snapshot: &GraphSnapshot) -> LexGraphResult<()> {
    let document = json!({
        "nodes": snapshot.nodes.iter().map(node_json).collect::<Vec<_>>(),
        "edges": snapshot.edges.iter().map(edge_json).collect::<Vec<_>>(),
    });

    let final_path = dir.join(MIRROR_FILE_NAME);
    let tmp_path = dir.join(format!("{}.tmp", MIRROR_FILE_NAME));
    std::fs::write(&tmp_path, serde_json::to_vec_pretty(&document)?)?;
    std::fs::rename(&tmp_path, &final_path)?;
    Ok(())
}

fn node_json(node: &NodeRecord) -> Value {
    let mut object = Map::new();
    object.insert("id".to_string(), Value::String(node.id.clone()));
    object.insert(ENTITY_TYPE_KEY.to_string(), Value::String(node.entity_type.clone()));
    object.insert(ENTITY_NAME_KEY.to_string(), Value::String(node.entity_name.clone()));
    flatten(&mut object, &node.properties);
    object.insert(SOURCE_FILES_KEY.to_string(), json!(node.source_files));
    Value::Object(object)
}

fn edge_json(edge: &EdgeRecord) -> Value {
    let mut object = Map::new();
    object.insert("source".to_string(), Value::String(edge.source.clone()));
    object.insert("target".to_string(), Value::String(edge.target.clone()));
    object.insert(
        RELATIONSHIP_TYPE_KEY.to_string(),
        Value::String(edge.relationship_type.clone()),
    );
    object.insert(RELATIONSHIP_TYPES_KEY.to_string(), json!(edge.relationship_types));
    object.insert(SOURCE_FILES_KEY.to_string(), json!(edge.source_files));
    flatten(&mut object, &edge.properties);
    Value::Object(object)
}

fn flatten(object: &mut Map<String, Value>, properties: &PropertyMap) {
    for (key, value) in properties {
        // Fixed keys win over any property of the same name
        if !object.contains_key(key) {
            object.insert(key.clone(), value.to_json());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexgraph_core::types::PropertyValue;

    #[test]
    fn test_mirror_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut properties = PropertyMap::new();
        properties.insert("text".to_string(), PropertyValue::from("Approval from DPO is required."));

        let snapshot = GraphSnapshot {
            nodes: vec![NodeRecord {
                id: "req_4_1".to_string(),
                entity_type: "Requirement".to_string(),
                entity_name: "Requirement 4.1".to_string(),
                properties,
                source_files: vec!["policy.txt".to_string()],
            }],
            edges: vec![EdgeRecord {
                source: "section_4".to_string(),
                target: "req_4_1".to_string(),
                relationship_type: "CONTAINS".to_string(),
                relationship_types: vec!["CONTAINS".to_string()],
                properties: PropertyMap::new(),
                source_files: vec!["policy.txt".to_string()],
            }],
        };

        write_mirror(dir.path(), &snapshot).unwrap();

        let raw = std::fs::read_to_string(dir.path().join(MIRROR_FILE_NAME)).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();

        let node = &value["nodes"][0];
        assert_eq!(node["id"], "req_4_1");
        assert_eq!(node["entity_type"], "Requirement");
        assert_eq!(node["entity_name"], "Requirement 4.1");
        assert_eq!(node["text"], "Approval from DPO is required.");
        assert_eq!(node["source_files"], json!(["policy.txt"]));

        let edge = &value["edges"][0];
        assert_eq!(edge["source"], "section_4");
        assert_eq!(edge["relationship_types"], json!(["CONTAINS"]));
    }
}
