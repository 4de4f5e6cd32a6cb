//! In-memory knowledge graph on a petgraph `DiGraph`.
//!
//! Nodes are keyed by their string id through a side index; edges are keyed
//! by the ordered `(source, target)` pair, so the graph never holds parallel
//! edges. Nothing is ever removed, which keeps petgraph's node and edge
//! indices in insertion order.

mod merge;
pub mod snapshot;

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use lexgraph_core::error::{LexGraphError, LexGraphResult};
use lexgraph_core::types::{Edge, EntityKind, Node};

pub use merge::MergeStats;
pub use snapshot::{EdgeRecord, GraphSnapshot, NodeRecord};

/// The petgraph type backing the knowledge graph.
pub type LegalGraph = DiGraph<Node, Edge>;

/// Counts by type for the whole graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Node count per `entity_type`.
    pub node_types: BTreeMap<String, usize>,
    /// Edge count per first-seen relationship type.
    pub relationship_types: BTreeMap<String, usize>,
}

/// A bounded listing of graph contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub total_nodes: usize,
    pub total_edges: usize,
}

/// Directed property graph of legal/policy entities.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: LegalGraph,
    index: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Check whether a node with `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    /// Look up the edge for an ordered pair.
    pub fn edge(&self, source: &str, target: &str) -> Option<&Edge> {
        self.edge_index(source, target).map(|idx| &self.graph[idx])
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    /// Outgoing edges of `id` with their target nodes, in insertion order.
    ///
    /// Returns an empty list for unknown ids.
    pub fn outgoing(&self, id: &str) -> Vec<(&Node, &Edge)> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Incoming edges of `id` with their source nodes, in insertion order.
    pub fn incoming(&self, id: &str) -> Vec<(&Node, &Edge)> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<(&Node, &Edge)> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };

        // petgraph walks adjacency lists newest-first
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), other)
            })
            .collect();
        edges.sort_by_key(|(edge_idx, _)| edge_idx.index());

        edges
            .into_iter()
            .map(|(edge_idx, other)| (&self.graph[other], &self.graph[edge_idx]))
            .collect()
    }

    /// Enumerate simple directed paths from `source` to `target` with at most
    /// `max_hops` edges, returning node ids for the first `limit` paths found.
    pub fn simple_paths(
        &self,
        source: &str,
        target: &str,
        max_hops: usize,
        limit: usize,
    ) -> Vec<Vec<String>> {
        if max_hops == 0 || limit == 0 || source == target {
            return Vec::new();
        }
        let (Some(&from), Some(&to)) = (self.index.get(source), self.index.get(target)) else {
            return Vec::new();
        };

        petgraph::algo::all_simple_paths::<Vec<NodeIndex>, _>(
            &self.graph,
            from,
            to,
            0,
            Some(max_hops - 1),
        )
        .take(limit)
        .map(|path| path.into_iter().map(|idx| self.graph[idx].id.clone()).collect())
        .collect()
    }

    /// Count nodes and edges by type.
    pub fn stats(&self) -> GraphStats {
        let mut node_types = BTreeMap::new();
        for node in self.nodes() {
            *node_types.entry(node.entity_type.clone()).or_insert(0) += 1;
        }
        let mut relationship_types = BTreeMap::new();
        for edge in self.edges() {
            *relationship_types
                .entry(edge.relationship_type.clone())
                .or_insert(0) += 1;
        }

        GraphStats {
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
            node_types,
            relationship_types,
        }
    }

    /// The first `limit` nodes and edges.
    pub fn view(&self, limit: usize) -> GraphView {
        GraphView {
            nodes: self.nodes().take(limit).cloned().collect(),
            edges: self.edges().take(limit).cloned().collect(),
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
        }
    }

    /// Convert to the snapshot form.
    pub fn to_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes().map(NodeRecord::from).collect(),
            edges: self.edges().map(EdgeRecord::from).collect(),
        }
    }

    /// Rebuild a graph from a snapshot.
    ///
    /// Fails on duplicate node ids, duplicate ordered pairs, or edges whose
    /// endpoints are not in the snapshot.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> LexGraphResult<Self> {
        let mut graph = Self::new();

        for record in snapshot.nodes {
            if graph.contains(&record.id) {
                return Err(LexGraphError::snapshot_corrupted(format!(
                    "Duplicate node id '{}' in snapshot",
                    record.id
                )));
            }
            graph.insert_node(Node::from(record));
        }

        for record in snapshot.edges {
            let (Some(&from), Some(&to)) =
                (graph.index.get(&record.source), graph.index.get(&record.target))
            else {
                return Err(LexGraphError::snapshot_corrupted(format!(
                    "Edge {} -> {} references a missing node",
                    record.source, record.target
                )));
            };
            if graph.graph.find_edge(from, to).is_some() {
                return Err(LexGraphError::snapshot_corrupted(format!(
                    "Duplicate edge {} -> {} in snapshot",
                    record.source, record.target
                )));
            }
            graph.graph.add_edge(from, to, Edge::from(record));
        }

        Ok(graph)
    }

    fn insert_node(&mut self, node: Node) -> NodeIndex {
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        idx
    }

    fn edge_index(&self, source: &str, target: &str) -> Option<EdgeIndex> {
        let from = *self.index.get(source)?;
        let to = *self.index.get(target)?;
        self.graph.find_edge(from, to)
    }

    /// Get or create the node for `id`, creating an untyped placeholder
    /// named after its id when absent. Returns the index and whether the
    /// node was created.
    fn ensure_placeholder(&mut self, id: &str, source_file: &str) -> (NodeIndex, bool) {
        if let Some(&idx) = self.index.get(id) {
            return (idx, false);
        }
        let mut node = Node::new(id, EntityKind::Unknown.as_str(), id);
        node.source_files.insert(source_file.to_string());
        (self.insert_node(node), true)
    }
}
