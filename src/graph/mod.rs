//! Graph primitives: nodes, edges, handles and id generation.
//!
//! `RuleGraph` keeps nodes and edges in two typed maps. It is only mutated by the
//! model while applying change operations; everything outside the crate gets
//! read access.

pub mod edge;
pub mod handles;
pub mod ids;
pub mod node;

pub use edge::*;
pub use ids::*;
pub use node::*;

use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

/// The node and edge collection currently shown in the editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleGraph {
    nodes: AHashMap<String, RuleEditorNode>,
    edges: AHashMap<String, RuleEdge>,
}

impl RuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, node_id: &str) -> Option<&RuleEditorNode> {
        self.nodes.get(node_id)
    }

    pub fn edge(&self, edge_id: &str) -> Option<&RuleEdge> {
        self.edges.get(edge_id)
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = &RuleEditorNode> {
        self.nodes.values()
    }

    /// All edges in arbitrary order.
    pub fn edges(&self) -> impl Iterator<Item = &RuleEdge> {
        self.edges.values()
    }

    /// All nodes ordered by id, for deterministic output.
    pub fn sorted_nodes(&self) -> Vec<&RuleEditorNode> {
        self.nodes.values().sorted_by(|a, b| a.id.cmp(&b.id)).collect()
    }

    /// Returns the nodes with the given ids, skipping unknown ones and keeping the given order.
    pub fn nodes_by_id<'a, I, S>(&self, node_ids: I) -> Vec<&RuleEditorNode>
    where
        I: IntoIterator<Item = &'a S>,
        S: AsRef<str> + 'a + ?Sized,
    {
        node_ids
            .into_iter()
            .filter_map(|id| self.nodes.get(id.as_ref()))
            .collect()
    }

    /// Edges matching the filter, ordered by target and port.
    pub fn find_edges(&self, filter: EdgeFilter<'_>) -> Vec<&RuleEdge> {
        self.edges
            .values()
            .filter(|e| filter.matches(e))
            .sorted_by(|a, b| (&a.target, a.target_handle).cmp(&(&b.target, b.target_handle)))
            .collect()
    }

    /// Every edge that starts or ends at one of the given nodes.
    pub fn edges_of_nodes(&self, node_ids: &AHashSet<&str>) -> Vec<&RuleEdge> {
        self.edges
            .values()
            .filter(|e| node_ids.contains(e.source.as_str()) || node_ids.contains(e.target.as_str()))
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .collect()
    }

    /// The edge occupying a specific input port, if any.
    pub fn edge_at(&self, target: &str, target_handle: usize) -> Option<&RuleEdge> {
        self.edges
            .values()
            .find(|e| e.target == target && e.target_handle == target_handle)
    }

    /// Incoming edges grouped by target node id.
    pub fn input_edges_by_target(&self) -> AHashMap<&str, Vec<&RuleEdge>> {
        let mut grouped: AHashMap<&str, Vec<&RuleEdge>> = AHashMap::new();
        for edge in self.edges.values() {
            grouped.entry(edge.target.as_str()).or_default().push(edge);
        }
        grouped
    }

    /// Highest occupied input port per target node.
    pub fn max_occupied_handles(&self) -> AHashMap<&str, usize> {
        let mut max_handles: AHashMap<&str, usize> = AHashMap::new();
        for edge in self.edges.values() {
            let current = max_handles.entry(edge.target.as_str()).or_insert(edge.target_handle);
            if edge.target_handle > *current {
                *current = edge.target_handle;
            }
        }
        max_handles
    }

    pub(crate) fn insert_node(&mut self, node: RuleEditorNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub(crate) fn remove_node(&mut self, node_id: &str) -> Option<RuleEditorNode> {
        self.nodes.remove(node_id)
    }

    pub(crate) fn node_mut(&mut self, node_id: &str) -> Option<&mut RuleEditorNode> {
        self.nodes.get_mut(node_id)
    }

    pub(crate) fn insert_edge(&mut self, edge: RuleEdge) {
        self.edges.insert(edge.id.clone(), edge);
    }

    pub(crate) fn remove_edge(&mut self, edge_id: &str) -> Option<RuleEdge> {
        self.edges.remove(edge_id)
    }

    /// Drops edges whose endpoints no longer exist.
    pub(crate) fn retain_connected_edges(&mut self) -> usize {
        let before = self.edges.len();
        let nodes = &self.nodes;
        self.edges
            .retain(|_, e| nodes.contains_key(&e.source) && nodes.contains_key(&e.target));
        before - self.edges.len()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}
