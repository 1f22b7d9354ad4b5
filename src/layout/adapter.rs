use super::request::{LayoutConfig, LayoutEdge, LayoutNode, LayoutRequest, LayoutResult};
use crate::change::ChangeOperation;
use crate::graph::{EdgeFilter, NodeDimensions, Position, RuleEditorNode, RuleGraph};
use ahash::AHashMap;
use tracing::debug;

/// Node sizes as rendered on screen, together with the zoom they were measured at.
#[derive(Debug, Clone)]
pub struct MeasuredSizes {
    zoom_factor: f64,
    sizes: AHashMap<String, NodeDimensions>,
}

impl Default for MeasuredSizes {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl MeasuredSizes {
    pub fn new(zoom_factor: f64) -> Self {
        Self {
            zoom_factor,
            sizes: AHashMap::new(),
        }
    }

    pub fn with_size(mut self, node_id: &str, width: f64, height: f64) -> Self {
        self.insert(node_id, width, height);
        self
    }

    pub fn insert(&mut self, node_id: &str, width: f64, height: f64) {
        self.sizes
            .insert(node_id.to_string(), NodeDimensions { width, height });
    }

    /// The size of a node in graph coordinates, i.e. corrected by the zoom factor.
    pub fn get(&self, node_id: &str) -> Option<NodeDimensions> {
        let zoom = if self.zoom_factor > 0.0 { self.zoom_factor } else { 1.0 };
        self.sizes.get(node_id).map(|size| NodeDimensions {
            width: size.width / zoom,
            height: size.height / zoom,
        })
    }
}

fn node_size(node: &RuleEditorNode, sizes: &MeasuredSizes, config: &LayoutConfig) -> NodeDimensions {
    node.dimension
        .or_else(|| sizes.get(&node.id))
        .unwrap_or_else(|| NodeDimensions {
            width: config.fallback_width,
            height: config.fallback_base_height
                + config.fallback_height_per_parameter * node.operator.parameters.len() as f64,
        })
}

/// Translates the graph into a layout engine request.
pub fn build_layout_request(graph: &RuleGraph, sizes: &MeasuredSizes, config: &LayoutConfig) -> LayoutRequest {
    let mut order_hints: AHashMap<&str, usize> = AHashMap::new();
    for edge in graph.edges() {
        let hint = order_hints.entry(edge.source.as_str()).or_insert(edge.target_handle);
        *hint = (*hint).max(edge.target_handle);
    }

    let nodes = graph
        .sorted_nodes()
        .into_iter()
        .map(|node| {
            let size = node_size(node, sizes, config);
            LayoutNode {
                id: node.id.clone(),
                width: size.width,
                height: size.height,
                x: node.position.x,
                y: node.position.y,
                order_hint: order_hints.get(node.id.as_str()).copied(),
            }
        })
        .collect();

    let edges = graph
        .find_edges(EdgeFilter::default())
        .into_iter()
        .map(|edge| LayoutEdge {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        })
        .collect();

    LayoutRequest {
        nodes,
        edges,
        options: config.options(),
    }
}

/// Average of the positions, floored. The origin for no positions.
pub fn graph_center(positions: impl IntoIterator<Item = Position>) -> Position {
    let (count, sum) = positions
        .into_iter()
        .fold((0usize, Position::default()), |(count, sum), p| (count + 1, sum.offset_by(p)));
    if count == 0 {
        return Position::default();
    }
    Position::new((sum.x / count as f64).floor(), (sum.y / count as f64).floor())
}

/// Moves the layout result so that its center matches `center`.
pub fn recentered(result: &LayoutResult, center: Position) -> AHashMap<String, Position> {
    let positions = result.positions();
    let new_center = graph_center(positions.values().copied());
    let offset = Position::new(center.x - new_center.x, center.y - new_center.y);
    positions
        .into_iter()
        .map(|(id, position)| (id.to_string(), position.offset_by(offset)))
        .collect()
}

/// Position changes for every existing node whose position differs from the new one.
///
/// Positions of nodes that are no longer part of the graph are dropped.
pub fn position_changes(graph: &RuleGraph, positions: &AHashMap<String, Position>) -> Vec<ChangeOperation> {
    let vanished = positions.keys().filter(|id| !graph.contains_node(id)).count();
    if vanished > 0 {
        debug!(vanished, "dropping layout positions of removed nodes");
    }
    graph
        .sorted_nodes()
        .into_iter()
        .filter_map(|node| {
            let to = *positions.get(&node.id)?;
            (to != node.position).then(|| ChangeOperation::ChangeNodePosition {
                node_id: node.id.clone(),
                from: node.position,
                to,
            })
        })
        .collect()
}
