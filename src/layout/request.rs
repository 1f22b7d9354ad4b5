use crate::graph::Position;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

pub const ALGORITHM_LAYERED: &str = "layered";
pub const EDGE_ROUTING_POLYLINE: &str = "polyline";
pub const DIRECTION_RIGHT: &str = "RIGHT";
pub const CROSSING_MINIMIZATION_INTERACTIVE: &str = "interactive";

/// Layout settings of an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Vertical gap between nodes of the same layer.
    pub node_spacing: f64,
    /// Horizontal gap between layers.
    pub layer_spacing: f64,
    pub fallback_width: f64,
    pub fallback_base_height: f64,
    /// Extra fallback height per operator parameter.
    pub fallback_height_per_parameter: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 80.0,
            layer_spacing: 120.0,
            fallback_width: 250.0,
            fallback_base_height: 100.0,
            fallback_height_per_parameter: 75.0,
        }
    }
}

impl LayoutConfig {
    pub fn options(&self) -> LayoutOptions {
        LayoutOptions {
            algorithm: ALGORITHM_LAYERED.to_string(),
            edge_routing: EDGE_ROUTING_POLYLINE.to_string(),
            direction: DIRECTION_RIGHT.to_string(),
            crossing_minimization: CROSSING_MINIMIZATION_INTERACTIVE.to_string(),
            node_spacing: self.node_spacing,
            layer_spacing: self.layer_spacing,
        }
    }
}

/// Engine options sent along with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    pub algorithm: String,
    pub edge_routing: String,
    pub direction: String,
    pub crossing_minimization: String,
    pub node_spacing: f64,
    pub layer_spacing: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: String,
    pub width: f64,
    pub height: f64,
    /// Current top-left position, used for interactive ordering.
    pub x: f64,
    pub y: f64,
    /// Highest input port this node feeds into. Keeps inputs of a node in port order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_hint: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// A graph handed to a layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub options: LayoutOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Top-left positions computed by a layout engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub nodes: Vec<PositionedNode>,
}

impl LayoutResult {
    pub fn positions(&self) -> AHashMap<&str, Position> {
        self.nodes
            .iter()
            .map(|n| (n.id.as_str(), Position::new(n.x, n.y)))
            .collect()
    }
}
