//! In-process layered layout, flowing left to right.
//!
//! Phases:
//!   1. Layer assignment (longest path from the inputs)
//!   2. Ordering within layers, from the rightmost layer back to the inputs
//!   3. Coordinate assignment

use super::LayoutEngine;
use super::request::{ALGORITHM_LAYERED, LayoutNode, LayoutRequest, LayoutResult, PositionedNode};
use crate::error::LayoutError;
use ahash::AHashMap;
use async_trait::async_trait;

/// Layered layout for rule trees. Inputs end up on the left, the root on the right.
///
/// Ordering is interactive: nodes are stacked by the position of their consumer,
/// then by the port they feed into, then by their current vertical position.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredLayout;

#[async_trait]
impl LayoutEngine for LayeredLayout {
    async fn layout(&self, request: LayoutRequest) -> Result<LayoutResult, LayoutError> {
        compute_layout(&request)
    }
}

pub fn compute_layout(request: &LayoutRequest) -> Result<LayoutResult, LayoutError> {
    if request.options.algorithm != ALGORITHM_LAYERED {
        return Err(LayoutError::EngineFailed(format!(
            "unsupported layout algorithm '{}'",
            request.options.algorithm
        )));
    }
    let nodes: AHashMap<&str, &LayoutNode> = request.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut consumers: AHashMap<&str, Vec<&str>> = AHashMap::new();
    for edge in &request.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !nodes.contains_key(endpoint.as_str()) {
                return Err(LayoutError::UnknownNode(endpoint.clone()));
            }
        }
        consumers
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let layers = assign_layers(request);
    let layer_count = layers.values().max().map_or(0, |max| max + 1);

    let mut centers: AHashMap<&str, f64> = AHashMap::new();
    let mut tops: AHashMap<&str, f64> = AHashMap::new();
    let mut layer_widths = vec![0.0f64; layer_count];
    let mut ordered_layers: Vec<Vec<&LayoutNode>> = vec![Vec::new(); layer_count];

    for layer in (0..layer_count).rev() {
        let mut members: Vec<&LayoutNode> = request
            .nodes
            .iter()
            .filter(|n| layers.get(n.id.as_str()) == Some(&layer))
            .collect();
        let anchor = |node: &LayoutNode| -> f64 {
            consumers
                .get(node.id.as_str())
                .and_then(|targets| {
                    targets
                        .iter()
                        .filter_map(|t| centers.get(t).copied())
                        .min_by(f64::total_cmp)
                })
                .unwrap_or(node.y + node.height / 2.0)
        };
        members.sort_by(|a, b| {
            anchor(*a)
                .total_cmp(&anchor(*b))
                .then_with(|| a.order_hint.unwrap_or(0).cmp(&b.order_hint.unwrap_or(0)))
                .then_with(|| a.y.total_cmp(&b.y))
                .then_with(|| a.id.cmp(&b.id))
        });

        let total_height: f64 = members.iter().map(|n| n.height).sum::<f64>()
            + request.options.node_spacing * members.len().saturating_sub(1) as f64;
        let mut y = -total_height / 2.0;
        for node in &members {
            centers.insert(node.id.as_str(), y + node.height / 2.0);
            tops.insert(node.id.as_str(), y);
            y += node.height + request.options.node_spacing;
        }
        layer_widths[layer] = members.iter().map(|n| n.width).fold(0.0, f64::max);
        ordered_layers[layer] = members;
    }

    let mut x = 0.0;
    let mut result = LayoutResult::default();
    for (layer, members) in ordered_layers.iter().enumerate() {
        for node in members {
            let y = tops.get(node.id.as_str()).copied().unwrap_or_default();
            result.nodes.push(PositionedNode {
                id: node.id.clone(),
                x,
                y,
            });
        }
        x += layer_widths[layer] + request.options.layer_spacing;
    }
    result.nodes.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(result)
}

/// Longest-path layering. Relaxation is bounded by the node count, so cycles terminate.
fn assign_layers(request: &LayoutRequest) -> AHashMap<&str, usize> {
    let mut layers: AHashMap<&str, usize> = request.nodes.iter().map(|n| (n.id.as_str(), 0)).collect();
    for _ in 0..request.nodes.len() {
        let mut changed = false;
        for edge in &request.edges {
            if edge.source == edge.target {
                continue;
            }
            let source_layer = layers.get(edge.source.as_str()).copied().unwrap_or(0);
            if let Some(target_layer) = layers.get_mut(edge.target.as_str()) {
                if *target_layer < source_layer + 1 {
                    *target_layer = source_layer + 1;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    layers
}
