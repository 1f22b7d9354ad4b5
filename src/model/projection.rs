use super::RuleEditorModel;
use super::apply::Recording;
use crate::change::{ChangeOperation, RuleModelChanges};
use crate::error::{ProjectionError, RuleValidationError};
use crate::graph::handles::initial_input_handles;
use crate::graph::{
    EdgeIdGenerator, PluginType, PortSpecification, RuleEdge, RuleEditorNode, RuleOperatorNode, StickyNote,
    StickyNoteProps,
};
use crate::layout::{LayoutEngine, MeasuredSizes, graph_center};
use crate::validation::{ValidationGraph, validate_rule_tree};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Node id base of sticky notes.
pub const STICKY_NOTE_PLUGIN_ID: &str = "stickyNote";

/// The persisted form of a rule: its operators plus free-floating annotations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDocument {
    pub operator_nodes: Vec<RuleOperatorNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sticky_notes: Vec<StickyNote>,
}

impl RuleDocument {
    pub fn from_json(json: &str) -> Result<Self, ProjectionError> {
        serde_json::from_str(json).map_err(|e| ProjectionError::Json(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ProjectionError> {
        serde_json::to_string_pretty(self).map_err(|e| ProjectionError::Json(e.to_string()))
    }
}

/// Builds the editor node of a sticky note.
pub(crate) fn sticky_note_node(note: &StickyNote) -> RuleEditorNode {
    RuleEditorNode {
        id: note.id.clone(),
        operator: RuleOperatorNode {
            node_id: note.id.clone(),
            plugin_id: STICKY_NOTE_PLUGIN_ID.to_string(),
            plugin_type: PluginType::StickyNote,
            label: "Sticky note".to_string(),
            parameters: Default::default(),
            inputs: Vec::new(),
            port_specification: PortSpecification::bounded(0, 0),
            position: Some(note.position),
            tags: Vec::new(),
            inputs_can_be_switched: false,
            description: None,
        },
        position: note.position,
        dimension: note.dimension,
        input_handles: 0,
        sticky: Some(StickyNoteProps {
            content: Some(note.content.clone()),
            style: Some(note.style.clone()),
        }),
    }
}

fn operator_editor_node(operator: &RuleOperatorNode) -> RuleEditorNode {
    RuleEditorNode {
        id: operator.node_id.clone(),
        operator: operator.clone(),
        position: operator.position.unwrap_or_default(),
        dimension: None,
        input_handles: initial_input_handles(&operator.port_specification, operator.inputs.len()),
        sticky: None,
    }
}

impl RuleEditorModel {
    /// Replaces the session with a loaded rule.
    ///
    /// History, parameter edits and id counters are reset. Nothing is recorded for
    /// undo. Returns `true` if some operator had no position and needs a layout.
    pub fn load(&mut self, document: &RuleDocument) -> Result<bool, ProjectionError> {
        let mut seen = AHashSet::new();
        let ids = document
            .operator_nodes
            .iter()
            .map(|n| n.node_id.as_str())
            .chain(document.sticky_notes.iter().map(|n| n.id.as_str()));
        for id in ids {
            if !seen.insert(id) {
                return Err(ProjectionError::DuplicateNodeId(id.to_string()));
            }
        }

        self.graph.clear();
        self.history.clear();
        self.parameters.clear();
        self.edge_ids = EdgeIdGenerator::default();

        let nodes = document
            .operator_nodes
            .iter()
            .map(operator_editor_node)
            .chain(document.sticky_notes.iter().map(sticky_note_node));
        self.execute(RuleModelChanges::add_nodes(nodes), Recording::Skip);

        let mut edges = Vec::new();
        for operator in &document.operator_nodes {
            for (handle, input) in operator.inputs.iter().enumerate() {
                let Some(source) = input else { continue };
                if !seen.contains(source.as_str()) {
                    warn!(node_id = %operator.node_id, input = %source, "input references unknown node");
                    continue;
                }
                edges.push(ChangeOperation::AddEdge(RuleEdge::new(
                    self.edge_ids.next_id(),
                    source,
                    &operator.node_id,
                    handle,
                )));
            }
        }
        self.execute(RuleModelChanges::new(edges), Recording::Skip);
        self.node_ids.seed(seen.iter().copied());

        let needs_layout = document.operator_nodes.iter().any(|n| n.position.is_none());
        debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            needs_layout,
            "loaded rule"
        );
        Ok(needs_layout)
    }

    /// Loads a rule and lays it out without recording history if some operator
    /// had no position.
    pub async fn load_with_layout(
        &mut self,
        document: &RuleDocument,
        engine: &dyn LayoutEngine,
        sizes: &MeasuredSizes,
    ) -> Result<(), ProjectionError> {
        if self.load(document)? {
            // Unpositioned operators sit at the origin and must not pull the center
            let placed = document
                .operator_nodes
                .iter()
                .filter_map(|n| n.position)
                .chain(document.sticky_notes.iter().map(|n| n.position));
            let center = graph_center(placed);
            self.run_layout(engine, sizes, Some(center), false).await?;
        }
        Ok(())
    }

    /// The operators of the current graph in their persisted form, ordered by id.
    ///
    /// Inputs are rebuilt from the edges by port, with empty ports as `None`.
    /// Trailing empty ports of nodes with unbounded ports are trimmed. Parameters
    /// include all unsaved edits.
    pub fn rule_operator_nodes(&self) -> Vec<RuleOperatorNode> {
        let input_edges = self.graph.input_edges_by_target();
        self.graph
            .sorted_nodes()
            .into_iter()
            .filter(|node| !node.is_sticky_note())
            .map(|node| {
                let edges = input_edges.get(node.id.as_str());
                let occupied = edges
                    .and_then(|edges| edges.iter().map(|e| e.target_handle + 1).max())
                    .unwrap_or(0);
                let mut inputs: Vec<Option<String>> = vec![None; occupied.max(node.input_handles)];
                for edge in edges.into_iter().flatten() {
                    inputs[edge.target_handle] = Some(edge.source.clone());
                }
                let spec = node.operator.port_specification;
                if spec.has_dynamic_ports() {
                    let keep = spec.min_input_ports.saturating_sub(1);
                    while inputs.len() > keep && inputs.last() == Some(&None) {
                        inputs.pop();
                    }
                }
                RuleOperatorNode {
                    inputs,
                    parameters: self.parameters.materialize(&node.operator),
                    position: Some(node.position),
                    ..node.operator.clone()
                }
            })
            .collect()
    }

    /// All sticky notes, ordered by id.
    pub fn sticky_notes(&self) -> Vec<StickyNote> {
        self.graph
            .sorted_nodes()
            .into_iter()
            .filter_map(|node| {
                let sticky = node.sticky.as_ref()?;
                Some(StickyNote {
                    id: node.id.clone(),
                    content: sticky.content.clone().unwrap_or_default(),
                    style: sticky.style.clone().unwrap_or_default(),
                    position: node.position,
                    dimension: node.dimension,
                })
            })
            .collect()
    }

    /// Projects the graph into its persisted form after validating it.
    ///
    /// Fails if the rule has more than one root, contains a cycle, has nodes not
    /// connected to the root, or violates the session validator's rule checks.
    /// The graph is never modified.
    pub fn save_rule(&self) -> Result<RuleDocument, RuleValidationError> {
        let operator_nodes = self.rule_operator_nodes();
        let graph = ValidationGraph::new(&operator_nodes);
        validate_rule_tree(&graph)?;
        self.validator.validate_rule(&graph)?;
        Ok(RuleDocument {
            operator_nodes,
            sticky_notes: self.sticky_notes(),
        })
    }

    /// The node and everything that feeds into it, in depth-first order.
    pub fn get_sub_tree_nodes(&self, node_id: &str) -> Vec<RuleOperatorNode> {
        let nodes = self.rule_operator_nodes();
        let graph = ValidationGraph::new(&nodes);
        graph.sub_tree(node_id).into_iter().cloned().collect()
    }
}
