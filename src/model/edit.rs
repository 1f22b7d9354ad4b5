use super::RuleEditorModel;
use super::apply::Recording;
use super::projection::{STICKY_NOTE_PLUGIN_ID, sticky_note_node};
use crate::catalog::RuleOperator;
use crate::change::{ChangeOperation, RuleModelChanges};
use crate::graph::handles::{dynamic_input_handles, initial_input_handles};
use crate::graph::{
    EdgeFilter, NodeDimensions, ParameterValue, PluginType, Position, RuleEdge, RuleEditorNode, StickyNote,
    StickyNoteProps, StickyNoteStyle,
};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use tracing::warn;

/// Offset of a cloned node relative to its original.
pub const CLONE_OFFSET: Position = Position { x: 50.0, y: 50.0 };

impl RuleEditorModel {
    /// Places a new node for `operator`. Returns the generated node id.
    pub fn add_node(&mut self, operator: &RuleOperator, position: Position) -> Option<String> {
        if !self.editable() {
            return None;
        }
        let node_id = self.fresh_node_id(&operator.plugin_id);
        let mut operator_node = operator.to_operator_node(node_id.clone());
        operator_node.position = Some(position);
        let node = RuleEditorNode {
            id: node_id.clone(),
            input_handles: initial_input_handles(&operator.port_specification, operator_node.inputs.len()),
            operator: operator_node,
            position,
            dimension: None,
            sticky: None,
        };
        self.execute(RuleModelChanges::add_nodes([node]), Recording::Edit);
        Some(node_id)
    }

    /// Places a new node for the catalog operator with the given type and id.
    pub fn add_node_by_plugin(&mut self, plugin_type: PluginType, plugin_id: &str, position: Position) -> Option<String> {
        let Some(operator) = self.catalog.find(plugin_type, plugin_id).cloned() else {
            warn!(?plugin_type, plugin_id, "operator does not exist");
            return None;
        };
        self.add_node(&operator, position)
    }

    /// Places a new sticky note. Returns the generated node id.
    pub fn add_sticky_note(
        &mut self,
        content: &str,
        style: StickyNoteStyle,
        position: Position,
        dimension: Option<NodeDimensions>,
    ) -> Option<String> {
        if !self.editable() {
            return None;
        }
        let id = self.fresh_node_id(STICKY_NOTE_PLUGIN_ID);
        let node = sticky_note_node(&StickyNote {
            id: id.clone(),
            content: content.to_string(),
            style,
            position,
            dimension,
        });
        self.execute(RuleModelChanges::add_nodes([node]), Recording::Edit);
        Some(id)
    }

    pub fn delete_node(&mut self, node_id: &str) -> bool {
        self.delete_nodes(&[node_id])
    }

    /// Deletes nodes together with all edges touching them.
    ///
    /// Edges are recorded first, so undoing restores nodes before their edges.
    pub fn delete_nodes(&mut self, node_ids: &[&str]) -> bool {
        if !self.editable() {
            return false;
        }
        let nodes: Vec<RuleEditorNode> = self
            .graph
            .nodes_by_id(node_ids.iter().unique())
            .into_iter()
            .cloned()
            .collect();
        if nodes.is_empty() {
            return false;
        }
        let id_set: AHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let edges: Vec<RuleEdge> = self.graph.edges_of_nodes(&id_set).into_iter().cloned().collect();
        if !edges.is_empty() {
            self.execute(RuleModelChanges::delete_edges(edges), Recording::Edit);
        }
        self.execute(RuleModelChanges::delete_nodes(nodes), Recording::Edit);
        self.fix_node_inputs_internal();
        true
    }

    /// Connects the output of `source` to an input port of `target`.
    ///
    /// Without `target_handle` the first empty port is used, or a new port is
    /// appended for nodes with unbounded ports. An edge already on the port and any
    /// other edge leaving `source` are removed. With `previous_handle` the displaced
    /// edge moves to that port instead, swapping the two inputs.
    ///
    /// Returns the id of the new edge.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        target_handle: Option<usize>,
        previous_handle: Option<usize>,
    ) -> Option<String> {
        if !self.editable() || source == target || self.graph.node(source).is_none_or(|n| n.is_sticky_note()) {
            return None;
        }
        let handle = match target_handle {
            Some(handle) => handle,
            None => self.first_free_handle(target)?,
        };
        let target_node = self.graph.node(target)?;
        if target_node.is_sticky_note()
            || target_node
                .operator
                .port_specification
                .max_input_ports
                .is_some_and(|max| handle >= max)
        {
            return None;
        }

        let displaced = self.graph.edge_at(target, handle).cloned();
        let mut obsolete: Vec<RuleEdge> = displaced.iter().cloned().collect();
        obsolete.extend(
            self.graph
                .find_edges(EdgeFilter {
                    source: Some(source),
                    ..Default::default()
                })
                .into_iter()
                .filter(|e| displaced.as_ref().is_none_or(|d| d.id != e.id))
                .cloned(),
        );
        if !obsolete.is_empty() {
            self.execute(RuleModelChanges::delete_edges(obsolete), Recording::Edit);
        }
        if let (Some(displaced), Some(previous_handle)) = (displaced, previous_handle) {
            let swapped = RuleEdge {
                target_handle: previous_handle,
                ..displaced
            };
            self.execute(RuleModelChanges::add_edges([swapped]), Recording::Edit);
        }

        let edge = RuleEdge::new(self.edge_ids.next_id(), source, target, handle);
        let edge_id = edge.id.clone();
        self.execute(RuleModelChanges::add_edges([edge]), Recording::Edit);
        self.fix_node_inputs_internal();
        Some(edge_id)
    }

    fn first_free_handle(&self, target: &str) -> Option<usize> {
        let node = self.graph.node(target)?;
        let occupied: AHashSet<usize> = self
            .graph
            .find_edges(EdgeFilter {
                target: Some(target),
                ..Default::default()
            })
            .into_iter()
            .map(|e| e.target_handle)
            .collect();
        (0..node.input_handles)
            .find(|handle| !occupied.contains(handle))
            .or_else(|| {
                let next = occupied.iter().max().map_or(0, |max| max + 1);
                node.has_dynamic_ports().then(|| next.max(node.input_handles))
            })
    }

    /// Deletes an edge. With `update_handles` the handle counts of dynamic nodes are
    /// fixed right away, otherwise the caller is expected to do so later.
    pub fn delete_edge(&mut self, edge_id: &str, update_handles: bool) -> bool {
        if !self.editable() {
            return false;
        }
        let Some(edge) = self.graph.edge(edge_id).cloned() else {
            return false;
        };
        self.execute(RuleModelChanges::delete_edges([edge]), Recording::Edit);
        if update_handles {
            self.fix_node_inputs_internal();
        }
        true
    }

    pub fn delete_edges(&mut self, edge_ids: &[&str]) -> bool {
        if !self.editable() {
            return false;
        }
        let edges: Vec<RuleEdge> = edge_ids
            .iter()
            .unique()
            .filter_map(|id| self.graph.edge(id).cloned())
            .collect();
        if edges.is_empty() {
            return false;
        }
        self.execute(RuleModelChanges::delete_edges(edges), Recording::Edit);
        self.fix_node_inputs_internal();
        true
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) -> bool {
        if !self.editable() {
            return false;
        }
        let Some(node) = self.graph.node(node_id) else {
            return false;
        };
        let changes = RuleModelChanges::change_node_position(node_id, node.position, position);
        self.execute(changes, Recording::Edit);
        true
    }

    /// Moves several nodes by the same offset, one position change per node.
    pub fn move_nodes(&mut self, node_ids: &[&str], offset: Position) -> bool {
        if !self.editable() {
            return false;
        }
        let operations: Vec<ChangeOperation> = self
            .graph
            .nodes_by_id(node_ids.iter().unique())
            .into_iter()
            .map(|node| ChangeOperation::ChangeNodePosition {
                node_id: node.id.clone(),
                from: node.position,
                to: node.position.offset_by(offset),
            })
            .collect();
        if operations.is_empty() {
            return false;
        }
        self.execute(RuleModelChanges::new(operations), Recording::Edit);
        true
    }

    pub fn change_node_size(&mut self, node_id: &str, dimension: Option<NodeDimensions>) -> bool {
        if !self.editable() {
            return false;
        }
        let Some(node) = self.graph.node(node_id) else {
            return false;
        };
        let changes = RuleModelChanges::change_node_size(node_id, node.dimension, dimension);
        self.execute(changes, Recording::Edit);
        true
    }

    /// Changes content and style of a sticky note.
    pub fn change_sticky_note(&mut self, node_id: &str, props: StickyNoteProps) -> bool {
        if !self.editable() {
            return false;
        }
        let Some(current) = self.graph.node(node_id).and_then(|n| n.sticky.clone()) else {
            return false;
        };
        self.execute(
            RuleModelChanges::change_sticky_note(node_id, current, props),
            Recording::Edit,
        );
        true
    }

    /// Duplicates nodes with fresh ids, moved by `offset`.
    ///
    /// Only edges between two copied nodes are duplicated. Copies carry the current
    /// parameter values of their originals. Returns the new ids in input order.
    pub fn copy_and_paste_nodes(&mut self, node_ids: &[&str], offset: Position) -> Vec<String> {
        if !self.editable() {
            return Vec::new();
        }
        let originals: Vec<RuleEditorNode> = self
            .graph
            .nodes_by_id(node_ids.iter().unique())
            .into_iter()
            .cloned()
            .collect();
        if originals.is_empty() {
            return Vec::new();
        }

        let mut id_map: AHashMap<String, String> = AHashMap::new();
        let mut copies = Vec::with_capacity(originals.len());
        for original in &originals {
            let base = if original.is_sticky_note() {
                STICKY_NOTE_PLUGIN_ID
            } else {
                original.operator.plugin_id.as_str()
            };
            let new_id = self.fresh_node_id(base);
            let mut operator = original.operator.clone();
            operator.node_id = new_id.clone();
            operator.parameters = self.parameters.materialize(&original.operator);
            let position = original.position.offset_by(offset);
            operator.position = Some(position);
            copies.push(RuleEditorNode {
                id: new_id.clone(),
                operator,
                position,
                dimension: original.dimension,
                input_handles: original.input_handles,
                sticky: original.sticky.clone(),
            });
            id_map.insert(original.id.clone(), new_id);
        }

        let copied_edges: Vec<(String, String, usize)> = self
            .graph
            .edges()
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .filter_map(|edge| {
                let source = id_map.get(&edge.source)?;
                let target = id_map.get(&edge.target)?;
                Some((source.clone(), target.clone(), edge.target_handle))
            })
            .collect();
        let edges: Vec<RuleEdge> = copied_edges
            .into_iter()
            .map(|(source, target, handle)| RuleEdge::new(self.edge_ids.next_id(), &source, &target, handle))
            .collect();

        let new_ids = copies.iter().map(|n| n.id.clone()).collect();
        self.execute(RuleModelChanges::add_nodes(copies), Recording::Edit);
        if !edges.is_empty() {
            self.execute(RuleModelChanges::add_edges(edges), Recording::Edit);
        }
        self.fix_node_inputs_internal();
        new_ids
    }

    /// Copies a single node next to the original.
    pub fn clone_node(&mut self, node_id: &str) -> Option<String> {
        self.copy_and_paste_nodes(&[node_id], CLONE_OFFSET).into_iter().next()
    }

    /// Sets a parameter value. Consecutive changes of the same parameter are merged
    /// into one undo step that restores the value from before the first change.
    pub fn change_node_parameter(&mut self, node_id: &str, parameter_id: &str, value: Option<ParameterValue>) -> bool {
        if !self.editable() {
            return false;
        }
        self.change_node_parameter_internal(node_id, parameter_id, value, true)
    }

    /// Sets several parameters of one node as a single undo step.
    pub fn update_node_parameters(
        &mut self,
        node_id: &str,
        values: impl IntoIterator<Item = (String, Option<ParameterValue>)>,
    ) -> bool {
        if !self.editable() || !self.graph.contains_node(node_id) {
            return false;
        }
        self.start_change_transaction();
        let mut changed = false;
        for (parameter_id, value) in values.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
            changed |= self.change_node_parameter_internal(node_id, &parameter_id, value, false);
        }
        changed
    }

    fn change_node_parameter_internal(
        &mut self,
        node_id: &str,
        parameter_id: &str,
        value: Option<ParameterValue>,
        auto_start_transaction: bool,
    ) -> bool {
        let Some(node) = self.graph.node(node_id) else {
            warn!(node_id, parameter_id, "cannot change parameter of missing node");
            return false;
        };
        let from = self.parameters.current_value(&node.operator, parameter_id);
        let undo_stack = self.history.undo_stack();
        let same_parameter = undo_stack
            .last_parameter_change()
            .is_some_and(|(last_node, last_parameter, _)| last_node == node_id && last_parameter == parameter_id);
        if auto_start_transaction && !same_parameter && !undo_stack.last_is_boundary() {
            self.history.start_transaction();
        }
        self.execute(
            RuleModelChanges::change_node_parameter(node_id, parameter_id, from, value),
            Recording::Edit,
        );
        true
    }

    /// Grows or shrinks the input handles of nodes with unbounded ports so each has
    /// exactly one free port after its highest connected one.
    pub fn fix_node_inputs(&mut self) -> bool {
        if !self.editable() {
            return false;
        }
        self.fix_node_inputs_internal()
    }

    pub(crate) fn fix_node_inputs_internal(&mut self) -> bool {
        let max_occupied = self.graph.max_occupied_handles();
        let operations: Vec<ChangeOperation> = self
            .graph
            .sorted_nodes()
            .into_iter()
            .filter(|node| node.has_dynamic_ports())
            .filter_map(|node| {
                let wanted = dynamic_input_handles(
                    &node.operator.port_specification,
                    max_occupied.get(node.id.as_str()).copied(),
                );
                (wanted != node.input_handles).then(|| ChangeOperation::ChangeNumberOfInputHandles {
                    node_id: node.id.clone(),
                    from: node.input_handles,
                    to: wanted,
                })
            })
            .collect();
        if operations.is_empty() {
            return false;
        }
        self.execute(RuleModelChanges::new(operations), Recording::Maintenance);
        true
    }

    /// An id derived from `base_id` that no node in the graph uses.
    pub(crate) fn fresh_node_id(&mut self, base_id: &str) -> String {
        loop {
            let id = self.node_ids.fresh(base_id);
            if !self.graph.contains_node(&id) {
                return id;
            }
        }
    }
}
