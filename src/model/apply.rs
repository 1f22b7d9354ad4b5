use super::RuleEditorModel;
use crate::change::{ChangeKind, ChangeOperation, RuleModelChanges};
use crate::graph::{NodeDimensions, Position};
use ahash::AHashMap;
use tracing::{debug, warn};

/// How an executed change unit is recorded in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Recording {
    /// A user edit. Starts a new branch, so the redo stack is dropped.
    Edit,
    /// Bookkeeping that follows an edit, e.g. handle count fixes. Keeps the redo stack.
    Maintenance,
    /// Not recorded at all, e.g. while loading.
    Skip,
}

impl RuleEditorModel {
    /// Applies a change unit and records it.
    pub(crate) fn execute(&mut self, changes: RuleModelChanges, recording: Recording) {
        if changes.is_empty() {
            return;
        }
        self.apply_changes(&changes);
        match recording {
            Recording::Edit => self.history.record(changes, true),
            Recording::Maintenance => self.history.record(changes, false),
            Recording::Skip => {}
        }
    }

    /// Applies the operations of a change unit, one batch per run of the same kind.
    pub(crate) fn apply_changes(&mut self, changes: &RuleModelChanges) {
        for group in changes.grouped() {
            debug!(kind = ?group.kind, count = group.operations.len(), "applying change group");
            let operations = group.operations.as_slice();
            match group.kind {
                ChangeKind::AddNode => self.add_nodes_internal(operations),
                ChangeKind::DeleteNode => self.delete_nodes_internal(operations),
                ChangeKind::AddEdge => self.add_edges_internal(operations),
                ChangeKind::DeleteEdge => self.delete_edges_internal(operations),
                ChangeKind::ChangeNodePosition => self.change_positions_internal(operations),
                ChangeKind::ChangeNodeSize => self.change_sizes_internal(operations),
                ChangeKind::ChangeNodeParameter => self.change_parameters_internal(operations),
                ChangeKind::ChangeNumberOfInputHandles => self.change_input_handles_internal(operations),
                ChangeKind::ChangeStickyNote => self.change_sticky_notes_internal(operations),
            }
        }
        self.revision += 1;
    }

    fn add_nodes_internal(&mut self, operations: &[&ChangeOperation]) {
        for operation in operations {
            let ChangeOperation::AddNode(node) = operation else { continue };
            if self.graph.contains_node(&node.id) {
                warn!(node_id = %node.id, "replacing node with the same id");
            }
            self.graph.insert_node(node.clone());
        }
    }

    fn delete_nodes_internal(&mut self, operations: &[&ChangeOperation]) {
        for operation in operations {
            let ChangeOperation::DeleteNode(node) = operation else { continue };
            if self.graph.remove_node(&node.id).is_none() {
                debug!(node_id = %node.id, "node to delete does not exist");
            }
        }
        let dropped = self.graph.retain_connected_edges();
        if dropped > 0 {
            warn!(dropped, "dropped edges of deleted nodes");
        }
    }

    fn add_edges_internal(&mut self, operations: &[&ChangeOperation]) {
        for operation in operations {
            let ChangeOperation::AddEdge(edge) = operation else { continue };
            if !self.graph.contains_node(&edge.source) || !self.graph.contains_node(&edge.target) {
                warn!(edge_id = %edge.id, "dropping edge with missing endpoint");
                continue;
            }
            if let Some(existing) = self.graph.edge_at(&edge.target, edge.target_handle) {
                if existing.id != edge.id {
                    warn!(
                        edge_id = %edge.id,
                        existing = %existing.id,
                        target = %edge.target,
                        target_handle = edge.target_handle,
                        "dropping edge to an occupied input port"
                    );
                    continue;
                }
            }
            self.graph.insert_edge(edge.clone());
        }
    }

    fn delete_edges_internal(&mut self, operations: &[&ChangeOperation]) {
        for operation in operations {
            let ChangeOperation::DeleteEdge(edge) = operation else { continue };
            self.graph.remove_edge(&edge.id);
        }
    }

    fn change_positions_internal(&mut self, operations: &[&ChangeOperation]) {
        let positions: AHashMap<&str, Position> = operations
            .iter()
            .filter_map(|op| match op {
                ChangeOperation::ChangeNodePosition { node_id, to, .. } => Some((node_id.as_str(), *to)),
                _ => None,
            })
            .collect();
        for (node_id, position) in positions {
            match self.graph.node_mut(node_id) {
                Some(node) => node.position = position,
                None => warn!(node_id, "cannot move missing node"),
            }
        }
    }

    fn change_sizes_internal(&mut self, operations: &[&ChangeOperation]) {
        let sizes: AHashMap<&str, Option<NodeDimensions>> = operations
            .iter()
            .filter_map(|op| match op {
                ChangeOperation::ChangeNodeSize { node_id, to, .. } => Some((node_id.as_str(), *to)),
                _ => None,
            })
            .collect();
        for (node_id, dimension) in sizes {
            match self.graph.node_mut(node_id) {
                Some(node) => node.dimension = dimension,
                None => warn!(node_id, "cannot resize missing node"),
            }
        }
    }

    fn change_parameters_internal(&mut self, operations: &[&ChangeOperation]) {
        for operation in operations {
            let ChangeOperation::ChangeNodeParameter {
                node_id,
                parameter_id,
                to,
                ..
            } = operation
            else {
                continue;
            };
            let Some(node) = self.graph.node(node_id) else {
                warn!(%node_id, %parameter_id, "cannot change parameter of missing node");
                continue;
            };
            self.parameters
                .set(node_id, parameter_id, to.clone(), node.operator.parameter(parameter_id));
        }
    }

    fn change_input_handles_internal(&mut self, operations: &[&ChangeOperation]) {
        for operation in operations {
            let ChangeOperation::ChangeNumberOfInputHandles { node_id, to, .. } = operation else { continue };
            match self.graph.node_mut(node_id) {
                Some(node) => node.input_handles = *to,
                None => warn!(%node_id, "cannot change input handles of missing node"),
            }
        }
    }

    fn change_sticky_notes_internal(&mut self, operations: &[&ChangeOperation]) {
        for operation in operations {
            let ChangeOperation::ChangeStickyNote { node_id, to, .. } = operation else { continue };
            match self.graph.node_mut(node_id) {
                Some(node) => node.sticky = Some(to.clone()),
                None => warn!(%node_id, "cannot change missing sticky note"),
            }
        }
    }
}
