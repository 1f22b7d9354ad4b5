use crate::graph::{NodeDimensions, ParameterValue, Position, RuleEdge, RuleEditorNode, StickyNoteProps};

/// A single, invertible edit of the rule graph.
///
/// Every variant carries enough state to be applied and to be rolled back.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeOperation {
    AddNode(RuleEditorNode),
    DeleteNode(RuleEditorNode),
    AddEdge(RuleEdge),
    DeleteEdge(RuleEdge),
    ChangeNodePosition {
        node_id: String,
        from: Position,
        to: Position,
    },
    ChangeNodeSize {
        node_id: String,
        from: Option<NodeDimensions>,
        to: Option<NodeDimensions>,
    },
    ChangeNodeParameter {
        node_id: String,
        parameter_id: String,
        from: Option<ParameterValue>,
        to: Option<ParameterValue>,
    },
    ChangeNumberOfInputHandles {
        node_id: String,
        from: usize,
        to: usize,
    },
    ChangeStickyNote {
        node_id: String,
        from: StickyNoteProps,
        to: StickyNoteProps,
    },
}

/// The kind of a change operation, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    AddNode,
    DeleteNode,
    AddEdge,
    DeleteEdge,
    ChangeNodePosition,
    ChangeNodeSize,
    ChangeNodeParameter,
    ChangeNumberOfInputHandles,
    ChangeStickyNote,
}

impl ChangeOperation {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeOperation::AddNode(_) => ChangeKind::AddNode,
            ChangeOperation::DeleteNode(_) => ChangeKind::DeleteNode,
            ChangeOperation::AddEdge(_) => ChangeKind::AddEdge,
            ChangeOperation::DeleteEdge(_) => ChangeKind::DeleteEdge,
            ChangeOperation::ChangeNodePosition { .. } => ChangeKind::ChangeNodePosition,
            ChangeOperation::ChangeNodeSize { .. } => ChangeKind::ChangeNodeSize,
            ChangeOperation::ChangeNodeParameter { .. } => ChangeKind::ChangeNodeParameter,
            ChangeOperation::ChangeNumberOfInputHandles { .. } => ChangeKind::ChangeNumberOfInputHandles,
            ChangeOperation::ChangeStickyNote { .. } => ChangeKind::ChangeStickyNote,
        }
    }

    /// Returns the operation that rolls this one back.
    pub fn inverted(&self) -> ChangeOperation {
        match self {
            ChangeOperation::AddNode(node) => ChangeOperation::DeleteNode(node.clone()),
            ChangeOperation::DeleteNode(node) => ChangeOperation::AddNode(node.clone()),
            ChangeOperation::AddEdge(edge) => ChangeOperation::DeleteEdge(edge.clone()),
            ChangeOperation::DeleteEdge(edge) => ChangeOperation::AddEdge(edge.clone()),
            ChangeOperation::ChangeNodePosition { node_id, from, to } => {
                ChangeOperation::ChangeNodePosition {
                    node_id: node_id.clone(),
                    from: *to,
                    to: *from,
                }
            }
            ChangeOperation::ChangeNodeSize { node_id, from, to } => ChangeOperation::ChangeNodeSize {
                node_id: node_id.clone(),
                from: *to,
                to: *from,
            },
            ChangeOperation::ChangeNodeParameter {
                node_id,
                parameter_id,
                from,
                to,
            } => ChangeOperation::ChangeNodeParameter {
                node_id: node_id.clone(),
                parameter_id: parameter_id.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            ChangeOperation::ChangeNumberOfInputHandles { node_id, from, to } => {
                ChangeOperation::ChangeNumberOfInputHandles {
                    node_id: node_id.clone(),
                    from: *to,
                    to: *from,
                }
            }
            ChangeOperation::ChangeStickyNote { node_id, from, to } => ChangeOperation::ChangeStickyNote {
                node_id: node_id.clone(),
                from: to.clone(),
                to: from.clone(),
            },
        }
    }
}

/// An ordered sequence of change operations that is applied and undone as one unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleModelChanges {
    pub operations: Vec<ChangeOperation>,
}

impl RuleModelChanges {
    pub fn new(operations: Vec<ChangeOperation>) -> Self {
        Self { operations }
    }

    pub fn single(operation: ChangeOperation) -> Self {
        Self {
            operations: vec![operation],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn add_nodes(nodes: impl IntoIterator<Item = RuleEditorNode>) -> Self {
        Self::new(nodes.into_iter().map(ChangeOperation::AddNode).collect())
    }

    pub fn delete_nodes(nodes: impl IntoIterator<Item = RuleEditorNode>) -> Self {
        Self::new(nodes.into_iter().map(ChangeOperation::DeleteNode).collect())
    }

    pub fn add_edges(edges: impl IntoIterator<Item = RuleEdge>) -> Self {
        Self::new(edges.into_iter().map(ChangeOperation::AddEdge).collect())
    }

    pub fn delete_edges(edges: impl IntoIterator<Item = RuleEdge>) -> Self {
        Self::new(edges.into_iter().map(ChangeOperation::DeleteEdge).collect())
    }

    pub fn change_node_position(node_id: &str, from: Position, to: Position) -> Self {
        Self::single(ChangeOperation::ChangeNodePosition {
            node_id: node_id.to_string(),
            from,
            to,
        })
    }

    pub fn change_node_size(node_id: &str, from: Option<NodeDimensions>, to: Option<NodeDimensions>) -> Self {
        Self::single(ChangeOperation::ChangeNodeSize {
            node_id: node_id.to_string(),
            from,
            to,
        })
    }

    pub fn change_node_parameter(
        node_id: &str,
        parameter_id: &str,
        from: Option<ParameterValue>,
        to: Option<ParameterValue>,
    ) -> Self {
        Self::single(ChangeOperation::ChangeNodeParameter {
            node_id: node_id.to_string(),
            parameter_id: parameter_id.to_string(),
            from,
            to,
        })
    }

    pub fn change_sticky_note(node_id: &str, from: StickyNoteProps, to: StickyNoteProps) -> Self {
        Self::single(ChangeOperation::ChangeStickyNote {
            node_id: node_id.to_string(),
            from,
            to,
        })
    }

    /// Reversed and inverted operations, i.e. the changes that roll this unit back.
    pub fn inverted(&self) -> RuleModelChanges {
        RuleModelChanges {
            operations: self.operations.iter().rev().map(|op| op.inverted()).collect(),
        }
    }

    /// The `(node_id, parameter_id, from)` of this unit if it is exactly one parameter change.
    pub fn as_single_parameter_change(&self) -> Option<(&str, &str, &Option<ParameterValue>)> {
        match self.operations.as_slice() {
            [ChangeOperation::ChangeNodeParameter {
                node_id,
                parameter_id,
                from,
                ..
            }] => Some((node_id.as_str(), parameter_id.as_str(), from)),
            _ => None,
        }
    }
}
