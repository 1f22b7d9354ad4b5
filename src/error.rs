use thiserror::Error;

/// A node that caused a rule validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeError {
    pub node_id: String,
    pub message: Option<String>,
}

impl NodeError {
    pub fn new(node_id: &str, message: impl Into<String>) -> Self {
        Self {
            node_id: node_id.to_string(),
            message: Some(message.into()),
        }
    }

    /// A node that is only highlighted, without its own message.
    pub fn highlight(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            message: None,
        }
    }
}

/// A structural problem of the rule tree, reported on save or evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Rule validation error: {message}")]
pub struct RuleValidationError {
    pub message: String,
    pub node_errors: Vec<NodeError>,
}

impl RuleValidationError {
    pub fn new(message: impl Into<String>, node_errors: Vec<NodeError>) -> Self {
        Self {
            message: message.into(),
            node_errors,
        }
    }

    /// Ids of all offending nodes.
    pub fn node_ids(&self) -> Vec<&str> {
        self.node_errors.iter().map(|e| e.node_id.as_str()).collect()
    }
}

/// Errors of the auto-layout boundary. The graph is left untouched when one occurs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Layout engine failed: {0}")]
    EngineFailed(String),

    #[error("Layout request references unknown node '{0}'")]
    UnknownNode(String),
}

/// Errors while loading a rule into the editor model.
#[derive(Error, Debug, Clone)]
pub enum ProjectionError {
    #[error("Node id '{0}' is used by more than one rule operator")]
    DuplicateNodeId(String),

    #[error("Failed to parse rule JSON: {0}")]
    Json(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Errors converting between operator nodes and the linkage rule tree.
#[derive(Error, Debug, Clone)]
pub enum LinkingError {
    #[error(transparent)]
    Validation(#[from] RuleValidationError),

    #[error("Rule operator node '{node_id}' does not exist, but is referenced by '{referenced_by}'")]
    MissingNode {
        node_id: String,
        referenced_by: String,
    },

    #[error("Cannot convert {plugin_type} node '{node_id}' into a {expected}")]
    IncompatibleNode {
        node_id: String,
        plugin_type: String,
        expected: &'static str,
    },

    #[error("Parameter '{parameter}' of node '{node_id}' is not a valid number: '{value}'")]
    InvalidNumber {
        node_id: String,
        parameter: &'static str,
        value: String,
    },
}
