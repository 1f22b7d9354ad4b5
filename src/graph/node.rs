use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A point on the editor canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this position moved by `offset`.
    pub fn offset_by(self, offset: Position) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
        }
    }
}

/// Width and height of a node, either user-resized or measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDimensions {
    pub width: f64,
    pub height: f64,
}

/// The closed set of operator kinds that can be placed in a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginType {
    #[serde(rename = "PathInputOperator")]
    PathInput,
    #[serde(rename = "TransformOperator")]
    Transform,
    #[serde(rename = "ComparisonOperator")]
    Comparison,
    #[serde(rename = "AggregationOperator")]
    Aggregation,
    #[serde(rename = "StickyNote")]
    StickyNote,
    #[serde(rename = "unknown", other)]
    Unknown,
}

/// A parameter value, either a plain string or a value with a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Plain(String),
    Labelled {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

impl ParameterValue {
    /// The raw value that is persisted.
    pub fn value(&self) -> &str {
        match self {
            ParameterValue::Plain(value) => value,
            ParameterValue::Labelled { value, .. } => value,
        }
    }

    /// The label shown to the user, falling back to the raw value.
    pub fn label(&self) -> &str {
        match self {
            ParameterValue::Plain(value) => value,
            ParameterValue::Labelled { value, label } => label.as_deref().unwrap_or(value),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Plain(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Plain(value)
    }
}

/// Parameter values keyed by parameter id. `None` marks a parameter without value.
pub type RuleOperatorNodeParameters = AHashMap<String, Option<ParameterValue>>;

/// How many input ports an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortSpecification {
    pub min_input_ports: usize,
    /// `None` means an unbounded number of input ports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_input_ports: Option<usize>,
}

impl PortSpecification {
    pub fn bounded(min: usize, max: usize) -> Self {
        Self {
            min_input_ports: min,
            max_input_ports: Some(max),
        }
    }

    pub fn unbounded(min: usize) -> Self {
        Self {
            min_input_ports: min,
            max_input_ports: None,
        }
    }

    /// Nodes with unbounded ports grow and shrink their handles with their connections.
    pub fn has_dynamic_ports(&self) -> bool {
        self.max_input_ports.is_none()
    }
}

/// The externally exchanged form of a single operator in the rule tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOperatorNode {
    pub node_id: String,
    pub plugin_id: String,
    pub plugin_type: PluginType,
    pub label: String,
    #[serde(default)]
    pub parameters: RuleOperatorNodeParameters,
    /// Upstream node ids by input port. `None` is an empty port.
    #[serde(default)]
    pub inputs: Vec<Option<String>>,
    pub port_specification: PortSpecification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Symmetric comparisons accept source and target values on either port.
    #[serde(default)]
    pub inputs_can_be_switched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RuleOperatorNode {
    /// Returns the value of a parameter, if set.
    pub fn parameter(&self, parameter_id: &str) -> Option<&ParameterValue> {
        self.parameters.get(parameter_id).and_then(|v| v.as_ref())
    }

    /// Ids of all connected upstream nodes, in port order.
    pub fn connected_inputs(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().filter_map(|i| i.as_deref())
    }
}

/// Inline CSS-like style properties of a sticky note.
pub type StickyNoteStyle = AHashMap<String, String>;

/// Editable properties of a sticky note node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StickyNoteProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StickyNoteStyle>,
}

/// A persisted sticky note annotation. Not part of the rule tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyNote {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub style: StickyNoteStyle,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<NodeDimensions>,
}

/// A node as it lives in the editor graph.
///
/// `operator` is the record the node was created with; parameter edits are kept
/// in the model's parameter diff instead of being written back here.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEditorNode {
    pub id: String,
    pub operator: RuleOperatorNode,
    pub position: Position,
    pub dimension: Option<NodeDimensions>,
    /// Number of input handles (ports) currently rendered on the node.
    pub input_handles: usize,
    pub sticky: Option<StickyNoteProps>,
}

impl RuleEditorNode {
    pub fn plugin_type(&self) -> PluginType {
        self.operator.plugin_type
    }

    pub fn is_sticky_note(&self) -> bool {
        self.operator.plugin_type == PluginType::StickyNote
    }

    pub fn has_dynamic_ports(&self) -> bool {
        !self.is_sticky_note() && self.operator.port_specification.has_dynamic_ports()
    }
}
