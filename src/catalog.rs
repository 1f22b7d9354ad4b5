//! The operator plugin catalog the editor places nodes from.

use crate::graph::{ParameterValue, PluginType, PortSpecification, RuleOperatorNode};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Input widget type of an operator parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterType {
    Boolean,
    Int,
    Float,
    TextField,
    TextArea,
    Code,
    Password,
    Resource,
    PathInput,
    #[serde(other)]
    Other,
}

/// Specification of one operator parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpecification {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub advanced: bool,
    pub default_value: String,
    #[serde(default)]
    pub order_idx: usize,
}

/// An operator that can be added to a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOperator {
    pub plugin_id: String,
    pub plugin_type: PluginType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub parameter_specification: AHashMap<String, ParameterSpecification>,
    pub port_specification: PortSpecification,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub inputs_can_be_switched: bool,
}

impl RuleOperator {
    /// Builds the operator node for a new placement, with all parameters at their defaults.
    pub fn to_operator_node(&self, node_id: String) -> RuleOperatorNode {
        RuleOperatorNode {
            node_id,
            plugin_id: self.plugin_id.clone(),
            plugin_type: self.plugin_type,
            label: self.label.clone(),
            parameters: self
                .parameter_specification
                .iter()
                .map(|(id, spec)| (id.clone(), Some(ParameterValue::from(spec.default_value.as_str()))))
                .collect(),
            inputs: Vec::new(),
            port_specification: self.port_specification,
            position: None,
            tags: self.tags.clone(),
            inputs_can_be_switched: self.inputs_can_be_switched,
            description: self.description.clone(),
        }
    }
}

/// All operators available in an editing session.
#[derive(Debug, Clone, Default)]
pub struct OperatorCatalog {
    operators: Vec<RuleOperator>,
}

impl OperatorCatalog {
    pub fn new(operators: Vec<RuleOperator>) -> Self {
        Self { operators }
    }

    /// Parses a catalog from a JSON array of operators.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::new)
    }

    pub fn operators(&self) -> &[RuleOperator] {
        &self.operators
    }

    /// Finds an operator by plugin type and id.
    pub fn find(&self, plugin_type: PluginType, plugin_id: &str) -> Option<&RuleOperator> {
        self.operators
            .iter()
            .find(|op| op.plugin_type == plugin_type && op.plugin_id == plugin_id)
    }

    /// Finds the first operator with the given plugin id, optionally narrowed by type.
    pub fn get(&self, plugin_id: &str, plugin_type: Option<PluginType>) -> Option<&RuleOperator> {
        self.operators.iter().find(|op| {
            op.plugin_id == plugin_id && plugin_type.is_none_or(|t| op.plugin_type == t)
        })
    }

    /// Parameter specification of a plugin, `None` for unknown plugins.
    pub fn parameter_specification(&self, plugin_id: &str) -> Option<&AHashMap<String, ParameterSpecification>> {
        self.get(plugin_id, None).map(|op| &op.parameter_specification)
    }
}
