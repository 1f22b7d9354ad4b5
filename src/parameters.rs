//! Sparse overlay of edited parameter values.
//!
//! Nodes keep the parameters they were loaded with. Edits only land here, keyed by
//! node and parameter id, and are merged into the node record on save.

use crate::graph::{ParameterValue, RuleOperatorNode, RuleOperatorNodeParameters};
use ahash::AHashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterDiff {
    overrides: AHashMap<String, AHashMap<String, Option<ParameterValue>>>,
}

impl ParameterDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.overrides.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// The overridden value, if the parameter was edited. `Some(None)` is an edit to "no value".
    pub fn get(&self, node_id: &str, parameter_id: &str) -> Option<&Option<ParameterValue>> {
        self.overrides.get(node_id)?.get(parameter_id)
    }

    /// The value a parameter currently has: the override if any, else the loaded value.
    pub fn current_value(&self, node: &RuleOperatorNode, parameter_id: &str) -> Option<ParameterValue> {
        match self.get(&node.node_id, parameter_id) {
            Some(value) => value.clone(),
            None => node.parameter(parameter_id).cloned(),
        }
    }

    /// Records a new value for a parameter.
    ///
    /// Setting a parameter back to its loaded value drops the override, so the diff
    /// only ever holds values that differ from the node record.
    pub fn set(
        &mut self,
        node_id: &str,
        parameter_id: &str,
        value: Option<ParameterValue>,
        loaded: Option<&ParameterValue>,
    ) {
        if value.as_ref() == loaded {
            if let Some(node_diff) = self.overrides.get_mut(node_id) {
                node_diff.remove(parameter_id);
                if node_diff.is_empty() {
                    self.overrides.remove(node_id);
                }
            }
        } else {
            self.overrides
                .entry(node_id.to_string())
                .or_default()
                .insert(parameter_id.to_string(), value);
        }
    }

    /// Merges the loaded parameters of a node with its overrides.
    pub fn materialize(&self, node: &RuleOperatorNode) -> RuleOperatorNodeParameters {
        let mut parameters = node.parameters.clone();
        if let Some(node_diff) = self.overrides.get(&node.node_id) {
            for (parameter_id, value) in node_diff {
                parameters.insert(parameter_id.clone(), value.clone());
            }
        }
        parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{PluginType, PortSpecification};

    fn comparison() -> RuleOperatorNode {
        RuleOperatorNode {
            node_id: "cmp".into(),
            plugin_id: "equality".into(),
            plugin_type: PluginType::Comparison,
            label: "Equality".into(),
            parameters: [("threshold".to_string(), Some(ParameterValue::from("0.0")))]
                .into_iter()
                .collect(),
            inputs: vec![],
            port_specification: PortSpecification::bounded(2, 2),
            position: None,
            tags: vec![],
            inputs_can_be_switched: false,
            description: None,
        }
    }

    #[test]
    fn overrides_take_precedence_and_reset_drops_them() {
        let node = comparison();
        let mut diff = ParameterDiff::new();
        diff.set("cmp", "threshold", Some("1.5".into()), node.parameter("threshold"));
        assert_eq!(diff.current_value(&node, "threshold"), Some("1.5".into()));
        assert_eq!(
            diff.materialize(&node).get("threshold"),
            Some(&Some(ParameterValue::from("1.5")))
        );
        // The node record itself is untouched
        assert_eq!(node.parameter("threshold"), Some(&ParameterValue::from("0.0")));

        diff.set("cmp", "threshold", Some("0.0".into()), node.parameter("threshold"));
        assert!(diff.is_empty());
        assert_eq!(diff.current_value(&node, "threshold"), Some("0.0".into()));
    }

    #[test]
    fn clearing_a_value_is_an_override() {
        let node = comparison();
        let mut diff = ParameterDiff::new();
        diff.set("cmp", "threshold", None, node.parameter("threshold"));
        assert_eq!(diff.get("cmp", "threshold"), Some(&None));
        assert_eq!(diff.current_value(&node, "threshold"), None);
    }
}
