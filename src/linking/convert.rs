use super::tree::{
    AggregationOperator, ComparisonOperator, LinkageRule, OperatorParameters, PathInput, RuleLayout,
    SimilarityOperator, TransformInput, UiAnnotations, ValueInput,
};
use crate::catalog::OperatorCatalog;
use crate::error::{LinkingError, NodeError, RuleValidationError};
use crate::graph::{
    ParameterValue, PluginType, PortSpecification, Position, RuleOperatorNode, RuleOperatorNodeParameters,
};
use crate::model::RuleDocument;
use crate::validation::{PathRole, SOURCE_PATH_INPUT, TARGET_PATH_INPUT, ValidationGraph, from_type, validate_rule_tree};
use tracing::debug;

/// Parameter of symmetric comparisons telling whether source and target inputs are swapped.
pub const REVERSE_PARAMETER: &str = "reverse";
const THRESHOLD_PARAMETER: &str = "threshold";
const WEIGHT_PARAMETER: &str = "weight";
const PATH_PARAMETER: &str = "path";

const PATH_INPUT_DESCRIPTION: &str =
    "Specifies the property, attribute or path where the input values are coming from.";

/// Collects operator nodes while walking a rule tree. Inputs are pushed before
/// the operator consuming them.
struct NodeExtractor<'c> {
    catalog: &'c OperatorCatalog,
    nodes: Vec<RuleOperatorNode>,
}

impl NodeExtractor<'_> {
    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        id: &str,
        plugin_id: &str,
        plugin_type: PluginType,
        inputs: Vec<Option<String>>,
        parameters: RuleOperatorNodeParameters,
        port_specification: PortSpecification,
        tag: &str,
        inputs_can_be_switched: bool,
    ) -> String {
        let operator = self.catalog.get(plugin_id, Some(plugin_type));
        self.nodes.push(RuleOperatorNode {
            node_id: id.to_string(),
            plugin_id: plugin_id.to_string(),
            plugin_type,
            label: operator.map_or(plugin_id, |op| op.label.as_str()).to_string(),
            parameters,
            inputs,
            port_specification,
            position: None,
            tags: vec![tag.to_string()],
            inputs_can_be_switched,
            description: operator.and_then(|op| op.description.clone()),
        });
        id.to_string()
    }

    fn similarity(&mut self, operator: &SimilarityOperator) -> String {
        match operator {
            SimilarityOperator::Comparison(comparison) => {
                let mut inputs = vec![
                    Some(self.value_input(&comparison.source_input, false)),
                    Some(self.value_input(&comparison.target_input, true)),
                ];
                let reverse = comparison.parameters.get(REVERSE_PARAMETER).map(ParameterValue::value);
                if reverse == Some("true") {
                    inputs.reverse();
                }
                let mut parameters = editor_parameters(&comparison.parameters);
                parameters.insert(THRESHOLD_PARAMETER.to_string(), Some(threshold_value(comparison.threshold).into()));
                parameters.insert(WEIGHT_PARAMETER.to_string(), Some(comparison.weight.to_string().into()));
                self.push(
                    &comparison.id,
                    &comparison.metric,
                    PluginType::Comparison,
                    inputs,
                    parameters,
                    PortSpecification::bounded(2, 2),
                    "Comparison",
                    reverse.is_some(),
                )
            }
            SimilarityOperator::Aggregation(aggregation) => {
                let inputs = aggregation
                    .inputs
                    .iter()
                    .map(|input| Some(self.similarity(input)))
                    .collect();
                let mut parameters = editor_parameters(&aggregation.parameters);
                parameters.insert(WEIGHT_PARAMETER.to_string(), Some(aggregation.weight.to_string().into()));
                self.push(
                    &aggregation.id,
                    &aggregation.aggregator,
                    PluginType::Aggregation,
                    inputs,
                    parameters,
                    PortSpecification::unbounded(1),
                    "Aggregation",
                    false,
                )
            }
        }
    }

    fn value_input(&mut self, input: &ValueInput, is_target: bool) -> String {
        match input {
            ValueInput::Path(path) => {
                let (plugin_id, label) = if is_target {
                    (TARGET_PATH_INPUT, "Target path")
                } else {
                    (SOURCE_PATH_INPUT, "Source path")
                };
                self.nodes.push(RuleOperatorNode {
                    node_id: path.id.clone(),
                    plugin_id: plugin_id.to_string(),
                    plugin_type: PluginType::PathInput,
                    label: label.to_string(),
                    parameters: [(PATH_PARAMETER.to_string(), Some(path.path.as_str().into()))]
                        .into_iter()
                        .collect(),
                    inputs: Vec::new(),
                    port_specification: PortSpecification::bounded(0, 0),
                    position: None,
                    tags: Vec::new(),
                    inputs_can_be_switched: false,
                    description: Some(PATH_INPUT_DESCRIPTION.to_string()),
                });
                path.id.clone()
            }
            ValueInput::Transform(transform) => {
                let inputs = transform
                    .inputs
                    .iter()
                    .map(|input| Some(self.value_input(input, is_target)))
                    .collect();
                self.push(
                    &transform.id,
                    &transform.function,
                    PluginType::Transform,
                    inputs,
                    editor_parameters(&transform.parameters),
                    PortSpecification::unbounded(1),
                    "Transform",
                    false,
                )
            }
        }
    }
}

fn editor_parameters(parameters: &OperatorParameters) -> RuleOperatorNodeParameters {
    parameters
        .iter()
        .map(|(id, value)| (id.clone(), Some(value.clone())))
        .collect()
}

fn tree_parameters(parameters: &RuleOperatorNodeParameters) -> OperatorParameters {
    parameters
        .iter()
        .map(|(id, value)| (id.clone(), value.clone().unwrap_or_else(|| ParameterValue::from(""))))
        .collect()
}

/// Formats a threshold so that it always reads as a float, e.g. `1.0` instead of `1`.
fn threshold_value(threshold: f64) -> String {
    let value = threshold.to_string();
    if value.len() == 1 {
        format!("{threshold:.1}")
    } else {
        value
    }
}

/// Converts a linkage rule into operator nodes, inputs before their consumers.
///
/// Labels and descriptions come from `catalog`; unknown plugins are labelled with
/// their plugin id. Positions are taken from the rule layout.
pub fn linkage_rule_to_operator_nodes(rule: &LinkageRule, catalog: &OperatorCatalog) -> Vec<RuleOperatorNode> {
    let mut extractor = NodeExtractor {
        catalog,
        nodes: Vec::new(),
    };
    if let Some(operator) = &rule.operator {
        extractor.similarity(operator);
    }
    let mut nodes = extractor.nodes;
    for node in &mut nodes {
        node.position = rule
            .layout
            .node_positions
            .get(&node.node_id)
            .map(|&(x, y)| Position::new(x, y));
    }
    debug!(nodes = nodes.len(), "converted linkage rule");
    nodes
}

/// Builds the rule tree from operator nodes.
///
/// Returns `None` for an empty rule. The tree must have a single root that is a
/// comparison or an aggregation, and no cycles.
pub fn construct_linkage_rule_tree(nodes: &[RuleOperatorNode]) -> Result<Option<SimilarityOperator>, LinkingError> {
    let graph = ValidationGraph::new(nodes);
    let Some(root) = validate_rule_tree(&graph)? else {
        return Ok(None);
    };
    if !matches!(root.plugin_type, PluginType::Comparison | PluginType::Aggregation) {
        return Err(RuleValidationError::new(
            "Rule tree root must either be an aggregation or comparison!",
            vec![NodeError::new(
                &root.node_id,
                format!(
                    "Root node '{}' is a '{:?}', but must be either a comparison or aggregation.",
                    root.label, root.plugin_type
                ),
            )],
        )
        .into());
    }
    similarity_operator(&graph, root).map(Some)
}

/// Rounded node positions of all operators that have one.
pub fn rule_layout(nodes: &[RuleOperatorNode]) -> RuleLayout {
    RuleLayout {
        node_positions: nodes
            .iter()
            .filter_map(|node| {
                let position = node.position?;
                Some((node.node_id.clone(), (position.x.round(), position.y.round())))
            })
            .collect(),
    }
}

fn fetch<'a>(
    graph: &ValidationGraph<'a>,
    node_id: &str,
    parent: &RuleOperatorNode,
) -> Result<&'a RuleOperatorNode, LinkingError> {
    graph
        .node(node_id)
        .map(|node| node.node())
        .ok_or_else(|| LinkingError::MissingNode {
            node_id: node_id.to_string(),
            referenced_by: parent.label.clone(),
        })
}

fn incompatible(node: &RuleOperatorNode, expected: &'static str) -> LinkingError {
    LinkingError::IncompatibleNode {
        node_id: node.node_id.clone(),
        plugin_type: format!("{:?}", node.plugin_type),
        expected,
    }
}

fn number_parameter(node: &RuleOperatorNode, parameter: &'static str) -> Result<f64, LinkingError> {
    let value = node
        .parameters
        .get(parameter)
        .and_then(Option::as_ref)
        .map(ParameterValue::value)
        .unwrap_or_default();
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| LinkingError::InvalidNumber {
            node_id: node.node_id.clone(),
            parameter,
            value: value.to_string(),
        })
}

/// Whether the input on `port` delivers values of `role`.
fn input_has_role(graph: &ValidationGraph<'_>, node: &RuleOperatorNode, port: usize, role: PathRole) -> Result<bool, LinkingError> {
    let input = node.inputs.get(port).and_then(|input| input.as_deref()).and_then(|id| graph.node(id));
    match input {
        Some(input) => Ok(from_type(input, None)? == Some(role)),
        None => Ok(false),
    }
}

fn similarity_operator(graph: &ValidationGraph<'_>, node: &RuleOperatorNode) -> Result<SimilarityOperator, LinkingError> {
    match node.plugin_type {
        PluginType::Comparison => {
            let [Some(source), Some(target)] = node.inputs.as_slice() else {
                return Err(RuleValidationError::new(
                    format!(
                        "Comparison operator '{}' must have 2 inputs, but is missing at least 1 input!",
                        node.label
                    ),
                    vec![NodeError::highlight(&node.node_id)],
                )
                .into());
            };
            let mut comparison = ComparisonOperator {
                id: node.node_id.clone(),
                metric: node.plugin_id.clone(),
                threshold: number_parameter(node, THRESHOLD_PARAMETER)?,
                weight: number_parameter(node, WEIGHT_PARAMETER)?.trunc() as i64,
                indexing: true,
                parameters: tree_parameters(&node.parameters),
                source_input: value_input(graph, fetch(graph, source, node)?)?,
                target_input: value_input(graph, fetch(graph, target, node)?)?,
            };
            if node.inputs_can_be_switched {
                let reverse = input_has_role(graph, node, 0, PathRole::Target)?
                    || input_has_role(graph, node, 1, PathRole::Source)?;
                comparison
                    .parameters
                    .insert(REVERSE_PARAMETER.to_string(), ParameterValue::from(reverse.to_string()));
                if reverse {
                    std::mem::swap(&mut comparison.source_input, &mut comparison.target_input);
                }
            }
            Ok(SimilarityOperator::Comparison(comparison))
        }
        PluginType::Aggregation => {
            let inputs = node
                .connected_inputs()
                .map(|input| similarity_operator(graph, fetch(graph, input, node)?))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(SimilarityOperator::Aggregation(AggregationOperator {
                id: node.node_id.clone(),
                aggregator: node.plugin_id.clone(),
                weight: number_parameter(node, WEIGHT_PARAMETER)?.trunc() as i64,
                parameters: tree_parameters(&node.parameters),
                inputs,
            }))
        }
        _ => Err(incompatible(node, "similarity operator")),
    }
}

fn value_input(graph: &ValidationGraph<'_>, node: &RuleOperatorNode) -> Result<ValueInput, LinkingError> {
    match node.plugin_type {
        PluginType::Transform => {
            let inputs = node
                .connected_inputs()
                .map(|input| value_input(graph, fetch(graph, input, node)?))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ValueInput::Transform(TransformInput {
                id: node.node_id.clone(),
                function: node.plugin_id.clone(),
                parameters: tree_parameters(&node.parameters),
                inputs,
            }))
        }
        PluginType::PathInput => Ok(ValueInput::Path(PathInput {
            id: node.node_id.clone(),
            path: node
                .parameters
                .get(PATH_PARAMETER)
                .and_then(Option::as_ref)
                .map(|path| path.value().to_string())
                .unwrap_or_default(),
        })),
        _ => Err(incompatible(node, "value input")),
    }
}

impl LinkageRule {
    /// The editor form of this rule.
    pub fn to_document(&self, catalog: &OperatorCatalog) -> RuleDocument {
        RuleDocument {
            operator_nodes: linkage_rule_to_operator_nodes(self, catalog),
            sticky_notes: self.ui_annotations.sticky_notes.clone(),
        }
    }

    /// This rule with operator tree, layout and annotations replaced by a saved
    /// document. Filter and link type are kept.
    pub fn with_document(&self, document: &RuleDocument) -> Result<LinkageRule, LinkingError> {
        Ok(LinkageRule {
            operator: construct_linkage_rule_tree(&document.operator_nodes)?,
            layout: rule_layout(&document.operator_nodes),
            ui_annotations: UiAnnotations {
                sticky_notes: document.sticky_notes.clone(),
            },
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_value_reads_as_float() {
        assert_eq!(threshold_value(1.0), "1.0");
        assert_eq!(threshold_value(0.5), "0.5");
        assert_eq!(threshold_value(10.0), "10");
    }

    #[test]
    fn test_rule_layout_rounds_positions() {
        let node = RuleOperatorNode {
            node_id: "a".into(),
            plugin_id: "p".into(),
            plugin_type: PluginType::Transform,
            label: "a".into(),
            parameters: Default::default(),
            inputs: vec![],
            port_specification: PortSpecification::unbounded(1),
            position: Some(Position::new(10.4, -3.6)),
            tags: vec![],
            inputs_can_be_switched: false,
            description: None,
        };
        let unplaced = RuleOperatorNode {
            node_id: "b".into(),
            position: None,
            ..node.clone()
        };
        let layout = rule_layout(&[node, unplaced]);
        assert_eq!(layout.node_positions.len(), 1);
        assert_eq!(layout.node_positions["a"], (10.0, -4.0));
    }
}
