use super::tree::{ValidationGraph, ValidationNode};
use crate::error::{NodeError, RuleValidationError};
use crate::graph::{PluginType, RuleOperatorNode};
use ahash::AHashSet;
use tracing::debug;

/// Plugin id of path inputs reading from the source dataset.
pub const SOURCE_PATH_INPUT: &str = "sourcePathInput";
/// Plugin id of path inputs reading from the target dataset.
pub const TARGET_PATH_INPUT: &str = "targetPathInput";

/// Which side of a comparison a value flows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    Source,
    Target,
}

impl PathRole {
    pub fn of_path_input(plugin_id: &str) -> Self {
        if plugin_id == SOURCE_PATH_INPUT {
            PathRole::Source
        } else {
            PathRole::Target
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            PathRole::Source => PathRole::Target,
            PathRole::Target => PathRole::Source,
        }
    }

    /// The comparison port values of this role go into.
    pub fn comparison_port(self) -> usize {
        match self {
            PathRole::Source => 0,
            PathRole::Target => 1,
        }
    }
}

/// Decides whether an edge from `from` into port `target_port` of `to` may be created.
///
/// Implementations must be pure; they are used both before creating an edge and
/// when auditing a rule.
pub trait ConnectionValidator: Send + Sync + std::fmt::Debug {
    fn validate_connection(&self, from: ValidationNode<'_, '_>, to: ValidationNode<'_, '_>, target_port: usize) -> bool;

    /// Rule-wide checks run before saving, on top of the tree structure checks.
    fn validate_rule(&self, _graph: &ValidationGraph<'_>) -> Result<(), RuleValidationError> {
        Ok(())
    }
}

/// Accepts every connection. Used for transformation rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveValidator;

impl ConnectionValidator for PermissiveValidator {
    fn validate_connection(&self, _from: ValidationNode<'_, '_>, _to: ValidationNode<'_, '_>, _target_port: usize) -> bool {
        true
    }
}

/// The connection rules of linking rules: source and target values never mix and
/// always end up on the matching comparison port.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkingValidator;

impl ConnectionValidator for LinkingValidator {
    fn validate_connection(&self, from: ValidationNode<'_, '_>, to: ValidationNode<'_, '_>, target_port: usize) -> bool {
        let source = from.node();
        let target = to.node();
        match (source.plugin_type, target.plugin_type) {
            (_, PluginType::PathInput) => false,
            (PluginType::PathInput, PluginType::Comparison) => {
                let role = PathRole::of_path_input(&source.plugin_id);
                if target.inputs_can_be_switched {
                    let other_port = if target_port == 0 { 1 } else { 0 };
                    match to.inputs().get(other_port).copied().flatten() {
                        None => true,
                        Some(other) => match from_type(other, None) {
                            Ok(other_role) => other_role != Some(role),
                            Err(err) => rejected(&err),
                        },
                    }
                } else {
                    role.comparison_port() == target_port
                }
            }
            (PluginType::PathInput | PluginType::Transform, PluginType::Transform)
            | (PluginType::Transform, PluginType::Comparison) => {
                match input_path_validation(from, to, target_port) {
                    Ok(valid) => valid,
                    Err(err) => rejected(&err),
                }
            }
            _ => true,
        }
    }

    fn validate_rule(&self, graph: &ValidationGraph<'_>) -> Result<(), RuleValidationError> {
        validate_transform_roles(graph)
    }
}

/// Rejects transforms whose inputs mix source and target values.
pub fn validate_transform_roles(graph: &ValidationGraph<'_>) -> Result<(), RuleValidationError> {
    for node_id in graph.node_ids() {
        if let Some(node) = graph.node(node_id) {
            if node.node().plugin_type == PluginType::Transform {
                from_type(node, None)?;
            }
        }
    }
    Ok(())
}

fn rejected(err: &RuleValidationError) -> bool {
    debug!(error = %err, "connection rejected");
    false
}

/// Classifies where the values of a node come from.
///
/// Path inputs have the role of their plugin. Transforms inherit the role of their
/// connected inputs, ignoring `filter_input` (the port about to be replaced).
/// Everything else has no role. A transform fed by both roles is an error, and so
/// is a transform that feeds into itself.
pub fn from_type(node: ValidationNode<'_, '_>, filter_input: Option<usize>) -> Result<Option<PathRole>, RuleValidationError> {
    from_type_on_path(node, filter_input, &mut AHashSet::new())
}

fn from_type_on_path<'a>(
    node: ValidationNode<'_, 'a>,
    filter_input: Option<usize>,
    path: &mut AHashSet<&'a str>,
) -> Result<Option<PathRole>, RuleValidationError> {
    let operator = node.node();
    match operator.plugin_type {
        PluginType::PathInput => Ok(Some(PathRole::of_path_input(&operator.plugin_id))),
        PluginType::Transform => {
            if !path.insert(operator.node_id.as_str()) {
                return Err(cycle_error(operator));
            }
            let mut is_source = false;
            let mut is_target = false;
            for (idx, input) in node.inputs().into_iter().enumerate() {
                let Some(input) = input else { continue };
                if Some(idx) == filter_input {
                    continue;
                }
                match from_type_on_path(input, None, path)? {
                    Some(PathRole::Source) => is_source = true,
                    Some(PathRole::Target) => is_target = true,
                    None => {}
                }
            }
            path.remove(operator.node_id.as_str());
            match (is_source, is_target) {
                (true, true) => Err(RuleValidationError::new(
                    "Transform operator detected with source and target inputs.",
                    vec![NodeError::highlight(&operator.node_id)],
                )),
                (true, false) => Ok(Some(PathRole::Source)),
                (false, true) => Ok(Some(PathRole::Target)),
                (false, false) => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

/// Classifies which role a value arriving at `target_port` of `node` must have,
/// judged from what the node feeds into.
pub fn to_type(node: ValidationNode<'_, '_>, target_port: usize) -> Result<Option<PathRole>, RuleValidationError> {
    to_type_on_path(node, target_port, &mut AHashSet::new())
}

fn to_type_on_path<'a>(
    node: ValidationNode<'_, 'a>,
    target_port: usize,
    path: &mut AHashSet<&'a str>,
) -> Result<Option<PathRole>, RuleValidationError> {
    let operator = node.node();
    match operator.plugin_type {
        PluginType::Comparison if operator.inputs_can_be_switched => {
            let other_port = if target_port == 0 { 1 } else { 0 };
            match node.inputs().get(other_port).copied().flatten() {
                Some(other) => Ok(from_type(other, None)?.map(PathRole::opposite)),
                None => Ok(None),
            }
        }
        PluginType::Comparison => match target_port {
            0 => Ok(Some(PathRole::Source)),
            1 => Ok(Some(PathRole::Target)),
            _ => Err(RuleValidationError::new(
                format!(
                    "Invalid connection to comparison operator {} on input port {} detected.",
                    operator.label, target_port
                ),
                vec![NodeError::highlight(&operator.node_id)],
            )),
        },
        PluginType::Transform => {
            if !path.insert(operator.node_id.as_str()) {
                return Err(cycle_error(operator));
            }
            let Some(consumer) = node.output() else {
                return Ok(None);
            };
            let port = consumer
                .inputs()
                .iter()
                .position(|input| input.is_some_and(|n| n.node().node_id == operator.node_id));
            match port {
                Some(port) => to_type_on_path(consumer, port, path),
                None => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

fn cycle_error(operator: &RuleOperatorNode) -> RuleValidationError {
    RuleValidationError::new(
        format!("Rule operator '{}' is part of a cycle.", operator.label),
        vec![NodeError::highlight(&operator.node_id)],
    )
}

fn invalid_combination(a: Option<PathRole>, b: Option<PathRole>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x != y)
}

/// Checks that connecting `from` into `to` neither mixes roles inside `to` nor
/// delivers a value of the wrong role downstream.
pub fn input_path_validation(
    from: ValidationNode<'_, '_>,
    to: ValidationNode<'_, '_>,
    target_port: usize,
) -> Result<bool, RuleValidationError> {
    let source_from = from_type(from, None)?;
    let target_to = to_type(to, target_port)?;
    if invalid_combination(source_from, target_to) {
        return Ok(false);
    }
    let target_from = from_type(to, Some(target_port))?;
    Ok(!invalid_combination(source_from, target_from))
}
