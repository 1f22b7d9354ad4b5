use crate::error::{NodeError, RuleValidationError};
use crate::graph::RuleOperatorNode;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

/// A read-only view of rule operator nodes with input and output navigation.
#[derive(Debug)]
pub struct ValidationGraph<'a> {
    nodes: AHashMap<&'a str, &'a RuleOperatorNode>,
    consumers: AHashMap<&'a str, &'a str>,
}

impl<'a> ValidationGraph<'a> {
    pub fn new(nodes: &'a [RuleOperatorNode]) -> Self {
        let mut consumers = AHashMap::new();
        for node in nodes {
            for input in node.connected_inputs() {
                consumers.entry(input).or_insert(node.node_id.as_str());
            }
        }
        Self {
            nodes: nodes.iter().map(|n| (n.node_id.as_str(), n)).collect(),
            consumers,
        }
    }

    pub fn node(&self, node_id: &str) -> Option<ValidationNode<'_, 'a>> {
        self.nodes
            .get(node_id)
            .map(|node| ValidationNode { graph: self, node })
    }

    /// All node ids, ordered.
    pub fn node_ids(&self) -> Vec<&'a str> {
        self.nodes.keys().copied().sorted().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes that no other node consumes, ordered by id.
    pub fn root_nodes(&self) -> Vec<&'a RuleOperatorNode> {
        self.nodes
            .values()
            .filter(|n| !self.consumers.contains_key(n.node_id.as_str()))
            .copied()
            .sorted_by(|a, b| a.node_id.cmp(&b.node_id))
            .collect()
    }

    /// Whether connecting `source` into `target` would close a cycle, i.e. `target`
    /// already feeds into `source`.
    pub fn would_create_cycle(&self, source: &str, target: &str) -> bool {
        if source == target {
            return true;
        }
        let mut visited = AHashSet::new();
        let mut stack = vec![source];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(node) = self.nodes.get(current) {
                stack.extend(node.connected_inputs());
            }
        }
        false
    }

    /// The node and all nodes that transitively feed into it.
    pub fn sub_tree(&self, node_id: &str) -> Vec<&'a RuleOperatorNode> {
        let mut visited = AHashSet::new();
        let mut result = Vec::new();
        let mut stack = vec![node_id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(node) = self.nodes.get(current) {
                result.push(*node);
                stack.extend(node.connected_inputs().collect::<Vec<_>>().into_iter().rev());
            }
        }
        result
    }
}

/// A node in a `ValidationGraph`.
#[derive(Debug, Clone, Copy)]
pub struct ValidationNode<'g, 'a> {
    graph: &'g ValidationGraph<'a>,
    node: &'a RuleOperatorNode,
}

impl<'g, 'a> ValidationNode<'g, 'a> {
    pub fn node(&self) -> &'a RuleOperatorNode {
        self.node
    }

    /// The connected input nodes by port, `None` for empty or dangling ports.
    pub fn inputs(&self) -> Vec<Option<ValidationNode<'g, 'a>>> {
        self.node
            .inputs
            .iter()
            .map(|input| input.as_deref().and_then(|id| self.input_node(id)))
            .collect()
    }

    fn input_node(&self, node_id: &str) -> Option<ValidationNode<'g, 'a>> {
        self.graph.nodes.get(node_id).map(|node| ValidationNode {
            graph: self.graph,
            node,
        })
    }

    /// The node consuming this node's output, if any.
    pub fn output(&self) -> Option<ValidationNode<'g, 'a>> {
        let consumer = self.graph.consumers.get(self.node.node_id.as_str())?;
        self.input_node(consumer)
    }
}

/// Checks the root constraints and cycle freedom of a rule and returns its root node.
///
/// At most one root is allowed. No root in a non-empty rule means the nodes form a
/// cycle. A single root must reach every node without revisiting one on its path.
pub fn validate_rule_tree<'a>(
    graph: &ValidationGraph<'a>,
) -> Result<Option<&'a RuleOperatorNode>, RuleValidationError> {
    let roots = graph.root_nodes();
    match roots.as_slice() {
        [] if graph.is_empty() => Ok(None),
        [] => {
            // Without a root every node feeds a cycle, but not every node is on one
            let cycle = graph
                .node_ids()
                .into_iter()
                .find_map(|start| find_cycle_from(graph, start))
                .unwrap_or_default();
            Err(RuleValidationError::new(
                "Rule tree cannot be saved, because it contains cycles!",
                cycle.iter().unique().map(|id| NodeError::highlight(id)).collect(),
            ))
        }
        [root] => {
            if let Some(cycle) = find_cycle(graph, &root.node_id)? {
                let labels = cycle
                    .iter()
                    .filter_map(|id| graph.nodes.get(id.as_str()))
                    .map(|n| n.label.as_str())
                    .join(", ");
                return Err(RuleValidationError::new(
                    format!(
                        "Illegal cycle found in rule. Path from root node to cycled node: {}",
                        labels
                    ),
                    cycle.iter().unique().map(|id| NodeError::highlight(id)).collect(),
                ));
            }
            Ok(Some(*root))
        }
        _ => Err(RuleValidationError::new(
            format!(
                "More than one root node found, but at most one is allowed! Root nodes: {}",
                roots.iter().map(|n| n.label.as_str()).join(", ")
            ),
            roots
                .iter()
                .map(|n| {
                    NodeError::new(
                        &n.node_id,
                        format!("Rule operator '{}' is not the only root node.", n.label),
                    )
                })
                .collect(),
        )),
    }
}

/// Depth-first search from `root` along node inputs.
///
/// Returns the first cycle as the path from `root` to the repeated node (which
/// appears twice), or an error if `root` does not reach every node.
pub fn find_cycle(graph: &ValidationGraph<'_>, root: &str) -> Result<Option<Vec<String>>, RuleValidationError> {
    let mut visited = AHashSet::new();
    let mut path = Vec::new();
    let cycle = visit(graph, root, &mut visited, &mut path);
    if cycle.is_none() && visited.len() != graph.len() {
        let label = graph
            .nodes
            .get(root)
            .map(|n| n.label.as_str())
            .unwrap_or(root);
        return Err(RuleValidationError::new(
            format!(
                "Root node '{}' is not connected to all nodes! There are overall {} nodes, but only {} are part of the rule tree spanned by '{}'.",
                label,
                graph.len(),
                visited.len(),
                label
            ),
            vec![NodeError::highlight(root)],
        ));
    }
    Ok(cycle)
}

fn find_cycle_from(graph: &ValidationGraph<'_>, start: &str) -> Option<Vec<String>> {
    let mut visited = AHashSet::new();
    let mut path = Vec::new();
    visit(graph, start, &mut visited, &mut path)
}

fn visit<'a>(
    graph: &ValidationGraph<'a>,
    node_id: &str,
    visited: &mut AHashSet<String>,
    path: &mut Vec<String>,
) -> Option<Vec<String>> {
    if path.iter().any(|p| p == node_id) {
        let mut cycle = path.clone();
        cycle.push(node_id.to_string());
        return Some(cycle);
    }
    if !visited.insert(node_id.to_string()) {
        return None;
    }
    let node = graph.nodes.get(node_id)?;
    path.push(node_id.to_string());
    for input in node.connected_inputs() {
        if graph.nodes.contains_key(input) {
            if let Some(cycle) = visit(graph, input, visited, path) {
                return Some(cycle);
            }
        }
    }
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{PluginType, PortSpecification};

    fn node(id: &str, inputs: &[&str]) -> RuleOperatorNode {
        RuleOperatorNode {
            node_id: id.into(),
            plugin_id: "concat".into(),
            plugin_type: PluginType::Transform,
            label: id.to_uppercase(),
            parameters: Default::default(),
            inputs: inputs.iter().map(|i| Some(i.to_string())).collect(),
            port_specification: PortSpecification::unbounded(1),
            position: None,
            tags: vec![],
            inputs_can_be_switched: false,
            description: None,
        }
    }

    #[test]
    fn single_root_tree_is_valid() {
        let nodes = vec![node("a", &[]), node("b", &["a"]), node("c", &["b"])];
        let graph = ValidationGraph::new(&nodes);
        let root = validate_rule_tree(&graph).expect("valid tree");
        assert_eq!(root.map(|r| r.node_id.as_str()), Some("c"));
        assert!(!graph.would_create_cycle("a", "c"));
        assert!(graph.would_create_cycle("c", "a"));
    }

    #[test]
    fn cycle_below_root_reports_path() {
        let nodes = vec![node("r", &["a"]), node("a", &["b"]), node("b", &["a"])];
        let graph = ValidationGraph::new(&nodes);
        let cycle = find_cycle(&graph, "r").unwrap().expect("cycle");
        assert_eq!(cycle, vec!["r", "a", "b", "a"]);
    }

    #[test]
    fn sub_tree_contains_transitive_inputs() {
        let nodes = vec![node("a", &[]), node("b", &[]), node("c", &["a", "b"]), node("d", &["c"])];
        let graph = ValidationGraph::new(&nodes);
        let ids: Vec<_> = graph.sub_tree("c").iter().map(|n| n.node_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
