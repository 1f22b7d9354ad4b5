//! Common test utilities for building catalogs, rules and editor models.
use rulegraph::prelude::*;

fn operator(
    plugin_id: &str,
    plugin_type: PluginType,
    port_specification: PortSpecification,
    parameters: &[(&str, &str)],
    inputs_can_be_switched: bool,
) -> RuleOperator {
    RuleOperator {
        plugin_id: plugin_id.to_string(),
        plugin_type,
        label: plugin_id.to_string(),
        description: None,
        categories: vec![],
        parameter_specification: parameters
            .iter()
            .enumerate()
            .map(|(idx, (id, default))| {
                (
                    id.to_string(),
                    ParameterSpecification {
                        label: id.to_string(),
                        description: None,
                        parameter_type: ParameterType::TextField,
                        required: false,
                        advanced: false,
                        default_value: default.to_string(),
                        order_idx: idx,
                    },
                )
            })
            .collect(),
        port_specification,
        tags: vec![],
        inputs_can_be_switched,
    }
}

/// A small linking catalog: path inputs, two transforms, two comparisons and an aggregation.
#[allow(dead_code)]
pub fn test_catalog() -> OperatorCatalog {
    OperatorCatalog::new(vec![
        operator("sourcePathInput", PluginType::PathInput, PortSpecification::bounded(0, 0), &[("path", "")], false),
        operator("targetPathInput", PluginType::PathInput, PortSpecification::bounded(0, 0), &[("path", "")], false),
        operator("lowerCase", PluginType::Transform, PortSpecification::unbounded(1), &[], false),
        operator("concatenate", PluginType::Transform, PortSpecification::unbounded(1), &[("glue", "")], false),
        operator(
            "equality",
            PluginType::Comparison,
            PortSpecification::bounded(2, 2),
            &[("threshold", "0.0"), ("weight", "1")],
            false,
        ),
        operator(
            "jaccard",
            PluginType::Comparison,
            PortSpecification::bounded(2, 2),
            &[("threshold", "0.5"), ("weight", "1")],
            true,
        ),
        operator("average", PluginType::Aggregation, PortSpecification::unbounded(1), &[("weight", "1")], false),
    ])
}

/// An operator node of a catalog plugin with the given inputs.
#[allow(dead_code)]
pub fn operator_node(id: &str, plugin_id: &str, inputs: &[Option<&str>], position: Option<(f64, f64)>) -> RuleOperatorNode {
    let mut node = test_catalog()
        .get(plugin_id, None)
        .expect("plugin in test catalog")
        .to_operator_node(id.to_string());
    node.inputs = inputs.iter().map(|i| i.map(str::to_string)).collect();
    node.position = position.map(|(x, y)| Position::new(x, y));
    node
}

/// `src -> lower -> cmp[0]` and `tgt -> cmp[1]`, all placed.
#[allow(dead_code)]
pub fn simple_document() -> RuleDocument {
    let mut src = operator_node("src", "sourcePathInput", &[], Some((0.0, 0.0)));
    src.parameters.insert("path".into(), Some("name".into()));
    let mut tgt = operator_node("tgt", "targetPathInput", &[], Some((0.0, 200.0)));
    tgt.parameters.insert("path".into(), Some("label".into()));
    RuleDocument {
        operator_nodes: vec![
            src,
            operator_node("lower", "lowerCase", &[Some("src")], Some((300.0, 0.0))),
            tgt,
            operator_node("cmp", "equality", &[Some("lower"), Some("tgt")], Some((600.0, 100.0))),
        ],
        sticky_notes: vec![],
    }
}

/// A linking model with `simple_document` loaded.
#[allow(dead_code)]
pub fn loaded_model() -> RuleEditorModel {
    let mut model = RuleEditorModel::builder(test_catalog())
        .with_validator(Box::new(LinkingValidator))
        .build();
    let needs_layout = model.load(&simple_document()).expect("load simple document");
    assert!(!needs_layout);
    model
}

/// The source of the edge on `(target, handle)`, if any.
#[allow(dead_code)]
pub fn input_of(model: &RuleEditorModel, target: &str, handle: usize) -> Option<String> {
    model.graph().edge_at(target, handle).map(|e| e.source.clone())
}

/// Node ids of the model, ordered.
#[allow(dead_code)]
pub fn node_ids(model: &RuleEditorModel) -> Vec<String> {
    model.graph().sorted_nodes().iter().map(|n| n.id.clone()).collect()
}

/// Asserts that no two edges share a target port.
#[allow(dead_code)]
pub fn assert_unique_target_ports(model: &RuleEditorModel) {
    let mut ports: Vec<(String, usize)> = model
        .graph()
        .edges()
        .map(|e| (e.target.clone(), e.target_handle))
        .collect();
    let total = ports.len();
    ports.sort();
    ports.dedup();
    assert_eq!(ports.len(), total, "two edges share a target port");
}
