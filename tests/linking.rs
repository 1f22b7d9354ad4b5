//! Conversion between linkage rule trees and operator nodes.
mod common;
use common::*;
use rulegraph::linking::{
    AggregationOperator, ComparisonOperator, LinkFilter, PathInput, RuleLayout, TransformInput,
    construct_linkage_rule_tree, linkage_rule_to_operator_nodes,
};
use rulegraph::prelude::*;

fn path(id: &str, path: &str) -> ValueInput {
    ValueInput::Path(PathInput {
        id: id.to_string(),
        path: path.to_string(),
    })
}

/// `average(jaccard(lowerCase(src), tgt))`, stored with swapped inputs.
fn linkage_rule() -> LinkageRule {
    let comparison = ComparisonOperator {
        id: "cmp".to_string(),
        metric: "jaccard".to_string(),
        threshold: 0.5,
        weight: 2,
        indexing: true,
        parameters: [("reverse".to_string(), ParameterValue::from("true"))].into_iter().collect(),
        source_input: ValueInput::Transform(TransformInput {
            id: "lower".to_string(),
            function: "lowerCase".to_string(),
            parameters: Default::default(),
            inputs: vec![path("src", "name")],
        }),
        target_input: path("tgt", "label"),
    };
    let positions = [
        ("src", (0.0, 0.0)),
        ("lower", (300.0, 0.0)),
        ("tgt", (0.0, 200.0)),
        ("cmp", (600.0, 100.0)),
        ("agg", (900.0, 100.0)),
    ];
    LinkageRule {
        operator: Some(SimilarityOperator::Aggregation(AggregationOperator {
            id: "agg".to_string(),
            aggregator: "average".to_string(),
            weight: 1,
            parameters: Default::default(),
            inputs: vec![SimilarityOperator::Comparison(comparison)],
        })),
        filter: LinkFilter {
            limit: Some(1),
            unambiguous: None,
        },
        link_type: "owl:sameAs".to_string(),
        layout: RuleLayout {
            node_positions: positions
                .into_iter()
                .map(|(id, position)| (id.to_string(), position))
                .collect(),
        },
        ui_annotations: Default::default(),
    }
}

fn set_parameter(node: &mut RuleOperatorNode, parameter: &str, value: &str) {
    node.parameters.insert(parameter.to_string(), Some(value.into()));
}

fn comparison_of(operator: &SimilarityOperator) -> &ComparisonOperator {
    match operator {
        SimilarityOperator::Aggregation(aggregation) => match &aggregation.inputs[0] {
            SimilarityOperator::Comparison(comparison) => comparison,
            other => panic!("expected a comparison, got {other:?}"),
        },
        SimilarityOperator::Comparison(comparison) => comparison,
    }
}

#[cfg(test)]
mod linking_tests {
    use super::*;

    #[test]
    fn test_tree_to_nodes() {
        let nodes = linkage_rule_to_operator_nodes(&linkage_rule(), &test_catalog());
        let ids: Vec<&str> = nodes.iter().map(|n| n.node_id.as_str()).collect();
        assert_eq!(ids, vec!["src", "lower", "tgt", "cmp", "agg"]);

        let node = |id: &str| nodes.iter().find(|n| n.node_id == id).unwrap();
        assert_eq!(node("src").plugin_id, "sourcePathInput");
        assert_eq!(node("src").label, "Source path");
        assert_eq!(node("src").parameter("path"), Some(&ParameterValue::from("name")));
        assert_eq!(node("tgt").plugin_id, "targetPathInput");
        assert_eq!(node("lower").inputs, vec![Some("src".to_string())]);
        assert_eq!(node("lower").tags, vec!["Transform"]);

        let cmp = node("cmp");
        // Stored reversed: the target input sits on the first port
        assert_eq!(cmp.inputs, vec![Some("tgt".to_string()), Some("lower".to_string())]);
        assert!(cmp.inputs_can_be_switched);
        assert_eq!(cmp.parameter("threshold"), Some(&ParameterValue::from("0.5")));
        assert_eq!(cmp.parameter("weight"), Some(&ParameterValue::from("2")));
        assert_eq!(cmp.label, "jaccard");
        assert_eq!(cmp.port_specification, PortSpecification::bounded(2, 2));

        assert_eq!(node("agg").inputs, vec![Some("cmp".to_string())]);
        assert_eq!(node("agg").position, Some(Position::new(900.0, 100.0)));
    }

    #[test]
    fn test_nodes_to_tree_restores_source_and_target() {
        let nodes = linkage_rule_to_operator_nodes(&linkage_rule(), &test_catalog());
        let tree = construct_linkage_rule_tree(&nodes).unwrap().expect("non-empty rule");
        assert_eq!(tree.id(), "agg");

        let comparison = comparison_of(&tree);
        assert_eq!(comparison.threshold, 0.5);
        assert_eq!(comparison.weight, 2);
        assert!(matches!(&comparison.source_input, ValueInput::Transform(t) if t.id == "lower"));
        assert!(matches!(&comparison.target_input, ValueInput::Path(p) if p.path == "label"));
        assert_eq!(comparison.parameters["reverse"], ParameterValue::from("true"));
    }

    #[test]
    fn test_symmetric_comparison_in_natural_order_is_not_reversed() {
        let mut nodes = vec![
            operator_node("s", "sourcePathInput", &[], None),
            operator_node("t", "targetPathInput", &[], None),
            operator_node("cmp", "jaccard", &[Some("s"), Some("t")], None),
        ];
        set_parameter(&mut nodes[0], "path", "name");
        let tree = construct_linkage_rule_tree(&nodes).unwrap().unwrap();
        let comparison = comparison_of(&tree);
        assert_eq!(comparison.parameters["reverse"], ParameterValue::from("false"));
        assert!(matches!(&comparison.source_input, ValueInput::Path(p) if p.id == "s" && p.path == "name"));
    }

    #[test]
    fn test_empty_rule_has_no_operator() {
        assert_eq!(construct_linkage_rule_tree(&[]).unwrap(), None);
    }

    #[test]
    fn test_root_must_be_a_similarity_operator() {
        let nodes = vec![
            operator_node("s", "sourcePathInput", &[], None),
            operator_node("lower", "lowerCase", &[Some("s")], None),
        ];
        match construct_linkage_rule_tree(&nodes) {
            Err(LinkingError::Validation(err)) => {
                assert!(err.message.contains("root"));
                assert_eq!(err.node_ids(), vec!["lower"]);
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_comparison_needs_both_inputs() {
        let nodes = vec![
            operator_node("s", "sourcePathInput", &[], None),
            operator_node("cmp", "equality", &[Some("s"), None], None),
        ];
        match construct_linkage_rule_tree(&nodes) {
            Err(LinkingError::Validation(err)) => {
                assert!(err.message.contains("must have 2 inputs"));
                assert_eq!(err.node_ids(), vec!["cmp"]);
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_numbers_are_parsed() {
        let mut nodes = vec![
            operator_node("s", "sourcePathInput", &[], None),
            operator_node("t", "targetPathInput", &[], None),
            operator_node("cmp", "equality", &[Some("s"), Some("t")], None),
        ];
        set_parameter(&mut nodes[2], "weight", "2.7");
        let tree = construct_linkage_rule_tree(&nodes).unwrap().unwrap();
        assert_eq!(comparison_of(&tree).weight, 2);

        set_parameter(&mut nodes[2], "threshold", "abc");
        match construct_linkage_rule_tree(&nodes) {
            Err(LinkingError::InvalidNumber { node_id, parameter, value }) => {
                assert_eq!(node_id, "cmp");
                assert_eq!(parameter, "threshold");
                assert_eq!(value, "abc");
            }
            other => panic!("expected an invalid number error, got {other:?}"),
        }
    }

    #[test]
    fn test_aggregations_only_take_similarity_operators() {
        let nodes = vec![
            operator_node("s", "sourcePathInput", &[], None),
            operator_node("agg", "average", &[Some("s")], None),
        ];
        assert!(matches!(
            construct_linkage_rule_tree(&nodes),
            Err(LinkingError::IncompatibleNode { ref node_id, .. }) if node_id == "s"
        ));
    }

    #[test]
    fn test_edit_session_round_trip() {
        let rule = linkage_rule();
        let catalog = test_catalog();
        let mut model = RuleEditorModel::builder(catalog.clone())
            .with_validator(Box::new(LinkingValidator))
            .build();
        assert!(!model.load(&rule.to_document(&catalog)).unwrap());

        model.change_node_parameter("cmp", "threshold", Some("0.9".into()));
        model.move_node("agg", Position::new(950.4, 99.6));
        let saved = model.save_rule().expect("valid rule");
        let updated = rule.with_document(&saved).unwrap();

        assert_eq!(updated.filter, rule.filter);
        assert_eq!(updated.link_type, "owl:sameAs");
        assert_eq!(updated.layout.node_positions["agg"], (950.0, 100.0));
        assert_eq!(updated.layout.node_positions.len(), 5);

        let comparison = comparison_of(updated.operator.as_ref().unwrap());
        assert_eq!(comparison.threshold, 0.9);
        let original = comparison_of(rule.operator.as_ref().unwrap());
        assert_eq!(comparison.target_input, original.target_input);
        assert_eq!(comparison.source_input, original.source_input);
    }
}
