//! Loading rules into the editor and projecting them back out.
mod common;
use common::*;
use rulegraph::prelude::*;
use tokio_test::block_on;

fn permissive_model(document: &RuleDocument) -> RuleEditorModel {
    let mut model = RuleEditorModel::new(test_catalog());
    model.load(document).expect("load");
    model
}

#[cfg(test)]
mod projection_tests {
    use super::*;

    #[test]
    fn test_save_rebuilds_inputs_from_edges() {
        let document = RuleDocument {
            operator_nodes: vec![
                operator_node("A", "sourcePathInput", &[], Some((0.0, 0.0))),
                operator_node("B", "lowerCase", &[Some("A")], Some((150.0, 100.0))),
                operator_node("C", "concatenate", &[Some("A"), Some("B")], Some((300.0, 50.0))),
            ],
            sticky_notes: vec![],
        };
        let model = permissive_model(&document);
        let saved = model.save_rule().expect("valid rule");

        assert_eq!(saved.operator_nodes.len(), 3);
        let c = saved.operator_nodes.iter().find(|n| n.node_id == "C").unwrap();
        assert_eq!(c.inputs, vec![Some("A".to_string()), Some("B".to_string())]);
        assert_eq!(c.position, Some(Position::new(300.0, 50.0)));
    }

    #[test]
    fn test_load_then_save_reproduces_the_rule() {
        let model = loaded_model();
        let saved = model.save_rule().expect("valid rule");

        let mut expected = simple_document().operator_nodes;
        expected.sort_by(|a, b| a.node_id.cmp(&b.node_id));
        assert_eq!(saved.operator_nodes, expected);
        assert!(saved.sticky_notes.is_empty());
    }

    #[test]
    fn test_free_trailing_ports_are_trimmed() {
        let mut model = loaded_model();
        let edge_id = model.graph().edge_at("lower", 0).unwrap().id.clone();
        model.delete_edge(&edge_id, false);

        let nodes = model.rule_operator_nodes();
        let lower = nodes.iter().find(|n| n.node_id == "lower").unwrap();
        assert!(lower.inputs.is_empty());
        // Bounded comparisons keep their empty ports
        let cmp = nodes.iter().find(|n| n.node_id == "cmp").unwrap();
        assert_eq!(cmp.inputs.len(), 2);
    }

    #[test]
    fn test_parameter_edits_are_materialized_on_save() {
        let mut model = loaded_model();
        model.change_node_parameter("cmp", "threshold", Some("0.75".into()));

        let saved = model.save_rule().unwrap();
        let cmp = saved.operator_nodes.iter().find(|n| n.node_id == "cmp").unwrap();
        assert_eq!(cmp.parameter("threshold"), Some(&ParameterValue::from("0.75")));
        assert_eq!(cmp.parameter("weight"), Some(&ParameterValue::from("1")));

        // The node record keeps its loaded value
        let node = model.graph().node("cmp").unwrap();
        assert_eq!(node.operator.parameter("threshold"), Some(&ParameterValue::from("0.0")));
    }

    #[test]
    fn test_duplicate_node_ids_are_rejected() {
        let mut document = simple_document();
        document
            .operator_nodes
            .push(operator_node("src", "lowerCase", &[], None));
        let mut model = RuleEditorModel::new(test_catalog());
        match model.load(&document) {
            Err(ProjectionError::DuplicateNodeId(id)) => assert_eq!(id, "src"),
            other => panic!("expected duplicate id error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_inputs_are_skipped() {
        let document = RuleDocument {
            operator_nodes: vec![operator_node("cmp", "equality", &[Some("ghost"), None], Some((0.0, 0.0)))],
            sticky_notes: vec![],
        };
        let model = permissive_model(&document);
        assert_eq!(model.graph().node_count(), 1);
        assert_eq!(model.graph().edge_count(), 0);
    }

    #[test]
    fn test_unpositioned_rules_need_layout() {
        let mut document = simple_document();
        document.operator_nodes[1].position = None;
        let mut model = RuleEditorModel::new(test_catalog());
        assert!(model.load(&document).unwrap());

        block_on(model.load_with_layout(&document, &LayeredLayout, &MeasuredSizes::default())).unwrap();
        let lower = model.graph().node("lower").unwrap().position;
        let cmp = model.graph().node("cmp").unwrap().position;
        assert!(lower.x < cmp.x);
        assert!(!model.can_undo());
    }

    #[test]
    fn test_sticky_notes_survive_a_round_trip() {
        let note = StickyNote {
            id: "stickyNote".to_string(),
            content: "compare lower-cased names".to_string(),
            style: [("color".to_string(), "#ffeb3b".to_string())].into_iter().collect(),
            position: Position::new(100.0, -50.0),
            dimension: Some(NodeDimensions {
                width: 180.0,
                height: 90.0,
            }),
        };
        let mut document = simple_document();
        document.sticky_notes.push(note.clone());

        let mut model = permissive_model(&document);
        assert_eq!(model.graph().node_count(), 5);
        let saved = model.save_rule().unwrap();
        assert_eq!(saved.sticky_notes, vec![note]);
        assert_eq!(saved.operator_nodes.len(), 4);

        // Ids of loaded notes are not handed out again
        let fresh = model
            .add_sticky_note("another", Default::default(), Position::default(), None)
            .unwrap();
        assert_ne!(fresh, "stickyNote");
    }

    #[test]
    fn test_sub_tree_of_a_node() {
        let model = loaded_model();
        let ids: Vec<String> = model
            .get_sub_tree_nodes("lower")
            .into_iter()
            .map(|n| n.node_id)
            .collect();
        assert_eq!(ids, vec!["lower", "src"]);
        assert_eq!(model.get_sub_tree_nodes("cmp").len(), 4);
        assert!(model.get_sub_tree_nodes("ghost").is_empty());
    }

    #[test]
    fn test_document_from_json() {
        let json = r#"{
            "operatorNodes": [
                {
                    "nodeId": "country",
                    "pluginId": "sourcePathInput",
                    "pluginType": "PathInputOperator",
                    "label": "Source path",
                    "parameters": {
                        "path": { "value": "dbo:country", "label": "Country" }
                    },
                    "portSpecification": { "minInputPorts": 0, "maxInputPorts": 0 },
                    "position": { "x": 10.0, "y": 20.0 }
                }
            ]
        }"#;
        let document = RuleDocument::from_json(json).expect("valid document");
        let node = &document.operator_nodes[0];
        let path = node.parameter("path").unwrap();
        assert_eq!(path.value(), "dbo:country");
        assert_eq!(path.label(), "Country");
        assert!(node.inputs.is_empty());
        assert!(document.sticky_notes.is_empty());

        let reparsed = RuleDocument::from_json(&document.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, document);

        assert!(matches!(RuleDocument::from_json("{"), Err(ProjectionError::Json(_))));
    }
}
