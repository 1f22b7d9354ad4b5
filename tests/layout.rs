//! Auto-layout through the async engine boundary.
mod common;
use async_trait::async_trait;
use common::*;
use rulegraph::layout::graph_center;
use rulegraph::layout::layered::compute_layout;
use rulegraph::prelude::*;
use tokio_test::block_on;

#[derive(Debug)]
struct FailingEngine;

#[async_trait]
impl LayoutEngine for FailingEngine {
    async fn layout(&self, _request: LayoutRequest) -> Result<LayoutResult, LayoutError> {
        Err(LayoutError::EngineFailed("engine offline".into()))
    }
}

fn center_of(model: &RuleEditorModel) -> Position {
    graph_center(model.graph().nodes().map(|n| n.position))
}

fn x_of(model: &RuleEditorModel, node_id: &str) -> f64 {
    model.graph().node(node_id).unwrap().position.x
}

#[cfg(test)]
mod layout_tests {
    use super::*;

    #[test]
    fn test_request_sizes_and_hints() {
        let model = loaded_model();
        let sizes = MeasuredSizes::new(2.0).with_size("lower", 500.0, 300.0);
        let (ticket, request) = model.layout_request(&sizes);

        assert_eq!(ticket.revision(), model.revision());
        assert_eq!(request.options.algorithm, "layered");
        assert_eq!(request.options.direction, "RIGHT");
        assert_eq!(request.edges.len(), 3);

        let node = |id: &str| request.nodes.iter().find(|n| n.id == id).unwrap();
        // Measured at zoom 2
        assert_eq!((node("lower").width, node("lower").height), (250.0, 150.0));
        // Fallback: base height plus one row per parameter
        assert_eq!((node("src").width, node("src").height), (250.0, 175.0));
        assert_eq!(node("cmp").height, 250.0);
        // Port the node feeds into
        assert_eq!(node("lower").order_hint, Some(0));
        assert_eq!(node("tgt").order_hint, Some(1));
        assert_eq!(node("cmp").order_hint, None);
    }

    #[test]
    fn test_session_layout_config() {
        let config = LayoutConfig {
            layer_spacing: 40.0,
            fallback_width: 200.0,
            ..Default::default()
        };
        let mut model = RuleEditorModel::builder(test_catalog())
            .with_layout_config(config.clone())
            .build();
        model.load(&simple_document()).unwrap();
        assert_eq!(model.layout_config(), &config);

        let (_, request) = model.layout_request(&MeasuredSizes::default());
        assert_eq!(request.options.layer_spacing, 40.0);
        let result = compute_layout(&request).unwrap();
        let lower = result.nodes.iter().find(|n| n.id == "lower").unwrap();
        assert_eq!(lower.x, 240.0);
    }

    #[test]
    fn test_auto_layout_is_one_undoable_step() {
        let mut model = loaded_model();
        let before = model.graph().clone();
        let center = center_of(&model);

        let moved = block_on(model.auto_layout(&LayeredLayout, &MeasuredSizes::default())).unwrap();
        assert!(moved);
        assert!(x_of(&model, "src") < x_of(&model, "lower"));
        assert!(x_of(&model, "lower") < x_of(&model, "cmp"));
        assert_eq!(x_of(&model, "src"), x_of(&model, "tgt"));
        assert_eq!(center_of(&model), center);

        assert!(model.undo());
        assert_eq!(model.graph(), &before);
        assert!(!model.can_undo());
    }

    #[test]
    fn test_engine_failure_leaves_graph_untouched() {
        let mut model = loaded_model();
        let before = model.graph().clone();
        let result = block_on(model.auto_layout(&FailingEngine, &MeasuredSizes::default()));
        assert_eq!(result, Err(LayoutError::EngineFailed("engine offline".into())));
        assert_eq!(model.graph(), &before);
        assert!(!model.can_undo());
    }

    #[test]
    fn test_stale_result_skips_removed_nodes() {
        let mut model = loaded_model();
        let (ticket, request) = model.layout_request(&MeasuredSizes::default());
        assert!(model.delete_node("tgt"));
        assert_ne!(ticket.revision(), model.revision());

        let result = compute_layout(&request).unwrap();
        model.start_change_transaction();
        assert!(model.apply_layout(&ticket, &result, true));
        assert!(model.graph().node("tgt").is_none());
        assert!(x_of(&model, "lower") < x_of(&model, "cmp"));

        // The layout and the deletion are separate steps
        assert!(model.undo());
        assert!(model.graph().node("tgt").is_none());
        assert!(model.undo());
        assert!(model.graph().node("tgt").is_some());
    }

    #[test]
    fn test_layout_without_history() {
        let mut model = loaded_model();
        let (ticket, request) = model.layout_request(&MeasuredSizes::default());
        let result = compute_layout(&request).unwrap();
        assert!(model.apply_layout(&ticket, &result, false));
        assert!(!model.can_undo());
        // Applying the same result again moves nothing
        assert!(!model.apply_layout(&ticket, &result, false));
    }

    #[test]
    fn test_read_only_model_is_not_laid_out() {
        let mut model = loaded_model();
        model.set_read_only(true);
        let before = model.graph().clone();
        let moved = block_on(model.auto_layout(&LayeredLayout, &MeasuredSizes::default())).unwrap();
        assert!(!moved);
        assert_eq!(model.graph(), &before);
    }

    #[test]
    fn test_load_with_layout_places_unpositioned_rules() {
        let mut document = simple_document();
        for node in &mut document.operator_nodes {
            node.position = None;
        }
        let mut model = RuleEditorModel::new(test_catalog());
        block_on(model.load_with_layout(&document, &LayeredLayout, &MeasuredSizes::default())).unwrap();

        assert!(x_of(&model, "src") < x_of(&model, "lower"));
        assert!(x_of(&model, "lower") < x_of(&model, "cmp"));
        assert!(!model.can_undo());
    }

    #[test]
    fn test_load_with_layout_centers_on_placed_nodes() {
        let mut document = simple_document();
        document.operator_nodes[1].position = None;
        let mut model = RuleEditorModel::new(test_catalog());
        block_on(model.load_with_layout(&document, &LayeredLayout, &MeasuredSizes::default())).unwrap();

        // Mean of src (0, 0), tgt (0, 200) and cmp (600, 100)
        assert_eq!(center_of(&model), Position::new(200.0, 100.0));
    }
}
