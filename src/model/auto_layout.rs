use super::RuleEditorModel;
use super::apply::Recording;
use crate::change::RuleModelChanges;
use crate::error::LayoutError;
use crate::graph::Position;
use crate::layout::{
    LayoutEngine, LayoutRequest, LayoutResult, MeasuredSizes, build_layout_request, graph_center, position_changes,
    recentered,
};
use tracing::debug;

/// Identifies the graph state a layout request was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutTicket {
    revision: u64,
    center: Position,
}

impl LayoutTicket {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Center of the graph when the request was built. Results are moved back onto it.
    pub fn center(&self) -> Position {
        self.center
    }
}

impl RuleEditorModel {
    /// Builds a layout request for the current graph.
    pub fn layout_request(&self, sizes: &MeasuredSizes) -> (LayoutTicket, LayoutRequest) {
        let ticket = LayoutTicket {
            revision: self.revision,
            center: graph_center(self.graph.nodes().map(|n| n.position)),
        };
        (ticket, build_layout_request(&self.graph, sizes, &self.layout_config))
    }

    /// Applies a layout result as one grouped position change.
    ///
    /// The graph may have changed since the request was built. Positions of nodes
    /// that no longer exist are dropped. Returns `true` if some node moved.
    pub fn apply_layout(&mut self, ticket: &LayoutTicket, result: &LayoutResult, record_history: bool) -> bool {
        if record_history && !self.editable() {
            return false;
        }
        if ticket.revision != self.revision {
            debug!(
                requested = ticket.revision,
                current = self.revision,
                "applying layout computed for an older graph"
            );
        }
        let positions = recentered(result, ticket.center);
        let operations = position_changes(&self.graph, &positions);
        if operations.is_empty() {
            return false;
        }
        debug!(moved = operations.len(), "applying layout");
        let changes = RuleModelChanges::new(operations);
        if record_history {
            self.start_change_transaction();
            self.execute(changes, Recording::Edit);
        } else {
            self.execute(changes, Recording::Skip);
        }
        true
    }

    /// Lays out the graph with `engine` as a single undoable step.
    ///
    /// On error the graph is left untouched.
    pub async fn auto_layout(&mut self, engine: &dyn LayoutEngine, sizes: &MeasuredSizes) -> Result<bool, LayoutError> {
        if !self.editable() {
            return Ok(false);
        }
        self.run_layout(engine, sizes, None, true).await
    }

    /// Requests a layout and applies it. `center` replaces the center of the
    /// current graph when some node positions are placeholders.
    pub(crate) async fn run_layout(
        &mut self,
        engine: &dyn LayoutEngine,
        sizes: &MeasuredSizes,
        center: Option<Position>,
        record_history: bool,
    ) -> Result<bool, LayoutError> {
        let (mut ticket, request) = self.layout_request(sizes);
        if let Some(center) = center {
            ticket.center = center;
        }
        debug!(nodes = request.nodes.len(), edges = request.edges.len(), "requesting layout");
        let result = engine.layout(request).await?;
        Ok(self.apply_layout(&ticket, &result, record_history))
    }
}
