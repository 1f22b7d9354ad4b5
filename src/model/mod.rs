//! The rule editor model: one editing session of a rule graph.
//!
//! All mutation goes through change units (`RuleModelChanges`). Public edit
//! operations build the units, apply them, and record them in the history so they
//! can be undone. Consecutive edits form one undo step until the caller starts a new
//! transaction with [`RuleEditorModel::start_change_transaction`].

mod apply;
mod auto_layout;
mod builder;
mod edit;
mod projection;

pub use auto_layout::LayoutTicket;
pub use builder::RuleEditorModelBuilder;
pub use projection::{RuleDocument, STICKY_NOTE_PLUGIN_ID};

use crate::catalog::OperatorCatalog;
use crate::graph::{EdgeIdGenerator, NodeIdGenerator, ParameterValue, RuleGraph};
use crate::history::History;
use crate::layout::LayoutConfig;
use crate::parameters::ParameterDiff;
use crate::validation::{ConnectionValidator, ValidationGraph};
use tracing::debug;

#[derive(Debug)]
pub struct RuleEditorModel {
    graph: RuleGraph,
    history: History,
    parameters: ParameterDiff,
    node_ids: NodeIdGenerator,
    edge_ids: EdgeIdGenerator,
    catalog: OperatorCatalog,
    validator: Box<dyn ConnectionValidator>,
    layout_config: LayoutConfig,
    read_only: bool,
    /// Incremented with every applied change unit.
    revision: u64,
}

impl RuleEditorModel {
    pub fn builder(catalog: OperatorCatalog) -> RuleEditorModelBuilder {
        RuleEditorModelBuilder::new(catalog)
    }

    /// A model with the default validator and layout configuration.
    pub fn new(catalog: OperatorCatalog) -> Self {
        Self::builder(catalog).build()
    }

    pub fn graph(&self) -> &RuleGraph {
        &self.graph
    }

    pub fn catalog(&self) -> &OperatorCatalog {
        &self.catalog
    }

    pub fn parameter_diff(&self) -> &ParameterDiff {
        &self.parameters
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout_config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Edits that follow are undone together, until the next call.
    pub fn start_change_transaction(&mut self) {
        self.history.start_transaction();
    }

    /// Undoes the last transaction. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.editable() {
            return false;
        }
        let Some(transaction) = self.history.take_undo() else {
            return false;
        };
        debug!(units = transaction.len(), "undo");
        for changes in &transaction {
            self.apply_changes(changes);
        }
        true
    }

    /// Redoes the last undone transaction. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.editable() {
            return false;
        }
        let Some(transaction) = self.history.take_redo() else {
            return false;
        };
        debug!(units = transaction.len(), "redo");
        for changes in &transaction {
            self.apply_changes(changes);
        }
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Current value of a parameter, including unsaved edits.
    pub fn current_parameter_value(&self, node_id: &str, parameter_id: &str) -> Option<ParameterValue> {
        let node = self.graph.node(node_id)?;
        self.parameters.current_value(&node.operator, parameter_id)
    }

    /// Whether an edge from `source` into port `target_handle` of `target` may be created.
    ///
    /// Rejects unknown nodes, sticky notes, self loops, ports beyond the port
    /// specification and edges that close a cycle, then asks the session's validator.
    pub fn is_valid_edge(&self, source: &str, target: &str, target_handle: usize) -> bool {
        let (Some(from), Some(to)) = (self.graph.node(source), self.graph.node(target)) else {
            return false;
        };
        if source == target || from.is_sticky_note() || to.is_sticky_note() {
            return false;
        }
        if to
            .operator
            .port_specification
            .max_input_ports
            .is_some_and(|max| target_handle >= max)
        {
            return false;
        }
        let nodes = self.rule_operator_nodes();
        let graph = ValidationGraph::new(&nodes);
        if graph.would_create_cycle(source, target) {
            return false;
        }
        match (graph.node(source), graph.node(target)) {
            (Some(from), Some(to)) => self.validator.validate_connection(from, to, target_handle),
            _ => false,
        }
    }

    fn editable(&self) -> bool {
        if self.read_only {
            debug!("model is read-only, ignoring edit");
        }
        !self.read_only
    }
}
