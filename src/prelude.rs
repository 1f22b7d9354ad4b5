//! Prelude module for convenient imports
//!
//! Re-exports the types needed to load, edit, lay out and save a rule.
//!
//! ```rust,no_run
//! use rulegraph::prelude::*;
//!
//! let mut model = RuleEditorModel::new(OperatorCatalog::default());
//! let note = model.add_sticky_note("todo", Default::default(), Position::new(0.0, 0.0), None);
//! assert!(note.is_some());
//! assert!(model.undo());
//! ```

// Editing
pub use crate::catalog::{OperatorCatalog, ParameterSpecification, ParameterType, RuleOperator};
pub use crate::model::{LayoutTicket, RuleDocument, RuleEditorModel, RuleEditorModelBuilder};

// Graph types
pub use crate::graph::{
    NodeDimensions, ParameterValue, PluginType, PortSpecification, Position, RuleEdge, RuleEditorNode,
    RuleGraph, RuleOperatorNode, StickyNote, StickyNoteProps,
};

// Changes and history
pub use crate::change::{ChangeKind, ChangeOperation, RuleModelChanges};
pub use crate::history::History;

// Validation
pub use crate::validation::{ConnectionValidator, LinkingValidator, PermissiveValidator};

// Layout
pub use crate::layout::{LayeredLayout, LayoutConfig, LayoutEngine, LayoutRequest, LayoutResult, MeasuredSizes};

// Linkage rules
pub use crate::linking::{LinkageRule, SimilarityOperator, ValueInput};

// Error types
pub use crate::error::{LayoutError, LinkingError, ProjectionError, RuleValidationError};
