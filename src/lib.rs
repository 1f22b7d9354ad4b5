//! # rulegraph - Editable Rule Operator Graphs
//!
//! **rulegraph** is the model behind a visual rule editor. A rule is a tree of
//! operators (path inputs, transformations, comparisons and aggregations) that the
//! user edits as a graph of nodes and edges. The crate keeps that graph consistent
//! while it is being edited and converts it back into a rule tree when it is saved.
//!
//! ## Core Workflow
//!
//! 1.  **Load**: Parse a `RuleDocument` (or convert a linkage rule with the
//!     `linking` module) and load it into a `RuleEditorModel`.
//! 2.  **Edit**: Add and connect nodes, change parameters, move things around. Every
//!     edit is a change unit that can be undone. Consecutive edits form one undo
//!     step until a new transaction is started.
//! 3.  **Validate**: `is_valid_edge` gates connections before they are made; the
//!     session's `ConnectionValidator` encodes the domain rules.
//! 4.  **Lay out**: Hand a `LayoutRequest` to any `LayoutEngine` and apply the
//!     result as one undoable step.
//! 5.  **Save**: `save_rule` checks the tree structure and projects the graph back
//!     into operator nodes with all parameter edits applied.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rulegraph::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = OperatorCatalog::from_json(&std::fs::read_to_string("operators.json")?)?;
//!     let document = RuleDocument::from_json(&std::fs::read_to_string("rule.json")?)?;
//!
//!     let mut model = RuleEditorModel::builder(catalog)
//!         .with_validator(Box::new(LinkingValidator))
//!         .build();
//!     model.load(&document)?;
//!
//!     model.start_change_transaction();
//!     model.change_node_parameter("lowerCase", "locale", Some("de".into()));
//!     model.undo();
//!
//!     let engine = LayeredLayout;
//!     tokio_test::block_on(model.auto_layout(&engine, &MeasuredSizes::default()))?;
//!
//!     let saved = model.save_rule()?;
//!     println!("{}", saved.to_json()?);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod change;
pub mod error;
pub mod graph;
pub mod history;
pub mod layout;
pub mod linking;
pub mod model;
pub mod parameters;
pub mod prelude;
pub mod validation;
