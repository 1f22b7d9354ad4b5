//! The closed set of graph edits and their grouping into change units.

mod grouping;
pub mod operation;

pub use grouping::ChangeGroup;
pub use operation::*;
