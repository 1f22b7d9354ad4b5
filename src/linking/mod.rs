//! Linkage rules: the backend's tree form of a linking rule and its conversion
//! to and from editor operator nodes.

pub mod convert;
pub mod tree;

pub use convert::{REVERSE_PARAMETER, construct_linkage_rule_tree, linkage_rule_to_operator_nodes, rule_layout};
pub use tree::*;
