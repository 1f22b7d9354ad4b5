//! Connection rules and structural checks of rule trees.
//!
//! Everything here is pure: functions only read a `ValidationGraph` snapshot, so
//! they can gate an edit before it happens as well as audit a rule before saving.

pub mod connection;
pub mod tree;

pub use connection::{
    ConnectionValidator, LinkingValidator, PathRole, PermissiveValidator, SOURCE_PATH_INPUT, TARGET_PATH_INPUT,
    from_type, input_path_validation, to_type, validate_transform_roles,
};
pub use tree::{ValidationGraph, ValidationNode, find_cycle, validate_rule_tree};
