use super::RuleEditorModel;
use crate::catalog::OperatorCatalog;
use crate::graph::{EdgeIdGenerator, NodeIdGenerator, RuleGraph};
use crate::history::History;
use crate::layout::LayoutConfig;
use crate::parameters::ParameterDiff;
use crate::validation::{ConnectionValidator, PermissiveValidator};

pub struct RuleEditorModelBuilder {
    catalog: OperatorCatalog,
    validator: Box<dyn ConnectionValidator>,
    layout_config: LayoutConfig,
    read_only: bool,
}

impl RuleEditorModelBuilder {
    pub fn new(catalog: OperatorCatalog) -> Self {
        Self {
            catalog,
            validator: Box::new(PermissiveValidator),
            layout_config: LayoutConfig::default(),
            read_only: false,
        }
    }

    /// Sets the connection rules, e.g. `LinkingValidator` for linking rules.
    pub fn with_validator(mut self, validator: Box<dyn ConnectionValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_layout_config(mut self, layout_config: LayoutConfig) -> Self {
        self.layout_config = layout_config;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn build(self) -> RuleEditorModel {
        RuleEditorModel {
            graph: RuleGraph::new(),
            history: History::new(),
            parameters: ParameterDiff::new(),
            node_ids: NodeIdGenerator::new(),
            edge_ids: EdgeIdGenerator::default(),
            catalog: self.catalog,
            validator: self.validator,
            layout_config: self.layout_config,
            read_only: self.read_only,
            revision: 0,
        }
    }
}
