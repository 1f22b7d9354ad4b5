use crate::graph::{ParameterValue, StickyNote};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Parameters of a rule tree operator. Values may carry a display label.
pub type OperatorParameters = AHashMap<String, ParameterValue>;

/// A linkage rule as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkageRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<SimilarityOperator>,
    #[serde(default)]
    pub filter: LinkFilter,
    #[serde(default)]
    pub link_type: String,
    #[serde(default)]
    pub layout: RuleLayout,
    #[serde(default)]
    pub ui_annotations: UiAnnotations,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unambiguous: Option<bool>,
}

/// Node positions of a rule, as `[x, y]` pairs keyed by node id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleLayout {
    pub node_positions: AHashMap<String, (f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiAnnotations {
    #[serde(default)]
    pub sticky_notes: Vec<StickyNote>,
}

/// An operator producing a similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimilarityOperator {
    Comparison(ComparisonOperator),
    Aggregation(AggregationOperator),
}

impl SimilarityOperator {
    pub fn id(&self) -> &str {
        match self {
            SimilarityOperator::Comparison(c) => &c.id,
            SimilarityOperator::Aggregation(a) => &a.id,
        }
    }
}

/// Compares the values of a source and a target input with a distance metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOperator {
    pub id: String,
    pub metric: String,
    pub threshold: f64,
    pub weight: i64,
    #[serde(default = "default_indexing")]
    pub indexing: bool,
    #[serde(default)]
    pub parameters: OperatorParameters,
    pub source_input: ValueInput,
    pub target_input: ValueInput,
}

fn default_indexing() -> bool {
    true
}

/// Combines the scores of several similarity operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationOperator {
    pub id: String,
    pub aggregator: String,
    pub weight: i64,
    #[serde(default)]
    pub parameters: OperatorParameters,
    #[serde(default)]
    pub inputs: Vec<SimilarityOperator>,
}

/// An operator producing values: a path lookup or a transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ValueInput {
    #[serde(rename = "pathInput")]
    Path(PathInput),
    #[serde(rename = "transformInput")]
    Transform(TransformInput),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathInput {
    pub id: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformInput {
    pub id: String,
    pub function: String,
    #[serde(default)]
    pub parameters: OperatorParameters,
    #[serde(default)]
    pub inputs: Vec<ValueInput>,
}
