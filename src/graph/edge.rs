/// A directed connection from the output of `source` into input port
/// `target_handle` of `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub target_handle: usize,
}

impl RuleEdge {
    pub fn new(id: String, source: &str, target: &str, target_handle: usize) -> Self {
        Self {
            id,
            source: source.to_string(),
            target: target.to_string(),
            target_handle,
        }
    }
}

/// Criteria for looking up edges. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeFilter<'a> {
    pub source: Option<&'a str>,
    pub target: Option<&'a str>,
    pub target_handle: Option<usize>,
}

impl EdgeFilter<'_> {
    pub fn matches(&self, edge: &RuleEdge) -> bool {
        self.source.is_none_or(|s| edge.source == s)
            && self.target.is_none_or(|t| edge.target == t)
            && self.target_handle.is_none_or(|h| edge.target_handle == h)
    }
}
