use super::operation::{ChangeKind, ChangeOperation, RuleModelChanges};
use itertools::Itertools;

/// A contiguous run of operations of the same kind inside one change unit.
#[derive(Debug)]
pub struct ChangeGroup<'a> {
    pub kind: ChangeKind,
    pub operations: Vec<&'a ChangeOperation>,
}

impl RuleModelChanges {
    /// Splits the operations into contiguous runs of the same kind, keeping their order.
    ///
    /// Each run can be applied as one batch.
    pub fn grouped(&self) -> Vec<ChangeGroup<'_>> {
        let runs = self.operations.iter().chunk_by(|op| op.kind());
        runs.into_iter()
            .map(|(kind, operations)| ChangeGroup {
                kind,
                operations: operations.collect(),
            })
            .collect()
    }
}
