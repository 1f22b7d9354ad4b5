//! Undo/redo stacks of change units, split into transactions by boundary markers.

use crate::change::{ChangeOperation, RuleModelChanges};
use crate::graph::ParameterValue;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
enum StackEntry {
    Boundary,
    Changes(RuleModelChanges),
}

/// One stack of change units. The run after the last boundary is the current transaction.
#[derive(Debug, Clone, Default)]
pub struct ChangeStack {
    entries: Vec<StackEntry>,
}

impl ChangeStack {
    pub fn start_transaction(&mut self) {
        self.entries.push(StackEntry::Boundary);
    }

    pub fn push(&mut self, changes: RuleModelChanges) {
        self.entries.push(StackEntry::Changes(changes));
    }

    /// Pushes a change unit, merging consecutive edits of the same parameter.
    ///
    /// If both the top entry and `changes` are a single change of the same
    /// `(node, parameter)`, the top entry is replaced and keeps its original `from`
    /// value. Returns `true` if a merge happened.
    pub fn push_or_merge(&mut self, mut changes: RuleModelChanges) -> bool {
        let previous_from = match (self.last_parameter_change(), changes.as_single_parameter_change()) {
            (Some((last_node, last_param, last_from)), Some((node, param, _)))
                if last_node == node && last_param == param =>
            {
                Some(last_from.clone())
            }
            _ => None,
        };
        match previous_from {
            Some(oldest_from) => {
                if let Some(ChangeOperation::ChangeNodeParameter { from, .. }) = changes.operations.first_mut() {
                    *from = oldest_from;
                }
                self.entries.pop();
                self.entries.push(StackEntry::Changes(changes));
                true
            }
            None => {
                self.push(changes);
                false
            }
        }
    }

    /// The top entry if it is a single parameter change.
    pub fn last_parameter_change(&self) -> Option<(&str, &str, &Option<ParameterValue>)> {
        match self.entries.last() {
            Some(StackEntry::Changes(changes)) => changes.as_single_parameter_change(),
            _ => None,
        }
    }

    pub fn last_is_boundary(&self) -> bool {
        matches!(self.entries.last(), Some(StackEntry::Boundary))
    }

    /// Removes the most recent transaction and returns its change units in execution order.
    ///
    /// Trailing boundaries are skipped; the boundary that opened the transaction is consumed.
    pub fn pop_transaction(&mut self) -> Vec<RuleModelChanges> {
        while self.last_is_boundary() {
            self.entries.pop();
        }
        let mut transaction = Vec::new();
        while let Some(entry) = self.entries.pop() {
            match entry {
                StackEntry::Changes(changes) => transaction.push(changes),
                StackEntry::Boundary => break,
            }
        }
        transaction.reverse();
        transaction
    }

    /// Whether there is at least one change unit on the stack.
    pub fn has_changes(&self) -> bool {
        self.entries.iter().any(|e| matches!(e, StackEntry::Changes(_)))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The undo and redo stacks of one editing session.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo: ChangeStack,
    redo: ChangeStack,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a new user-visible transaction.
    pub fn start_transaction(&mut self) {
        self.undo.start_transaction();
    }

    /// Records a change unit that has been (or is about to be) applied.
    ///
    /// A new edit starts a new branch, so `reset_redo` drops the redo history.
    pub fn record(&mut self, changes: RuleModelChanges, reset_redo: bool) {
        if self.undo.push_or_merge(changes) {
            debug!("merged consecutive parameter change");
        }
        if reset_redo {
            self.redo.clear();
        }
    }

    pub fn undo_stack(&self) -> &ChangeStack {
        &self.undo
    }

    /// Takes the last undo transaction and moves its inversion to the redo stack.
    ///
    /// Returns the inverted change units in the order they must be applied, or
    /// `None` if there is nothing to undo.
    pub fn take_undo(&mut self) -> Option<Vec<RuleModelChanges>> {
        Self::transfer(&mut self.undo, &mut self.redo)
    }

    /// Takes the last redo transaction and moves its inversion back to the undo stack.
    pub fn take_redo(&mut self) -> Option<Vec<RuleModelChanges>> {
        Self::transfer(&mut self.redo, &mut self.undo)
    }

    fn transfer(from: &mut ChangeStack, to: &mut ChangeStack) -> Option<Vec<RuleModelChanges>> {
        let transaction = from.pop_transaction();
        if transaction.is_empty() {
            return None;
        }
        let inverted: Vec<RuleModelChanges> = transaction.iter().rev().map(|c| c.inverted()).collect();
        to.start_transaction();
        for changes in &inverted {
            to.push(changes.clone());
        }
        Some(inverted)
    }

    pub fn can_undo(&self) -> bool {
        self.undo.has_changes()
    }

    pub fn can_redo(&self) -> bool {
        self.redo.has_changes()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
