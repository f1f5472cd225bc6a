//! The result tree: named test sets holding outcomes and nested sets.

use crate::outcome::{Outcome, OutcomeKind};
use std::cell::Cell;

/// A child of a [`TestSet`].
#[derive(Clone, Debug)]
pub enum Child {
    Outcome(Outcome),
    Set(TestSet),
}

/// A named node of the result tree.
///
/// Passing outcomes are folded into `pass_count` as they are recorded and
/// never stored; every other outcome and every finished nested set is kept
/// in `children`, in the order it was recorded.
#[derive(Clone, Debug)]
pub struct TestSet {
    description: String,
    children: Vec<Child>,
    pass_count: usize,
    has_non_pass: Cell<Option<bool>>,
}

impl TestSet {
    pub(crate) fn new(description: impl Into<String>) -> Self {
        TestSet {
            description: description.into(),
            children: Vec::new(),
            pass_count: 0,
            has_non_pass: Cell::new(None),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Passes recorded directly in this set, excluding nested sets.
    pub fn pass_count(&self) -> usize {
        self.pass_count
    }

    /// Whether the subtree holds a Fail or Error, as of the last aggregation.
    ///
    /// `None` until [`aggregate`](crate::aggregate) has visited this set.
    pub fn has_non_pass(&self) -> Option<bool> {
        self.has_non_pass.get()
    }

    pub(crate) fn set_has_non_pass(&self, value: bool) {
        self.has_non_pass.set(Some(value));
    }

    /// Nested sets, in recording order.
    pub fn subsets(&self) -> impl Iterator<Item = &TestSet> {
        self.children.iter().filter_map(|child| match child {
            Child::Set(set) => Some(set),
            Child::Outcome(_) => None,
        })
    }

    pub(crate) fn push_outcome(&mut self, outcome: Outcome) {
        if outcome.kind() == OutcomeKind::Pass {
            self.pass_count += 1;
        } else {
            self.children.push(Child::Outcome(outcome));
        }
        self.has_non_pass.set(None);
    }

    pub(crate) fn push_set(&mut self, set: TestSet) {
        self.children.push(Child::Set(set));
        self.has_non_pass.set(None);
    }
}
