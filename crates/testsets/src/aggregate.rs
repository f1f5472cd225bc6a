//! Bottom-up aggregation of result counts and the column layout derived
//! from the shape of the whole tree.

use crate::outcome::{Outcome, OutcomeKind};
use crate::tree::{Child, TestSet};
use std::ops::AddAssign;
use unicode_width::UnicodeWidthStr;

/// Result counts for a subtree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    pub passes: usize,
    pub fails: usize,
    pub errors: usize,
    pub broken: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.passes + self.fails + self.errors + self.broken
    }

    /// True when at least one Fail or Error was recorded. Broken never counts.
    pub fn has_failures(&self) -> bool {
        self.fails + self.errors > 0
    }

    fn add(&mut self, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Pass => self.passes += 1,
            OutcomeKind::Fail => self.fails += 1,
            OutcomeKind::Error => self.errors += 1,
            OutcomeKind::Broken => self.broken += 1,
        }
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Counts) {
        self.passes += other.passes;
        self.fails += other.fails;
        self.errors += other.errors;
        self.broken += other.broken;
    }
}

/// Sum the counts of `set` and everything below it.
///
/// Records on every visited set whether its subtree failed. Aggregating an
/// unchanged tree again gives the same counts.
pub fn aggregate(set: &TestSet) -> Counts {
    let mut counts = Counts {
        passes: set.pass_count(),
        ..Counts::default()
    };
    for child in set.children() {
        match child {
            Child::Outcome(outcome) => counts.add(outcome.kind()),
            Child::Set(nested) => counts += aggregate(nested),
        }
    }
    set.set_has_non_pass(counts.has_failures());
    counts
}

/// Width of the description column needed by `set` and its descendants when
/// `set` is printed at `depth`.
pub fn column_alignment(set: &TestSet, depth: usize) -> usize {
    set.subsets()
        .map(|nested| column_alignment(nested, depth + 1))
        .fold(2 * depth + text_width(set.description()), usize::max)
}

/// Terminal columns taken by `text`.
pub(crate) fn text_width(text: &str) -> usize {
    text.width()
}

/// Fail and Error outcomes of the subtree, depth-first in recording order.
pub fn collect_failures(set: &TestSet) -> Vec<Outcome> {
    let mut failures = Vec::new();
    collect_into(set, &mut failures);
    failures
}

fn collect_into(set: &TestSet, failures: &mut Vec<Outcome>) {
    for child in set.children() {
        match child {
            Child::Outcome(outcome) if outcome.kind().is_failure() => {
                failures.push(outcome.clone())
            }
            Child::Outcome(_) => {}
            Child::Set(nested) => collect_into(nested, failures),
        }
    }
}

pub(crate) const PASS_LABEL: &str = "Pass";
pub(crate) const FAIL_LABEL: &str = "Fail";
pub(crate) const ERROR_LABEL: &str = "Error";
pub(crate) const BROKEN_LABEL: &str = "Broken";
pub(crate) const TOTAL_LABEL: &str = "Total";

/// Per-category column widths, shared by every row of one report.
///
/// A width of zero means the column is left out entirely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeaderWidths {
    pub pass: usize,
    pub fail: usize,
    pub error: usize,
    pub broken: usize,
    pub total: usize,
}

impl HeaderWidths {
    /// Widths for a report whose root aggregated to `root`.
    pub fn new(root: &Counts) -> Self {
        HeaderWidths {
            pass: column_width(PASS_LABEL, root.passes),
            fail: column_width(FAIL_LABEL, root.fails),
            error: column_width(ERROR_LABEL, root.errors),
            broken: column_width(BROKEN_LABEL, root.broken),
            total: column_width(TOTAL_LABEL, root.total()),
        }
    }
}

fn column_width(label: &str, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        label.len().max(count.to_string().len())
    }
}
