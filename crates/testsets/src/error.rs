//! Error types.

use crate::aggregate::Counts;
use crate::outcome::Outcome;

/// Errors produced while recording into or closing test sets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no test set is open")]
    NoOpenScope,

    #[error("test set {description:?} was closed by its own body")]
    Unbalanced { description: String },

    /// The root set finished with at least one Fail or Error.
    #[error(transparent)]
    Failed(#[from] TestSetFailure),

    /// A Fail or Error recorded while no test set was open.
    #[error("a check did not pass outside of any test set:\n{0}")]
    Unscoped(Box<Outcome>),

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

/// The failure of a root test set: its counts plus every Fail and Error in
/// the tree, depth-first in recording order.
#[derive(Debug, thiserror::Error)]
#[error(
    "Some tests did not pass: {} passed, {} failed, {} errored, {} broken.",
    .counts.passes,
    .counts.fails,
    .counts.errors,
    .counts.broken
)]
pub struct TestSetFailure {
    pub counts: Counts,
    pub failures: Vec<Outcome>,
}
