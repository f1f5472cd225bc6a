//! # testsets — nested test sets with an aligned summary table
//!
//! Checks are recorded into named, nestable test sets. Counts are folded
//! upward as sets close, failures are printed the moment they happen, and
//! the outermost set prints one summary table for the whole tree:
//!
//! ```text
//! Test Summary: | Pass  Fail  Total
//! suite         |    3     1      4
//!   A           |    2            2
//!   B           |    1     1      2
//! ```
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use testsets::{check, check_eq, Session};
//!
//! fn main() {
//!     let mut session = Session::new();
//!     let result = session.testset("Calculator", |s| {
//!         check_eq!(s, 2 + 3, 5)?;
//!
//!         s.testset("with negative numbers", |s| {
//!             check!(s, -1 + 1 == 0)?;
//!             Ok(())
//!         })?;
//!         Ok(())
//!     });
//!
//!     if let Err(error) = result {
//!         eprintln!("{error}");
//!         std::process::exit(1);
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - `googletest` — re-exports `googletest` matchers via `testsets::matchers`
//!   and adds `Outcome::from_verification`

mod aggregate;
mod checks;
mod config;
mod error;
mod outcome;
mod report;
mod session;
mod stack;
mod table;
mod tree;

pub use aggregate::{aggregate, collect_failures, column_alignment, Counts, HeaderWidths};
pub use config::{ColorChoice, Config};
pub use error::{Error, TestSetFailure};
pub use outcome::{Location, Origin, Outcome, OutcomeKind};
pub use session::{Closed, Session};
pub use stack::{Frame, Scrubber, Stack};
pub use table::TableBuilder;
pub use tree::{Child, TestSet};

#[doc(hidden)]
pub use checks::{__broken_outcome, __check_outcome, __compare_outcome};

/// Re-export of the [`googletest`] crate. Available with the `googletest` feature.
#[cfg(feature = "googletest")]
pub use googletest;

/// Composable matchers re-exported from [`googletest::prelude`].
#[cfg(feature = "googletest")]
pub mod matchers {
    pub use googletest::prelude::*;
}

use std::sync::atomic::{AtomicBool, Ordering};

static REPORT_PRINTING: AtomicBool = AtomicBool::new(true);

/// Turn printing of failure detail and summaries on or off for every
/// session that does not override it. Failures are still returned.
pub fn set_report_printing(enabled: bool) {
    REPORT_PRINTING.store(enabled, Ordering::SeqCst);
}

/// Whether sessions print by default. Enabled unless switched off.
pub fn report_printing() -> bool {
    REPORT_PRINTING.load(Ordering::SeqCst)
}

/// Record whether a boolean expression holds.
///
/// A panic while evaluating the expression is recorded as an Error.
/// Evaluates to the `Result` of [`Session::record`].
///
/// ```rust,no_run
/// # use testsets::{check, Session};
/// # let mut session = Session::new();
/// session.testset("strings", |s| {
///     check!(s, "abc".len() == 3)?;
///     Ok(())
/// }).ok();
/// ```
#[macro_export]
macro_rules! check {
    ($session:expr, $cond:expr $(,)?) => {{
        let outcome = $crate::__check_outcome(
            ::std::stringify!($cond),
            ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| -> bool { $cond })),
            $crate::Location::new(::std::file!(), ::std::line!()),
        );
        $session.record(outcome)
    }};
}

/// Record whether two expressions are equal, keeping both values on failure.
#[macro_export]
macro_rules! check_eq {
    ($session:expr, $left:expr, $right:expr $(,)?) => {{
        let outcome = $crate::__compare_outcome(
            ::std::concat!(::std::stringify!($left), " == ", ::std::stringify!($right)),
            ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| {
                match (&$left, &$right) {
                    (left, right) => (*left == *right, ::std::format!("{:?} == {:?}", left, right)),
                }
            })),
            $crate::Location::new(::std::file!(), ::std::line!()),
        );
        $session.record(outcome)
    }};
}

/// Record a check that is known to fail. Recorded as Broken while it fails,
/// and as an Error once it unexpectedly holds.
#[macro_export]
macro_rules! check_broken {
    ($session:expr, $cond:expr $(,)?) => {{
        let outcome = $crate::__broken_outcome(
            ::std::stringify!($cond),
            ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| -> bool { $cond })),
            $crate::Location::new(::std::file!(), ::std::line!()),
        );
        $session.record(outcome)
    }};
}

/// Record a check as Broken without evaluating it.
#[macro_export]
macro_rules! skip {
    ($session:expr, $cond:expr $(,)?) => {
        $session.record(
            $crate::Outcome::skipped(::std::stringify!($cond))
                .at($crate::Location::new(::std::file!(), ::std::line!())),
        )
    };
}
