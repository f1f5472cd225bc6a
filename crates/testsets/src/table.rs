//! Table-driven test sets — one nested set per case.

use crate::error::Error;
use crate::session::{Closed, Session};

/// Builder for a set whose cases share one body.
///
/// Each `.case()` becomes a nested set inside a set named after the table.
///
/// # Example
///
/// ```rust,no_run
/// # use testsets::{check_eq, Session};
/// # let mut session = Session::new();
/// session
///     .table("arithmetic")
///     .case("addition", (2i32, 3i32, 5i32))
///     .case("large numbers", (100, 200, 300))
///     .run(|s, (a, b, expected)| {
///         check_eq!(s, a + b, *expected)?;
///         Ok(())
///     })
///     .ok();
/// ```
pub struct TableBuilder<'s, T> {
    session: &'s mut Session,
    name: String,
    cases: Vec<(String, T)>,
    auto_index: usize,
}

impl<'s, T> TableBuilder<'s, T> {
    pub(crate) fn new(session: &'s mut Session, name: String) -> Self {
        TableBuilder {
            session,
            name,
            cases: Vec::new(),
            auto_index: 0,
        }
    }

    /// Add a named case.
    pub fn case(mut self, label: &str, data: T) -> Self {
        self.cases.push((label.to_string(), data));
        self
    }

    /// Add an unnamed case (auto-named `case_1`, `case_2`, ...).
    pub fn case_unnamed(mut self, data: T) -> Self {
        self.auto_index += 1;
        let label = format!("case_{}", self.auto_index);
        self.cases.push((label, data));
        self
    }

    /// Run `body` once per case, each inside its own nested set.
    pub fn run(
        self,
        body: impl Fn(&mut Session, &T) -> Result<(), Error>,
    ) -> Result<Closed, Error> {
        let cases = self.cases;
        self.session.testset(self.name, |s| {
            for (label, data) in &cases {
                s.testset(label.as_str(), |s| body(s, data))?;
            }
            Ok(())
        })
    }
}
