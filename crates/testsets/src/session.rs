//! Opening, recording into and closing nested test sets.

use crate::aggregate::{aggregate, collect_failures};
use crate::checks::panic_message;
use crate::config::Config;
use crate::error::{Error, TestSetFailure};
use crate::outcome::Outcome;
use crate::report::{self, Styles};
use crate::table::TableBuilder;
use crate::tree::TestSet;
use std::io::{self, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// What closing a test set did with it.
#[derive(Debug)]
pub enum Closed {
    /// A parent set was open; the finished set now belongs to it.
    Attached,
    /// The outermost set finished without any Fail or Error.
    Root(TestSet),
}

/// The stack of open test sets for one run.
///
/// Exactly one set, the innermost, accepts outcomes at any time. Closing a
/// nested set hands it to its parent; closing the outermost set prints the
/// summary and reports whether the run failed.
///
/// # Example
///
/// ```rust,no_run
/// use testsets::{check, Session};
///
/// let mut session = Session::new();
/// let result = session.testset("arithmetic", |s| {
///     check!(s, 2 + 2 == 4)?;
///     s.testset("negatives", |s| {
///         check!(s, -1 + 1 == 0)?;
///         Ok(())
///     })?;
///     Ok(())
/// });
/// if result.is_err() {
///     std::process::exit(1);
/// }
/// ```
pub struct Session {
    stack: Vec<TestSet>,
    config: Config,
    styles: Styles,
    out: Box<dyn Write>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    /// A session writing to stdout with the default configuration.
    pub fn new() -> Self {
        Session::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Session {
            stack: Vec::new(),
            styles: config.styles(),
            config,
            out: Box::new(io::stdout()),
        }
    }

    /// Send failure detail and the summary to `out` instead of stdout.
    pub fn with_output(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of open test sets.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The innermost open test set.
    pub fn current(&self) -> Option<&TestSet> {
        self.stack.last()
    }

    pub fn open(&mut self, description: impl Into<String>) {
        let set = TestSet::new(description);
        tracing::debug!(set = set.description(), depth = self.stack.len(), "opening test set");
        self.stack.push(set);
    }

    /// Record an outcome into the innermost open set.
    ///
    /// Fail and Error outcomes are printed right away. With no set open,
    /// Pass and Broken are dropped and Fail or Error is returned as
    /// [`Error::Unscoped`].
    pub fn record(&mut self, outcome: Outcome) -> Result<(), Error> {
        let outcome = match outcome.stack() {
            Some(stack) if outcome.kind().is_failure() => {
                let scrubbed = stack.scrub(self.config.frame_scrubber());
                outcome.with_stack(scrubbed)
            }
            _ => outcome,
        };
        let printing = self.config.printing();

        let Some(set) = self.stack.last_mut() else {
            if !outcome.kind().is_failure() {
                return Ok(());
            }
            if printing {
                write_or_warn(report::write_failure("", &outcome, &self.styles, &mut *self.out));
            }
            return Err(Error::Unscoped(Box::new(outcome)));
        };

        tracing::trace!(set = set.description(), kind = ?outcome.kind(), "recording outcome");
        if printing && outcome.kind().is_failure() {
            write_or_warn(report::write_failure(
                set.description(),
                &outcome,
                &self.styles,
                &mut *self.out,
            ));
        }
        set.push_outcome(outcome);
        Ok(())
    }

    /// Close the innermost open set.
    ///
    /// A nested set is attached to its parent and nothing is printed. The
    /// outermost set is aggregated, its summary printed, and a
    /// [`TestSetFailure`] returned if anything in it failed or errored.
    pub fn close(&mut self) -> Result<Closed, Error> {
        let set = self.stack.pop().ok_or(Error::NoOpenScope)?;

        if let Some(parent) = self.stack.last_mut() {
            tracing::debug!(
                set = set.description(),
                parent = parent.description(),
                "attaching finished test set"
            );
            parent.push_set(set);
            return Ok(Closed::Attached);
        }

        let counts = aggregate(&set);
        tracing::debug!(
            set = set.description(),
            passes = counts.passes,
            fails = counts.fails,
            errors = counts.errors,
            broken = counts.broken,
            "root test set finished"
        );

        if self.config.printing() {
            write_or_warn(report::render_report(&set, &self.styles, &mut *self.out));
        }

        if counts.has_failures() {
            return Err(TestSetFailure {
                counts,
                failures: collect_failures(&set),
            }
            .into());
        }
        Ok(Closed::Root(set))
    }

    /// Run `body` inside a new set named `description`, then close it.
    ///
    /// A panic or `Err` escaping `body` is recorded as an Error in the set,
    /// and sets the body left open are closed into it first.
    pub fn testset(
        &mut self,
        description: impl Into<String>,
        body: impl FnOnce(&mut Session) -> Result<(), Error>,
    ) -> Result<Closed, Error> {
        let description = description.into();
        self.open(description.clone());
        let depth = self.stack.len();

        let result = catch_unwind(AssertUnwindSafe(|| body(self)));

        if self.stack.len() < depth {
            return Err(Error::Unbalanced { description });
        }
        while self.stack.len() > depth {
            self.close()?;
        }

        match result {
            Ok(Ok(())) => {}
            Ok(Err(error)) => self.record(Outcome::outside_check(error.to_string()))?,
            Err(payload) => self.record(Outcome::outside_check(panic_message(&*payload)))?,
        }
        self.close()
    }

    pub fn describe(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut Session) -> Result<(), Error>,
    ) -> Result<Closed, Error> {
        self.testset(format!("describe {name}"), body)
    }

    pub fn it(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut Session) -> Result<(), Error>,
    ) -> Result<Closed, Error> {
        self.testset(format!("it {name}"), body)
    }

    pub fn test(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut Session) -> Result<(), Error>,
    ) -> Result<Closed, Error> {
        self.testset(format!("test {name}"), body)
    }

    /// Start a table of cases; each case runs in its own nested set.
    ///
    /// ```rust,no_run
    /// # use testsets::{check, Session};
    /// # let mut session = Session::new();
    /// session
    ///     .table("addition")
    ///     .case("small", (2, 3, 5))
    ///     .case("large", (100, 200, 300))
    ///     .run(|s, (a, b, sum)| {
    ///         check!(s, a + b == *sum)?;
    ///         Ok(())
    ///     })
    ///     .ok();
    /// ```
    pub fn table<T>(&mut self, name: &str) -> TableBuilder<'_, T> {
        TableBuilder::new(self, name.to_string())
    }
}

fn write_or_warn(result: io::Result<()>) {
    if let Err(error) = result {
        tracing::warn!(%error, "failed to write test output");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorChoice;
    use crate::outcome::OutcomeKind;
    use crate::stack::{Frame, Stack};
    use crate::tree::Child;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Buffer(Rc<RefCell<Vec<u8>>>);

    impl Buffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn session() -> (Session, Buffer) {
        let buffer = Buffer::default();
        let config = Config::default()
            .color(ColorChoice::Never)
            .print_report(true);
        (Session::with_config(config).with_output(buffer.clone()), buffer)
    }

    #[test]
    fn test_nested_close_attaches_silently() {
        let (mut s, out) = session();
        s.open("root");
        s.open("child");
        s.record(Outcome::fail("x")).unwrap();
        let before = out.text();

        assert!(matches!(s.close().unwrap(), Closed::Attached));
        assert_eq!(out.text(), before);
        assert_eq!(s.depth(), 1);
        assert_eq!(s.current().unwrap().subsets().count(), 1);
    }

    #[test]
    fn test_root_close_returns_tree_when_passing() {
        let (mut s, out) = session();
        s.open("root");
        s.record(Outcome::pass("a")).unwrap();
        s.record(Outcome::broken("b")).unwrap();

        let Closed::Root(root) = s.close().unwrap() else {
            panic!("expected the root set");
        };
        assert_eq!(root.pass_count(), 1);
        assert_eq!(root.has_non_pass(), Some(false));
        assert!(out.text().starts_with("Test Summary:"));
    }

    #[test]
    fn test_only_broken_does_not_fail() {
        let (mut s, out) = session();
        s.open("known issues");
        for expr in ["a", "b", "c"] {
            s.record(Outcome::broken(expr)).unwrap();
        }
        assert!(s.close().is_ok());
        assert_eq!(
            out.text(),
            concat!(
                "Test Summary: | Broken  Total\n",
                "known issues  |      3      3\n",
            )
        );
    }

    #[test]
    fn test_root_failure_carries_counts_and_outcomes() {
        let (mut s, out) = session();
        s.open("suite");
        s.open("A");
        s.record(Outcome::pass("a1")).unwrap();
        s.record(Outcome::pass("a2")).unwrap();
        s.close().unwrap();
        s.open("B");
        s.record(Outcome::fail("b1")).unwrap();
        s.record(Outcome::pass("b2")).unwrap();
        s.close().unwrap();

        let Err(Error::Failed(failure)) = s.close() else {
            panic!("expected a failed root");
        };
        assert_eq!(failure.counts.total(), 4);
        assert_eq!(failure.counts.fails, 1);
        assert_eq!(failure.failures.len(), 1);
        assert_eq!(failure.failures[0].expression(), "b1");

        assert_eq!(
            out.text(),
            concat!(
                "B: Test Failed\n",
                "  Expression: b1\n",
                "Test Summary: | Pass  Fail  Total\n",
                "suite         |    3     1      4\n",
                "  A           |    2            2\n",
                "  B           |    1     1      2\n",
            )
        );
    }

    #[test]
    fn test_failures_print_in_recording_order_before_summary() {
        let (mut s, out) = session();
        s.testset("root", |s| {
            s.record(Outcome::fail("first"))?;
            s.testset("inner", |s| s.record(Outcome::error("second", "boom")))?;
            s.record(Outcome::fail("third"))?;
            Ok(())
        })
        .unwrap_err();

        let text = out.text();
        let first = text.find("Expression: first").unwrap();
        let second = text.find("Expression: second").unwrap();
        let third = text.find("Expression: third").unwrap();
        let summary = text.find("Test Summary:").unwrap();
        assert!(first < second && second < third && third < summary);
    }

    #[test]
    fn test_three_levels_with_one_error() {
        let (mut s, out) = session();
        let stack = Stack::from_frames(vec![
            Frame::new("testsets::checks::__check_outcome", "src/checks.rs", 10),
            Frame::new("my_tests::case_body", "tests/my.rs", 42),
            Frame::new("testsets::session::Session::testset", "src/session.rs", 1),
        ]);
        let result = s.testset("suite", |s| {
            s.testset("group", |s| {
                s.testset("case", |s| {
                    s.record(Outcome::error("parse()", "bad input").with_stack(stack))
                })?;
                Ok(())
            })?;
            Ok(())
        });

        let Err(Error::Failed(failure)) = result else {
            panic!("expected a failed root");
        };
        let recorded = failure.failures[0].stack().unwrap();
        assert_eq!(recorded.frames().len(), 1);
        assert_eq!(recorded.frames()[0].function.as_deref(), Some("my_tests::case_body"));

        assert_eq!(
            out.text(),
            concat!(
                "case: Error During Test\n",
                "  Test threw exception\n",
                "  Expression: parse()\n",
                "  bad input\n",
                "  Stacktrace:\n",
                "   [1] my_tests::case_body\n",
                "     @ tests/my.rs:42\n",
                "Test Summary: | Error  Total\n",
                "suite         |     1      1\n",
                "  group       |     1      1\n",
                "    case      |     1      1\n",
            )
        );
    }

    #[test]
    fn test_siblings_keep_order() {
        let (mut s, _out) = session();
        s.open("root");
        for name in ["one", "two", "three"] {
            s.testset(name, |_| Ok(())).unwrap();
        }
        let names: Vec<&str> = s.current().unwrap().subsets().map(TestSet::description).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_panic_in_body_is_recorded_as_error() {
        let (mut s, _out) = session();
        s.open("root");
        s.testset("explodes", |_| panic!("kaboom")).unwrap();
        let root = s.current().unwrap();
        let Some(Child::Set(set)) = root.children().first() else {
            panic!("expected a nested set");
        };
        let Some(Child::Outcome(outcome)) = set.children().first() else {
            panic!("expected an outcome");
        };
        assert_eq!(outcome.kind(), OutcomeKind::Error);
        assert_eq!(outcome.message(), Some("kaboom"));
    }

    #[test]
    fn test_body_left_open_sets_are_closed() {
        let (mut s, _out) = session();
        s.open("root");
        s.testset("outer", |s| {
            s.open("forgotten");
            s.record(Outcome::pass("p"))
        })
        .unwrap();
        assert_eq!(s.depth(), 1);
        let outer = s.current().unwrap().subsets().next().unwrap();
        assert_eq!(outer.subsets().next().unwrap().description(), "forgotten");
    }

    #[test]
    fn test_body_closing_its_own_set_is_unbalanced() {
        let (mut s, _out) = session();
        s.open("root");
        let result = s.testset("eager", |s| s.close().map(|_| ()));
        assert!(matches!(result, Err(Error::Unbalanced { .. })));
    }

    #[test]
    fn test_close_without_open_set() {
        let (mut s, _out) = session();
        assert!(matches!(s.close(), Err(Error::NoOpenScope)));
    }

    #[test]
    fn test_unscoped_failure_is_returned_immediately() {
        let (mut s, out) = session();
        s.record(Outcome::pass("fine")).unwrap();
        s.record(Outcome::broken("known")).unwrap();
        let err = s.record(Outcome::fail("bad")).unwrap_err();
        assert!(matches!(err, Error::Unscoped(_)));
        assert_eq!(out.text(), "Test Failed\n  Expression: bad\n");
    }

    #[test]
    fn test_printing_disabled_keeps_failure() {
        let buffer = Buffer::default();
        let config = Config::default().color(ColorChoice::Never).print_report(false);
        let mut s = Session::with_config(config).with_output(buffer.clone());
        let result = s.testset("quiet", |s| s.record(Outcome::fail("x")));
        assert!(matches!(result, Err(Error::Failed(_))));
        assert_eq!(buffer.text(), "");
    }

    #[test]
    fn test_wrappers_prefix_tags() {
        let (mut s, _out) = session();
        s.open("root");
        s.describe("Calculator", |s| {
            s.it("adds", |_| Ok(()))?;
            s.test("subtracts", |_| Ok(()))?;
            Ok(())
        })
        .unwrap();
        let calculator = s.current().unwrap().subsets().next().unwrap();
        assert_eq!(calculator.description(), "describe Calculator");
        let names: Vec<&str> = calculator.subsets().map(TestSet::description).collect();
        assert_eq!(names, vec!["it adds", "test subtracts"]);
    }
}
