//! Outcomes of individual checks.

use crate::stack::Stack;
use std::fmt;

/// The four result categories a check can land in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Pass,
    Fail,
    Error,
    /// A known failure. Never counts against the run.
    Broken,
}

impl OutcomeKind {
    /// Fail and Error are the only kinds that make a run fail.
    pub fn is_failure(self) -> bool {
        matches!(self, OutcomeKind::Fail | OutcomeKind::Error)
    }
}

/// Where an outcome came from, which decides how it is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// A plain check evaluated by the assertion layer.
    Check,
    /// A check that was deliberately not evaluated. Recorded as Broken.
    Skipped,
    /// A check marked broken that held after all. Recorded as Error.
    UnexpectedPass,
    /// A panic or error raised by a set body outside of any check.
    OutsideCheck,
}

/// Source position of a check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Location {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// The result of one evaluated check.
///
/// Outcomes are immutable once built; the `with_*` methods consume and
/// return a new value.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    kind: OutcomeKind,
    origin: Origin,
    expression: String,
    evaluated: Option<String>,
    message: Option<String>,
    location: Option<Location>,
    stack: Option<Stack>,
}

impl Outcome {
    fn new(kind: OutcomeKind, origin: Origin, expression: impl Into<String>) -> Self {
        Outcome {
            kind,
            origin,
            expression: expression.into(),
            evaluated: None,
            message: None,
            location: None,
            stack: None,
        }
    }

    pub fn pass(expression: impl Into<String>) -> Self {
        Outcome::new(OutcomeKind::Pass, Origin::Check, expression)
    }

    pub fn fail(expression: impl Into<String>) -> Self {
        Outcome::new(OutcomeKind::Fail, Origin::Check, expression)
    }

    /// A check that could not be evaluated, e.g. because it panicked.
    pub fn error(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Outcome::new(OutcomeKind::Error, Origin::Check, expression).with_message(message)
    }

    pub fn broken(expression: impl Into<String>) -> Self {
        Outcome::new(OutcomeKind::Broken, Origin::Check, expression)
    }

    pub fn skipped(expression: impl Into<String>) -> Self {
        Outcome::new(OutcomeKind::Broken, Origin::Skipped, expression)
    }

    pub fn unexpected_pass(expression: impl Into<String>) -> Self {
        Outcome::new(OutcomeKind::Error, Origin::UnexpectedPass, expression)
    }

    /// A panic or error that escaped a set body without going through a check.
    pub fn outside_check(message: impl Into<String>) -> Self {
        Outcome::new(OutcomeKind::Error, Origin::OutsideCheck, "").with_message(message)
    }

    /// Outcome for a check known to be broken: Broken while it still fails,
    /// Error once it unexpectedly holds.
    pub fn from_broken_check(expression: impl Into<String>, held: bool) -> Self {
        if held {
            Outcome::unexpected_pass(expression)
        } else {
            Outcome::broken(expression)
        }
    }

    /// Converts the result of a `googletest` verification.
    #[cfg(feature = "googletest")]
    pub fn from_verification(expression: impl Into<String>, result: googletest::Result<()>) -> Self {
        match result {
            Ok(()) => Outcome::pass(expression),
            Err(failure) => Outcome::fail(expression).with_message(failure.to_string()),
        }
    }

    pub fn with_evaluated(mut self, evaluated: impl Into<String>) -> Self {
        self.evaluated = Some(evaluated.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_stack(mut self, stack: Stack) -> Self {
        self.stack = Some(stack);
        self
    }

    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn evaluated(&self) -> Option<&str> {
        self.evaluated.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn stack(&self) -> Option<&Stack> {
        self.stack.as_ref()
    }

    fn write_location(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, " at {location}"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.origin) {
            (OutcomeKind::Pass, _) => {
                f.write_str("Test Passed")?;
                self.write_location(f)?;
            }
            (OutcomeKind::Fail, _) => {
                f.write_str("Test Failed")?;
                self.write_location(f)?;
            }
            (OutcomeKind::Broken, Origin::Skipped) => f.write_str("Test Broken (skipped)")?,
            (OutcomeKind::Broken, _) => f.write_str("Test Broken")?,
            (OutcomeKind::Error, Origin::UnexpectedPass) => {
                f.write_str("Unexpected Pass")?;
                self.write_location(f)?;
            }
            (OutcomeKind::Error, origin) => {
                f.write_str("Error During Test")?;
                self.write_location(f)?;
                if origin == Origin::OutsideCheck {
                    f.write_str("\n  Got exception outside of a check")?;
                } else {
                    f.write_str("\n  Test threw exception")?;
                }
            }
        }

        if !self.expression.is_empty() {
            write!(f, "\n  Expression: {}", self.expression)?;
        }
        if let Some(evaluated) = &self.evaluated {
            write!(f, "\n   Evaluated: {evaluated}")?;
        }
        if self.origin == Origin::UnexpectedPass {
            f.write_str("\n  Got correct result, please change to a plain check if no longer broken.")?;
        }
        if let Some(message) = &self.message {
            for line in message.lines() {
                write!(f, "\n  {line}")?;
            }
        }
        // Errors carry their own trace; Fail traces are printed by the recorder.
        if self.kind == OutcomeKind::Error {
            if let Some(stack) = self.stack.as_ref().filter(|s| !s.is_empty()) {
                write!(f, "\n  Stacktrace:\n{stack}")?;
            }
        }
        Ok(())
    }
}
