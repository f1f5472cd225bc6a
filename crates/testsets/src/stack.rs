//! Call stacks attached to failing checks, and scrubbing of the frames that
//! belong to the recording machinery rather than to the test body.

use std::fmt;
use std::sync::Arc;

/// One resolved stack frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub function: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Frame {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Frame {
            function: Some(function.into()),
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// Function name with any leading `<` of a trait-qualified path removed.
    fn path(&self) -> &str {
        self.function
            .as_deref()
            .map(|f| f.trim_start_matches('<'))
            .unwrap_or("")
    }
}

/// An ordered call stack, innermost frame first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Stack { frames }
    }

    /// Capture and resolve the current call stack.
    pub fn capture() -> Self {
        let backtrace = backtrace::Backtrace::new();
        let frames = backtrace
            .frames()
            .iter()
            .flat_map(|frame| frame.symbols())
            .map(|symbol| Frame {
                function: symbol.name().map(|name| format!("{name:#}")),
                file: symbol.filename().map(|path| path.display().to_string()),
                line: symbol.lineno(),
            })
            .collect();
        Stack { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Remove the frames `scrubber` identifies as machinery.
    ///
    /// Everything up to and including the leading run of internal frames is
    /// dropped, then the stack is cut at the first runner frame.
    pub fn scrub(&self, scrubber: &Scrubber) -> Stack {
        let mut frames = self.frames.as_slice();

        if let Some(first) = frames.iter().position(|f| (scrubber.internal)(f)) {
            let run = frames[first..]
                .iter()
                .take_while(|f| (scrubber.internal)(f))
                .count();
            let cut = first + run;
            // A stack made only of machinery is left alone.
            if cut < frames.len() {
                frames = &frames[cut..];
            }
        }

        if let Some(end) = frames.iter().position(|f| (scrubber.runner)(f)) {
            frames = &frames[..end];
        }

        Stack {
            frames: frames.to_vec(),
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "   [{}] {}", i + 1, frame.function.as_deref().unwrap_or("???"))?;
            if let Some(file) = &frame.file {
                write!(f, "\n     @ {file}")?;
                if let Some(line) = frame.line {
                    write!(f, ":{line}")?;
                }
            }
        }
        Ok(())
    }
}

type FramePredicate = Arc<dyn Fn(&Frame) -> bool + Send + Sync>;

/// Decides which frames of a captured stack belong to the machinery.
///
/// `internal` matches the recording/assertion frames sitting on top of the
/// test body; `runner` matches the frames of whatever invoked the test body.
#[derive(Clone)]
pub struct Scrubber {
    internal: FramePredicate,
    runner: FramePredicate,
}

impl Scrubber {
    pub fn new(
        internal: impl Fn(&Frame) -> bool + Send + Sync + 'static,
        runner: impl Fn(&Frame) -> bool + Send + Sync + 'static,
    ) -> Self {
        Scrubber {
            internal: Arc::new(internal),
            runner: Arc::new(runner),
        }
    }

    /// A scrubber that keeps every frame.
    pub fn keep_all() -> Self {
        Scrubber::new(|_| false, |_| false)
    }
}

impl Default for Scrubber {
    fn default() -> Self {
        Scrubber::new(
            |frame| {
                let path = frame.path();
                path.starts_with("testsets::") || path.starts_with("backtrace::")
            },
            |frame| {
                let path = frame.path();
                path.starts_with("testsets::")
                    || path.starts_with("std::panic")
                    || path.starts_with("core::panic")
            },
        )
    }
}

impl fmt::Debug for Scrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scrubber").finish_non_exhaustive()
    }
}
