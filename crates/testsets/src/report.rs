//! Aligned, colored summary tables and immediate failure output.
//!
//! A finished root set renders as:
//!
//! ```text
//! Test Summary: | Pass  Fail  Total
//! suite         |    3     1      4
//!   A           |    2            2
//!   B           |    1     1      2
//! ```

use crate::aggregate::{
    aggregate, column_alignment, text_width, Counts, HeaderWidths, BROKEN_LABEL, ERROR_LABEL,
    FAIL_LABEL, PASS_LABEL, TOTAL_LABEL,
};
use crate::outcome::{Outcome, OutcomeKind};
use crate::tree::TestSet;
use owo_colors::{OwoColorize, Style};
use std::io::{self, Write};

const SUMMARY_LABEL: &str = "Test Summary:";
const NO_TESTS: &str = "No tests";

#[derive(Debug, Default, Clone)]
pub(crate) struct Styles {
    pub(crate) is_colorized: bool,
    pub(crate) header: Style,
    pub(crate) description: Style,
    pub(crate) pass: Style,
    pub(crate) fail: Style,
    pub(crate) error: Style,
    pub(crate) broken: Style,
    pub(crate) total: Style,
}

impl Styles {
    pub(crate) fn colorize(&mut self) {
        self.is_colorized = true;
        self.header = Style::new().bold();
        self.description = Style::new().white();
        self.pass = Style::new().green();
        self.fail = Style::new().red();
        self.error = Style::new().red();
        self.broken = Style::new().yellow();
        self.total = Style::new().blue();
    }

    /// Bold variant of `style`, or plain text when uncolored.
    fn strong(&self, style: Style) -> Style {
        if self.is_colorized {
            style.bold()
        } else {
            style
        }
    }
}

/// Right-pad `text` with spaces to `width` terminal columns.
fn pad_right(text: &str, width: usize) -> String {
    let mut padded = text.to_string();
    padded.extend(std::iter::repeat(' ').take(width.saturating_sub(text_width(text))));
    padded
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{text:>width$}")
}

/// Print the summary table for a finished root set.
pub(crate) fn render_report(root: &TestSet, styles: &Styles, out: &mut dyn Write) -> io::Result<()> {
    let totals = aggregate(root);
    let align = column_alignment(root, 0).max(text_width(SUMMARY_LABEL));
    let widths = HeaderWidths::new(&totals);

    write_header(&totals, &widths, align, styles, out)?;
    write_rows(root, 0, &widths, align, styles, out)?;
    out.flush()
}

fn write_header(
    totals: &Counts,
    widths: &HeaderWidths,
    align: usize,
    styles: &Styles,
    out: &mut dyn Write,
) -> io::Result<()> {
    let header = styles.header;
    write!(out, "{} | ", pad_right(SUMMARY_LABEL, align).style(header))?;

    let cells = [
        (PASS_LABEL, widths.pass, styles.pass),
        (FAIL_LABEL, widths.fail, styles.fail),
        (ERROR_LABEL, widths.error, styles.error),
        (BROKEN_LABEL, widths.broken, styles.broken),
    ];
    for (label, width, style) in cells {
        if width > 0 {
            write!(out, "{}  ", pad_left(label, width).style(styles.strong(style)))?;
        }
    }

    if totals.total() == 0 {
        writeln!(out, "{}", NO_TESTS.style(styles.strong(styles.total)))
    } else {
        writeln!(
            out,
            "{}",
            pad_left(TOTAL_LABEL, widths.total).style(styles.strong(styles.total))
        )
    }
}

fn write_rows(
    set: &TestSet,
    depth: usize,
    widths: &HeaderWidths,
    align: usize,
    styles: &Styles,
    out: &mut dyn Write,
) -> io::Result<()> {
    let counts = aggregate(set);
    let label = format!("{}{}", "  ".repeat(depth), set.description());
    write!(out, "{} | ", pad_right(&label, align).style(styles.description))?;

    let cells = [
        (counts.passes, widths.pass, styles.pass),
        (counts.fails, widths.fail, styles.fail),
        (counts.errors, widths.error, styles.error),
        (counts.broken, widths.broken, styles.broken),
    ];
    for (count, width, style) in cells {
        if count > 0 {
            write!(out, "{}  ", pad_left(&count.to_string(), width).style(style))?;
        } else if width > 0 {
            write!(out, "{}  ", " ".repeat(width))?;
        }
    }

    if counts.total() == 0 {
        writeln!(out, "{}", NO_TESTS.style(styles.total))?;
    } else {
        writeln!(
            out,
            "{}",
            pad_left(&counts.total().to_string(), widths.total).style(styles.total)
        )?;
    }

    for nested in set.subsets() {
        write_rows(nested, depth + 1, widths, align, styles, out)?;
    }
    Ok(())
}

/// Print a Fail or Error the moment it is recorded into the set named
/// `description`.
pub(crate) fn write_failure(
    description: &str,
    outcome: &Outcome,
    styles: &Styles,
    out: &mut dyn Write,
) -> io::Result<()> {
    if !description.is_empty() {
        write!(out, "{}: ", description.style(styles.description))?;
    }
    let style = match outcome.kind() {
        OutcomeKind::Error => styles.error,
        _ => styles.fail,
    };
    let detail = outcome.to_string();
    let (headline, rest) = detail.split_once('\n').unwrap_or((detail.as_str(), ""));
    write!(out, "{}", headline.style(styles.strong(style)))?;
    if !rest.is_empty() {
        write!(out, "\n{rest}")?;
    }
    if outcome.kind() == OutcomeKind::Fail {
        if let Some(stack) = outcome.stack().filter(|s| !s.is_empty()) {
            write!(out, "\n  Stacktrace:\n{stack}")?;
        }
    }
    writeln!(out)?;
    out.flush()
}
