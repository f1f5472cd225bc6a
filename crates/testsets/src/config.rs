//! Session configuration.

use crate::error::Error;
use crate::report::Styles;
use crate::stack::Scrubber;
use std::str::FromStr;

const COLOR_VAR: &str = "TESTSETS_COLOR";
const PRINT_VAR: &str = "TESTSETS_PRINT";

/// When to color output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Color when stdout is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                // Respect NO_COLOR env var (https://no-color.org/)
                if std::env::var_os("NO_COLOR").is_some() {
                    return false;
                }
                std::io::IsTerminal::is_terminal(&std::io::stdout())
            }
        }
    }
}

impl FromStr for ColorChoice {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(()),
        }
    }
}

/// Configuration of a [`Session`](crate::Session).
#[derive(Clone, Debug, Default)]
pub struct Config {
    color: ColorChoice,
    print_report: Option<bool>,
    scrubber: Scrubber,
}

impl Config {
    /// Read `TESTSETS_COLOR` (`auto`, `always`, `never`) and `TESTSETS_PRINT`
    /// (`1`, `0`, `true`, `false`).
    pub fn from_env() -> Result<Self, Error> {
        Config::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Config::default();

        if let Some(value) = lookup(COLOR_VAR).filter(|v| !v.is_empty()) {
            config.color = value.parse().map_err(|()| Error::InvalidEnv {
                var: COLOR_VAR,
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup(PRINT_VAR).filter(|v| !v.is_empty()) {
            let enabled = match value.trim() {
                "1" => true,
                "0" => false,
                v if v.eq_ignore_ascii_case("true") => true,
                v if v.eq_ignore_ascii_case("false") => false,
                _ => {
                    return Err(Error::InvalidEnv {
                        var: PRINT_VAR,
                        value: value.clone(),
                    })
                }
            };
            config.print_report = Some(enabled);
        }

        Ok(config)
    }

    pub fn color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Override the process-wide print switch for this session.
    pub fn print_report(mut self, enabled: bool) -> Self {
        self.print_report = Some(enabled);
        self
    }

    pub fn scrubber(mut self, scrubber: Scrubber) -> Self {
        self.scrubber = scrubber;
        self
    }

    pub(crate) fn printing(&self) -> bool {
        self.print_report.unwrap_or_else(crate::report_printing)
    }

    pub(crate) fn frame_scrubber(&self) -> &Scrubber {
        &self.scrubber
    }

    pub(crate) fn styles(&self) -> Styles {
        let mut styles = Styles::default();
        if self.color.should_colorize() {
            styles.colorize();
        }
        styles
    }
}
