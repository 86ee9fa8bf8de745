//! Writing the textual report to a terminal
//!
//! With the `colors` feature enabled, status markers are colored when stdout
//! is a terminal. Without it the log is written unchanged.

use super::text::{FAILED_MARKER, OK_MARKER, PASSED_SUMMARY, RUN_MARKER, SUITE_MARKER};
use std::io::{self, Write};

/// Visual category of one log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Passed,
    Failed,
    Started,
    Boundary,
    Plain,
}

/// Classify a log line by its leading marker
pub fn classify(line: &str) -> LineKind {
    if line.starts_with(OK_MARKER) || line.starts_with(PASSED_SUMMARY) {
        LineKind::Passed
    } else if line.starts_with(FAILED_MARKER) {
        LineKind::Failed
    } else if line.starts_with(RUN_MARKER) {
        LineKind::Started
    } else if line.starts_with(SUITE_MARKER) {
        LineKind::Boundary
    } else {
        LineKind::Plain
    }
}

/// Print a textual report to stdout
pub fn print(log: &str) -> io::Result<()> {
    #[cfg(feature = "colors")]
    {
        use termcolor::{ColorChoice, StandardStream};

        let choice = if atty::is(atty::Stream::Stdout) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stdout = StandardStream::stdout(choice);
        write_colored(&mut stdout, log)
    }

    #[cfg(not(feature = "colors"))]
    {
        let stdout = io::stdout();
        write_to(&mut stdout.lock(), log)
    }
}

/// Write a textual report unchanged
pub fn write_to<W: Write>(out: &mut W, log: &str) -> io::Result<()> {
    out.write_all(log.as_bytes())?;
    out.flush()
}

/// Write a textual report, coloring the marker lines
#[cfg(feature = "colors")]
pub fn write_colored<W: termcolor::WriteColor>(out: &mut W, log: &str) -> io::Result<()> {
    use termcolor::{Color, ColorSpec};

    for line in log.split_inclusive('\n') {
        let color = match classify(line) {
            LineKind::Passed => Some(Color::Green),
            LineKind::Failed => Some(Color::Red),
            LineKind::Started | LineKind::Boundary => Some(Color::Cyan),
            LineKind::Plain => None,
        };

        match color {
            Some(color) => {
                out.set_color(ColorSpec::new().set_fg(Some(color)))?;
                out.write_all(line.as_bytes())?;
                out.reset()?;
            }
            None => out.write_all(line.as_bytes())?,
        }
    }

    out.flush()
}
