//! JUnit-style XML report
//!
//! Rendered once, after every test has run, from the frozen [`RunState`].

use crate::run::{state::ms_to_seconds, RunState};
use std::fmt::Write;

/// Render the run as a `testsuite` document
///
/// `testcase` elements follow execution order. Tests that were filtered out
/// do not appear.
pub fn render(state: &RunState, suite_name: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    let _ = writeln!(
        output,
        "<testsuite name=\"{}\" failures=\"{}\" time=\"{}\">",
        escape(suite_name),
        state.failures(),
        ms_to_seconds(state.duration_ms)
    );

    for name in state.executed_names() {
        let seconds = state.durations[name];
        match state.failure_messages.get(name) {
            Some(message) => {
                let _ = writeln!(
                    output,
                    "  <testcase name=\"{}\" time=\"{}\">",
                    escape(name),
                    seconds
                );
                let _ = writeln!(output, "    <failure>{}</failure>", escape(message));
                let _ = writeln!(output, "  </testcase>");
            }
            None => {
                let _ = writeln!(
                    output,
                    "  <testcase name=\"{}\" time=\"{}\"/>",
                    escape(name),
                    seconds
                );
            }
        }
    }

    let _ = writeln!(output, "</testsuite>");
    output
}

/// Escape text for use in attribute values and character data
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // Not representable in XML 1.0
            c if (c as u32) < 0x20 && !matches!(c, '\n' | '\r' | '\t') => {
                let _ = write!(escaped, "\\u{{{:x}}}", c as u32);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}
