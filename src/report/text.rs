//! The console log built up while tests execute
//!
//! The markers match the layout log scrapers already understand:
//!
//! ```text
//! [----------]
//! [ RUN      ] math.add
//! adding
//! [       OK ] math.add (3 ms)
//! [ RUN      ] math.sub
//! [  FAILED  ] math.sub (1 ms)
//! [----------]
//!
//! [  FAILED  ]
//! ```

use crate::run::TestResult;

pub const RUN_MARKER: &str = "[ RUN      ]";
pub const OK_MARKER: &str = "[       OK ]";
pub const FAILED_MARKER: &str = "[  FAILED  ]";
pub const SUITE_MARKER: &str = "[----------]";
pub const PASSED_SUMMARY: &str = "[  PASSED  ]";
pub const FAILED_SUMMARY: &str = "[  FAILED  ]";

/// Replaces the whole log when no test executed
pub const NO_TESTS_FOUND: &str = "No tests found.\n";

/// Incrementally built textual report
#[derive(Debug, Default, Clone)]
pub struct TextLog {
    buffer: String,
}

impl TextLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_suite(&mut self) {
        self.line(SUITE_MARKER);
    }

    pub fn end_suite(&mut self) {
        self.line(SUITE_MARKER);
        self.buffer.push('\n');
    }

    /// Append a test's block: start line, captured output, result line
    pub fn test(&mut self, result: &TestResult) {
        self.line(&format!("{} {}", RUN_MARKER, result.name));
        self.buffer.push_str(&result.output);

        let status = if result.succeeded {
            OK_MARKER
        } else {
            FAILED_MARKER
        };
        self.line(&format!(
            "{} {} ({} ms)",
            status, result.name, result.duration_ms
        ));
    }

    /// Append the overall pass/fail line
    pub fn summary(&mut self, success: bool) {
        self.line(if success {
            PASSED_SUMMARY
        } else {
            FAILED_SUMMARY
        });
    }

    /// Append a free-form diagnostic line
    pub fn diagnostic(&mut self, text: &str) {
        self.line(text);
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }

    fn line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}
