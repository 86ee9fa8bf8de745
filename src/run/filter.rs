//! Test name filtering

use crate::error::Result;
use regex::Regex;

/// A compiled full-match pattern over qualified test names
#[derive(Debug, Clone)]
pub struct TestFilter {
    regex: Regex,
}

impl TestFilter {
    /// Compile `pattern` so that it must match a whole test name
    ///
    /// An empty pattern matches every name.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = if pattern.is_empty() { ".*" } else { pattern };
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(TestFilter { regex })
    }

    /// Whether a test with this name should run
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}
