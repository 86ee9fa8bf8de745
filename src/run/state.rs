//! Aggregated results of one run

use std::collections::HashMap;

/// The outcome of executing one test
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    /// Qualified test name
    pub name: String,
    pub succeeded: bool,
    /// Output captured while the test ran
    pub output: String,
    /// Failure text with surrounding whitespace removed
    pub failure_message: Option<String>,
    pub duration_ms: u64,
}

/// Results accumulated while iterating over the discovered tests
///
/// `tests_run` lists every discovered name in discovery order. Names without an
/// entry in `durations` were filtered out and never executed.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub tests_run: Vec<String>,
    /// Seconds per executed test
    pub durations: HashMap<String, f64>,
    /// Trimmed failure message per failed test
    pub failure_messages: HashMap<String, String>,
    pub success: bool,
    /// Wall-clock time of discovery plus iteration
    pub duration_ms: u64,
}

impl RunState {
    pub fn new() -> Self {
        RunState {
            tests_run: Vec::new(),
            durations: HashMap::new(),
            failure_messages: HashMap::new(),
            success: true,
            duration_ms: 0,
        }
    }

    /// Record a discovered test that did not match the filter
    pub fn record_skipped(&mut self, name: &str) {
        self.tests_run.push(name.to_string());
    }

    /// Fold one executed test into the aggregate
    pub fn record(&mut self, result: &TestResult) {
        self.tests_run.push(result.name.clone());
        self.durations
            .insert(result.name.clone(), ms_to_seconds(result.duration_ms));

        if !result.succeeded {
            self.success = false;
            self.failure_messages.insert(
                result.name.clone(),
                result.failure_message.clone().unwrap_or_default(),
            );
        }
    }

    /// Number of tests that actually executed
    pub fn executed(&self) -> usize {
        self.durations.len()
    }

    /// Number of executed tests that failed
    pub fn failures(&self) -> usize {
        self.failure_messages.len()
    }

    /// Executed test names in execution order
    pub fn executed_names(&self) -> impl Iterator<Item = &str> {
        self.tests_run
            .iter()
            .map(String::as_str)
            .filter(|name| self.durations.contains_key(*name))
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert milliseconds to fractional seconds
pub fn ms_to_seconds(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, failure: Option<&str>, ms: u64) -> TestResult {
        TestResult {
            name: name.to_string(),
            succeeded: failure.is_none(),
            output: String::new(),
            failure_message: failure.map(str::to_string),
            duration_ms: ms,
        }
    }

    #[test]
    fn records_preserve_invariants() {
        let mut state = RunState::new();
        state.record(&result("a.one", None, 10));
        state.record_skipped("a.two");
        state.record(&result("a.three", Some("boom"), 1234));

        assert_eq!(state.tests_run, vec!["a.one", "a.two", "a.three"]);
        assert_eq!(state.executed(), 2);
        assert_eq!(state.failures(), 1);
        assert!(!state.success);
        assert_eq!(state.durations["a.three"], 1.234);
        assert_eq!(state.failure_messages["a.three"], "boom");
        assert_eq!(
            state.executed_names().collect::<Vec<_>>(),
            vec!["a.one", "a.three"]
        );

        assert!(state.failures() <= state.executed());
        assert!(state.executed() <= state.tests_run.len());
    }

    #[test]
    fn passing_tests_keep_success() {
        let mut state = RunState::new();
        state.record(&result("x", None, 0));
        assert!(state.success);
        assert!(state.failure_messages.is_empty());
    }

    #[test]
    fn failure_without_message_is_recorded() {
        let mut state = RunState::new();
        let mut failed = result("x", None, 0);
        failed.succeeded = false;
        state.record(&failed);
        assert_eq!(state.failure_messages["x"], "");
        assert!(!state.success);
    }
}
