//! Configuration parameters for a test run

use crate::env::{GET_TEST_FUNCTIONS_GLOBAL, TEST_SUITES_GLOBAL};

/// Suite name written on the XML report's root element
pub const DEFAULT_SUITE_NAME: &str = "Google JS tests";

/// Environment variable holding the default test filter
pub const FILTER_ENV_VAR: &str = "SCRIPTSUITE_FILTER";

/// Global expressions the engine evaluates to discover tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoints {
    /// Evaluates to the array of registered suites
    pub test_suites: String,
    /// Evaluates to a function mapping one suite to its test functions
    pub get_test_functions: String,
}

impl Default for EntryPoints {
    fn default() -> Self {
        EntryPoints {
            test_suites: TEST_SUITES_GLOBAL.to_string(),
            get_test_functions: GET_TEST_FUNCTIONS_GLOBAL.to_string(),
        }
    }
}

/// Configuration parameters for running tests
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Full-match regular expression selecting tests; empty runs everything
    pub filter: String,
    /// Where to find the test registry in the script context
    pub entry_points: EntryPoints,
    /// Name of the XML `testsuite` element
    pub suite_name: String,
}

impl RunParams {
    /// Create a new RunParams with default settings
    ///
    /// The filter starts out as the value of `SCRIPTSUITE_FILTER`, if set.
    pub fn new() -> Self {
        let filter = std::env::var(FILTER_ENV_VAR).unwrap_or_default();

        RunParams {
            filter,
            entry_points: EntryPoints::default(),
            suite_name: DEFAULT_SUITE_NAME.to_string(),
        }
    }

    /// Set the test filter
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Override the registry globals
    pub fn entry_points(mut self, entry_points: EntryPoints) -> Self {
        self.entry_points = entry_points;
        self
    }

    /// Set the name of the XML report's suite element
    pub fn suite_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }
}

impl Default for RunParams {
    fn default() -> Self {
        Self::new()
    }
}
