//! # scriptsuite-rs
//!
//! Runs test suites written in a dynamic scripting language inside one shared
//! interpreter context, and reports the results twice: as a console log in the
//! familiar `[ RUN      ]` / `[       OK ]` layout, and as a JUnit-style XML
//! document for CI.
//!
//! The interpreter itself is supplied by the caller through the
//! [`ScriptEnvironment`] trait. [`ScriptedEnvironment`] is a small built-in
//! implementation with a declarative suite language.

pub mod bundle;
pub mod env;
pub mod error;
pub mod report;
pub mod run;

pub use bundle::ScriptSource;
pub use env::{
    FunctionRef, Handle, Invocation, ScriptEnvironment, ScriptError, ScriptedEnvironment, Value,
};
pub use error::{Error, Result};
pub use run::{
    run_tests, run_with_params, EntryPoints, RunParams, RunReport, RunState, RunStatus,
    TestFilter, TestResult,
};

use std::path::Path;

/// Builder for configuring and running a set of scripts
///
/// # Examples
///
/// ```no_run
/// use scriptsuite_rs::{testsuite, ScriptedEnvironment};
///
/// let report = testsuite::from_dir("testdata", "*.js")
///     .unwrap()
///     .filter(r"math\..*")
///     .execute(ScriptedEnvironment::new())
///     .unwrap();
///
/// print!("{}", report.output);
/// if let Some(xml) = &report.xml {
///     std::fs::write("report.xml", xml).unwrap();
/// }
/// assert!(report.success());
/// ```
pub struct Builder {
    scripts: Vec<ScriptSource>,
    params: RunParams,
}

impl Builder {
    /// Create a new builder for the given scripts
    fn new(scripts: Vec<ScriptSource>) -> Self {
        Self {
            scripts,
            params: RunParams::new(),
        }
    }

    /// Only run tests whose full name matches this regular expression
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.params = self.params.filter(filter);
        self
    }

    /// Look up the test registry under different global names
    pub fn entry_points(mut self, entry_points: EntryPoints) -> Self {
        self.params = self.params.entry_points(entry_points);
        self
    }

    /// Set the suite name written to the XML report
    pub fn suite_name(mut self, name: impl Into<String>) -> Self {
        self.params = self.params.suite_name(name);
        self
    }

    /// The scripts that will be loaded, in order
    pub fn scripts(&self) -> &[ScriptSource] {
        &self.scripts
    }

    /// Load the scripts into `env` and run the matching tests
    ///
    /// The environment is dropped when the run finishes.
    pub fn execute<E: ScriptEnvironment>(self, env: E) -> Result<RunReport> {
        run_with_params(env, &self.scripts, &self.params)
    }
}

/// Entry points for building a run
pub mod testsuite {
    use super::*;

    /// Run the given scripts
    pub fn run(scripts: Vec<ScriptSource>) -> Builder {
        Builder::new(scripts)
    }

    /// Run every script in `dir` whose file name matches `pattern` (e.g. `*.js`)
    pub fn from_dir(dir: impl AsRef<Path>, pattern: &str) -> Result<Builder> {
        let scripts = bundle::load_dir(dir.as_ref(), pattern)?;
        Ok(Builder::new(scripts))
    }

    /// Run the scripts packed into a bundle file
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Builder> {
        let scripts = bundle::read(path.as_ref())?;
        Ok(Builder::new(scripts))
    }
}
