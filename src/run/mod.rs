//! Test execution module

pub mod execution;
pub mod filter;
pub mod params;
pub mod state;

// Re-export public types
pub use execution::DiscoveredSuite;
pub use filter::TestFilter;
pub use params::{EntryPoints, RunParams};
pub use state::{RunState, TestResult};

use crate::bundle::ScriptSource;
use crate::env::ScriptEnvironment;
use crate::error::Result;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every executed test passed
    Passed,
    /// At least one test failed
    Failed,
    /// The run completed but no test executed
    NoTestsFound,
    /// A script threw while loading; nothing ran
    LoadFailed,
    /// The test registry was missing or malformed; nothing ran
    EnvironmentFailed,
}

impl RunStatus {
    pub fn is_success(self) -> bool {
        self == RunStatus::Passed
    }

    /// Whether the run was aborted before any test executed
    pub fn is_fatal(self) -> bool {
        matches!(self, RunStatus::LoadFailed | RunStatus::EnvironmentFailed)
    }
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub status: RunStatus,
    /// The human-readable log, or a diagnostic when the run was aborted
    pub output: String,
    /// The XML report; `None` when no test executed
    pub xml: Option<String>,
    /// The aggregate the reports were rendered from
    pub state: RunState,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.status.is_success()
    }
}

/// Run the tests registered by `scripts` whose names fully match `filter`
///
/// An empty filter runs everything. Only an invalid filter is returned as an
/// error; load failures, broken registries and failing tests are reported
/// through [`RunReport::status`].
pub fn run_tests<E: ScriptEnvironment>(
    env: E,
    scripts: &[ScriptSource],
    filter: &str,
) -> Result<RunReport> {
    let params = RunParams::new().filter(filter);
    run_with_params(env, scripts, &params)
}

/// Run tests with full control over the run parameters
#[tracing::instrument(skip_all, fields(scripts = scripts.len(), filter = %params.filter))]
pub fn run_with_params<E: ScriptEnvironment>(
    env: E,
    scripts: &[ScriptSource],
    params: &RunParams,
) -> Result<RunReport> {
    let filter = TestFilter::new(&params.filter)?;
    Ok(execution::run_impl(env, scripts, &filter, params))
}
