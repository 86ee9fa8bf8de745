//! Loading, discovery and test execution

use crate::bundle::ScriptSource;
use crate::env::{FunctionRef, ScriptEnvironment, Value};
use crate::error::{Error, Result};
use crate::report::text::NO_TESTS_FOUND;
use crate::report::{xml, TextLog};
use crate::run::filter::TestFilter;
use crate::run::params::{EntryPoints, RunParams};
use crate::run::state::{RunState, TestResult};
use crate::run::{RunReport, RunStatus};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A suite's tests as returned by the registry, in enumeration order
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredSuite {
    pub tests: Vec<(String, FunctionRef)>,
}

/// Run every matching test in a fresh environment - main implementation
///
/// The environment is consumed: its context lives exactly as long as the run.
pub fn run_impl<E: ScriptEnvironment>(
    mut env: E,
    scripts: &[ScriptSource],
    filter: &TestFilter,
    params: &RunParams,
) -> RunReport {
    let mut log = TextLog::new();
    let mut state = RunState::new();

    if let Err(e) = load_scripts(&mut env, scripts) {
        warn!(error = %e, "script failed to load; no tests will run");
        log.diagnostic(&e.to_string());
        return fatal(RunStatus::LoadFailed, log, state);
    }

    let timer = Instant::now();

    let suites = match discover(&mut env, &params.entry_points) {
        Ok(suites) => suites,
        Err(e) => {
            warn!(error = %e, "test discovery failed; no tests will run");
            log.diagnostic(&e.to_string());
            return fatal(RunStatus::EnvironmentFailed, log, state);
        }
    };

    for suite in &suites {
        log.start_suite();
        for (name, function) in &suite.tests {
            if !filter.matches(name) {
                state.record_skipped(name);
                continue;
            }

            let result = execute_test(&mut env, name, *function);
            log.test(&result);
            state.record(&result);
        }
        log.end_suite();
    }

    state.duration_ms = timer.elapsed().as_millis() as u64;
    log.summary(state.success);

    // A run where nothing executed usually means tests were never registered
    if state.executed() == 0 {
        warn!(suites = suites.len(), "no tests found");
        state.success = false;
        return RunReport {
            status: RunStatus::NoTestsFound,
            output: NO_TESTS_FOUND.to_string(),
            xml: None,
            state,
        };
    }

    info!(
        executed = state.executed(),
        failures = state.failures(),
        duration_ms = state.duration_ms,
        "test run finished"
    );

    let xml = xml::render(&state, &params.suite_name);
    let status = if state.success {
        RunStatus::Passed
    } else {
        RunStatus::Failed
    };

    RunReport {
        status,
        output: log.into_string(),
        xml: Some(xml),
        state,
    }
}

/// Load each script in order, stopping at the first one that throws
///
/// Scripts loaded before the failure stay in the context.
pub fn load_scripts<E: ScriptEnvironment>(env: &mut E, scripts: &[ScriptSource]) -> Result<()> {
    for script in scripts {
        env.load(script).map_err(|source| Error::Load {
            script: script.name.clone(),
            source,
        })?;
        debug!(script = %script.name, "loaded script");
    }
    Ok(())
}

/// Resolve the test registry and list every suite's tests
///
/// Anything other than the expected shapes is an environment error.
pub fn discover<E: ScriptEnvironment>(
    env: &mut E,
    entry_points: &EntryPoints,
) -> Result<Vec<DiscoveredSuite>> {
    let get_test_functions = match resolve(env, &entry_points.get_test_functions)? {
        Value::Function(function) => function,
        other => {
            return Err(Error::environment_error(format!(
                "{} is not a function (got {})",
                entry_points.get_test_functions,
                other.kind()
            )))
        }
    };

    let suites = match resolve(env, &entry_points.test_suites)? {
        Value::Array(suites) => suites,
        other => {
            return Err(Error::environment_error(format!(
                "{} is not an array (got {})",
                entry_points.test_suites,
                other.kind()
            )))
        }
    };

    let mut seen = HashSet::new();
    let mut discovered = Vec::with_capacity(suites.len());

    for (index, suite) in suites.into_iter().enumerate() {
        if !suite.is_object() {
            return Err(Error::environment_error(format!(
                "test suite {} is not an object (got {})",
                index,
                suite.kind()
            )));
        }

        let functions = env.call(get_test_functions, &[suite]).map_err(|e| {
            Error::environment_error(format!(
                "{} failed for test suite {}: {}",
                entry_points.get_test_functions, index, e
            ))
        })?;

        let properties = match functions {
            Value::Record(properties) => properties,
            other => {
                return Err(Error::environment_error(format!(
                    "test functions for suite {} are not an object (got {})",
                    index,
                    other.kind()
                )))
            }
        };

        let mut tests = Vec::with_capacity(properties.len());
        for (name, value) in properties {
            let function = match value {
                Value::Function(function) => function,
                other => {
                    return Err(Error::environment_error(format!(
                        "test '{}' is not a function (got {})",
                        name,
                        other.kind()
                    )))
                }
            };

            if !seen.insert(name.clone()) {
                return Err(Error::environment_error(format!(
                    "test '{}' is registered more than once",
                    name
                )));
            }
            tests.push((name, function));
        }

        debug!(suite = index, tests = tests.len(), "discovered test suite");
        discovered.push(DiscoveredSuite { tests });
    }

    Ok(discovered)
}

/// Invoke one test and turn the environment's report into a result
pub fn execute_test<E: ScriptEnvironment>(
    env: &mut E,
    name: &str,
    function: FunctionRef,
) -> TestResult {
    let invocation = env.invoke(function);

    let failure_message = if invocation.succeeded {
        None
    } else {
        Some(
            invocation
                .failure_message
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_string(),
        )
    };

    debug!(
        test = name,
        succeeded = invocation.succeeded,
        duration_ms = invocation.duration_ms,
        "test finished"
    );

    TestResult {
        name: name.to_string(),
        succeeded: invocation.succeeded,
        output: invocation.output,
        failure_message,
        duration_ms: invocation.duration_ms,
    }
}

fn resolve<E: ScriptEnvironment>(env: &mut E, expression: &str) -> Result<Value> {
    env.eval_global(expression).map_err(|e| {
        Error::environment_error(format!("cannot resolve {}: {}", expression, e))
    })
}

fn fatal(status: RunStatus, log: TextLog, mut state: RunState) -> RunReport {
    state.success = false;
    RunReport {
        status,
        output: log.into_string(),
        xml: None,
        state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ScriptedEnvironment;

    fn env_with(source: &str) -> ScriptedEnvironment {
        let mut env = ScriptedEnvironment::new();
        env.load(&ScriptSource::new("t.js", source)).unwrap();
        env
    }

    #[test]
    fn discover_lists_suites_in_registration_order() {
        let mut env = env_with("suite b\ntest one\nend\nsuite a\ntest two\nend\ntest three\nend");
        let suites = discover(&mut env, &EntryPoints::default()).unwrap();
        let names: Vec<Vec<&str>> = suites
            .iter()
            .map(|s| s.tests.iter().map(|(n, _)| n.as_str()).collect())
            .collect();
        assert_eq!(names, vec![vec!["b.one"], vec!["a.two", "a.three"]]);
    }

    #[test]
    fn discover_rejects_duplicate_names() {
        let mut env = env_with("suite s\ntest dup\nend\nsuite s\ntest dup\nend");
        let err = discover(&mut env, &EntryPoints::default()).unwrap_err();
        assert!(err.to_string().contains("registered more than once"));
    }

    #[test]
    fn discover_rejects_non_function_lookup() {
        let mut env = env_with("set gjstest.internal.getTestFunctions 7");
        let err = discover(&mut env, &EntryPoints::default()).unwrap_err();
        assert!(matches!(err, Error::Environment { .. }));
        assert!(err.to_string().contains("is not a function (got primitive)"));
    }

    #[test]
    fn execute_test_trims_failure_message() {
        let mut env = env_with("suite s\ntest t\n  fail \"  spaced out  \"\nend");
        let result = execute_test(&mut env, "s.t", FunctionRef::new(1));
        assert!(!result.succeeded);
        assert_eq!(result.failure_message.as_deref(), Some("spaced out"));
    }

    #[test]
    fn load_stops_at_first_failure() {
        let mut env = ScriptedEnvironment::new();
        let scripts = vec![
            ScriptSource::new("a.js", "set a 1"),
            ScriptSource::new("b.js", "throw nope"),
            ScriptSource::new("c.js", "set c 1"),
        ];
        let err = load_scripts(&mut env, &scripts).unwrap_err();
        assert!(matches!(err, Error::Load { ref script, .. } if script == "b.js"));
        assert_eq!(env.global("a"), Some("1"));
        assert_eq!(env.global("c"), None);
    }
}
