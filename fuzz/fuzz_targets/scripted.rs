#![no_main]

use libfuzzer_sys::fuzz_target;
use scriptsuite_rs::{run_tests, ScriptSource, ScriptedEnvironment};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let scripts = vec![ScriptSource::new("fuzz.js", input.to_string())];

    // Any source either loads or fails to load; neither may panic
    let report = match run_tests(ScriptedEnvironment::new(), &scripts, "") {
        Ok(report) => report,
        Err(_) => return,
    };

    let state = &report.state;
    assert!(state.failures() <= state.executed());
    assert!(state.executed() <= state.tests_run.len());
    assert_eq!(report.xml.is_some(), state.executed() > 0 && !report.status.is_fatal());
});
