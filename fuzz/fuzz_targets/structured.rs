#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scriptsuite_rs::{bundle, run_tests, RunStatus, ScriptedEnvironment};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    suites: Vec<FuzzSuite>,
    filter: String,
}

#[derive(Arbitrary, Debug)]
struct FuzzSuite {
    name: u8,
    tests: Vec<FuzzTest>,
}

#[derive(Arbitrary, Debug)]
struct FuzzTest {
    name: u8,
    output: Vec<String>,
    failure: Option<String>,
    elapsed: u16,
}

impl FuzzInput {
    fn to_bundle(&self) -> String {
        let mut text = String::new();
        for (i, suite) in self.suites.iter().enumerate() {
            text.push_str(&format!("-- suite_{}.js --\n", i));
            text.push_str(&format!("suite s{}\n", suite.name));
            for test in &suite.tests {
                text.push_str(&format!("test t{}\n", test.name));
                for line in &test.output {
                    text.push_str(&format!("  print {:?}\n", line));
                }
                text.push_str(&format!("  elapsed {}\n", test.elapsed));
                if let Some(failure) = &test.failure {
                    text.push_str(&format!("  fail {:?}\n", failure));
                }
                text.push_str("end\n");
            }
        }
        text
    }
}

fuzz_target!(|input: FuzzInput| {
    let scripts = match bundle::parse(&input.to_bundle()) {
        Ok(scripts) => scripts,
        Err(_) => return,
    };

    let report = match run_tests(ScriptedEnvironment::new(), &scripts, &input.filter) {
        Ok(report) => report,
        Err(_) => return,
    };

    match report.status {
        RunStatus::Passed | RunStatus::Failed => {
            let xml = report.xml.expect("completed runs render xml");
            assert_eq!(
                xml.matches("<testcase ").count(),
                report.state.executed(),
                "every executed test appears once"
            );
            assert_eq!(report.success(), report.state.failure_messages.is_empty());
        }
        _ => assert!(report.xml.is_none()),
    }
});
