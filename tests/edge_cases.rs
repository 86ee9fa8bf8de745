//! Edge case tests for unusual names, output and failure text

use scriptsuite_rs::{bundle, run_tests, RunStatus, ScriptSource, ScriptedEnvironment};

#[test]
fn test_unicode_names_and_output() {
    let scripts = vec![ScriptSource::new(
        "unicode_test.js",
        "suite 国际化\ntest héllo\n  print \"🚀 launched\"\nend",
    )];

    let report = run_tests(ScriptedEnvironment::new(), &scripts, "").unwrap();
    assert!(report.success());
    assert!(report.output.contains("[ RUN      ] 国际化.héllo\n🚀 launched\n"));
    assert!(report.xml.unwrap().contains("<testcase name=\"国际化.héllo\""));
}

#[test]
fn test_filter_treats_dots_as_regex() {
    let scripts = vec![ScriptSource::new(
        "dots_test.js",
        "suite a\ntest b\nend\nsuite aXb\ntest c\nend",
    )];

    // Unescaped '.' also matches other characters
    let report = run_tests(ScriptedEnvironment::new(), &scripts, "a.b.*").unwrap();
    assert_eq!(report.state.executed(), 2);

    let report = run_tests(ScriptedEnvironment::new(), &scripts, r"a\.b").unwrap();
    assert_eq!(report.state.executed_names().collect::<Vec<_>>(), vec!["a.b"]);
}

#[test]
fn test_markup_in_failure_is_escaped() {
    let scripts = vec![ScriptSource::new(
        "markup_test.js",
        "suite xml\ntest markup\n  fail \"</failure><injected attr='1'> & more\"\nend",
    )];

    let report = run_tests(ScriptedEnvironment::new(), &scripts, "").unwrap();
    assert_eq!(report.status, RunStatus::Failed);

    let xml = report.xml.unwrap();
    assert_eq!(xml.matches("</failure>").count(), 1);
    assert!(xml.contains(
        "<failure>&lt;/failure&gt;&lt;injected attr=&apos;1&apos;&gt; &amp; more</failure>"
    ));
}

#[test]
fn test_whitespace_only_failure_message() {
    let scripts = vec![ScriptSource::new(
        "blank_test.js",
        "suite s\ntest blank\n  fail \"   \"\nend",
    )];

    let report = run_tests(ScriptedEnvironment::new(), &scripts, "").unwrap();
    assert_eq!(report.state.failure_messages["s.blank"], "");
    assert!(report.xml.unwrap().contains("<failure></failure>"));
}

#[test]
fn test_bundle_with_comment_preamble_and_empty_scripts() {
    let scripts = bundle::parse(
        "This bundle was generated.\n-- empty.js --\n-- real.js --\nsuite s\ntest t\nend\n",
    )
    .unwrap();
    assert_eq!(scripts.len(), 2);

    let report = run_tests(ScriptedEnvironment::new(), &scripts, "").unwrap();
    assert!(report.success());
}

#[test]
fn test_many_suites_keep_discovery_order() {
    let mut source = String::new();
    for i in (0..20).rev() {
        source.push_str(&format!("suite s{:02}\ntest t\nend\n", i));
    }
    let scripts = vec![ScriptSource::new("many_test.js", source)];

    let report = run_tests(ScriptedEnvironment::new(), &scripts, "").unwrap();
    let executed: Vec<String> = report.state.executed_names().map(str::to_string).collect();
    let expected: Vec<String> = (0..20).rev().map(|i| format!("s{:02}.t", i)).collect();
    assert_eq!(executed, expected);
}
