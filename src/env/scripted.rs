//! A small line-oriented script environment
//!
//! `ScriptedEnvironment` implements [`ScriptEnvironment`] for a tiny
//! declarative language. It registers suites and tests in the same global
//! registry a real JavaScript test library would, which makes it useful for
//! driving the engine end to end.
//!
//! ```text
//! # Comments start with '#'
//! set greeting "hello world"
//!
//! suite strings
//! test greeting
//!   print "checking the greeting"
//!   expect greeting "hello world"
//! end
//! ```
//!
//! Top-level commands run when the script is loaded: `suite NAME`,
//! `test NAME` ... `end`, `set NAME VALUE`, `require NAME`, `throw MESSAGE`,
//! and `delete NAME`. Inside a test block the steps `print TEXT`,
//! `set NAME VALUE`, `expect NAME VALUE`, `fail MESSAGE` and `elapsed MS` run
//! each time the test is invoked.

use super::{
    FunctionRef, Handle, Invocation, ScriptEnvironment, ScriptError, Value,
    GET_TEST_FUNCTIONS_GLOBAL, TEST_SUITES_GLOBAL,
};
use crate::bundle::ScriptSource;
use std::collections::HashMap;
use std::time::Instant;

/// Function id of the built-in suite-to-tests lookup
const LOOKUP_FUNCTION_ID: u64 = 0;

#[derive(Debug, Clone)]
enum Binding {
    Primitive(String),
    SuiteList,
    TestFunctionsLookup,
}

#[derive(Debug)]
struct Suite {
    name: String,
    tests: Vec<usize>,
}

#[derive(Debug)]
struct TestFunction {
    name: String,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Print(String),
    Set(String, String),
    Expect(String, String),
    Fail(String),
    Elapsed(u64),
}

/// Script environment for the declarative suite language
#[derive(Debug)]
pub struct ScriptedEnvironment {
    globals: HashMap<String, Binding>,
    suites: Vec<Suite>,
    tests: Vec<TestFunction>,
}

impl ScriptedEnvironment {
    /// Create a fresh context with the test registry globals bound
    pub fn new() -> Self {
        let mut globals = HashMap::new();
        globals.insert(TEST_SUITES_GLOBAL.to_string(), Binding::SuiteList);
        globals.insert(
            GET_TEST_FUNCTIONS_GLOBAL.to_string(),
            Binding::TestFunctionsLookup,
        );

        ScriptedEnvironment {
            globals,
            suites: Vec::new(),
            tests: Vec::new(),
        }
    }

    /// Current value of a primitive global, if bound
    pub fn global(&self, name: &str) -> Option<&str> {
        match self.globals.get(name) {
            Some(Binding::Primitive(value)) => Some(value),
            _ => None,
        }
    }

    fn execute_line(
        &mut self,
        script: &str,
        line_num: usize,
        tokens: &[String],
    ) -> Result<(), ScriptError> {
        let (command, args) = match tokens.split_first() {
            Some(split) => split,
            None => return Ok(()),
        };

        match (command.as_str(), args) {
            ("suite", [name]) => {
                self.suites.push(Suite {
                    name: name.clone(),
                    tests: Vec::new(),
                });
            }
            ("set", [name, value]) => {
                self.globals
                    .insert(name.clone(), Binding::Primitive(value.clone()));
            }
            ("require", [name]) => {
                if !self.globals.contains_key(name) {
                    return Err(ScriptError::new(format!(
                        "ReferenceError: {} is not defined",
                        name
                    ))
                    .at(script, line_num));
                }
            }
            ("throw", message) if !message.is_empty() => {
                return Err(
                    ScriptError::new(format!("Error: {}", message.join(" "))).at(script, line_num)
                );
            }
            ("delete", [name]) => {
                self.globals.remove(name);
            }
            ("end", []) => {
                return Err(
                    ScriptError::new("SyntaxError: 'end' outside of a test").at(script, line_num)
                );
            }
            _ => {
                return Err(ScriptError::new(format!(
                    "SyntaxError: Invalid command '{}'",
                    tokens.join(" ")
                ))
                .at(script, line_num));
            }
        }

        Ok(())
    }

    fn register_test(
        &mut self,
        script: &str,
        line_num: usize,
        name: &str,
        steps: Vec<Step>,
    ) -> Result<(), ScriptError> {
        let suite = self.suites.last_mut().ok_or_else(|| {
            ScriptError::new(format!("Error: test '{}' declared outside of a suite", name))
                .at(script, line_num)
        })?;

        self.tests.push(TestFunction {
            name: format!("{}.{}", suite.name, name),
            steps,
        });
        suite.tests.push(self.tests.len() - 1);
        Ok(())
    }

    fn test_index(&self, function: FunctionRef) -> Option<usize> {
        let index = function.id().checked_sub(1)? as usize;
        (index < self.tests.len()).then_some(index)
    }

    fn test_functions_for(&self, args: &[Value]) -> Result<Value, ScriptError> {
        let suite = match args.first() {
            Some(Value::Object(handle)) => self.suites.get(handle.id() as usize),
            _ => None,
        }
        .ok_or_else(|| ScriptError::new("TypeError: argument is not a test suite"))?;

        let functions = suite
            .tests
            .iter()
            .map(|&index| {
                (
                    self.tests[index].name.clone(),
                    Value::Function(FunctionRef::new(index as u64 + 1)),
                )
            })
            .collect();

        Ok(Value::Record(functions))
    }

    /// Run a test's steps, returning its output, failure and duration override
    fn run_steps(&mut self, index: usize) -> (String, Option<String>, Option<u64>) {
        let steps = self.tests[index].steps.clone();
        let mut output = String::new();
        let mut elapsed = None;

        for step in steps {
            match step {
                Step::Print(text) => {
                    output.push_str(&text);
                    output.push('\n');
                }
                Step::Set(name, value) => {
                    self.globals.insert(name, Binding::Primitive(value));
                }
                Step::Expect(name, expected) => match self.global(&name) {
                    Some(actual) if actual == expected => {}
                    Some(actual) => {
                        let message = format!(
                            "Expected {} to be {}, but was {}\n",
                            name, expected, actual
                        );
                        return (output, Some(message), elapsed);
                    }
                    None => {
                        let message = format!("ReferenceError: {} is not defined\n", name);
                        return (output, Some(message), elapsed);
                    }
                },
                Step::Fail(message) => {
                    return (output, Some(format!("{}\n", message)), elapsed);
                }
                Step::Elapsed(ms) => elapsed = Some(ms),
            }
        }

        (output, None, elapsed)
    }
}

impl Default for ScriptedEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEnvironment for ScriptedEnvironment {
    fn load(&mut self, script: &ScriptSource) -> Result<(), ScriptError> {
        let lines: Vec<&str> = script.source.lines().collect();
        let mut i = 0;

        while i < lines.len() {
            let line_num = i + 1;
            let tokens = tokenize(lines[i]).map_err(|e| e.at(&script.name, line_num))?;
            i += 1;

            match tokens.first().map(String::as_str) {
                Some("test") => {
                    if tokens.len() != 2 {
                        return Err(ScriptError::new("SyntaxError: test requires a name")
                            .at(&script.name, line_num));
                    }

                    // Collect steps up to the matching `end`
                    let mut steps = Vec::new();
                    let mut closed = false;
                    while i < lines.len() {
                        let step_line = i + 1;
                        let step_tokens =
                            tokenize(lines[i]).map_err(|e| e.at(&script.name, step_line))?;
                        i += 1;
                        if step_tokens.first().map(String::as_str) == Some("end") {
                            closed = true;
                            break;
                        }
                        if let Some(step) =
                            parse_step(&step_tokens).map_err(|e| e.at(&script.name, step_line))?
                        {
                            steps.push(step);
                        }
                    }

                    if !closed {
                        return Err(ScriptError::new(format!(
                            "SyntaxError: test '{}' is missing 'end'",
                            tokens[1]
                        ))
                        .at(&script.name, line_num));
                    }

                    self.register_test(&script.name, line_num, &tokens[1], steps)?;
                }
                _ => self.execute_line(&script.name, line_num, &tokens)?,
            }
        }

        Ok(())
    }

    fn eval_global(&mut self, expression: &str) -> Result<Value, ScriptError> {
        let name = expression.trim();
        match self.globals.get(name) {
            Some(Binding::Primitive(value)) => Ok(Value::Primitive(value.clone())),
            Some(Binding::SuiteList) => Ok(Value::Array(
                (0..self.suites.len())
                    .map(|id| Value::Object(Handle::new(id as u64)))
                    .collect(),
            )),
            Some(Binding::TestFunctionsLookup) => {
                Ok(Value::Function(FunctionRef::new(LOOKUP_FUNCTION_ID)))
            }
            None => Err(ScriptError::new(format!(
                "ReferenceError: {} is not defined",
                name
            ))),
        }
    }

    fn call(&mut self, function: FunctionRef, args: &[Value]) -> Result<Value, ScriptError> {
        if function.id() == LOOKUP_FUNCTION_ID {
            return self.test_functions_for(args);
        }

        let index = self
            .test_index(function)
            .ok_or_else(|| ScriptError::new("TypeError: value is not a function"))?;

        match self.run_steps(index) {
            (_, Some(message), _) => Err(ScriptError::new(message.trim_end())),
            _ => Ok(Value::Undefined),
        }
    }

    fn invoke(&mut self, function: FunctionRef) -> Invocation {
        let index = match self.test_index(function) {
            Some(index) => index,
            None => {
                return Invocation {
                    succeeded: false,
                    output: String::new(),
                    failure_message: Some("TypeError: value is not a function\n".to_string()),
                    duration_ms: 0,
                }
            }
        };

        let start = Instant::now();
        let (output, failure_message, elapsed) = self.run_steps(index);
        let duration_ms = elapsed.unwrap_or_else(|| start.elapsed().as_millis() as u64);

        Invocation {
            succeeded: failure_message.is_none(),
            output,
            failure_message,
            duration_ms,
        }
    }
}

fn parse_step(tokens: &[String]) -> Result<Option<Step>, ScriptError> {
    let (command, args) = match tokens.split_first() {
        Some(split) => split,
        None => return Ok(None),
    };

    let step = match (command.as_str(), args) {
        ("print", text) => Step::Print(text.join(" ")),
        ("set", [name, value]) => Step::Set(name.clone(), value.clone()),
        ("expect", [name, value]) => Step::Expect(name.clone(), value.clone()),
        ("fail", message) if !message.is_empty() => Step::Fail(message.join(" ")),
        ("elapsed", [ms]) => Step::Elapsed(ms.parse().map_err(|_| {
            ScriptError::new(format!("SyntaxError: elapsed expects milliseconds, got '{}'", ms))
        })?),
        _ => {
            return Err(ScriptError::new(format!(
                "SyntaxError: Invalid test step '{}'",
                tokens.join(" ")
            )))
        }
    };

    Ok(Some(step))
}

/// Split a line into tokens, honoring quotes and backslash escapes
///
/// Blank lines and `#` comments produce no tokens.
fn tokenize(line: &str) -> Result<Vec<String>, ScriptError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Vec::new());
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut quoted_token = false;
    let mut chars = trimmed.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' | '\'' if quote == Some(ch) => quote = None,
            '"' | '\'' if quote.is_none() => {
                quote = Some(ch);
                quoted_token = true;
            }
            ' ' | '\t' if quote.is_none() => {
                if !current.is_empty() || quoted_token {
                    tokens.push(std::mem::take(&mut current));
                    quoted_token = false;
                }
            }
            '\\' => match chars.next() {
                Some('n') => current.push('\n'),
                Some('t') => current.push('\t'),
                Some(other @ ('\\' | '"' | '\'')) => current.push(other),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            _ => current.push(ch),
        }
    }

    if let Some(open) = quote {
        return Err(ScriptError::new(format!(
            "SyntaxError: unterminated {} quote",
            open
        )));
    }

    if !current.is_empty() || quoted_token {
        tokens.push(current);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(env: &mut ScriptedEnvironment, name: &str, source: &str) -> Result<(), ScriptError> {
        env.load(&ScriptSource::new(name, source))
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("suite math").unwrap(), vec!["suite", "math"]);
        assert_eq!(
            tokenize("  print \"hello world\"").unwrap(),
            vec!["print", "hello world"]
        );
        assert_eq!(
            tokenize(r#"fail 'it\'s broken\n'"#).unwrap(),
            vec!["fail", "it's broken\n"]
        );
        assert_eq!(tokenize("set empty \"\"").unwrap(), vec!["set", "empty", ""]);
        assert!(tokenize("# a comment").unwrap().is_empty());
        assert!(tokenize("   ").unwrap().is_empty());
        assert!(tokenize("print \"unclosed").is_err());
    }

    #[test]
    fn test_registers_suites_and_tests() {
        let mut env = ScriptedEnvironment::new();
        load(
            &mut env,
            "math_test.js",
            "suite math\ntest add\n  print adding\nend\ntest sub\nend\n",
        )
        .unwrap();

        let suites = env.eval_global(TEST_SUITES_GLOBAL).unwrap();
        let suite = match suites {
            Value::Array(items) => items[0].clone(),
            other => panic!("expected array, got {other:?}"),
        };

        let lookup = match env.eval_global(GET_TEST_FUNCTIONS_GLOBAL).unwrap() {
            Value::Function(f) => f,
            other => panic!("expected function, got {other:?}"),
        };

        match env.call(lookup, &[suite]).unwrap() {
            Value::Record(props) => {
                let names: Vec<&str> = props.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["math.add", "math.sub"]);
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_invoke_captures_output_and_failure() {
        let mut env = ScriptedEnvironment::new();
        load(
            &mut env,
            "t.js",
            "suite s\ntest ok\n  print one\n  print two\n  elapsed 5\nend\ntest bad\n  print before\n  fail \"went wrong\"\n  print after\nend\n",
        )
        .unwrap();

        let ok = env.invoke(FunctionRef::new(1));
        assert!(ok.succeeded);
        assert_eq!(ok.output, "one\ntwo\n");
        assert_eq!(ok.duration_ms, 5);

        let bad = env.invoke(FunctionRef::new(2));
        assert!(!bad.succeeded);
        assert_eq!(bad.output, "before\n");
        assert_eq!(bad.failure_message.as_deref(), Some("went wrong\n"));
    }

    #[test]
    fn test_globals_are_shared_across_scripts_and_tests() {
        let mut env = ScriptedEnvironment::new();
        load(&mut env, "a.js", "set counter 1").unwrap();
        load(
            &mut env,
            "b.js",
            "require counter\nsuite s\ntest bump\n  expect counter 1\n  set counter 2\nend\ntest check\n  expect counter 2\nend",
        )
        .unwrap();

        assert!(env.invoke(FunctionRef::new(1)).succeeded);
        assert!(env.invoke(FunctionRef::new(2)).succeeded);
        assert_eq!(env.global("counter"), Some("2"));

        // Running the first test again now sees the mutated value
        let again = env.invoke(FunctionRef::new(1));
        assert_eq!(
            again.failure_message.as_deref(),
            Some("Expected counter to be 1, but was 2\n")
        );
    }

    #[test]
    fn test_load_errors_carry_location() {
        let mut env = ScriptedEnvironment::new();
        let err = load(&mut env, "deps.js", "set a 1\nrequire missing").unwrap_err();
        assert_eq!(err.to_string(), "deps.js:2: ReferenceError: missing is not defined");

        // Side effects before the failing line survive
        assert_eq!(env.global("a"), Some("1"));

        let err = load(&mut env, "x.js", "test orphan\nend").unwrap_err();
        assert!(err.message.contains("outside of a suite"));

        let err = load(&mut env, "y.js", "suite s\ntest open\n  print hi").unwrap_err();
        assert_eq!(err.line, Some(2));
        assert!(err.message.contains("missing 'end'"));

        let err = load(&mut env, "z.js", "frobnicate now").unwrap_err();
        assert!(err.message.starts_with("SyntaxError"));

        let err = load(&mut env, "w.js", "throw setup exploded").unwrap_err();
        assert_eq!(err.to_string(), "w.js:1: Error: setup exploded");
    }

    #[test]
    fn test_delete_unbinds_registry() {
        let mut env = ScriptedEnvironment::new();
        load(&mut env, "hide.js", &format!("delete {}", TEST_SUITES_GLOBAL)).unwrap();
        assert!(env.eval_global(TEST_SUITES_GLOBAL).is_err());
    }

    #[test]
    fn test_call_rejects_non_suite_argument() {
        let mut env = ScriptedEnvironment::new();
        let err = env
            .call(FunctionRef::new(LOOKUP_FUNCTION_ID), &[Value::Undefined])
            .unwrap_err();
        assert!(err.message.contains("not a test suite"));
        assert!(!env.invoke(FunctionRef::new(99)).succeeded);
    }
}
