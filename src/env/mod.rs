//! The contract between the test engine and a script environment
//!
//! A script environment owns one interpreter context. The engine loads scripts
//! into it, looks up the global test registry, and invokes test functions, all
//! through [`ScriptEnvironment`]. Values that point back into the context
//! ([`Handle`], [`FunctionRef`]) are opaque ids that only mean something to the
//! environment that minted them.

pub mod scripted;

pub use scripted::ScriptedEnvironment;

use crate::bundle::ScriptSource;
use std::fmt;

/// Global holding the array of registered test suites
pub const TEST_SUITES_GLOBAL: &str = "gjstest.internal.testSuites";

/// Global holding the function that maps a suite to its test functions
pub const GET_TEST_FUNCTIONS_GLOBAL: &str = "gjstest.internal.getTestFunctions";

/// Opaque reference to an object living in the script context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    pub fn new(id: u64) -> Self {
        Handle(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Opaque reference to a callable living in the script context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionRef(u64);

impl FunctionRef {
    pub fn new(id: u64) -> Self {
        FunctionRef(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// A value handed back from the script context
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value (`undefined`)
    Undefined,
    /// Any scalar, in its textual form
    Primitive(String),
    /// A callable
    Function(FunctionRef),
    /// An object the engine can only pass back to the environment
    Object(Handle),
    /// An array of values
    Array(Vec<Value>),
    /// An object with enumerable properties, in enumeration order
    Record(Vec<(String, Value)>),
}

impl Value {
    /// Short type name used in contract-violation messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Primitive(_) => "primitive",
            Value::Function(_) => "function",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
        }
    }

    /// Whether the value is an object in the scripting language's sense
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Record(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Primitive(text) => write!(f, "{}", text),
            Value::Function(_) => write!(f, "[function]"),
            Value::Object(_) | Value::Record(_) => write!(f, "[object]"),
            Value::Array(items) => write!(f, "[array of {}]", items.len()),
        }
    }
}

/// An error thrown inside the script context
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptError {
    /// The thrown error's message
    pub message: String,
    /// Script name the error was thrown from, if known
    pub script: Option<String>,
    /// 1-based line in that script, if known
    pub line: Option<usize>,
}

impl ScriptError {
    pub fn new(message: impl Into<String>) -> Self {
        ScriptError {
            message: message.into(),
            script: None,
            line: None,
        }
    }

    /// Attach a source location
    pub fn at(mut self, script: impl Into<String>, line: usize) -> Self {
        self.script = Some(script.into());
        self.line = Some(line);
        self
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.script, self.line) {
            (Some(script), Some(line)) => write!(f, "{}:{}: {}", script, line, self.message),
            (Some(script), None) => write!(f, "{}: {}", script, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ScriptError {}

/// The outcome of invoking one test function
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Invocation {
    /// Whether the function returned without throwing
    pub succeeded: bool,
    /// Everything the function printed while running
    pub output: String,
    /// The thrown failure, if any
    pub failure_message: Option<String>,
    /// Wall-clock time of the call, in milliseconds
    pub duration_ms: u64,
}

/// A script execution context shared by every script and test of one run
///
/// Implementations keep all state between calls: a script loaded earlier is
/// visible to scripts loaded later and to every test. The engine never calls
/// into an environment from more than one thread.
pub trait ScriptEnvironment {
    /// Execute a script's source in the shared context
    fn load(&mut self, script: &ScriptSource) -> Result<(), ScriptError>;

    /// Evaluate a global expression such as a dotted property path
    fn eval_global(&mut self, expression: &str) -> Result<Value, ScriptError>;

    /// Call a function and return its result
    fn call(&mut self, function: FunctionRef, args: &[Value]) -> Result<Value, ScriptError>;

    /// Run a test function, capturing its output, failure and elapsed time
    ///
    /// Blocks until the function returns. There is no timeout.
    fn invoke(&mut self, function: FunctionRef) -> Invocation;
}

impl<E: ScriptEnvironment + ?Sized> ScriptEnvironment for Box<E> {
    fn load(&mut self, script: &ScriptSource) -> Result<(), ScriptError> {
        (**self).load(script)
    }

    fn eval_global(&mut self, expression: &str) -> Result<Value, ScriptError> {
        (**self).eval_global(expression)
    }

    fn call(&mut self, function: FunctionRef, args: &[Value]) -> Result<Value, ScriptError> {
        (**self).call(function, args)
    }

    fn invoke(&mut self, function: FunctionRef) -> Invocation {
        (**self).invoke(function)
    }
}
