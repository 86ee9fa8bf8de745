//! Error types for scriptsuite-rs

use crate::env::ScriptError;
use thiserror::Error;

/// Result type alias for scriptsuite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for scriptsuite operations
#[derive(Error, Debug)]
pub enum Error {
    /// The test filter is not a valid regular expression
    #[error("Invalid test filter: {0}")]
    Regex(#[from] regex::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// WalkDir error
    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Parse error in a script bundle or scripted environment source
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A script failed while being loaded into the shared context
    #[error("{source}")]
    Load {
        script: String,
        #[source]
        source: ScriptError,
    },

    /// The script environment broke its contract during test discovery
    #[error("Environment error: {message}")]
    Environment { message: String },
}

impl Error {
    /// Create a parse error
    pub fn parse_error(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create an environment contract error
    pub fn environment_error(message: impl Into<String>) -> Self {
        Error::Environment {
            message: message.into(),
        }
    }
}
