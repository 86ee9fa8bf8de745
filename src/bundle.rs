//! Named script sources and the txtar-style bundle format
//!
//! A bundle is a single text file holding several named scripts:
//!
//! ```text
//! Anything before the first header is a comment.
//! -- lib/setup.js --
//! ...
//! -- math_test.js --
//! ...
//! ```
//!
//! Scripts keep the order they appear in, which is the order they are loaded.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// One named script to be loaded into the shared context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSource {
    /// Name used in diagnostics (usually a file path)
    pub name: String,
    /// The script text
    pub source: String,
}

impl ScriptSource {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        ScriptSource {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Read a script from disk, naming it after its path
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Ok(ScriptSource::new(path.to_string_lossy(), source))
    }
}

/// Parse a bundle into its scripts
///
/// # Errors
/// Returns a parse error for a header with an empty name.
pub fn parse(content: &str) -> Result<Vec<ScriptSource>> {
    let mut scripts = Vec::new();
    let mut current: Option<(String, String)> = None;

    for (i, line) in content.lines().enumerate() {
        let line_num = i + 1;

        if let Some(name) = parse_header(line) {
            if name.is_empty() {
                return Err(Error::parse_error(line_num, "Script header has no name"));
            }
            if let Some((name, source)) = current.take() {
                scripts.push(finish(name, source));
            }
            current = Some((name, String::new()));
            continue;
        }

        // Lines before the first header are a comment area
        if let Some((_, ref mut source)) = current {
            source.push_str(line);
            source.push('\n');
        }
    }

    if let Some((name, source)) = current.take() {
        scripts.push(finish(name, source));
    }

    Ok(scripts)
}

/// Read and parse a bundle file
pub fn read(path: &Path) -> Result<Vec<ScriptSource>> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}

/// Load every file in `dir` whose name matches `pattern`, sorted by name
///
/// The pattern supports `*` as a wildcard and must match the whole file name.
/// Subdirectories are not searched.
pub fn load_dir(dir: &Path, pattern: &str) -> Result<Vec<ScriptSource>> {
    let pattern_regex = regex::escape(pattern).replace(r"\*", ".*");
    let regex = regex::Regex::new(&format!("^{}$", pattern_regex))?;

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() {
            if let Some(file_name) = entry.file_name().to_str() {
                if regex.is_match(file_name) {
                    paths.push(entry.path().to_path_buf());
                }
            }
        }
    }

    paths.sort();

    paths.iter().map(|path| ScriptSource::from_path(path)).collect()
}

fn finish(name: String, mut source: String) -> ScriptSource {
    // Every line got a newline appended; the last one belongs to the separator
    if source.ends_with('\n') {
        source.pop();
    }
    ScriptSource { name, source }
}

/// Parse a header line like "-- name --"
fn parse_header(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed == "-- --" || trimmed == "--  --" {
        return Some(String::new());
    }
    if trimmed.starts_with("-- ") && trimmed.ends_with(" --") && trimmed.len() > 6 {
        Some(trimmed[3..trimmed.len() - 3].trim().to_string())
    } else {
        None
    }
}
