//! CLI support for clove-expr
//!
//! Provides programmatic access to the `clove-expr` commands so other tools
//! can run them without spawning the binary.

mod check;
mod parse;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use parse::{OutputFormat, ParseOptions, ParseOutput, execute_parse};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::language::{Language, LanguageError};

/// Language used when no `--language` file is given.
///
/// It follows C operator priorities for binary operators only. Unary
/// operators always apply before any binary one, member access `.`
/// included, so `-a.b` reads as `(-a).b`.
pub const DEFAULT_LANGUAGE_JSON: &str = include_str!("../../languages/c_like.json");

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot read language file '{}': {source}", .path.display())]
    LanguageFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid language: {0}")]
    Language(#[from] LanguageError),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No input provided. Pass the text as an argument or pipe it to stdin.")]
    NoInput,
}

/// Loads the language at `path`, or the bundled C-like language.
pub fn load_language(path: Option<&Path>) -> Result<Language, CliError> {
    let Some(path) = path else {
        log::debug!("using the bundled C-like language");
        return Ok(Language::from_json(DEFAULT_LANGUAGE_JSON)?);
    };

    let json = fs::read_to_string(path).map_err(|source| CliError::LanguageFile {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded language from {}", path.display());
    Ok(Language::from_json(&json)?)
}
