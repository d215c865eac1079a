//! # Language definitions
//!
//! A language tells the parser which keywords, operators, markers and literal
//! forms exist. The parser never hard-codes any of them.
//!
//! - **[LanguageConfig]** - plain data, loadable from JSON
//! - **[LanguageProvider]** - the trait the parser consumes (tables + hooks)
//! - **[Language]** - the stock provider: a config plus custom expression parsers
//!
//! ## Example
//!
//! ```
//! use clove_expr::language::{Language, LanguageConfig, OperatorConfig};
//!
//! let config = LanguageConfig::default()
//!     .with_operator(OperatorConfig::binary("+", 30))
//!     .with_operator(OperatorConfig::binary("*", 20))
//!     .with_keyword(1, "public");
//! let language = Language::new(config);
//! ```
mod compiled;
mod keywords;
mod numeric;
mod operators;

pub(crate) use compiled::CompiledLanguage;
pub(crate) use numeric::NumericMatch;
pub use keywords::{Keyword, KeywordId};
pub use numeric::{NumericKind, NumericTypeDescriptor, NumericTypeId};
pub use operators::{OperatorConfig, OperatorDefinition, OperatorId, OperatorKind};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::CustomExpressionParser;
use crate::scanner::Scanner;

/// Errors in a language definition, reported when a parser is built.
#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("keyword {0} has empty text")]
    EmptyKeyword(KeywordId),

    #[error("keyword id {0} is used more than once")]
    DuplicateKeywordId(KeywordId),

    #[error("keyword '{0}' is defined more than once")]
    DuplicateKeyword(String),

    #[error("operator {index} has an invalid name: {reason}")]
    InvalidOperatorName { index: usize, reason: String },

    #[error("operator id {0} is used more than once")]
    DuplicateOperatorId(OperatorId),

    #[error("{kind} operator '{name}' is defined more than once")]
    DuplicateOperator { name: String, kind: OperatorKind },

    #[error("invalid numeric pattern '{pattern}': {source}")]
    InvalidNumericPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid {marker} marker: {reason}")]
    InvalidMarker { marker: &'static str, reason: String },

    #[error("custom expression parser is registered for unknown {0}")]
    UnknownKeyword(KeywordId),

    #[error("invalid language JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Start and end markers of a construct (code blocks, multiline comments).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerPair {
    pub start: String,
    pub end: String,
}

impl MarkerPair {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        MarkerPair {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// How a quote character is written inside a text constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEscape {
    /// The quote is doubled: `'It''s'`
    #[default]
    DoubledQuote,
    /// Backslash escapes: `"say \"hi\"\n"`
    Backslash,
}

/// Tables and markers of a language.
///
/// Every field has a default, so a JSON file only lists what differs:
///
/// ```json
/// {
///   "operators": [
///     { "name_parts": ["+"], "kind": "binary", "priority": 30 },
///     { "name_parts": ["IS", "NULL"], "kind": "postfix", "priority": 10 }
///   ],
///   "case_sensitive": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    pub keywords: Vec<Keyword>,
    pub operators: Vec<OperatorConfig>,
    /// `None` disables code blocks
    pub code_block: Option<MarkerPair>,
    /// `None` disables statement separation
    pub separator: Option<char>,
    pub line_comment: Option<String>,
    pub multiline_comment: Option<MarkerPair>,
    pub quote_chars: Vec<char>,
    pub text_escape: TextEscape,
    pub case_sensitive: bool,
    pub supports_prefixes: bool,
    pub supports_keywords: bool,
    pub numeric_types: Vec<NumericTypeDescriptor>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        LanguageConfig {
            keywords: Vec::new(),
            operators: Vec::new(),
            code_block: Some(MarkerPair::new("{", "}")),
            separator: Some(';'),
            line_comment: Some("//".to_string()),
            multiline_comment: Some(MarkerPair::new("/*", "*/")),
            quote_chars: vec!['"', '\''],
            text_escape: TextEscape::default(),
            case_sensitive: true,
            supports_prefixes: true,
            supports_keywords: true,
            numeric_types: NumericTypeDescriptor::defaults(),
        }
    }
}

impl LanguageConfig {
    pub fn with_keyword(mut self, id: u32, text: &str) -> Self {
        self.keywords.push(Keyword::new(id, text));
        self
    }

    pub fn with_operator(mut self, operator: OperatorConfig) -> Self {
        self.operators.push(operator);
        self
    }
}

/// What the parser needs to know about a language.
///
/// Implement this to drive the parser from your own tables; [`Language`] is the
/// stock implementation.
pub trait LanguageProvider {
    /// Keyword/operator tables, markers and flags.
    fn config(&self) -> &LanguageConfig;

    /// Custom expression parsers. For a trigger keyword they are tried in
    /// this order until one matches.
    fn custom_expression_parsers(&self) -> &[Box<dyn CustomExpressionParser>] {
        &[]
    }

    /// Whether `c` can appear at `position_in_literal` of a bare literal
    /// (an identifier-like name).
    fn is_valid_literal_char(&self, c: char, position_in_literal: usize, scanner: &Scanner) -> bool {
        let _ = scanner;
        if position_in_literal == 0 {
            c.is_alphabetic() || c == '_'
        } else {
            c.is_alphanumeric() || c == '_'
        }
    }
}

/// A language built from a [`LanguageConfig`] and optional custom parsers.
#[derive(Debug, Default)]
pub struct Language {
    config: LanguageConfig,
    custom_parsers: Vec<Box<dyn CustomExpressionParser>>,
}

impl Language {
    pub fn new(config: LanguageConfig) -> Self {
        Language {
            config,
            custom_parsers: Vec::new(),
        }
    }

    /// Loads a language from its JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, LanguageError> {
        let config: LanguageConfig = serde_json::from_str(json)?;
        Ok(Language::new(config))
    }

    /// Registers a custom expression parser.
    pub fn with_custom_parser(mut self, parser: impl CustomExpressionParser + 'static) -> Self {
        self.custom_parsers.push(Box::new(parser));
        self
    }

    pub fn config_mut(&mut self) -> &mut LanguageConfig {
        &mut self.config
    }
}

impl LanguageProvider for Language {
    fn config(&self) -> &LanguageConfig {
        &self.config
    }

    fn custom_expression_parsers(&self) -> &[Box<dyn CustomExpressionParser>] {
        &self.custom_parsers
    }
}
