//! Parse text and render the result

use std::fmt;
use std::str::FromStr;

use super::CliError;
use crate::language::LanguageProvider;
use crate::output::{diagnostics, outline, to_json};
use crate::parser::ExpressionParser;

/// How the parse command prints the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Outline,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "outline" => Ok(OutputFormat::Outline),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format '{}', expected outline or json", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Outline => write!(f, "outline"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Options for the parse command
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// The text to parse
    pub text: String,
    pub format: OutputFormat,
    /// Pretty-print JSON output
    pub pretty: bool,
}

/// Rendered parse result
#[derive(Debug)]
pub struct ParseOutput {
    pub rendered: String,
    /// Diagnostics, one per line, for stderr
    pub diagnostics: Vec<String>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Execute a parse operation
pub fn execute_parse(
    options: &ParseOptions,
    language: &dyn LanguageProvider,
) -> Result<ParseOutput, CliError> {
    let parser = ExpressionParser::new(language)?;
    let result = parser.parse(&options.text);

    let rendered = match options.format {
        OutputFormat::Outline => outline(&result),
        OutputFormat::Json if options.pretty => serde_json::to_string_pretty(&to_json(&result))?,
        OutputFormat::Json => serde_json::to_string(&to_json(&result))?,
    };

    Ok(ParseOutput {
        rendered,
        diagnostics: diagnostics(&result).iter().map(|d| d.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::load_language;

    #[test]
    fn test_parse_outline() {
        let language = load_language(None).unwrap();
        let options = ParseOptions {
            text: "a = b + c * 2".to_string(),
            ..Default::default()
        };
        let output = execute_parse(&options, &language).unwrap();
        assert_eq!(output.rendered, "=(a, +(b, *(c, 2)))");
        assert!(!output.has_errors());
    }

    #[test]
    fn test_parse_json() {
        let language = load_language(None).unwrap();
        let options = ParseOptions {
            text: "x".to_string(),
            format: OutputFormat::Json,
            pretty: false,
        };
        let output = execute_parse(&options, &language).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output.rendered).unwrap();
        assert_eq!(value["root"]["kind"], "root");
        assert_eq!(value["errors"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
