//! Report parse errors of a text

use super::CliError;
use crate::language::LanguageProvider;
use crate::output::{Diagnostic, diagnostics};
use crate::parser::ExpressionParser;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The text to check
    pub text: String,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// The text parsed without errors
    Valid,
    /// Errors in the order they were found
    Invalid(Vec<Diagnostic>),
}

/// Execute a check operation
pub fn execute_check(
    options: &CheckOptions,
    language: &dyn LanguageProvider,
) -> Result<CheckResult, CliError> {
    let parser = ExpressionParser::new(language)?;
    let result = parser.parse(&options.text);

    let found = diagnostics(&result);
    if found.is_empty() {
        Ok(CheckResult::Valid)
    } else {
        log::debug!("check found {} error(s)", found.len());
        Ok(CheckResult::Invalid(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::load_language;
    use crate::error::ParseErrorCode;

    fn check(text: &str) -> CheckResult {
        let language = load_language(None).unwrap();
        let options = CheckOptions {
            text: text.to_string(),
        };
        execute_check(&options, &language).unwrap()
    }

    #[test]
    fn test_check_valid() {
        assert!(matches!(check("if (a < b) { return a; }"), CheckResult::Valid));
    }

    #[test]
    fn test_check_reports_positions() {
        let CheckResult::Invalid(found) = check("x = 1;\ny = \"open") else {
            panic!("expected errors");
        };
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, ParseErrorCode::ConstantTextNotClosed);
        assert_eq!((found[0].line, found[0].column), (2, 5));
    }
}
