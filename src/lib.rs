pub mod ast;
pub mod cli;
pub mod error;
pub mod language;
pub mod output;
pub mod parser;
pub mod result;
pub mod scanner;

pub use ast::{
    CustomCategory, CustomExpressionData, CustomExpressionItem, ExpressionItem, ExpressionTree,
    ItemId, ItemKind, Section, Token, TokenKind, TreeError,
};
pub use error::{ParseErrorCode, ParseErrorData, ParseErrorItem, ParseErrorKind};
pub use language::{
    Keyword, KeywordId, Language, LanguageConfig, LanguageError, LanguageProvider, OperatorConfig,
    OperatorId, OperatorKind,
};
pub use output::{outline, to_json};
pub use parser::{
    CustomExpression, CustomExpressionError, CustomExpressionParser, CustomParseContext,
    ExpressionParser, parse_expression,
};
pub use result::ParseExpressionResult;
pub use scanner::Scanner;

/// Installs a logger for unit tests, once per test binary.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
