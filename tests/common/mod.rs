// Shared languages and custom expression parsers for the integration tests.
#![allow(dead_code)]

use std::any::Any;
use std::sync::Once;

use clove_expr::ast::{CustomCategory, CustomExpressionData, ExpressionTree, ItemId, ItemKind};
use clove_expr::language::TextEscape;
use clove_expr::{
    CustomExpression, CustomExpressionError, CustomExpressionParser, CustomParseContext, KeywordId,
    Language, LanguageConfig, OperatorConfig, ParseExpressionResult, parse_expression,
};

pub const PUBLIC: u32 = 1;
pub const STATIC: u32 = 2;
pub const PRAGMA: u32 = 10;
pub const ATTR: u32 = 11;
pub const WHERE: u32 = 12;
pub const FAIL: u32 = 13;
pub const NOTE: u32 = 14;

/// Code used by the `note` parser.
pub const NOTE_ERROR_CODE: u32 = 10_001;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

// ============================================================================
// Languages
// ============================================================================

/// `*` `/` at 20, `+` `-` at 30, prefix `-` `!` at 0, postfix `++` at 5.
pub fn arithmetic_config() -> LanguageConfig {
    LanguageConfig::default()
        .with_operator(OperatorConfig::binary("+", 30))
        .with_operator(OperatorConfig::binary("-", 30))
        .with_operator(OperatorConfig::binary("*", 20))
        .with_operator(OperatorConfig::binary("/", 20))
        .with_operator(OperatorConfig::binary("=", 90))
        .with_operator(OperatorConfig::prefix("-", 0))
        .with_operator(OperatorConfig::prefix("!", 0))
        .with_operator(OperatorConfig::postfix("++", 5))
        .with_keyword(PUBLIC, "public")
        .with_keyword(STATIC, "static")
}

pub fn arithmetic() -> Language {
    Language::new(arithmetic_config())
}

/// Case insensitive, multi-word operators, `''` escapes, no code blocks.
pub fn sql() -> Language {
    let mut config = LanguageConfig::default()
        .with_operator(OperatorConfig::binary("=", 30))
        .with_operator(OperatorConfig::binary("<", 30))
        .with_operator(OperatorConfig::binary("+", 20))
        .with_operator(OperatorConfig::prefix("NOT", 40))
        .with_operator(OperatorConfig::binary("AND", 50))
        .with_operator(OperatorConfig::binary("OR", 60))
        .with_operator(OperatorConfig::postfix("IS NULL", 10))
        .with_operator(OperatorConfig::postfix("IS NOT NULL", 10))
        .with_keyword(1, "DISTINCT");
    config.case_sensitive = false;
    config.code_block = None;
    config.line_comment = Some("--".to_string());
    config.quote_chars = vec!['\''];
    config.text_escape = TextEscape::DoubledQuote;
    Language::new(config)
}

/// The arithmetic language with every test parser registered.
pub fn with_plugins() -> Language {
    let config = arithmetic_config()
        .with_keyword(PRAGMA, "pragma")
        .with_keyword(ATTR, "attr")
        .with_keyword(WHERE, "where")
        .with_keyword(FAIL, "fail")
        .with_keyword(NOTE, "note");

    Language::new(config)
        .with_custom_parser(PragmaParser::new())
        .with_custom_parser(AttrParser::new())
        .with_custom_parser(WhereParser::new())
        .with_custom_parser(FailingParser::new())
        .with_custom_parser(NoteParser::new())
}

// ============================================================================
// Helpers
// ============================================================================

pub fn parse(text: &str, language: &Language) -> ParseExpressionResult {
    init_logging();
    parse_expression(text, language).expect("language compiles")
}

pub fn codes(result: &ParseExpressionResult) -> Vec<u32> {
    result.errors().iter().map(|e| e.code().as_u32()).collect()
}

/// Token texts of the whole tree in text order.
pub fn token_texts(result: &ParseExpressionResult) -> Vec<String> {
    let mut tokens = Vec::new();
    collect_tokens(result.tree(), result.root(), &mut tokens);
    tokens.sort_by_key(|(position, _)| *position);
    tokens.into_iter().map(|(_, text)| text).collect()
}

fn collect_tokens(tree: &ExpressionTree, id: ItemId, tokens: &mut Vec<(usize, String)>) {
    let item = &tree[id];
    if let ItemKind::Token(token) = item.kind() {
        tokens.push((tree.index_in_text(id), token.text.clone()));
        return;
    }
    for part in item.parts().all() {
        collect_tokens(tree, part, tokens);
    }
}

// ============================================================================
// Custom expression parsers
// ============================================================================

/// Data of every test custom expression.
#[derive(Debug)]
pub struct TestData {
    pub name: &'static str,
    pub accepts_postfixes: bool,
}

impl CustomExpressionData for TestData {
    fn name(&self) -> &str {
        self.name
    }

    fn is_valid_postfix(&self, _tree: &ExpressionTree, _postfix: ItemId) -> bool {
        self.accepts_postfixes
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn data(name: &'static str) -> TestData {
    TestData {
        name,
        accepts_postfixes: true,
    }
}

/// `pragma name (args)?` as an operand. Declines when no name follows.
/// Rejects postfixes.
#[derive(Debug)]
pub struct PragmaParser {
    keywords: [KeywordId; 1],
}

impl PragmaParser {
    pub fn new() -> Self {
        PragmaParser {
            keywords: [KeywordId(PRAGMA)],
        }
    }
}

impl CustomExpressionParser for PragmaParser {
    fn keyword_ids(&self) -> &[KeywordId] {
        &self.keywords
    }

    fn try_parse(
        &self,
        context: &mut CustomParseContext<'_, '_>,
    ) -> Result<Option<CustomExpression>, CustomExpressionError> {
        let Some(name) = context.parse_literal_name()? else {
            return Ok(None);
        };
        let data = TestData {
            name: "pragma",
            accepts_postfixes: false,
        };
        let mut expression = CustomExpression::new(CustomCategory::Regular, data).with_child(name);
        if let Some(arguments) = context.parse_braces()? {
            expression = expression.with_child(arguments);
        }
        Ok(Some(expression))
    }
}

/// `attr[...]` applied to the expression that follows.
#[derive(Debug)]
pub struct AttrParser {
    keywords: [KeywordId; 1],
}

impl AttrParser {
    pub fn new() -> Self {
        AttrParser {
            keywords: [KeywordId(ATTR)],
        }
    }
}

impl CustomExpressionParser for AttrParser {
    fn keyword_ids(&self) -> &[KeywordId] {
        &self.keywords
    }

    fn try_parse(
        &self,
        context: &mut CustomParseContext<'_, '_>,
    ) -> Result<Option<CustomExpression>, CustomExpressionError> {
        match context.parse_braces()? {
            Some(braces) => Ok(Some(
                CustomExpression::new(CustomCategory::Prefix, data("attr")).with_child(braces),
            )),
            None => Ok(None),
        }
    }
}

/// `where <expression>` applied to the expression before it.
#[derive(Debug)]
pub struct WhereParser {
    keywords: [KeywordId; 1],
}

impl WhereParser {
    pub fn new() -> Self {
        WhereParser {
            keywords: [KeywordId(WHERE)],
        }
    }
}

impl CustomExpressionParser for WhereParser {
    fn keyword_ids(&self) -> &[KeywordId] {
        &self.keywords
    }

    fn try_parse(
        &self,
        context: &mut CustomParseContext<'_, '_>,
    ) -> Result<Option<CustomExpression>, CustomExpressionError> {
        match context.parse_expression()? {
            Some(condition) => Ok(Some(
                CustomExpression::new(CustomCategory::Postfix, data("where")).with_child(condition),
            )),
            None => Ok(None),
        }
    }
}

/// Always fails.
#[derive(Debug)]
pub struct FailingParser {
    keywords: [KeywordId; 1],
}

impl FailingParser {
    pub fn new() -> Self {
        FailingParser {
            keywords: [KeywordId(FAIL)],
        }
    }
}

impl CustomExpressionParser for FailingParser {
    fn keyword_ids(&self) -> &[KeywordId] {
        &self.keywords
    }

    fn try_parse(
        &self,
        _context: &mut CustomParseContext<'_, '_>,
    ) -> Result<Option<CustomExpression>, CustomExpressionError> {
        Err(CustomExpressionError::new("fail is not supported"))
    }
}

/// `note <word>` reports a plugin error on the word and becomes an operand.
/// `note!` reports with a reserved code instead.
#[derive(Debug)]
pub struct NoteParser {
    keywords: [KeywordId; 1],
}

impl NoteParser {
    pub fn new() -> Self {
        NoteParser {
            keywords: [KeywordId(NOTE)],
        }
    }
}

impl CustomExpressionParser for NoteParser {
    fn keyword_ids(&self) -> &[KeywordId] {
        &self.keywords
    }

    fn try_parse(
        &self,
        context: &mut CustomParseContext<'_, '_>,
    ) -> Result<Option<CustomExpression>, CustomExpressionError> {
        if context.current_char() == Some('!') {
            let position = context.position();
            context.add_error(position, 1, 3, "reserved code", false)?;
        }

        context.skip_spaces();
        let start = context.position();
        let mut length = 0;
        while context.char_at(start + length).is_some_and(char::is_alphanumeric) {
            length += 1;
        }
        if length == 0 {
            return Ok(None);
        }

        let word = context.add_token(length);
        context.add_error(start, length, NOTE_ERROR_CODE, "note found", false)?;
        Ok(Some(
            CustomExpression::new(CustomCategory::Regular, data("note")).with_token(word),
        ))
    }
}
