// tests/custom_expression_tests.rs
//
// Keyword triggered custom expression parsers: regular, prefix and postfix
// categories, declining, plugin errors and failures.

mod common;

use clove_expr::output::outline;
use clove_expr::{
    CustomCategory, ExpressionParser, ItemKind, KeywordId, Language, LanguageError, ParseErrorCode,
    ParseErrorKind, ParseExpressionResult,
};
use common::{
    NOTE_ERROR_CODE, PragmaParser, TestData, arithmetic_config, codes, parse, token_texts,
    with_plugins,
};
use pretty_assertions::assert_eq;

fn custom_items(result: &ParseExpressionResult) -> Vec<(CustomCategory, String)> {
    result
        .tree()
        .iter()
        .filter_map(|item| match item.kind() {
            ItemKind::Custom(custom) => Some((custom.category, custom.data.name().to_string())),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Categories
// ============================================================================

#[test]
fn test_regular_custom_expression() {
    let result = parse("pragma warning(x)", &with_plugins());
    assert!(result.errors().is_empty());
    assert_eq!(outline(&result), "@pragma(warning, (x))");
    assert_eq!(
        custom_items(&result),
        vec![(CustomCategory::Regular, "pragma".to_string())]
    );
}

#[test]
fn test_keywords_before_trigger_belong_to_custom_expression() {
    let result = parse("public pragma warning", &with_plugins());
    assert!(result.errors().is_empty());
    assert_eq!(outline(&result), "public @pragma(warning)");

    let statement = result.statements()[0];
    assert!(matches!(result.tree()[statement].kind(), ItemKind::Custom(_)));
    assert_eq!(result.tree()[statement].keywords().len(), 1);
}

#[test]
fn test_custom_expression_as_operand() {
    let result = parse("F(pragma w) + 1", &with_plugins());
    assert!(result.errors().is_empty());
    assert_eq!(outline(&result), "+(F(@pragma(w)), 1)");
}

#[test]
fn test_prefix_custom_expression() {
    let result = parse("attr[A] x", &with_plugins());
    assert!(result.errors().is_empty());
    assert_eq!(outline(&result), "@attr([A]) x");

    let statement = result.statements()[0];
    assert_eq!(result.item_text(statement), "attr[A] x");
    assert_eq!(result.tree()[statement].prefixes().len(), 1);
}

#[test]
fn test_postfix_custom_expression() {
    let result = parse("F(x) where x = 1", &with_plugins());
    assert!(result.errors().is_empty());
    assert_eq!(outline(&result), "F(x) @where(=(x, 1))");
    assert_eq!(
        custom_items(&result),
        vec![(CustomCategory::Postfix, "where".to_string())]
    );
}

#[test]
fn test_custom_data_downcast() {
    let result = parse("F(x) where y", &with_plugins());
    let data = result
        .tree()
        .iter()
        .find_map(|item| match item.kind() {
            ItemKind::Custom(custom) => custom.data_as::<TestData>(),
            _ => None,
        })
        .unwrap();
    assert_eq!(data.name, "where");
    assert!(data.accepts_postfixes);
}

// ============================================================================
// Declining and misplacement
// ============================================================================

#[test]
fn test_declined_keyword_stays_a_keyword() {
    let result = parse("pragma 42", &with_plugins());
    assert!(result.errors().is_empty());
    assert_eq!(outline(&result), "pragma 42");
    assert!(custom_items(&result).is_empty());
}

#[test]
fn test_postfix_without_target() {
    let result = parse("where y", &with_plugins());
    assert_eq!(codes(&result), vec![ParseErrorCode::PostfixHasNoTarget.as_u32()]);
    assert_eq!(outline(&result), "!series(@where(y))");

    let found = result.item_at(6).unwrap();
    assert_eq!(result.item_text(found), "y");
    assert_eq!(result.tree().topmost_ancestor(found), result.root());
}

#[test]
fn test_postfix_rejected_by_target() {
    let result = parse("pragma p where y", &with_plugins());
    assert_eq!(codes(&result), vec![ParseErrorCode::PostfixRejected.as_u32()]);
    assert_eq!(outline(&result), "!series(@pragma(p), @where(y))");
    assert_eq!(token_texts(&result), vec!["pragma", "p", "where", "y"]);

    let found = result.item_at(15).unwrap();
    assert_eq!(result.item_text(found), "y");
}

#[test]
fn test_keyword_after_operand_is_not_a_postfix() {
    let result = parse("F(x) public", &with_plugins());
    assert_eq!(
        codes(&result),
        vec![ParseErrorCode::InvalidUseOfPrefixesOrKeywords.as_u32()]
    );
    assert_eq!(outline(&result), "!series(F(x), public !series())");
}

#[test]
fn test_declined_postfix_keyword_is_kept() {
    let result = parse("x where", &with_plugins());
    assert_eq!(
        codes(&result),
        vec![ParseErrorCode::InvalidUseOfPrefixesOrKeywords.as_u32()]
    );
    let error = &result.errors().items()[0];
    assert_eq!((error.index_in_text, error.length), (2, 5));

    assert_eq!(outline(&result), "!series(x, where !series())");
    assert_eq!(token_texts(&result), vec!["x", "where"]);

    let found = result.item_at(6).unwrap();
    assert_eq!(result.item_text(found), "where");
}

// ============================================================================
// Rollback
// ============================================================================

/// Every item except the root hangs off some parent.
fn assert_no_orphans(text: &str) {
    let result = parse(text, &with_plugins());
    let orphans: Vec<_> = result
        .tree()
        .iter()
        .filter(|item| item.id() != result.root() && item.parent().is_none())
        .map(|item| result.item_text(item.id()))
        .collect();
    assert!(orphans.is_empty(), "{:?} left orphans {:?}", text, orphans);
}

#[test]
fn test_rolled_back_postfix_leaves_no_items() {
    let result = parse("x attr(a) y", &with_plugins());
    assert_eq!(
        codes(&result),
        vec![ParseErrorCode::NoSeparationBetweenSymbols.as_u32()]
    );
    assert_eq!(outline(&result), "!series(x, @attr((a)) y)");
    assert_eq!(custom_items(&result).len(), 1);

    assert_no_orphans("x attr(a) y");
}

#[test]
fn test_declining_parsers_leave_no_items() {
    assert_no_orphans("pragma 42");
    assert_no_orphans("x where");
    assert_no_orphans("F(x) where y attr[b] z");
}

// ============================================================================
// Plugin errors
// ============================================================================

#[test]
fn test_plugin_error_codes() {
    let result = parse("note hello", &with_plugins());
    assert_eq!(codes(&result), vec![NOTE_ERROR_CODE]);
    assert_eq!(outline(&result), "@note");

    let error = &result.errors().items()[0];
    assert!(!error.is_critical);
    assert_eq!((error.index_in_text, error.length), (5, 5));
    assert_eq!(error.code(), ParseErrorCode::Custom(NOTE_ERROR_CODE));
    assert_eq!(error.message(), "note found");
}

#[test]
fn test_plugin_reserved_error_code_fails_parse() {
    let result = parse("note!x", &with_plugins());
    assert_eq!(
        codes(&result),
        vec![ParseErrorCode::CustomExpressionParserThrewAnException.as_u32()]
    );
    let error = &result.errors().items()[0];
    assert!(error.is_critical);
    assert!(error.message().contains("below 10000"));
}

#[test]
fn test_failing_plugin_stops_parse() {
    let result = parse("x + fail y; z", &with_plugins());
    assert_eq!(
        codes(&result),
        vec![ParseErrorCode::CustomExpressionParserThrewAnException.as_u32()]
    );

    let error = &result.errors().items()[0];
    assert!(error.is_critical);
    assert_eq!(error.index_in_text, 4);
    assert_eq!(
        error.kind,
        ParseErrorKind::CustomExpressionParserThrewAnException {
            details: "fail is not supported".to_string()
        }
    );
    assert!(result.statements().is_empty());
}

#[test]
fn test_parser_for_unknown_keyword() {
    let language = Language::new(arithmetic_config()).with_custom_parser(PragmaParser::new());
    let err = ExpressionParser::new(&language).err().unwrap();
    assert!(matches!(err, LanguageError::UnknownKeyword(KeywordId(10))));
}
