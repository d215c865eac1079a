//! Rendering of parse results.
//!
//! Three views of a [`ParseExpressionResult`]:
//!
//! # Features
//!
//! - **Outline** via [`outline()`] - one line, operators in call form, for tests and quick looks
//! - **JSON tree** via [`to_json()`] - every item with its kind, span and parts
//! - **Diagnostics** via [`diagnostics()`] - errors with 1-based line and column
//!
//! # Outline format
//!
//! | Item                | Outline            |
//! |---------------------|--------------------|
//! | binary operator     | `+(x, y)`          |
//! | prefix operator     | `-(x)`             |
//! | postfix operator    | `(x)++`            |
//! | braces              | `F(_, x)`          |
//! | code block          | `{a; b}`           |
//! | custom expression   | `@name(children)`  |
//! | series with errors  | `!series(x, y)`    |
//!
//! Item prefixes, keywords and postfixes are written around the item,
//! separated by a space. Statements are joined with `"; "`.
//!
//! # Examples
//!
//! ```
//! use clove_expr::{Language, LanguageConfig, OperatorConfig, parse_expression};
//! use clove_expr::output::{diagnostics, outline};
//!
//! let language = Language::new(
//!     LanguageConfig::default().with_operator(OperatorConfig::binary("+", 30)),
//! );
//! let result = parse_expression("a + b; F(,c)", &language).unwrap();
//! assert_eq!(outline(&result), "+(a, b); F(_, c)");
//! assert!(diagnostics(&result).is_empty());
//! ```
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};

use crate::ast::{ExpressionTree, ItemId, ItemKind, TokenKind};
use crate::error::ParseErrorCode;
use crate::language::{NumericKind, OperatorKind};
use crate::result::ParseExpressionResult;
use crate::scanner::CommentKind;

// ============================================================================
// Outline
// ============================================================================

/// Renders the statements of `result` as a compact outline.
pub fn outline(result: &ParseExpressionResult) -> String {
    let tree = result.tree();
    result
        .statements()
        .iter()
        .map(|id| outline_item(tree, *id))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Renders one item and everything below it.
pub fn outline_item(tree: &ExpressionTree, id: ItemId) -> String {
    let item = &tree[id];
    let mut pieces: Vec<String> = Vec::new();

    for prefix in item.prefixes() {
        pieces.push(outline_item(tree, *prefix));
    }
    for keyword in item.keywords() {
        pieces.push(outline_item(tree, *keyword));
    }
    pieces.push(outline_core(tree, id));
    for postfix in item.postfixes() {
        pieces.push(outline_item(tree, *postfix));
    }

    pieces.join(" ")
}

fn outline_core(tree: &ExpressionTree, id: ItemId) -> String {
    let item = &tree[id];
    match item.kind() {
        ItemKind::Token(token) => token.text.clone(),
        ItemKind::Literal { name } => name.clone(),
        ItemKind::Numeric { value, .. } => value.clone(),
        ItemKind::ConstantText { raw, .. } => raw.clone(),

        ItemKind::Braces {
            kind,
            name,
            parameters,
            ..
        } => {
            let name = name.map(|n| outline_item(tree, n)).unwrap_or_default();
            let parameters: Vec<String> = parameters
                .iter()
                .map(|p| match p {
                    Some(p) => outline_item(tree, *p),
                    None => "_".to_string(),
                })
                .collect();
            format!(
                "{}{}{}{}",
                name,
                kind.opening(),
                parameters.join(", "),
                kind.closing()
            )
        }

        ItemKind::CodeBlock {
            start,
            end,
            statements,
        } => {
            let statements: Vec<String> = statements.iter().map(|s| outline_item(tree, *s)).collect();
            let end = end.map(|e| outline_core(tree, e)).unwrap_or_default();
            format!("{}{}{}", outline_core(tree, *start), statements.join("; "), end)
        }

        ItemKind::Operator {
            kind,
            info,
            operand1,
            operand2,
            ..
        } => {
            let name = outline_core(tree, *info);
            let operand1 = outline_item(tree, *operand1);
            match (kind, operand2) {
                (OperatorKind::Binary, Some(operand2)) => {
                    format!("{}({}, {})", name, operand1, outline_item(tree, *operand2))
                }
                (OperatorKind::Postfix, _) => format!("({}){}", operand1, name),
                _ => format!("{}({})", name, operand1),
            }
        }

        ItemKind::OperatorInfo { name, .. } => name.clone(),

        ItemKind::Custom(custom) => {
            let children: Vec<String> = item.children().iter().map(|c| outline_item(tree, *c)).collect();
            if children.is_empty() {
                format!("@{}", custom.data.name())
            } else {
                format!("@{}({})", custom.data.name(), children.join(", "))
            }
        }

        ItemKind::Root { statements, .. } => statements
            .iter()
            .map(|s| outline_item(tree, *s))
            .collect::<Vec<_>>()
            .join("; "),

        ItemKind::SeriesWithErrors => {
            let children: Vec<String> = item.children().iter().map(|c| outline_item(tree, *c)).collect();
            format!("!series({})", children.join(", "))
        }
    }
}

// ============================================================================
// JSON
// ============================================================================

/// Converts `result` into a JSON document with the item tree, errors and
/// comments.
///
/// Numeric literals carry their text in `value` and, when it converts, an
/// exact decimal rendering in `number`.
pub fn to_json(result: &ParseExpressionResult) -> Value {
    let errors: Vec<Value> = diagnostics(result).iter().map(Diagnostic::to_json).collect();
    let comments: Vec<Value> = result
        .comments()
        .iter()
        .map(|c| {
            let kind = match c.kind {
                CommentKind::Line => "line",
                CommentKind::Multiline => "multiline",
            };
            json!({
                "index_in_text": c.index_in_text,
                "length": c.length,
                "kind": kind,
                "closed": c.closed,
            })
        })
        .collect();

    json!({
        "index_in_text": result.index_in_text(),
        "length": result.length(),
        "root": item_to_json(result.tree(), result.root()),
        "errors": errors,
        "comments": comments,
    })
}

/// Converts one item and everything below it.
pub fn item_to_json(tree: &ExpressionTree, id: ItemId) -> Value {
    let item = &tree[id];
    let (index_in_text, length) = tree.span(id);

    let mut node = serde_json::Map::new();
    node.insert("id".to_string(), json!(id.0));
    node.insert("kind".to_string(), json!(item.kind().name()));
    node.insert("index_in_text".to_string(), json!(index_in_text));
    node.insert("length".to_string(), json!(length));

    match item.kind() {
        ItemKind::Token(token) => {
            node.insert("token".to_string(), json!(token_kind_name(token.kind)));
            node.insert("text".to_string(), json!(token.text));
            if let TokenKind::Keyword(keyword) = token.kind {
                node.insert("keyword".to_string(), json!(keyword.0));
            }
        }
        ItemKind::Literal { name } => {
            node.insert("name".to_string(), json!(name));
        }
        ItemKind::Numeric {
            value,
            numeric_type,
            numeric_kind,
        } => {
            node.insert("value".to_string(), json!(value));
            node.insert("numeric_type".to_string(), json!(numeric_type.0));
            node.insert("numeric_kind".to_string(), json!(numeric_kind_name(*numeric_kind)));
            let number = numeric_value(value, *numeric_kind).map(|d| d.normalize().to_string());
            node.insert("number".to_string(), json!(number));
        }
        ItemKind::ConstantText {
            text, quote, closed, ..
        } => {
            node.insert("text".to_string(), json!(text));
            node.insert("quote".to_string(), json!(quote.to_string()));
            node.insert("closed".to_string(), json!(closed));
        }
        ItemKind::Braces {
            kind,
            closing,
            parameters,
            ..
        } => {
            node.insert("brace".to_string(), json!(kind.opening().to_string()));
            node.insert("closed".to_string(), json!(closing.is_some()));
            let parameters: Vec<Value> = parameters.iter().map(|p| json!(p.map(|p| p.0))).collect();
            node.insert("parameters".to_string(), Value::Array(parameters));
        }
        ItemKind::CodeBlock { end, .. } => {
            node.insert("closed".to_string(), json!(end.is_some()));
        }
        ItemKind::Operator {
            operator,
            kind,
            priority,
            info,
            ..
        } => {
            node.insert("operator".to_string(), json!(operator.0));
            node.insert("operator_kind".to_string(), json!(kind.to_string()));
            node.insert("priority".to_string(), json!(priority));
            node.insert("name".to_string(), json!(outline_core(tree, *info)));
        }
        ItemKind::OperatorInfo {
            operator, kind, name,
        } => {
            node.insert("operator".to_string(), json!(operator.0));
            node.insert("operator_kind".to_string(), json!(kind.to_string()));
            node.insert("name".to_string(), json!(name));
        }
        ItemKind::Custom(custom) => {
            node.insert("name".to_string(), json!(custom.data.name()));
            node.insert("category".to_string(), json!(custom.category.to_string()));
            node.insert("trigger".to_string(), json!(custom.trigger.0));
        }
        ItemKind::Root { .. } | ItemKind::SeriesWithErrors => {}
    }

    if item.is_complex() {
        let parts = item.parts();
        for (key, ids) in [
            ("prefixes", &parts.prefixes),
            ("keywords", &parts.keywords),
            ("regular_items", &parts.regular_items),
            ("postfixes", &parts.postfixes),
        ] {
            if !ids.is_empty() {
                let nodes: Vec<Value> = ids.iter().map(|p| item_to_json(tree, *p)).collect();
                node.insert(key.to_string(), Value::Array(nodes));
            }
        }
    }

    Value::Object(node)
}

/// Exact value of a numeric literal, if its text converts.
pub fn numeric_value(text: &str, kind: NumericKind) -> Option<Decimal> {
    match kind {
        NumericKind::Integer | NumericKind::Decimal => Decimal::from_str(text).ok(),
        NumericKind::Scientific => Decimal::from_scientific(text).ok(),
        NumericKind::Other => None,
    }
}

fn token_kind_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Name => "name",
        TokenKind::Keyword(_) => "keyword",
        TokenKind::OpeningBrace(_) => "opening_brace",
        TokenKind::ClosingBrace(_) => "closing_brace",
        TokenKind::Comma => "comma",
        TokenKind::Separator => "separator",
        TokenKind::CodeBlockStart => "code_block_start",
        TokenKind::CodeBlockEnd => "code_block_end",
        TokenKind::OperatorNamePart => "operator_name_part",
        TokenKind::NumericValue => "numeric_value",
        TokenKind::Text => "text",
        TokenKind::Custom => "custom",
    }
}

fn numeric_kind_name(kind: NumericKind) -> &'static str {
    match kind {
        NumericKind::Integer => "integer",
        NumericKind::Decimal => "decimal",
        NumericKind::Scientific => "scientific",
        NumericKind::Other => "other",
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A parse error located by line and column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based
    pub line: usize,
    /// 1-based, in characters
    pub column: usize,
    pub index_in_text: usize,
    pub length: usize,
    pub code: ParseErrorCode,
    pub message: String,
    pub is_critical: bool,
}

impl Diagnostic {
    fn to_json(&self) -> Value {
        json!({
            "line": self.line,
            "column": self.column,
            "index_in_text": self.index_in_text,
            "length": self.length,
            "code": self.code.as_u32(),
            "message": self.message,
            "is_critical": self.is_critical,
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} [{}] {}", self.line, self.column, self.code, self.message)?;
        if self.is_critical {
            write!(f, " (critical)")?;
        }
        Ok(())
    }
}

/// Errors of `result` in the order they were reported.
pub fn diagnostics(result: &ParseExpressionResult) -> Vec<Diagnostic> {
    result
        .errors()
        .iter()
        .map(|error| {
            let (line, column) = line_column(result.text(), error.index_in_text);
            Diagnostic {
                line,
                column,
                index_in_text: error.index_in_text,
                length: error.length,
                code: error.code(),
                message: error.message(),
                is_critical: error.is_critical,
            }
        })
        .collect()
}

/// 1-based line and column of the character at `index_in_text`.
pub fn line_column(text: &str, index_in_text: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for c in text.chars().take(index_in_text) {
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{Language, LanguageConfig, OperatorConfig};
    use crate::parser::parse_expression;
    use pretty_assertions::assert_eq;

    fn arithmetic() -> Language {
        Language::new(
            LanguageConfig::default()
                .with_operator(OperatorConfig::binary("+", 30))
                .with_operator(OperatorConfig::binary("*", 20))
                .with_operator(OperatorConfig::prefix("-", 0))
                .with_operator(OperatorConfig::postfix("++", 5))
                .with_keyword(1, "public"),
        )
    }

    fn render(text: &str) -> String {
        crate::init_test_logging();
        let result = parse_expression(text, &arithmetic()).unwrap();
        outline(&result)
    }

    #[test]
    fn test_outline_operators() {
        assert_eq!(render("x + y * z"), "+(x, *(y, z))");
        assert_eq!(render("-x"), "-(x)");
        assert_eq!(render("x++"), "(x)++");
    }

    #[test]
    fn test_outline_statements_and_blocks() {
        assert_eq!(render("a; b"), "a; b");
        assert_eq!(render("{a; b}"), "{a; b}");
        assert_eq!(render("F(x) {y}"), "F(x) {y}");
    }

    #[test]
    fn test_outline_keywords_and_texts() {
        assert_eq!(render("public x"), "public x");
        assert_eq!(render("'a' + 1.5"), "+('a', 1.5)");
    }

    #[test]
    fn test_json_numeric_values() {
        let result = parse_expression("1.5e3", &arithmetic()).unwrap();
        let json = to_json(&result);
        let numeric = &json["root"]["regular_items"][0];
        assert_eq!(numeric["kind"], "numeric");
        assert_eq!(numeric["value"], "1.5e3");
        assert_eq!(numeric["numeric_kind"], "scientific");
        assert_eq!(numeric["number"], "1500");
    }

    #[test]
    fn test_json_braces_parameters() {
        let result = parse_expression("F(,x)", &arithmetic()).unwrap();
        let json = to_json(&result);
        let braces = &json["root"]["regular_items"][0];
        assert_eq!(braces["kind"], "braces");
        assert_eq!(braces["closed"], true);
        assert_eq!(braces["parameters"][0], Value::Null);
        assert!(braces["parameters"][1].is_u64());
    }

    #[test]
    fn test_numeric_value_kinds() {
        assert_eq!(numeric_value("42", NumericKind::Integer), Some(Decimal::from(42)));
        assert_eq!(numeric_value("0x1F", NumericKind::Other), None);
        assert_eq!(
            numeric_value("2.50", NumericKind::Decimal).map(|d| d.normalize().to_string()),
            Some("2.5".to_string())
        );
    }

    #[test]
    fn test_line_column() {
        let text = "a\nbc\n  d";
        assert_eq!(line_column(text, 0), (1, 1));
        assert_eq!(line_column(text, 3), (2, 2));
        assert_eq!(line_column(text, 7), (3, 3));
    }

    #[test]
    fn test_diagnostic_display() {
        let result = parse_expression("x +\n'abc", &arithmetic()).unwrap();
        let diagnostics = diagnostics(&result);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 2);
        assert_eq!(diagnostics[0].column, 1);
        assert_eq!(
            diagnostics[0].to_string(),
            "2:1 [E0006] text constant is not closed, expected '"
        );
    }
}
