//! # Parse errors
//!
//! Everything that goes wrong while parsing text ends up as a [`ParseErrorItem`]
//! in the [`ParseErrorData`] of the result. Nothing is thrown across `parse`.
//!
//! Errors are either **critical** (parsing stopped, the rest of the text was not
//! looked at) or **non-critical** (recorded, the parser recovered with a degraded
//! node and kept going).
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest code a custom expression parser may use.
pub const CUSTOM_ERROR_CODE_START: u32 = 10_000;

/// Machine readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u32")]
pub enum ParseErrorCode {
    InvalidSymbol,
    UnexpectedSymbol,
    BinaryOperatorMissing,
    NoSeparationBetweenSymbols,
    OperandMissing,
    ConstantTextNotClosed,
    MultipleOccurrencesOfKeyword,
    InvalidUseOfPrefixesOrKeywords,
    PostfixHasNoTarget,
    PostfixRejected,
    ClosingBraceMissing,
    CodeBlockEndMarkerMissing,
    CommentNotClosed,
    ParserImplementationError,
    CustomExpressionParserThrewAnException,
    /// Plugin defined, always `>= 10000`
    Custom(u32),
}

impl ParseErrorCode {
    pub fn as_u32(self) -> u32 {
        match self {
            ParseErrorCode::InvalidSymbol => 1,
            ParseErrorCode::UnexpectedSymbol => 2,
            ParseErrorCode::BinaryOperatorMissing => 3,
            ParseErrorCode::NoSeparationBetweenSymbols => 4,
            ParseErrorCode::OperandMissing => 5,
            ParseErrorCode::ConstantTextNotClosed => 6,
            ParseErrorCode::MultipleOccurrencesOfKeyword => 7,
            ParseErrorCode::InvalidUseOfPrefixesOrKeywords => 8,
            ParseErrorCode::PostfixHasNoTarget => 9,
            ParseErrorCode::PostfixRejected => 10,
            ParseErrorCode::ClosingBraceMissing => 11,
            ParseErrorCode::CodeBlockEndMarkerMissing => 12,
            ParseErrorCode::CommentNotClosed => 13,
            ParseErrorCode::ParserImplementationError => 14,
            ParseErrorCode::CustomExpressionParserThrewAnException => 15,
            ParseErrorCode::Custom(code) => code,
        }
    }
}

impl From<ParseErrorCode> for u32 {
    fn from(code: ParseErrorCode) -> u32 {
        code.as_u32()
    }
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.as_u32())
    }
}

/// What went wrong. Rendered into a message only when asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("invalid symbol '{symbol}'")]
    InvalidSymbol { symbol: char },

    #[error("unexpected '{symbol}'")]
    UnexpectedSymbol { symbol: String },

    #[error("binary operator missing")]
    BinaryOperatorMissing,

    #[error("no separation between symbols")]
    NoSeparationBetweenSymbols,

    #[error("operand missing for operator '{operator}'")]
    OperandMissing { operator: String },

    #[error("text constant is not closed, expected {quote}")]
    ConstantTextNotClosed { quote: char },

    #[error("keyword '{keyword}' is used more than once")]
    MultipleOccurrencesOfKeyword { keyword: String },

    #[error("prefixes or keywords must be followed by an expression")]
    InvalidUseOfPrefixesOrKeywords,

    #[error("postfix has no expression to apply to")]
    PostfixHasNoTarget,

    #[error("postfix cannot be applied to this expression")]
    PostfixRejected,

    #[error("closing brace '{expected}' is missing")]
    ClosingBraceMissing { expected: char },

    #[error("code block end marker '{marker}' is missing")]
    CodeBlockEndMarkerMissing { marker: String },

    #[error("comment is not closed, expected '{marker}'")]
    CommentNotClosed { marker: String },

    #[error("parser implementation error: {details}")]
    ParserImplementationError { details: String },

    #[error("custom expression parser failed: {details}")]
    CustomExpressionParserThrewAnException { details: String },

    #[error("{message}")]
    Custom { code: u32, message: String },
}

impl ParseErrorKind {
    pub fn code(&self) -> ParseErrorCode {
        match self {
            ParseErrorKind::InvalidSymbol { .. } => ParseErrorCode::InvalidSymbol,
            ParseErrorKind::UnexpectedSymbol { .. } => ParseErrorCode::UnexpectedSymbol,
            ParseErrorKind::BinaryOperatorMissing => ParseErrorCode::BinaryOperatorMissing,
            ParseErrorKind::NoSeparationBetweenSymbols => {
                ParseErrorCode::NoSeparationBetweenSymbols
            }
            ParseErrorKind::OperandMissing { .. } => ParseErrorCode::OperandMissing,
            ParseErrorKind::ConstantTextNotClosed { .. } => ParseErrorCode::ConstantTextNotClosed,
            ParseErrorKind::MultipleOccurrencesOfKeyword { .. } => {
                ParseErrorCode::MultipleOccurrencesOfKeyword
            }
            ParseErrorKind::InvalidUseOfPrefixesOrKeywords => {
                ParseErrorCode::InvalidUseOfPrefixesOrKeywords
            }
            ParseErrorKind::PostfixHasNoTarget => ParseErrorCode::PostfixHasNoTarget,
            ParseErrorKind::PostfixRejected => ParseErrorCode::PostfixRejected,
            ParseErrorKind::ClosingBraceMissing { .. } => ParseErrorCode::ClosingBraceMissing,
            ParseErrorKind::CodeBlockEndMarkerMissing { .. } => {
                ParseErrorCode::CodeBlockEndMarkerMissing
            }
            ParseErrorKind::CommentNotClosed { .. } => ParseErrorCode::CommentNotClosed,
            ParseErrorKind::ParserImplementationError { .. } => {
                ParseErrorCode::ParserImplementationError
            }
            ParseErrorKind::CustomExpressionParserThrewAnException { .. } => {
                ParseErrorCode::CustomExpressionParserThrewAnException
            }
            ParseErrorKind::Custom { code, .. } => ParseErrorCode::Custom(*code),
        }
    }

    /// Whether this kind of error always stops the parse.
    pub fn is_critical_by_default(&self) -> bool {
        matches!(
            self,
            ParseErrorKind::InvalidSymbol { .. }
                | ParseErrorKind::ParserImplementationError { .. }
                | ParseErrorKind::CustomExpressionParserThrewAnException { .. }
        )
    }
}

/// One error, positioned in the parsed text (character offsets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorItem {
    pub index_in_text: usize,
    pub length: usize,
    pub kind: ParseErrorKind,
    pub is_critical: bool,
}

impl ParseErrorItem {
    pub fn new(index_in_text: usize, length: usize, kind: ParseErrorKind) -> Self {
        let is_critical = kind.is_critical_by_default();
        ParseErrorItem {
            index_in_text,
            length,
            kind,
            is_critical,
        }
    }

    pub fn critical(mut self, is_critical: bool) -> Self {
        self.is_critical = is_critical;
        self
    }

    pub fn code(&self) -> ParseErrorCode {
        self.kind.code()
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn end(&self) -> usize {
        self.index_in_text + self.length
    }
}

impl fmt::Display for ParseErrorItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.code(), self.index_in_text, self.kind)
    }
}

/// Errors of one parse, in the order they were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseErrorData {
    items: Vec<ParseErrorItem>,
}

impl ParseErrorData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ParseErrorItem) {
        log::trace!("parse error {}", error);
        self.items.push(error);
    }

    /// Drops errors reported by an attempt that was rolled back.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseErrorItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[ParseErrorItem] {
        &self.items
    }

    pub fn has_critical_errors(&self) -> bool {
        self.items.iter().any(|e| e.is_critical)
    }

    /// Errors covering `position`. Zero-length errors match their own position.
    pub fn errors_at(&self, position: usize) -> Vec<&ParseErrorItem> {
        self.items
            .iter()
            .filter(|e| {
                if e.length == 0 {
                    e.index_in_text == position
                } else {
                    e.index_in_text <= position && position < e.end()
                }
            })
            .collect()
    }

    /// Errors starting inside `start..end`.
    pub fn errors_in_range(&self, start: usize, end: usize) -> Vec<&ParseErrorItem> {
        self.items
            .iter()
            .filter(|e| e.index_in_text >= start && e.index_in_text < end)
            .collect()
    }

    pub fn with_code(&self, code: ParseErrorCode) -> Vec<&ParseErrorItem> {
        self.items.iter().filter(|e| e.code() == code).collect()
    }
}

impl<'a> IntoIterator for &'a ParseErrorData {
    type Item = &'a ParseErrorItem;
    type IntoIter = std::slice::Iter<'a, ParseErrorItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ParseErrorCode::InvalidSymbol.as_u32(), 1);
        assert_eq!(ParseErrorCode::BinaryOperatorMissing.as_u32(), 3);
        assert_eq!(
            ParseErrorCode::CustomExpressionParserThrewAnException.as_u32(),
            15
        );
        assert_eq!(ParseErrorCode::Custom(10_042).as_u32(), 10_042);
        assert_eq!(ParseErrorCode::ConstantTextNotClosed.to_string(), "E0006");
    }

    #[test]
    fn test_criticality_defaults() {
        let error = ParseErrorItem::new(0, 1, ParseErrorKind::InvalidSymbol { symbol: '#' });
        assert!(error.is_critical);

        let error = ParseErrorItem::new(0, 0, ParseErrorKind::BinaryOperatorMissing);
        assert!(!error.is_critical);
    }

    #[test]
    fn test_errors_at_position() {
        let mut data = ParseErrorData::new();
        data.add(ParseErrorItem::new(2, 3, ParseErrorKind::PostfixRejected));
        data.add(ParseErrorItem::new(
            7,
            0,
            ParseErrorKind::BinaryOperatorMissing,
        ));

        assert_eq!(data.errors_at(4).len(), 1);
        assert_eq!(data.errors_at(5).len(), 0);
        assert_eq!(data.errors_at(7).len(), 1);
        assert_eq!(data.errors_in_range(0, 10).len(), 2);
        assert!(!data.has_critical_errors());
    }

    #[test]
    fn test_message_is_rendered_from_kind() {
        let error = ParseErrorItem::new(
            0,
            4,
            ParseErrorKind::MultipleOccurrencesOfKeyword {
                keyword: "public".to_string(),
            },
        );
        assert_eq!(error.message(), "keyword 'public' is used more than once");
    }
}
