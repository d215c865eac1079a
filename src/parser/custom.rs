//! # Custom expressions
//!
//! A [`CustomExpressionParser`] adds syntax the generic parser does not know.
//! It registers keyword ids; when the last keyword before an operand (or right
//! after one, for postfixes) is one of them, the parser hands control over
//! through a [`CustomParseContext`].
//!
//! ```text
//! public pragma warning(disable: 42)
//! ~~~~~~ ^^^^^^ ~~~~~~~~~~~~~~~~~~~~
//!   |    trigger        parsed by the plugin
//!   keyword before the trigger, attached to the result
//! ```
//!
//! The plugin returns:
//! - `Ok(None)` - not my syntax; the cursor is rewound and parsing goes on
//! - `Ok(Some(expression))` - the parts consumed, with a [`CustomCategory`]
//! - `Err(error)` - a failure; the parse stops with a critical error
use std::fmt;

use thiserror::Error;

use super::{ParseState, SegmentContext};
use crate::ast::{CustomCategory, CustomExpressionData, ExpressionTree, ItemId, TokenKind, TreeError};
use crate::error::{CUSTOM_ERROR_CODE_START, ParseErrorItem, ParseErrorKind};
use crate::language::KeywordId;
use crate::scanner::Scanner;

#[derive(Debug, Error)]
pub enum CustomExpressionError {
    #[error("{0}")]
    Message(String),

    #[error("custom error code {0} is below {min}", min = CUSTOM_ERROR_CODE_START)]
    InvalidErrorCode(u32),

    /// A nested parse hit a critical error; the plugin should return this as is.
    #[error("parsing stopped on a critical error")]
    ParseStopped,

    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl CustomExpressionError {
    pub fn new(message: impl Into<String>) -> Self {
        CustomExpressionError::Message(message.into())
    }
}

/// Parser for a keyword-triggered syntax extension.
pub trait CustomExpressionParser: fmt::Debug {
    /// Keywords that trigger this parser.
    fn keyword_ids(&self) -> &[KeywordId];

    /// Tries to parse a custom expression at the context's cursor, which sits
    /// right after the trigger keyword.
    fn try_parse(
        &self,
        context: &mut CustomParseContext<'_, '_>,
    ) -> Result<Option<CustomExpression>, CustomExpressionError>;
}

/// One part of a custom expression, in text order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomPart {
    /// A token added with [`CustomParseContext::add_token`]
    Token(ItemId),
    /// A nested expression
    Child(ItemId),
}

/// What a plugin hands back. The trigger keyword is added as the first part.
#[derive(Debug)]
pub struct CustomExpression {
    pub category: CustomCategory,
    pub data: Box<dyn CustomExpressionData>,
    pub parts: Vec<CustomPart>,
}

impl CustomExpression {
    pub fn new(category: CustomCategory, data: impl CustomExpressionData + 'static) -> Self {
        CustomExpression {
            category,
            data: Box::new(data),
            parts: Vec::new(),
        }
    }

    pub fn with_token(mut self, token: ItemId) -> Self {
        self.parts.push(CustomPart::Token(token));
        self
    }

    pub fn with_child(mut self, child: ItemId) -> Self {
        self.parts.push(CustomPart::Child(child));
        self
    }
}

/// The parser, as seen by a plugin.
pub struct CustomParseContext<'p, 'a> {
    state: &'p mut ParseState<'a>,
    prefixes: &'p [ItemId],
    keywords: &'p [ItemId],
    trigger: ItemId,
    trigger_keyword: KeywordId,
}

impl<'p, 'a> CustomParseContext<'p, 'a> {
    pub(crate) fn new(
        state: &'p mut ParseState<'a>,
        prefixes: &'p [ItemId],
        keywords: &'p [ItemId],
        trigger: ItemId,
        trigger_keyword: KeywordId,
    ) -> Self {
        CustomParseContext {
            state,
            prefixes,
            keywords,
            trigger,
            trigger_keyword,
        }
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    pub fn position(&self) -> usize {
        self.state.scanner.position()
    }

    pub fn current_char(&self) -> Option<char> {
        self.state.scanner.current_char()
    }

    pub fn char_at(&self, position: usize) -> Option<char> {
        self.state.scanner.char_at(position)
    }

    pub fn is_eof(&self) -> bool {
        self.state.scanner.is_eof()
    }

    pub fn skip(&mut self, count: usize) {
        self.state.scanner.skip(count);
    }

    /// Skips whitespace and comments.
    pub fn skip_spaces(&mut self) {
        self.state.skip_spaces();
    }

    /// Whether `symbol` is at the cursor, using the language's case rules.
    pub fn starts_with(&self, symbol: &str) -> bool {
        self.state.symbol_at(self.position(), symbol)
    }

    pub fn scanner(&self) -> &Scanner {
        &self.state.scanner
    }

    // ========================================================================
    // Context
    // ========================================================================

    /// Prefixes parsed before the trigger and not attached yet.
    pub fn prefixes(&self) -> &[ItemId] {
        self.prefixes
    }

    /// Keywords before the trigger keyword.
    pub fn keywords(&self) -> &[ItemId] {
        self.keywords
    }

    pub fn trigger(&self) -> ItemId {
        self.trigger
    }

    pub fn trigger_keyword(&self) -> KeywordId {
        self.trigger_keyword
    }

    pub fn tree(&self) -> &ExpressionTree {
        &self.state.tree
    }

    // ========================================================================
    // Re-entrant parsing
    // ========================================================================

    /// Adds a token covering the next `length` characters and moves past it.
    pub fn add_token(&mut self, length: usize) -> ItemId {
        let start = self.position();
        let text = self.state.scanner.slice(start, start + length).to_string();
        self.state.scanner.skip(length);
        self.state
            .tree
            .create_token(TokenKind::Custom, &text, start)
    }

    /// Parses a bare name at the cursor.
    pub fn parse_literal_name(&mut self) -> Result<Option<ItemId>, CustomExpressionError> {
        self.state.skip_spaces();
        self.state.parse_literal_name().map_err(|_| CustomExpressionError::ParseStopped)
    }

    /// Parses `( ... )` or `[ ... ]` at the cursor.
    pub fn parse_braces(&mut self) -> Result<Option<ItemId>, CustomExpressionError> {
        self.state.skip_spaces();
        if !self.state.is_opening_brace(self.position()) {
            return Ok(None);
        }
        self.state
            .parse_braces(None)
            .map(Some)
            .map_err(|_| CustomExpressionError::ParseStopped)
    }

    /// Parses a code block at the cursor.
    pub fn parse_code_block(&mut self) -> Result<Option<ItemId>, CustomExpressionError> {
        self.state.skip_spaces();
        if !self.state.is_code_block_start(self.position()) {
            return Ok(None);
        }
        self.state
            .parse_code_block()
            .map(Some)
            .map_err(|_| CustomExpressionError::ParseStopped)
    }

    /// Parses one expression, up to a separator, comma, closing brace or code
    /// block end.
    pub fn parse_expression(&mut self) -> Result<Option<ItemId>, CustomExpressionError> {
        self.state
            .parse_segment(SegmentContext::Custom)
            .map(|segment| segment.item)
            .map_err(|_| CustomExpressionError::ParseStopped)
    }

    /// Reports a plugin defined error. Codes start at 10000.
    pub fn add_error(
        &mut self,
        index_in_text: usize,
        length: usize,
        code: u32,
        message: impl Into<String>,
        is_critical: bool,
    ) -> Result<(), CustomExpressionError> {
        if code < CUSTOM_ERROR_CODE_START {
            return Err(CustomExpressionError::InvalidErrorCode(code));
        }
        let kind = ParseErrorKind::Custom {
            code,
            message: message.into(),
        };
        self.state
            .errors
            .add(ParseErrorItem::new(index_in_text, length, kind).critical(is_critical));
        Ok(())
    }
}
