//! # Expression parser
//!
//! Recursive descent over the text, driven by a [`LanguageProvider`].
//!
//! The text is split into **segments**: root statements, code block
//! statements, braces parameters and plugin sub-expressions. Each segment runs
//! through a small state machine:
//!
//! ```text
//! PrefixesAndKeywords -> Operand -> OperatorsAndKeywords -> Complete
//!          ^                                  |
//!          +----------- operator -------------+
//! ```
//!
//! Operands and operator groups are collected flat and handed to the
//! [resolver](resolver) once the segment hits a terminator (separator, comma,
//! closing brace, code block end, end of text).
//!
//! ## Example
//!
//! ```
//! use clove_expr::{ExpressionParser, Language, LanguageConfig, OperatorConfig};
//! use clove_expr::output::outline;
//!
//! let language = Language::new(
//!     LanguageConfig::default()
//!         .with_operator(OperatorConfig::binary("+", 30))
//!         .with_operator(OperatorConfig::binary("*", 20)),
//! );
//! let parser = ExpressionParser::new(&language).unwrap();
//! let result = parser.parse("x + y * z");
//!
//! assert!(result.errors().is_empty());
//! assert_eq!(outline(&result), "+(x, *(y, z))");
//! ```
mod blocks;
pub mod custom;
mod items;
mod matcher;
mod resolver;

pub use custom::{
    CustomExpression, CustomExpressionError, CustomExpressionParser, CustomParseContext,
    CustomPart,
};

use crate::ast::{
    CustomCategory, CustomExpressionItem, ExpressionTree, ItemId, ItemKind, TokenKind, TreeError,
};
use crate::error::{ParseErrorCode, ParseErrorData, ParseErrorItem, ParseErrorKind};
use crate::language::{CompiledLanguage, KeywordId, LanguageError, LanguageProvider, OperatorKind};
use crate::result::ParseExpressionResult;
use crate::scanner::Scanner;
use matcher::{Matcher, OperatorGroup};
use resolver::{Resolver, Term};

/// Parses texts of one language.
///
/// Building the parser validates the language once; `parse` can then be
/// called any number of times.
pub struct ExpressionParser<'a> {
    provider: &'a dyn LanguageProvider,
    language: CompiledLanguage,
}

impl<'a> ExpressionParser<'a> {
    pub fn new(provider: &'a dyn LanguageProvider) -> Result<Self, LanguageError> {
        let language = CompiledLanguage::compile(provider)?;
        log::debug!(
            "language compiled: {} keyword(s), {} operator(s)",
            language.keywords.len(),
            language.operators.len()
        );
        Ok(ExpressionParser { provider, language })
    }

    /// Parses `text`. Never fails: problems are reported in the result.
    pub fn parse(&self, text: &str) -> ParseExpressionResult {
        let mut state = ParseState::new(&self.language, self.provider, text);
        log::debug!("parsing {} char(s)", state.scanner.len());

        let root = state.tree.create(
            ItemKind::Root {
                statements: Vec::new(),
                separators: Vec::new(),
            },
            0,
        );

        if state.parse_root(root).is_err() {
            log::warn!(
                "parse stopped by a critical error at {} of {} char(s)",
                state.scanner.position(),
                state.scanner.len()
            );
        }

        log::debug!(
            "parse finished: {} item(s), {} error(s)",
            state.tree.len(),
            state.errors.len()
        );

        ParseExpressionResult::new(
            text,
            state.tree,
            root,
            state.errors,
            state.scanner.into_comments(),
        )
    }
}

/// Builds a parser for `provider` and parses `text` with it.
pub fn parse_expression(
    text: &str,
    provider: &dyn LanguageProvider,
) -> Result<ParseExpressionResult, LanguageError> {
    Ok(ExpressionParser::new(provider)?.parse(text))
}

// ============================================================================
// Parse state
// ============================================================================

/// Parsing cannot go on; the critical error is already recorded.
#[derive(Debug)]
pub(crate) struct Halt;

pub(crate) type Flow<T> = Result<T, Halt>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentContext {
    Root,
    CodeBlock,
    Braces,
    Custom,
}

impl SegmentContext {
    /// Statement contexts end a statement after a code block postfix.
    fn is_statement(self) -> bool {
        matches!(self, SegmentContext::Root | SegmentContext::CodeBlock)
    }
}

#[derive(Debug)]
pub(crate) struct Segment {
    pub item: Option<ItemId>,
    /// The statement ended with a code block postfix, no separator needed
    pub closed_by_code_block: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentState {
    PrefixesAndKeywords,
    Operand,
    OperatorsAndKeywords(ItemId),
    Complete,
}

/// Everything one parse owns.
pub(crate) struct ParseState<'a> {
    pub language: &'a CompiledLanguage,
    pub provider: &'a dyn LanguageProvider,
    pub scanner: Scanner,
    pub tree: ExpressionTree,
    pub errors: ParseErrorData,
}

impl<'a> ParseState<'a> {
    fn new(language: &'a CompiledLanguage, provider: &'a dyn LanguageProvider, text: &str) -> Self {
        ParseState {
            language,
            provider,
            scanner: Scanner::new(text, language.comments.clone()),
            tree: ExpressionTree::new(),
            errors: ParseErrorData::new(),
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Records a critical error.
    pub fn critical(&mut self, index_in_text: usize, length: usize, kind: ParseErrorKind) -> Halt {
        let error = ParseErrorItem::new(index_in_text, length, kind).critical(true);
        log::warn!("critical parse error: {}", error);
        self.errors.add(error);
        Halt
    }

    pub fn error(&mut self, index_in_text: usize, length: usize, kind: ParseErrorKind) {
        self.errors
            .add(ParseErrorItem::new(index_in_text, length, kind).critical(false));
    }

    /// A tree mutation failing inside the parser is a bug in the parser.
    pub fn tree_op<T>(&mut self, result: Result<T, TreeError>) -> Flow<T> {
        result.map_err(|err| {
            let position = self.scanner.position();
            self.critical(
                position,
                0,
                ParseErrorKind::ParserImplementationError {
                    details: err.to_string(),
                },
            )
        })
    }

    pub fn skip_spaces(&mut self) {
        let Some(start) = self.scanner.skip_spaces() else {
            return;
        };
        let reported = self
            .errors
            .errors_at(start)
            .iter()
            .any(|e| e.code() == ParseErrorCode::CommentNotClosed);
        if !reported {
            let marker = self
                .language
                .comments
                .multiline
                .as_ref()
                .map(|(_, end)| end.clone())
                .unwrap_or_default();
            let length = self.scanner.len() - start;
            self.error(start, length, ParseErrorKind::CommentNotClosed { marker });
        }
    }

    pub fn symbol_at(&self, position: usize, symbol: &str) -> bool {
        matcher::symbol_at(self.language, self.provider, &self.scanner, position, symbol)
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher::new(self.language, self.provider, &self.scanner)
    }

    pub fn is_opening_brace(&self, position: usize) -> bool {
        self.scanner
            .char_at(position)
            .is_some_and(|c| c == '(' || c == '[')
    }

    pub fn is_code_block_start(&self, position: usize) -> bool {
        self.language
            .code_block
            .as_ref()
            .is_some_and(|markers| self.symbol_at(position, &markers.start))
    }

    pub fn is_code_block_end(&self, position: usize) -> bool {
        self.language
            .code_block
            .as_ref()
            .is_some_and(|markers| self.symbol_at(position, &markers.end))
    }

    fn is_separator(&self, position: usize) -> bool {
        self.language.separator.is_some() && self.scanner.char_at(position) == self.language.separator
    }

    /// Segment terminators, the same in every context.
    pub fn is_terminator(&self, position: usize) -> bool {
        match self.scanner.char_at(position) {
            None => true,
            Some(',' | ')' | ']') => true,
            Some(_) => self.is_separator(position) || self.is_code_block_end(position),
        }
    }

    fn is_literal_start(&self, position: usize) -> bool {
        self.scanner
            .char_at(position)
            .is_some_and(|c| self.provider.is_valid_literal_char(c, 0, &self.scanner))
    }

    // ========================================================================
    // Keywords
    // ========================================================================

    /// Parses consecutive keywords into `keywords`.
    ///
    /// A keyword already in `keywords` is consumed, reported when
    /// `report_duplicates` is set, and ends the run.
    fn parse_keyword_run(&mut self, keywords: &mut Vec<ItemId>, report_duplicates: bool) {
        loop {
            self.skip_spaces();
            let position = self.scanner.position();
            let Some((id, length)) = self
                .matcher()
                .match_keyword(position)
                .map(|keyword| (keyword.id, keyword.text.chars().count()))
            else {
                break;
            };

            let text = self.scanner.slice(position, position + length).to_string();
            self.scanner.skip(length);

            let duplicate = keywords.iter().any(|k| {
                self.tree[*k]
                    .token()
                    .is_some_and(|token| token.kind == TokenKind::Keyword(id))
            });
            if duplicate {
                if report_duplicates {
                    self.error(
                        position,
                        length,
                        ParseErrorKind::MultipleOccurrencesOfKeyword { keyword: text },
                    );
                }
                break;
            }

            log::trace!("keyword '{}' at {}", text, position);
            let token = self
                .tree
                .create_token(TokenKind::Keyword(id), &text, position);
            keywords.push(token);
        }
    }

    // ========================================================================
    // Segments
    // ========================================================================

    /// Parses one segment and resolves its operators.
    pub fn parse_segment(&mut self, context: SegmentContext) -> Flow<Segment> {
        let mut terms: Vec<Term> = Vec::new();
        // Pending prefixes and keywords, not attached yet
        let mut prefixes: Vec<ItemId> = Vec::new();
        let mut keywords: Vec<ItemId> = Vec::new();
        // Prefixes and keywords before the first term go to the resolved root
        let mut lead_prefixes: Vec<ItemId> = Vec::new();
        let mut lead_keywords: Vec<ItemId> = Vec::new();
        let mut closed_by_code_block = false;
        let mut state = SegmentState::PrefixesAndKeywords;

        loop {
            state = match state {
                SegmentState::PrefixesAndKeywords => {
                    self.parse_prefixes_and_keywords(&mut prefixes, &mut keywords)?
                }

                SegmentState::Operand => {
                    match self.parse_operand(&terms, &mut prefixes, &mut keywords)? {
                        OperandStep::Operand(item) => SegmentState::OperatorsAndKeywords(item),
                        OperandStep::Operators(group) => {
                            if !prefixes.is_empty() || !keywords.is_empty() {
                                if terms.is_empty() {
                                    lead_prefixes.append(&mut prefixes);
                                    lead_keywords.append(&mut keywords);
                                } else {
                                    let stray = self.misplaced(&mut prefixes, &mut keywords)?;
                                    terms.push(Term::Stray(stray));
                                }
                            }
                            terms.push(Term::Operators(group));
                            SegmentState::PrefixesAndKeywords
                        }
                        OperandStep::Stray(item) => {
                            // Pending prefixes come before the stray and cannot reach past it
                            if !prefixes.is_empty() {
                                let stray = self.misplaced(&mut prefixes, &mut Vec::new())?;
                                terms.push(Term::Stray(stray));
                            }
                            terms.push(Term::Stray(item));
                            SegmentState::PrefixesAndKeywords
                        }
                        OperandStep::Retry => SegmentState::PrefixesAndKeywords,
                        OperandStep::End => SegmentState::Complete,
                    }
                }

                SegmentState::OperatorsAndKeywords(operand) => {
                    if terms.is_empty() {
                        lead_prefixes.append(&mut prefixes);
                        lead_keywords.append(&mut keywords);
                    } else {
                        for prefix in prefixes.drain(..) {
                            let result = self.tree.add_prefix(operand, prefix);
                            self.tree_op(result)?;
                        }
                        for keyword in keywords.drain(..) {
                            let result = self.tree.add_keyword(operand, keyword);
                            self.tree_op(result)?;
                        }
                    }

                    let postfixes = self.parse_postfixes(operand, context)?;
                    terms.push(Term::Operand(operand));
                    if let Some(rejected) = postfixes.rejected {
                        terms.push(Term::Stray(rejected));
                    }

                    if postfixes.closed_by_code_block {
                        closed_by_code_block = true;
                        SegmentState::Complete
                    } else {
                        self.skip_spaces();
                        let position = self.scanner.position();
                        if self.is_terminator(position) {
                            SegmentState::Complete
                        } else {
                            let group = self.matcher().match_operator(position, true);
                            // Without an operator another operand follows; the resolver reports it
                            if let Some(group) = group {
                                self.scanner.set_position(group.end());
                                terms.push(Term::Operators(group));
                            }
                            SegmentState::PrefixesAndKeywords
                        }
                    }
                }

                SegmentState::Complete => break,
            };
        }

        if !prefixes.is_empty() || !keywords.is_empty() {
            if terms.is_empty() {
                lead_prefixes.append(&mut prefixes);
                lead_keywords.append(&mut keywords);
            } else {
                let stray = self.misplaced(&mut prefixes, &mut keywords)?;
                terms.push(Term::Stray(stray));
            }
        }

        let resolved = Resolver::new(self.language, &mut self.tree, &mut self.errors).resolve(terms);
        let resolved = self.tree_op(resolved)?;

        let item = match resolved {
            Some(root) => {
                self.attach_lead(root, lead_prefixes, lead_keywords)?;
                Some(root)
            }
            None if lead_prefixes.is_empty() && lead_keywords.is_empty() => None,
            None => Some(self.misplaced(&mut lead_prefixes, &mut lead_keywords)?),
        };

        Ok(Segment {
            item,
            closed_by_code_block,
        })
    }

    fn attach_lead(&mut self, owner: ItemId, prefixes: Vec<ItemId>, keywords: Vec<ItemId>) -> Flow<()> {
        for prefix in prefixes {
            let result = self.tree.add_prefix(owner, prefix);
            self.tree_op(result)?;
        }
        for keyword in keywords {
            let result = self.tree.add_keyword(owner, keyword);
            self.tree_op(result)?;
        }
        Ok(())
    }

    /// Prefixes or keywords with no operand to apply to. They are reported
    /// and moved into a new `SeriesWithErrors`.
    fn misplaced(&mut self, prefixes: &mut Vec<ItemId>, keywords: &mut Vec<ItemId>) -> Flow<ItemId> {
        let first = prefixes.first().or(keywords.first()).copied();
        let last = keywords.last().or(prefixes.last()).copied();
        let start = first.map(|id| self.tree.index_in_text(id)).unwrap_or(0);
        let end = last.map(|id| self.tree.end(id)).unwrap_or(start);
        self.error(start, end - start, ParseErrorKind::InvalidUseOfPrefixesOrKeywords);

        let series = self.tree.create(ItemKind::SeriesWithErrors, start);
        self.attach_lead(series, std::mem::take(prefixes), std::mem::take(keywords))?;
        Ok(series)
    }

    fn parse_prefixes_and_keywords(
        &mut self,
        prefixes: &mut Vec<ItemId>,
        keywords: &mut Vec<ItemId>,
    ) -> Flow<SegmentState> {
        loop {
            self.skip_spaces();
            let position = self.scanner.position();

            // Nameless braces are a prefix when an operand follows them
            if self.language.supports_prefixes && keywords.is_empty() && self.is_opening_brace(position) {
                let braces = self.parse_braces(None)?;
                if self.operand_follows() {
                    prefixes.push(braces);
                    continue;
                }
                return Ok(SegmentState::OperatorsAndKeywords(braces));
            }

            if self.language.supports_keywords {
                let before = keywords.len();
                self.parse_keyword_run(keywords, true);
                if keywords.len() > before {
                    continue;
                }
            }

            return Ok(SegmentState::Operand);
        }
    }

    /// Whether something that can start an operand follows the cursor.
    fn operand_follows(&self) -> bool {
        let position = self.scanner.spaces_end(self.scanner.position());
        !(self.is_terminator(position)
            || self.is_code_block_start(position)
            || self.matcher().match_operator(position, true).is_some())
    }

    fn parse_operand(
        &mut self,
        terms: &[Term],
        prefixes: &mut Vec<ItemId>,
        keywords: &mut Vec<ItemId>,
    ) -> Flow<OperandStep> {
        self.skip_spaces();

        if !keywords.is_empty() {
            if let Some(item) = self.try_custom(prefixes, keywords)? {
                keywords.clear();
                return Ok(self.place_custom(item, prefixes));
            }
        }

        let position = self.scanner.position();
        if self.is_terminator(position) {
            return Ok(OperandStep::End);
        }

        let Some(c) = self.scanner.current_char() else {
            return Ok(OperandStep::End);
        };

        if self.language.quote_chars.contains(&c) {
            return self.parse_text(c).map(OperandStep::Operand);
        }

        if let Some(numeric) = self.language.numeric.match_at(self.scanner.rest_from(position)) {
            return self.parse_numeric(numeric).map(OperandStep::Operand);
        }

        if self.is_opening_brace(position) {
            return self.parse_braces(None).map(OperandStep::Operand);
        }

        if self.is_code_block_start(position) {
            return self.parse_code_block().map(OperandStep::Operand);
        }

        let preceded_by_operand = match terms.last() {
            Some(Term::Operand(_)) => true,
            Some(Term::Operators(group)) => group.has_kind(self.language, OperatorKind::Postfix),
            Some(Term::Stray(_)) | None => false,
        };
        let group = self.matcher().match_operator(position, preceded_by_operand);
        if let Some(group) = group {
            self.scanner.set_position(group.end());
            return Ok(OperandStep::Operators(group));
        }

        if self.is_literal_start(position) {
            if let Some(item) = self.parse_literal()? {
                return Ok(OperandStep::Operand(item));
            }
        }

        Err(self.critical(position, 1, ParseErrorKind::InvalidSymbol { symbol: c }))
    }

    /// Routes a custom expression found in operand position by its category.
    fn place_custom(&mut self, item: ItemId, prefixes: &mut Vec<ItemId>) -> OperandStep {
        let category = match &self.tree[item].kind {
            ItemKind::Custom(custom) => custom.category,
            _ => CustomCategory::Regular,
        };

        match category {
            CustomCategory::Regular => OperandStep::Operand(item),
            CustomCategory::Prefix if self.language.supports_prefixes => {
                prefixes.push(item);
                OperandStep::Retry
            }
            CustomCategory::Prefix => {
                let (start, length) = self.tree.span(item);
                self.error(start, length, ParseErrorKind::InvalidUseOfPrefixesOrKeywords);
                OperandStep::Stray(item)
            }
            CustomCategory::Postfix => {
                let (start, length) = self.tree.span(item);
                self.error(start, length, ParseErrorKind::PostfixHasNoTarget);
                OperandStep::Stray(item)
            }
        }
    }

    /// Parses postfixes of `operand`. A rejected postfix ends the run.
    fn parse_postfixes(&mut self, operand: ItemId, context: SegmentContext) -> Flow<Postfixes> {
        let mut postfixes = Postfixes::default();
        loop {
            self.skip_spaces();
            let position = self.scanner.position();

            let postfix = if self.is_code_block_start(position) {
                postfixes.closed_by_code_block = context.is_statement();
                self.parse_code_block()?
            } else {
                match self.try_custom_postfix()? {
                    Some(item) => item,
                    None => return Ok(postfixes),
                }
            };

            if !self.attach_postfix(operand, postfix)? {
                postfixes.rejected = Some(postfix);
                return Ok(postfixes);
            }
            if postfixes.closed_by_code_block {
                return Ok(postfixes);
            }
        }
    }

    /// Returns `false` when the target does not accept the postfix.
    fn attach_postfix(&mut self, target: ItemId, postfix: ItemId) -> Flow<bool> {
        if self.tree.is_valid_postfix(target, postfix) {
            let result = self.tree.add_postfix(target, postfix);
            self.tree_op(result)?;
            Ok(true)
        } else {
            let (start, length) = self.tree.span(postfix);
            self.error(start, length, ParseErrorKind::PostfixRejected);
            Ok(false)
        }
    }

    // ========================================================================
    // Custom expressions
    // ========================================================================

    /// Speculatively parses keywords after an operand and a postfix custom
    /// expression they trigger. Rolls the cursor, errors and arena back if
    /// that fails.
    fn try_custom_postfix(&mut self) -> Flow<Option<ItemId>> {
        if !self.language.supports_keywords {
            return Ok(None);
        }

        let start = self.scanner.position();
        let error_count = self.errors.len();
        let item_count = self.tree.len();
        let mut keywords = Vec::new();
        self.parse_keyword_run(&mut keywords, false);

        let triggered = keywords
            .last()
            .and_then(|k| self.keyword_id(*k))
            .is_some_and(|id| !self.language.custom_parsers_for(id).is_empty());

        if triggered {
            if let Some(item) = self.try_custom(&[], &keywords)? {
                let is_postfix = matches!(
                    &self.tree[item].kind,
                    ItemKind::Custom(custom) if custom.category == CustomCategory::Postfix
                );
                if is_postfix {
                    return Ok(Some(item));
                }
            }
        }

        self.scanner.set_position(start);
        self.errors.truncate(error_count);
        self.tree.truncate(item_count);
        Ok(None)
    }

    fn keyword_id(&self, token: ItemId) -> Option<KeywordId> {
        match self.tree[token].token().map(|t| t.kind) {
            Some(TokenKind::Keyword(id)) => Some(id),
            _ => None,
        }
    }

    /// Runs the custom parsers registered for the last keyword.
    fn try_custom(&mut self, prefixes: &[ItemId], keywords: &[ItemId]) -> Flow<Option<ItemId>> {
        let Some((&trigger, before)) = keywords.split_last() else {
            return Ok(None);
        };
        let Some(keyword_id) = self.keyword_id(trigger) else {
            return Ok(None);
        };

        let language = self.language;
        let provider = self.provider;
        let parsers = provider.custom_expression_parsers();
        let start = self.scanner.position();

        for &index in language.custom_parsers_for(keyword_id) {
            let Some(parser) = parsers.get(index) else {
                continue;
            };

            let critical_before = self.errors.iter().filter(|e| e.is_critical).count();
            let item_count = self.tree.len();
            let mut context = CustomParseContext::new(self, prefixes, before, trigger, keyword_id);
            let outcome = parser.try_parse(&mut context);
            let critical_after = self.errors.iter().filter(|e| e.is_critical).count();

            match outcome {
                Ok(None) if critical_after == critical_before => {
                    self.scanner.set_position(start);
                    self.tree.truncate(item_count);
                }
                Ok(None) => return Err(Halt),
                Ok(Some(expression)) => {
                    let item = self.build_custom(expression, before, trigger, keyword_id)?;
                    if critical_after > critical_before {
                        return Err(Halt);
                    }
                    log::debug!("custom expression for {} at {}", keyword_id, start);
                    return Ok(Some(item));
                }
                Err(CustomExpressionError::ParseStopped) if critical_after > critical_before => {
                    return Err(Halt);
                }
                Err(err) => {
                    log::error!("custom expression parser {:?} failed: {}", parser, err);
                    let position = self.tree.index_in_text(trigger);
                    return Err(self.critical(
                        position,
                        0,
                        ParseErrorKind::CustomExpressionParserThrewAnException {
                            details: err.to_string(),
                        },
                    ));
                }
            }
        }

        Ok(None)
    }

    fn build_custom(
        &mut self,
        expression: CustomExpression,
        before: &[ItemId],
        trigger: ItemId,
        keyword_id: KeywordId,
    ) -> Flow<ItemId> {
        let position = before
            .first()
            .map(|k| self.tree.index_in_text(*k))
            .unwrap_or_else(|| self.tree.index_in_text(trigger));
        let item = self.tree.create(
            ItemKind::Custom(CustomExpressionItem {
                category: expression.category,
                trigger: keyword_id,
                data: expression.data,
            }),
            position,
        );

        let result = assemble_custom(&mut self.tree, item, before, trigger, &expression.parts);
        result.map_err(|err| {
            log::error!("custom expression for {} is malformed: {}", keyword_id, err);
            self.critical(
                position,
                0,
                ParseErrorKind::CustomExpressionParserThrewAnException {
                    details: err.to_string(),
                },
            )
        })?;

        Ok(item)
    }
}

fn assemble_custom(
    tree: &mut ExpressionTree,
    item: ItemId,
    before: &[ItemId],
    trigger: ItemId,
    parts: &[CustomPart],
) -> Result<(), TreeError> {
    for keyword in before {
        tree.add_keyword(item, *keyword)?;
    }
    tree.add_regular_item(item, trigger)?;
    for part in parts {
        match *part {
            CustomPart::Token(token) => tree.add_regular_item(item, token)?,
            CustomPart::Child(child) => tree.add_child(item, child)?,
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Postfixes {
    /// A code block postfix ended the statement
    closed_by_code_block: bool,
    /// Postfix the operand refused, left for the segment to keep
    rejected: Option<ItemId>,
}

enum OperandStep {
    Operand(ItemId),
    Operators(OperatorGroup),
    /// A custom expression with nothing to apply to
    Stray(ItemId),
    /// Something was consumed that is not an operand; look again
    Retry,
    End,
}
