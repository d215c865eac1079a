//! Operand parsers: text constants, numerics, literals and braces.
use super::{Flow, ParseState, SegmentContext};
use crate::ast::{BraceKind, ItemId, ItemKind, TokenKind};
use crate::error::ParseErrorKind;
use crate::language::{NumericMatch, TextEscape};

impl ParseState<'_> {
    /// Parses a text constant starting at the quote under the cursor.
    pub(crate) fn parse_text(&mut self, quote: char) -> Flow<ItemId> {
        let start = self.scanner.position();
        let mut index = start + 1;
        let mut text = String::new();
        let mut closed = false;

        while let Some(c) = self.scanner.char_at(index) {
            if c == quote {
                if self.language.text_escape == TextEscape::DoubledQuote
                    && self.scanner.char_at(index + 1) == Some(quote)
                {
                    text.push(quote);
                    index += 2;
                    continue;
                }
                closed = true;
                index += 1;
                break;
            }

            if c == '\\' && self.language.text_escape == TextEscape::Backslash {
                match self.scanner.char_at(index + 1) {
                    Some(escaped) => {
                        text.push(unescape(escaped));
                        index += 2;
                    }
                    None => {
                        text.push(c);
                        index += 1;
                    }
                }
                continue;
            }

            text.push(c);
            index += 1;
        }

        let raw = self.scanner.slice(start, index).to_string();
        let item = self.tree.create(
            ItemKind::ConstantText {
                raw: raw.clone(),
                text,
                quote,
                closed,
            },
            start,
        );
        let token = self.tree.create_token(TokenKind::Text, &raw, start);
        let result = self.tree.add_regular_item(item, token);
        self.tree_op(result)?;

        if !closed {
            self.error(
                start,
                index - start,
                ParseErrorKind::ConstantTextNotClosed { quote },
            );
        }

        self.scanner.set_position(index);
        Ok(item)
    }

    pub(crate) fn parse_numeric(&mut self, numeric: NumericMatch) -> Flow<ItemId> {
        let start = self.scanner.position();
        let value = self
            .scanner
            .slice(start, start + numeric.length)
            .to_string();

        let item = self.tree.create(
            ItemKind::Numeric {
                value: value.clone(),
                numeric_type: numeric.numeric_type,
                numeric_kind: numeric.kind,
            },
            start,
        );
        let token = self.tree.create_token(TokenKind::NumericValue, &value, start);
        let result = self.tree.add_regular_item(item, token);
        self.tree_op(result)?;

        self.scanner.skip(numeric.length);
        Ok(item)
    }

    /// Parses a bare name. A name followed by an opening brace becomes the
    /// name of a braces item: `F(x)`, `a [1]`.
    pub(crate) fn parse_literal(&mut self) -> Flow<Option<ItemId>> {
        let Some(literal) = self.parse_literal_name()? else {
            return Ok(None);
        };

        let next = self.scanner.spaces_end(self.scanner.position());
        if self.is_opening_brace(next) {
            self.skip_spaces();
            return self.parse_braces(Some(literal)).map(Some);
        }

        Ok(Some(literal))
    }

    /// Parses a bare name without looking for braces after it.
    pub(crate) fn parse_literal_name(&mut self) -> Flow<Option<ItemId>> {
        let start = self.scanner.position();
        let mut end = start;
        while let Some(c) = self.scanner.char_at(end) {
            if !self
                .provider
                .is_valid_literal_char(c, end - start, &self.scanner)
            {
                break;
            }
            end += 1;
        }

        if end == start {
            return Ok(None);
        }

        let name = self.scanner.slice(start, end).to_string();
        let item = self
            .tree
            .create(ItemKind::Literal { name: name.clone() }, start);
        let token = self.tree.create_token(TokenKind::Name, &name, start);
        let result = self.tree.add_regular_item(item, token);
        self.tree_op(result)?;

        self.scanner.set_position(end);
        Ok(Some(item))
    }

    /// Parses `(...)` or `[...]` at the cursor, with an optional name item
    /// before it.
    pub(crate) fn parse_braces(&mut self, name: Option<ItemId>) -> Flow<ItemId> {
        let start = self.scanner.position();
        let Some(kind) = self.scanner.current_char().and_then(BraceKind::from_opening) else {
            let symbol = self.scanner.current_char().map(String::from).unwrap_or_default();
            return Err(self.critical(
                start,
                0,
                ParseErrorKind::ParserImplementationError {
                    details: format!("expected an opening brace, found '{}'", symbol),
                },
            ));
        };

        let opening = self
            .tree
            .create_token(TokenKind::OpeningBrace(kind), &kind.opening().to_string(), start);
        let braces = self.tree.create(
            ItemKind::Braces {
                kind,
                name,
                opening,
                closing: None,
                parameters: Vec::new(),
            },
            start,
        );
        if let Some(name) = name {
            let result = self.tree.add_child(braces, name);
            self.tree_op(result)?;
        }
        let result = self.tree.add_regular_item(braces, opening);
        self.tree_op(result)?;
        self.scanner.skip(1);

        let mut parameters: Vec<Option<ItemId>> = Vec::new();
        let mut closing = None;
        let mut saw_comma = false;

        loop {
            let segment = self.parse_segment(SegmentContext::Braces)?;
            if let Some(item) = segment.item {
                let result = self.tree.add_child(braces, item);
                self.tree_op(result)?;
            }

            self.skip_spaces();
            let position = self.scanner.position();
            match self.scanner.current_char() {
                Some(',') => {
                    parameters.push(segment.item);
                    let comma = self.tree.create_token(TokenKind::Comma, ",", position);
                    let result = self.tree.add_regular_item(braces, comma);
                    self.tree_op(result)?;
                    self.scanner.skip(1);
                    saw_comma = true;
                }
                Some(c) if c == kind.closing() => {
                    if segment.item.is_some() || saw_comma {
                        parameters.push(segment.item);
                    }
                    let token = self.tree.create_token(
                        TokenKind::ClosingBrace(kind),
                        &c.to_string(),
                        position,
                    );
                    let result = self.tree.add_regular_item(braces, token);
                    self.tree_op(result)?;
                    self.scanner.skip(1);
                    closing = Some(token);
                    break;
                }
                _ => {
                    // Left for the enclosing construct
                    if segment.item.is_some() || saw_comma {
                        parameters.push(segment.item);
                    }
                    self.error(
                        position,
                        0,
                        ParseErrorKind::ClosingBraceMissing {
                            expected: kind.closing(),
                        },
                    );
                    break;
                }
            }
        }

        if let Some(ItemKind::Braces {
            closing: slot,
            parameters: params,
            ..
        }) = self.tree.kind_mut(braces)
        {
            *slot = closing;
            *params = parameters;
        }

        Ok(braces)
    }
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}
