//! Statement lists: the root and code blocks.
use super::{Flow, ParseState, SegmentContext};
use crate::ast::{ItemId, ItemKind, TokenKind};
use crate::error::ParseErrorKind;

impl ParseState<'_> {
    /// Parses statements into `root` until the end of the text.
    pub(crate) fn parse_root(&mut self, root: ItemId) -> Flow<()> {
        loop {
            let start = self.scanner.position();
            let segment = self.parse_segment(SegmentContext::Root)?;
            if let Some(item) = segment.item {
                self.add_statement(root, item)?;
            }

            self.skip_spaces();
            let position = self.scanner.position();
            let Some(c) = self.scanner.current_char() else {
                return Ok(());
            };

            if Some(c) == self.language.separator {
                self.add_separator(root, position)?;
                continue;
            }
            if segment.closed_by_code_block {
                continue;
            }

            if self.is_code_block_end(position) {
                let length = self.code_block_end_length();
                self.unexpected(position, length);
                continue;
            }
            if matches!(c, ',' | ')' | ']') {
                self.unexpected(position, 1);
                continue;
            }

            if position == start {
                return Err(self.stuck(position));
            }
        }
    }

    /// Parses a code block starting at the cursor.
    pub(crate) fn parse_code_block(&mut self) -> Flow<ItemId> {
        let block_start = self.scanner.position();
        let (start_marker, end_marker) = match &self.language.code_block {
            Some(markers) => (markers.start.clone(), markers.end.clone()),
            None => return Err(self.stuck(block_start)),
        };

        let start_length = start_marker.chars().count();
        let text = self
            .scanner
            .slice(block_start, block_start + start_length)
            .to_string();
        let start_token = self
            .tree
            .create_token(TokenKind::CodeBlockStart, &text, block_start);
        let block = self.tree.create(
            ItemKind::CodeBlock {
                start: start_token,
                end: None,
                statements: Vec::new(),
            },
            block_start,
        );
        let result = self.tree.add_regular_item(block, start_token);
        self.tree_op(result)?;
        self.scanner.skip(start_length);

        loop {
            let start = self.scanner.position();
            let segment = self.parse_segment(SegmentContext::CodeBlock)?;
            if let Some(item) = segment.item {
                self.add_statement(block, item)?;
            }

            self.skip_spaces();
            let position = self.scanner.position();
            let Some(c) = self.scanner.current_char() else {
                self.error(
                    block_start,
                    start_length,
                    ParseErrorKind::CodeBlockEndMarkerMissing { marker: end_marker },
                );
                return Ok(block);
            };

            if self.is_code_block_end(position) {
                let length = end_marker.chars().count();
                let text = self.scanner.slice(position, position + length).to_string();
                let end_token = self
                    .tree
                    .create_token(TokenKind::CodeBlockEnd, &text, position);
                let result = self.tree.add_regular_item(block, end_token);
                self.tree_op(result)?;
                if let Some(ItemKind::CodeBlock { end, .. }) = self.tree.kind_mut(block) {
                    *end = Some(end_token);
                }
                self.scanner.skip(length);
                return Ok(block);
            }

            if Some(c) == self.language.separator {
                self.add_separator(block, position)?;
                continue;
            }
            if segment.closed_by_code_block {
                continue;
            }
            if matches!(c, ',' | ')' | ']') {
                self.unexpected(position, 1);
                continue;
            }

            if position == start {
                return Err(self.stuck(position));
            }
        }
    }

    fn add_statement(&mut self, owner: ItemId, item: ItemId) -> Flow<()> {
        let result = self.tree.add_child(owner, item);
        self.tree_op(result)?;
        match self.tree.kind_mut(owner) {
            Some(ItemKind::Root { statements, .. }) | Some(ItemKind::CodeBlock { statements, .. }) => {
                statements.push(item);
            }
            _ => {}
        }
        Ok(())
    }

    fn add_separator(&mut self, owner: ItemId, position: usize) -> Flow<()> {
        let text = self.scanner.slice(position, position + 1).to_string();
        let token = self.tree.create_token(TokenKind::Separator, &text, position);
        let result = self.tree.add_regular_item(owner, token);
        self.tree_op(result)?;
        if let Some(ItemKind::Root { separators, .. }) = self.tree.kind_mut(owner) {
            separators.push(token);
        }
        self.scanner.skip(1);
        Ok(())
    }

    fn code_block_end_length(&self) -> usize {
        self.language
            .code_block
            .as_ref()
            .map(|markers| markers.end.chars().count())
            .unwrap_or(1)
    }

    /// Reports and skips a symbol with no place in a statement list.
    fn unexpected(&mut self, position: usize, length: usize) {
        let symbol = self.scanner.slice(position, position + length).to_string();
        self.error(position, length, ParseErrorKind::UnexpectedSymbol { symbol });
        self.scanner.skip(length);
    }

    fn stuck(&mut self, position: usize) -> super::Halt {
        self.critical(
            position,
            0,
            ParseErrorKind::ParserImplementationError {
                details: "no progress in statement list".to_string(),
            },
        )
    }
}
