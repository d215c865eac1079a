//! Character cursor over the parsed text.
//!
//! Positions are character offsets, not byte offsets, so that error positions
//! map one-to-one onto what an editor shows.
use std::collections::BTreeMap;

use serde::Serialize;

/// Comment markers understood by [`Scanner::skip_spaces`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentSyntax {
    pub line: Option<String>,
    /// Start and end marker
    pub multiline: Option<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    Line,
    Multiline,
}

/// A comment found while skipping whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentSpan {
    pub index_in_text: usize,
    pub length: usize,
    pub kind: CommentKind,
    /// `false` for a multiline comment running to the end of the text
    pub closed: bool,
}

pub struct Scanner {
    text: String,
    chars: Vec<char>,
    /// Byte offset of every char, plus one entry for the end of the text
    byte_offsets: Vec<usize>,
    position: usize,
    comment_syntax: CommentSyntax,
    comments: BTreeMap<usize, CommentSpan>,
}

impl Scanner {
    pub fn new(text: &str, comment_syntax: CommentSyntax) -> Self {
        let mut byte_offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        byte_offsets.push(text.len());

        Scanner {
            text: text.to_string(),
            chars: text.chars().collect(),
            byte_offsets,
            position: 0,
            comment_syntax,
            comments: BTreeMap::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.chars.len());
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.chars.len()
    }

    pub fn current_char(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    pub fn char_at(&self, position: usize) -> Option<char> {
        self.chars.get(position).copied()
    }

    pub fn peek_char(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    pub fn skip(&mut self, count: usize) {
        self.set_position(self.position + count);
    }

    /// Text of the characters `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let start = start.min(self.chars.len());
        let end = end.clamp(start, self.chars.len());
        &self.text[self.byte_offsets[start]..self.byte_offsets[end]]
    }

    /// Text from `position` to the end.
    pub fn rest_from(&self, position: usize) -> &str {
        let position = position.min(self.chars.len());
        &self.text[self.byte_offsets[position]..]
    }

    pub fn starts_with(&self, symbol: &str, case_sensitive: bool) -> bool {
        self.starts_with_at(self.position, symbol, case_sensitive)
    }

    /// Whether `symbol` is written at `position`.
    pub fn starts_with_at(&self, position: usize, symbol: &str, case_sensitive: bool) -> bool {
        if symbol.is_empty() {
            return false;
        }

        let mut index = position;
        for expected in symbol.chars() {
            let Some(actual) = self.char_at(index) else {
                return false;
            };
            let equal = if case_sensitive {
                actual == expected
            } else {
                actual == expected || actual.to_lowercase().eq(expected.to_lowercase())
            };
            if !equal {
                return false;
            }
            index += 1;
        }
        true
    }

    /// End of the whitespace and comments starting at `position`.
    ///
    /// Does not move the cursor or record anything.
    pub fn spaces_end(&self, position: usize) -> usize {
        let mut index = position;
        loop {
            match self.comment_at(index) {
                Some((end, _, _)) => index = end,
                None => match self.char_at(index) {
                    Some(c) if c.is_whitespace() => index += 1,
                    _ => return index,
                },
            }
        }
    }

    /// Moves past whitespace and comments, remembering every comment seen.
    ///
    /// Returns the start of a multiline comment that runs to the end of the
    /// text without an end marker, if one was skipped.
    pub fn skip_spaces(&mut self) -> Option<usize> {
        let mut unclosed = None;
        loop {
            if let Some((end, kind, closed)) = self.comment_at(self.position) {
                let start = self.position;
                self.comments.entry(start).or_insert(CommentSpan {
                    index_in_text: start,
                    length: end - start,
                    kind,
                    closed,
                });
                if !closed {
                    unclosed = Some(start);
                }
                self.position = end;
                continue;
            }

            match self.current_char() {
                Some(c) if c.is_whitespace() => self.position += 1,
                _ => return unclosed,
            }
        }
    }

    /// Comments seen so far, ordered by position.
    pub fn comments(&self) -> impl Iterator<Item = &CommentSpan> {
        self.comments.values()
    }

    pub fn into_comments(self) -> Vec<CommentSpan> {
        self.comments.into_values().collect()
    }

    fn comment_at(&self, position: usize) -> Option<(usize, CommentKind, bool)> {
        if let Some(marker) = &self.comment_syntax.line {
            if self.starts_with_at(position, marker, true) {
                let mut end = position + marker.chars().count();
                while let Some(c) = self.char_at(end) {
                    if c == '\n' {
                        break;
                    }
                    end += 1;
                }
                return Some((end, CommentKind::Line, true));
            }
        }

        if let Some((start_marker, end_marker)) = &self.comment_syntax.multiline {
            if self.starts_with_at(position, start_marker, true) {
                let mut end = position + start_marker.chars().count();
                while end < self.chars.len() {
                    if self.starts_with_at(end, end_marker, true) {
                        return Some((
                            end + end_marker.chars().count(),
                            CommentKind::Multiline,
                            true,
                        ));
                    }
                    end += 1;
                }
                return Some((self.chars.len(), CommentKind::Multiline, false));
            }
        }

        None
    }
}

#[cfg(test)]
fn c_comments() -> CommentSyntax {
    CommentSyntax {
        line: Some("//".to_string()),
        multiline: Some(("/*".to_string(), "*/".to_string())),
    }
}

#[test]
fn test_skip_spaces_records_comments() {
    let mut scanner = Scanner::new("  // note\n /* block */ x", c_comments());
    assert_eq!(scanner.skip_spaces(), None);
    assert_eq!(scanner.current_char(), Some('x'));

    let comments: Vec<_> = scanner.comments().cloned().collect();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].index_in_text, 2);
    assert_eq!(comments[0].length, 7);
    assert_eq!(comments[0].kind, CommentKind::Line);
    assert_eq!(comments[1].index_in_text, 11);
    assert_eq!(comments[1].kind, CommentKind::Multiline);
}

#[test]
fn test_unclosed_comment() {
    let mut scanner = Scanner::new("x /* open", c_comments());
    scanner.skip(1);
    assert_eq!(scanner.skip_spaces(), Some(2));
    assert!(scanner.is_eof());

    // Skipping again finds it again but records it once
    scanner.set_position(1);
    assert_eq!(scanner.skip_spaces(), Some(2));
    assert_eq!(scanner.comments().count(), 1);
    assert!(!scanner.comments().next().unwrap().closed);
}

#[test]
fn test_spaces_end_does_not_move_cursor() {
    let scanner = Scanner::new("a  /* c */  b", c_comments());
    assert_eq!(scanner.spaces_end(1), 12);
    assert_eq!(scanner.position(), 0);
    assert_eq!(scanner.comments().count(), 0);
}

#[test]
fn test_positions_are_chars() {
    let scanner = Scanner::new("é + ü", CommentSyntax::default());
    assert_eq!(scanner.len(), 5);
    assert_eq!(scanner.slice(2, 5), "+ ü");
    assert_eq!(scanner.rest_from(4), "ü");
}

#[test]
fn test_starts_with_case_modes() {
    let scanner = Scanner::new("Public x", CommentSyntax::default());
    assert!(!scanner.starts_with("public", true));
    assert!(scanner.starts_with("public", false));
    assert!(scanner.starts_with_at(7, "x", true));
    assert!(!scanner.starts_with_at(7, "xy", true));
}
