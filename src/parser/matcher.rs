//! Keyword and operator matching at a text position.
//!
//! Nothing here moves the cursor; callers decide what to consume.
use std::collections::HashMap;

use crate::language::{CompiledLanguage, Keyword, LanguageProvider, OperatorKind};
use crate::scanner::Scanner;

/// The name parts of a matched operator and every operator definition that
/// matches exactly those parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OperatorGroup {
    /// `(index_in_text, text as written)` per name part
    pub parts: Vec<(usize, String)>,
    /// Indices into the compiled operator table
    pub candidates: Vec<usize>,
}

impl OperatorGroup {
    pub fn start(&self) -> usize {
        self.parts.first().map(|(index, _)| *index).unwrap_or(0)
    }

    pub fn end(&self) -> usize {
        self.parts
            .last()
            .map(|(index, text)| index + text.chars().count())
            .unwrap_or(0)
    }

    pub fn length(&self) -> usize {
        self.end() - self.start()
    }

    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// First candidate of the given kind.
    pub fn candidate(&self, language: &CompiledLanguage, kind: OperatorKind) -> Option<usize> {
        self.candidates
            .iter()
            .copied()
            .find(|&index| language.operators[index].kind == kind)
    }

    pub fn has_kind(&self, language: &CompiledLanguage, kind: OperatorKind) -> bool {
        self.candidate(language, kind).is_some()
    }
}

/// Whether `symbol` is written at `position`. A symbol ending in a literal
/// character must not run into more literal characters.
pub(crate) fn symbol_at(
    language: &CompiledLanguage,
    provider: &dyn LanguageProvider,
    scanner: &Scanner,
    position: usize,
    symbol: &str,
) -> bool {
    if !scanner.starts_with_at(position, symbol, language.case_sensitive) {
        return false;
    }

    let Some(last) = symbol.chars().last() else {
        return false;
    };
    if !provider.is_valid_literal_char(last, 1, scanner) {
        return true;
    }

    let after = position + symbol.chars().count();
    match scanner.char_at(after) {
        Some(next) => !provider.is_valid_literal_char(next, 1, scanner),
        None => true,
    }
}

/// One matching pass over a scanner.
///
/// The whitespace memo lives as long as the matcher, so create one per pass.
pub(crate) struct Matcher<'s> {
    language: &'s CompiledLanguage,
    provider: &'s dyn LanguageProvider,
    scanner: &'s Scanner,
    spaces: HashMap<usize, usize>,
}

impl<'s> Matcher<'s> {
    pub fn new(
        language: &'s CompiledLanguage,
        provider: &'s dyn LanguageProvider,
        scanner: &'s Scanner,
    ) -> Self {
        Matcher {
            language,
            provider,
            scanner,
            spaces: HashMap::new(),
        }
    }

    fn spaces_end(&mut self, position: usize) -> usize {
        let scanner = self.scanner;
        *self
            .spaces
            .entry(position)
            .or_insert_with(|| scanner.spaces_end(position))
    }

    pub fn symbol_at(&self, position: usize, symbol: &str) -> bool {
        symbol_at(self.language, self.provider, self.scanner, position, symbol)
    }

    /// Longest keyword written at `position`.
    pub fn match_keyword(&self, position: usize) -> Option<&'s Keyword> {
        let language = self.language;
        language
            .keywords
            .iter()
            .filter(|keyword| self.symbol_at(position, &keyword.text))
            .max_by_key(|keyword| keyword.text.chars().count())
    }

    /// Best operator match at `position`.
    ///
    /// Preference order: the kind fits `preceded_by_operand` (binary or postfix
    /// after an operand, prefix otherwise), then more name parts, then more
    /// matched characters. Every operator with the same name part spans as the
    /// winner ends up in the group.
    pub fn match_operator(
        &mut self,
        position: usize,
        preceded_by_operand: bool,
    ) -> Option<OperatorGroup> {
        let language = self.language;
        let mut matches: Vec<(usize, Vec<(usize, usize)>)> = Vec::new();

        for (index, operator) in language.operators.iter().enumerate() {
            if let Some(spans) = self.match_name_parts(position, &operator.name_parts) {
                matches.push((index, spans));
            }
        }

        let best = matches.iter().max_by_key(|(index, spans)| {
            let kind = language.operators[*index].kind;
            let fits = if preceded_by_operand {
                kind != OperatorKind::Prefix
            } else {
                kind == OperatorKind::Prefix
            };
            let total: usize = spans.iter().map(|(_, length)| length).sum();
            // max_by_key keeps the last maximum; reverse index keeps table order on ties
            (fits, spans.len(), total, std::cmp::Reverse(*index))
        })?;

        let winner_spans = best.1.clone();
        let candidates: Vec<usize> = matches
            .iter()
            .filter(|(_, spans)| *spans == winner_spans)
            .map(|(index, _)| *index)
            .collect();

        let parts = winner_spans
            .iter()
            .map(|&(start, length)| (start, self.scanner.slice(start, start + length).to_string()))
            .collect();

        log::trace!(
            "operator match at {}: {} candidate(s)",
            position,
            candidates.len()
        );
        Some(OperatorGroup { parts, candidates })
    }

    /// Spans `(start, length)` of every name part, or `None` if the operator is
    /// not written at `position`.
    fn match_name_parts(&mut self, position: usize, parts: &[String]) -> Option<Vec<(usize, usize)>> {
        let mut spans = Vec::with_capacity(parts.len());
        let mut current = position;

        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                let next = self.spaces_end(current);
                // Parts must be separated
                if next == current {
                    return None;
                }
                current = next;
            }
            if !self.symbol_at(current, part) {
                return None;
            }
            let length = part.chars().count();
            spans.push((current, length));
            current += length;
        }

        Some(spans)
    }
}
