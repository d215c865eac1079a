use regex::Regex;
use serde::{Deserialize, Serialize};

use super::LanguageError;

/// Identifier of a numeric literal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericTypeId(pub u32);

/// How the text of a numeric literal converts to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    /// Whole numbers (`42`)
    Integer,
    /// Fixed point numbers (`3.14`, `.5`)
    Decimal,
    /// Numbers with an exponent (`1.5e10`)
    Scientific,
    /// Anything the host interprets itself (hex, units, ...)
    Other,
}

/// A numeric literal type and the regex patterns that recognize it.
///
/// Descriptors are tried in table order, patterns in list order; the first
/// pattern that matches exactly at the cursor wins. Put longer forms first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericTypeDescriptor {
    pub id: NumericTypeId,
    pub name: String,
    pub kind: NumericKind,
    pub patterns: Vec<String>,
}

impl NumericTypeDescriptor {
    pub fn new(id: u32, name: impl Into<String>, kind: NumericKind, patterns: &[&str]) -> Self {
        NumericTypeDescriptor {
            id: NumericTypeId(id),
            name: name.into(),
            kind,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Scientific, decimal and integer literals, in that order.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                3,
                "scientific",
                NumericKind::Scientific,
                &[r"\d+(\.\d+)?[eE][+-]?\d+", r"\.\d+[eE][+-]?\d+"],
            ),
            Self::new(2, "decimal", NumericKind::Decimal, &[r"\d+\.\d+", r"\.\d+"]),
            Self::new(1, "integer", NumericKind::Integer, &[r"\d+"]),
        ]
    }
}

/// A successful numeric match at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NumericMatch {
    pub numeric_type: NumericTypeId,
    pub kind: NumericKind,
    /// Length of the match in characters
    pub length: usize,
}

/// Numeric patterns compiled once per parser.
#[derive(Debug)]
pub(crate) struct NumericMatcher {
    patterns: Vec<(NumericTypeId, NumericKind, Regex)>,
}

impl NumericMatcher {
    pub(crate) fn compile(descriptors: &[NumericTypeDescriptor]) -> Result<Self, LanguageError> {
        let mut patterns = Vec::new();

        for descriptor in descriptors {
            for pattern in &descriptor.patterns {
                // Anchor so that a match can only start at the cursor
                let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
                    LanguageError::InvalidNumericPattern {
                        pattern: pattern.clone(),
                        source,
                    }
                })?;
                patterns.push((descriptor.id, descriptor.kind, regex));
            }
        }

        Ok(NumericMatcher { patterns })
    }

    /// Tries every pattern against the text starting at the cursor.
    pub(crate) fn match_at(&self, rest: &str) -> Option<NumericMatch> {
        self.patterns.iter().find_map(|(id, kind, regex)| {
            regex
                .find(rest)
                .filter(|m| !m.as_str().is_empty())
                .map(|m| NumericMatch {
                    numeric_type: *id,
                    kind: *kind,
                    length: m.as_str().chars().count(),
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_matching_pattern_wins() {
        let matcher = NumericMatcher::compile(&NumericTypeDescriptor::defaults()).unwrap();

        let m = matcher.match_at("1.5e3 + x").unwrap();
        assert_eq!(m.kind, NumericKind::Scientific);
        assert_eq!(m.length, 5);

        let m = matcher.match_at("3.25)").unwrap();
        assert_eq!(m.kind, NumericKind::Decimal);
        assert_eq!(m.length, 4);

        let m = matcher.match_at("42;").unwrap();
        assert_eq!(m.kind, NumericKind::Integer);
        assert_eq!(m.length, 2);
    }

    #[test]
    fn test_match_must_start_at_cursor() {
        let matcher = NumericMatcher::compile(&NumericTypeDescriptor::defaults()).unwrap();
        assert!(matcher.match_at("x1").is_none());
        assert!(matcher.match_at("").is_none());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let descriptors = vec![NumericTypeDescriptor::new(
            1,
            "broken",
            NumericKind::Other,
            &["(\\d+"],
        )];
        let err = NumericMatcher::compile(&descriptors).unwrap_err();
        assert!(matches!(err, LanguageError::InvalidNumericPattern { .. }));
    }
}
