use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a keyword in a language's keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordId(pub u32);

impl fmt::Display for KeywordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "keyword#{}", self.0)
    }
}

/// A keyword: a literal token applied to the expression that follows it.
///
/// # Examples
/// ```text
/// public static F(x)     // `public` and `static` are applied to F(x)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: KeywordId,
    pub text: String,
}

impl Keyword {
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Keyword {
            id: KeywordId(id),
            text: text.into(),
        }
    }
}
