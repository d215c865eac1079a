use std::fmt;

use serde::{Deserialize, Serialize};

/// Grammatical kind of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Unary operator written before its operand (`-x`, `NOT x`)
    Prefix,
    /// Unary operator written after its operand (`x++`, `x IS NULL`)
    Postfix,
    /// Operator between two operands (`x + y`)
    Binary,
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorKind::Prefix => write!(f, "prefix"),
            OperatorKind::Postfix => write!(f, "postfix"),
            OperatorKind::Binary => write!(f, "binary"),
        }
    }
}

/// Identifier of an operator definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorId(pub u32);

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operator#{}", self.0)
    }
}

/// Operator as written in a language configuration.
///
/// `name_parts` holds the words of the operator: `["IS", "NOT", "NULL"]` matches
/// `x IS NOT NULL` (parts separated by whitespace or comments). Lower `priority`
/// numbers bind tighter: with `*` at 20 and `+` at 30, `x + y * z` groups as
/// `x + (y * z)`. When `id` is omitted one is assigned from the table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OperatorId>,
    pub name_parts: Vec<String>,
    pub kind: OperatorKind,
    pub priority: i32,
}

impl OperatorConfig {
    /// Creates an operator; `name` is split on whitespace into name parts.
    pub fn new(name: &str, kind: OperatorKind, priority: i32) -> Self {
        OperatorConfig {
            id: None,
            name_parts: name.split_whitespace().map(str::to_string).collect(),
            kind,
            priority,
        }
    }

    pub fn binary(name: &str, priority: i32) -> Self {
        Self::new(name, OperatorKind::Binary, priority)
    }

    pub fn prefix(name: &str, priority: i32) -> Self {
        Self::new(name, OperatorKind::Prefix, priority)
    }

    pub fn postfix(name: &str, priority: i32) -> Self {
        Self::new(name, OperatorKind::Postfix, priority)
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(OperatorId(id));
        self
    }
}

/// A validated operator with its final id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorDefinition {
    pub id: OperatorId,
    pub name_parts: Vec<String>,
    pub kind: OperatorKind,
    pub priority: i32,
}

impl OperatorDefinition {
    /// The name parts joined with single spaces.
    pub fn name(&self) -> String {
        self.name_parts.join(" ")
    }
}
