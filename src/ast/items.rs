use std::fmt;

use serde::Serialize;

use super::custom::CustomExpressionItem;
use crate::language::{KeywordId, NumericKind, NumericTypeId, OperatorId, OperatorKind};

/// Handle of an item in its [`ExpressionTree`](super::ExpressionTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub usize);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BraceKind {
    /// `(` `)`
    Round,
    /// `[` `]`
    Square,
}

impl BraceKind {
    pub fn from_opening(c: char) -> Option<Self> {
        match c {
            '(' => Some(BraceKind::Round),
            '[' => Some(BraceKind::Square),
            _ => None,
        }
    }

    pub fn from_closing(c: char) -> Option<Self> {
        match c {
            ')' => Some(BraceKind::Round),
            ']' => Some(BraceKind::Square),
            _ => None,
        }
    }

    pub fn opening(self) -> char {
        match self {
            BraceKind::Round => '(',
            BraceKind::Square => '[',
        }
    }

    pub fn closing(self) -> char {
        match self {
            BraceKind::Round => ')',
            BraceKind::Square => ']',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Name,
    Keyword(KeywordId),
    OpeningBrace(BraceKind),
    ClosingBrace(BraceKind),
    Comma,
    Separator,
    CodeBlockStart,
    CodeBlockEnd,
    OperatorNamePart,
    NumericValue,
    Text,
    /// Added by a custom expression parser
    Custom,
}

/// A piece of text with a fixed span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug)]
pub enum ItemKind {
    Token(Token),
    /// A bare name: `x`, `count`
    Literal { name: String },
    Numeric {
        value: String,
        numeric_type: NumericTypeId,
        numeric_kind: NumericKind,
    },
    ConstantText {
        /// As written, quotes included
        raw: String,
        /// Quotes removed and escapes applied
        text: String,
        quote: char,
        closed: bool,
    },
    /// `F(x, y)`, `(x)`, `a[1]`
    Braces {
        kind: BraceKind,
        name: Option<ItemId>,
        opening: ItemId,
        closing: Option<ItemId>,
        /// `None` marks an empty parameter: `F(,x,)`
        parameters: Vec<Option<ItemId>>,
    },
    CodeBlock {
        start: ItemId,
        end: Option<ItemId>,
        statements: Vec<ItemId>,
    },
    Operator {
        operator: OperatorId,
        kind: OperatorKind,
        priority: i32,
        info: ItemId,
        operand1: ItemId,
        operand2: Option<ItemId>,
    },
    /// The matched operator and its name part tokens
    OperatorInfo {
        operator: OperatorId,
        kind: OperatorKind,
        name: String,
    },
    Custom(CustomExpressionItem),
    Root {
        statements: Vec<ItemId>,
        separators: Vec<ItemId>,
    },
    /// Whatever could not be combined into one expression, in text order
    SeriesWithErrors,
}

impl ItemKind {
    pub fn is_token(&self) -> bool {
        matches!(self, ItemKind::Token(_))
    }

    /// Short lowercase name of the kind, as used in JSON output.
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Token(_) => "token",
            ItemKind::Literal { .. } => "literal",
            ItemKind::Numeric { .. } => "numeric",
            ItemKind::ConstantText { .. } => "constant_text",
            ItemKind::Braces { .. } => "braces",
            ItemKind::CodeBlock { .. } => "code_block",
            ItemKind::Operator { .. } => "operator",
            ItemKind::OperatorInfo { .. } => "operator_info",
            ItemKind::Custom(_) => "custom",
            ItemKind::Root { .. } => "root",
            ItemKind::SeriesWithErrors => "series_with_errors",
        }
    }
}

/// One of the four ordered sections of a complex item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Prefix,
    Keyword,
    Regular,
    Postfix,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Prefix => write!(f, "prefix"),
            Section::Keyword => write!(f, "keyword"),
            Section::Regular => write!(f, "regular item"),
            Section::Postfix => write!(f, "postfix"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexParts {
    pub prefixes: Vec<ItemId>,
    pub keywords: Vec<ItemId>,
    pub regular_items: Vec<ItemId>,
    pub postfixes: Vec<ItemId>,
    /// Regular items that are nested expressions
    pub children: Vec<ItemId>,
}

impl ComplexParts {
    pub fn section(&self, section: Section) -> &[ItemId] {
        match section {
            Section::Prefix => &self.prefixes,
            Section::Keyword => &self.keywords,
            Section::Regular => &self.regular_items,
            Section::Postfix => &self.postfixes,
        }
    }

    pub(crate) fn section_mut(&mut self, section: Section) -> &mut Vec<ItemId> {
        match section {
            Section::Prefix => &mut self.prefixes,
            Section::Keyword => &mut self.keywords,
            Section::Regular => &mut self.regular_items,
            Section::Postfix => &mut self.postfixes,
        }
    }

    /// All parts in text order.
    pub fn all(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.prefixes
            .iter()
            .chain(&self.keywords)
            .chain(&self.regular_items)
            .chain(&self.postfixes)
            .copied()
    }

    pub fn first(&self) -> Option<ItemId> {
        self.all().next()
    }

    pub fn last(&self) -> Option<ItemId> {
        self.postfixes
            .last()
            .or(self.regular_items.last())
            .or(self.keywords.last())
            .or(self.prefixes.last())
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(ItemId) -> bool) {
        self.prefixes.retain(|id| keep(*id));
        self.keywords.retain(|id| keep(*id));
        self.regular_items.retain(|id| keep(*id));
        self.postfixes.retain(|id| keep(*id));
        self.children.retain(|id| keep(*id));
    }
}

#[derive(Debug)]
pub struct ExpressionItem {
    pub(crate) id: ItemId,
    pub(crate) parent: Option<ItemId>,
    /// Fixed span of tokens; fallback position of complex items without parts
    pub(crate) index_in_text: usize,
    pub(crate) length: usize,
    pub(crate) kind: ItemKind,
    pub(crate) parts: ComplexParts,
}

impl ExpressionItem {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn parts(&self) -> &ComplexParts {
        &self.parts
    }

    pub fn is_complex(&self) -> bool {
        !self.kind.is_token()
    }

    pub fn token(&self) -> Option<&Token> {
        match &self.kind {
            ItemKind::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn prefixes(&self) -> &[ItemId] {
        &self.parts.prefixes
    }

    pub fn keywords(&self) -> &[ItemId] {
        &self.parts.keywords
    }

    pub fn regular_items(&self) -> &[ItemId] {
        &self.parts.regular_items
    }

    pub fn postfixes(&self) -> &[ItemId] {
        &self.parts.postfixes
    }

    pub fn children(&self) -> &[ItemId] {
        &self.parts.children
    }
}
