//! # Expression tree
//!
//! The parser produces an [`ExpressionTree`]: an arena of [`ExpressionItem`]s
//! addressed by [`ItemId`] handles. Items never own each other directly, so
//! parent links are plain handles and the whole tree is dropped at once with
//! its parse result.
//!
//! ## Architecture Overview
//!
//! - **[items]** - the item record and the closed set of item kinds
//! - **[tree]** - the arena, with the ordering rules enforced on every mutation
//! - **[custom]** - data attached to custom expressions produced by plugins
//!
//! ## Item sections
//!
//! Every complex item keeps its parts in four ordered sections:
//!
//! ```text
//! (attr)  public static  F(x, y)  { body }
//! ^^^^^^  ^^^^^^^^^^^^^  ^^^^^^^  ^^^^^^^^
//! prefix  keywords       regular  postfix
//! ```
//!
//! Positions increase strictly from one section to the next and inside each
//! section. `children` is the subset of regular items that are nested
//! expressions (a braces item's parameters, an operator's operands, ...) as
//! opposed to tokens (names, braces, commas, operator name parts).
//!
//! ## Spans
//!
//! Tokens have a fixed position and length. A complex item's span runs from
//! the start of its first part to the end of its last part, so it always
//! reflects the parts actually attached.
pub mod custom;
pub mod items;
pub mod tree;

pub use custom::{CustomCategory, CustomExpressionData, CustomExpressionItem};
pub use items::{
    BraceKind, ComplexParts, ExpressionItem, ItemId, ItemKind, Section, Token, TokenKind,
};
pub use tree::{ExpressionTree, TreeError};
