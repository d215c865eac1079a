use crate::ast::{ExpressionItem, ExpressionTree, ItemId};
use crate::error::ParseErrorData;
use crate::scanner::CommentSpan;

/// Everything a parse produced. Read-only once returned.
#[derive(Debug)]
pub struct ParseExpressionResult {
    text: String,
    tree: ExpressionTree,
    root: ItemId,
    errors: ParseErrorData,
    comments: Vec<CommentSpan>,
    index_in_text: usize,
    length: usize,
}

impl ParseExpressionResult {
    pub(crate) fn new(
        text: &str,
        tree: ExpressionTree,
        root: ItemId,
        errors: ParseErrorData,
        comments: Vec<CommentSpan>,
    ) -> Self {
        let (index_in_text, length) = tree.span(root);
        ParseExpressionResult {
            text: text.to_string(),
            tree,
            root,
            errors,
            comments,
            index_in_text,
            length,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &ExpressionTree {
        &self.tree
    }

    pub fn root(&self) -> ItemId {
        self.root
    }

    pub fn root_item(&self) -> &ExpressionItem {
        &self.tree[self.root]
    }

    /// Top level statements.
    pub fn statements(&self) -> &[ItemId] {
        self.tree[self.root].children()
    }

    pub fn errors(&self) -> &ParseErrorData {
        &self.errors
    }

    /// Comments in text order.
    pub fn comments(&self) -> &[CommentSpan] {
        &self.comments
    }

    /// Start of the parsed expressions.
    pub fn index_in_text(&self) -> usize {
        self.index_in_text
    }

    /// Length from the first to the end of the last parsed expression.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Deepest item at `position`, if any.
    pub fn item_at(&self, position: usize) -> Option<ItemId> {
        self.tree.item_at(self.root, position)
    }

    /// Text covered by `item`.
    pub fn item_text(&self, item: ItemId) -> String {
        let (start, length) = self.tree.span(item);
        self.text.chars().skip(start).take(length).collect()
    }
}
