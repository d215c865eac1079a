use std::ops::Index;

use thiserror::Error;

use super::items::{ComplexParts, ExpressionItem, ItemId, ItemKind, Section, Token, TokenKind};

/// Misuse of the tree mutation API.
///
/// These are programming errors of whoever builds the tree, never problems in
/// the parsed text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("item {0} does not exist")]
    UnknownItem(ItemId),

    #[error("item {0} is a token and cannot own other items")]
    NotComplex(ItemId),

    #[error("item {item} is already attached to {parent}")]
    AlreadyAttached { item: ItemId, parent: ItemId },

    #[error("making {parent} the parent of {item} would create a cycle")]
    CircularParent { item: ItemId, parent: ItemId },

    #[error("{section} {item} at position {position} is out of order in {owner}")]
    OrderViolation {
        owner: ItemId,
        item: ItemId,
        section: Section,
        position: usize,
    },
}

/// Arena holding every item of one parse.
#[derive(Debug)]
pub struct ExpressionTree {
    items: Vec<ExpressionItem>,
    validation: bool,
}

impl Default for ExpressionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionTree {
    pub fn new() -> Self {
        ExpressionTree {
            items: Vec::new(),
            validation: true,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&ExpressionItem> {
        self.items.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExpressionItem> {
        self.items.iter()
    }

    /// Creates a detached token item.
    pub fn create_token(&mut self, kind: TokenKind, text: &str, index_in_text: usize) -> ItemId {
        let length = text.chars().count();
        self.push(ItemKind::Token(Token::new(kind, text)), index_in_text, length)
    }

    /// Creates a detached item. For complex kinds `index_in_text` is only used
    /// while the item has no parts.
    pub fn create(&mut self, kind: ItemKind, index_in_text: usize) -> ItemId {
        let length = match &kind {
            ItemKind::Token(token) => token.text.chars().count(),
            _ => 0,
        };
        self.push(kind, index_in_text, length)
    }

    fn push(&mut self, kind: ItemKind, index_in_text: usize, length: usize) -> ItemId {
        let id = ItemId(self.items.len());
        self.items.push(ExpressionItem {
            id,
            parent: None,
            index_in_text,
            length,
            kind,
            parts: ComplexParts::default(),
        });
        id
    }

    /// Drops every item created after the arena held `len` items, along with
    /// the links other items have to them.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.items.len() {
            return;
        }
        self.items.truncate(len);
        for item in &mut self.items {
            if item.parent.is_some_and(|parent| parent.0 >= len) {
                item.parent = None;
            }
            item.parts.retain(|part| part.0 < len);
        }
    }

    pub(crate) fn kind_mut(&mut self, id: ItemId) -> Option<&mut ItemKind> {
        self.items.get_mut(id.0).map(|item| &mut item.kind)
    }

    pub fn parts(&self, id: ItemId) -> Option<&ComplexParts> {
        self.get(id).map(|item| &item.parts)
    }

    // ========================================================================
    // Spans
    // ========================================================================

    /// Start of the item: its own position for tokens, the start of its first
    /// part otherwise.
    pub fn index_in_text(&self, id: ItemId) -> usize {
        let mut current = id;
        loop {
            let Some(item) = self.get(current) else {
                return 0;
            };
            match item.parts.first() {
                Some(first) if item.is_complex() => current = first,
                _ => return item.index_in_text,
            }
        }
    }

    /// End of the item (exclusive).
    pub fn end(&self, id: ItemId) -> usize {
        let mut current = id;
        loop {
            let Some(item) = self.get(current) else {
                return 0;
            };
            match item.parts.last() {
                Some(last) if item.is_complex() => current = last,
                _ => return item.index_in_text + item.length,
            }
        }
    }

    pub fn length(&self, id: ItemId) -> usize {
        self.end(id).saturating_sub(self.index_in_text(id))
    }

    /// `(index_in_text, length)` of the item.
    pub fn span(&self, id: ItemId) -> (usize, usize) {
        (self.index_in_text(id), self.length(id))
    }

    // ========================================================================
    // Parent links
    // ========================================================================

    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.get(id).and_then(|item| item.parent)
    }

    /// Topmost item reached by following parent links from `id`.
    pub fn topmost_ancestor(&self, id: ItemId) -> ItemId {
        let mut current = id;
        for _ in 0..=self.items.len() {
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: ItemId, id: ItemId) -> bool {
        let mut current = Some(id);
        // A well-formed chain is never longer than the arena
        for _ in 0..=self.items.len() {
            match current {
                Some(item) if item == ancestor => return true,
                Some(item) => current = self.parent(item),
                None => return false,
            }
        }
        true
    }

    fn check_parent(&self, item: ItemId, parent: ItemId) -> Result<(), TreeError> {
        if self.get(item).is_none() {
            return Err(TreeError::UnknownItem(item));
        }
        if self.get(parent).is_none() {
            return Err(TreeError::UnknownItem(parent));
        }
        if self.is_ancestor_or_self(item, parent) {
            return Err(TreeError::CircularParent { item, parent });
        }
        Ok(())
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    pub fn add_prefix(&mut self, owner: ItemId, item: ItemId) -> Result<(), TreeError> {
        self.attach(owner, item, Section::Prefix, false)
    }

    pub fn add_keyword(&mut self, owner: ItemId, item: ItemId) -> Result<(), TreeError> {
        self.attach(owner, item, Section::Keyword, false)
    }

    pub fn add_postfix(&mut self, owner: ItemId, item: ItemId) -> Result<(), TreeError> {
        self.attach(owner, item, Section::Postfix, false)
    }

    /// Adds a token or other structural part.
    pub(crate) fn add_regular_item(&mut self, owner: ItemId, item: ItemId) -> Result<(), TreeError> {
        self.attach(owner, item, Section::Regular, false)
    }

    /// Adds a nested expression; it becomes both a regular item and a child.
    pub(crate) fn add_child(&mut self, owner: ItemId, item: ItemId) -> Result<(), TreeError> {
        self.attach(owner, item, Section::Regular, true)
    }

    /// Runs `f` with section ordering checks turned off.
    ///
    /// Parent checks stay on. The previous setting is restored afterwards, so
    /// calls can nest.
    pub fn with_validation_suspended<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.validation;
        self.validation = false;
        let result = f(self);
        self.validation = previous;
        result
    }

    pub fn is_validation_on(&self) -> bool {
        self.validation
    }

    fn attach(
        &mut self,
        owner: ItemId,
        item: ItemId,
        section: Section,
        is_child: bool,
    ) -> Result<(), TreeError> {
        let owner_item = self.get(owner).ok_or(TreeError::UnknownItem(owner))?;
        if !owner_item.is_complex() {
            return Err(TreeError::NotComplex(owner));
        }
        let attached = self.get(item).ok_or(TreeError::UnknownItem(item))?;

        self.check_parent(item, owner)?;
        if let Some(parent) = attached.parent {
            return Err(TreeError::AlreadyAttached { item, parent });
        }
        if self.validation {
            self.check_order(owner, item, section)?;
        }

        self.items[item.0].parent = Some(owner);
        let parts = &mut self.items[owner.0].parts;
        parts.section_mut(section).push(item);
        if is_child {
            parts.children.push(item);
        }
        Ok(())
    }

    /// The new item has to start after every part of its own and earlier
    /// sections and before every part of later sections.
    fn check_order(&self, owner: ItemId, item: ItemId, section: Section) -> Result<(), TreeError> {
        let position = self.index_in_text(item);
        let parts = &self.items[owner.0].parts;

        let sections = [
            Section::Prefix,
            Section::Keyword,
            Section::Regular,
            Section::Postfix,
        ];

        let previous = sections
            .iter()
            .filter(|s| **s <= section)
            .rev()
            .find_map(|s| parts.section(*s).last().copied());
        let next = sections
            .iter()
            .filter(|s| **s > section)
            .find_map(|s| parts.section(*s).first().copied());

        let after_previous = previous.is_none_or(|p| self.index_in_text(p) < position);
        let before_next = next.is_none_or(|n| position < self.index_in_text(n));

        if after_previous && before_next {
            Ok(())
        } else {
            Err(TreeError::OrderViolation {
                owner,
                item,
                section,
                position,
            })
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether `postfix` may be attached to `target`.
    ///
    /// Tokens never take postfixes; custom expressions ask their data.
    pub fn is_valid_postfix(&self, target: ItemId, postfix: ItemId) -> bool {
        match self.get(target).map(|item| &item.kind) {
            None | Some(ItemKind::Token(_)) => false,
            Some(ItemKind::Custom(custom)) => custom.data.is_valid_postfix(self, postfix),
            Some(_) => true,
        }
    }

    /// Deepest item under `root` whose span contains `position`.
    pub fn item_at(&self, root: ItemId, position: usize) -> Option<ItemId> {
        let contains = |id: ItemId| {
            let (start, length) = self.span(id);
            start <= position && position < start + length
        };

        if !contains(root) {
            return None;
        }

        let mut current = root;
        'descend: loop {
            let Some(item) = self.get(current) else {
                return Some(current);
            };
            for part in item.parts.all() {
                if contains(part) {
                    current = part;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }
}

impl Index<ItemId> for ExpressionTree {
    type Output = ExpressionItem;

    fn index(&self, id: ItemId) -> &ExpressionItem {
        &self.items[id.0]
    }
}
