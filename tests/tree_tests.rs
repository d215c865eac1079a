// tests/tree_tests.rs

mod common;

use clove_expr::{ExpressionTree, ItemId, ItemKind, KeywordId, Section, TokenKind, TreeError};
use common::{arithmetic, parse};
use pretty_assertions::assert_eq;

fn keyword(tree: &mut ExpressionTree, text: &str, position: usize) -> ItemId {
    tree.create_token(TokenKind::Keyword(KeywordId(1)), text, position)
}

fn series(tree: &mut ExpressionTree, position: usize) -> ItemId {
    tree.create(ItemKind::SeriesWithErrors, position)
}

// ============================================================================
// Parent links
// ============================================================================

#[test]
fn test_circular_parent_rejected() {
    let mut tree = ExpressionTree::new();
    let outer = series(&mut tree, 0);
    let inner = series(&mut tree, 0);
    tree.add_prefix(outer, inner).unwrap();

    assert_eq!(
        tree.add_postfix(inner, outer),
        Err(TreeError::CircularParent {
            item: outer,
            parent: inner
        })
    );
    assert_eq!(tree.parent(outer), None);
}

#[test]
fn test_self_parent_rejected() {
    let mut tree = ExpressionTree::new();
    let item = series(&mut tree, 0);
    assert_eq!(
        tree.add_prefix(item, item),
        Err(TreeError::CircularParent { item, parent: item })
    );
}

#[test]
fn test_item_attached_once() {
    let mut tree = ExpressionTree::new();
    let token = keyword(&mut tree, "public", 0);
    let first = series(&mut tree, 7);
    let second = series(&mut tree, 20);

    tree.add_keyword(first, token).unwrap();
    assert_eq!(tree.parent(token), Some(first));
    assert_eq!(
        tree.add_keyword(second, token),
        Err(TreeError::AlreadyAttached {
            item: token,
            parent: first
        })
    );
}

#[test]
fn test_tokens_cannot_own_items() {
    let mut tree = ExpressionTree::new();
    let token = keyword(&mut tree, "public", 0);
    let other = keyword(&mut tree, "static", 7);
    assert_eq!(tree.add_postfix(token, other), Err(TreeError::NotComplex(token)));
}

#[test]
fn test_unknown_item() {
    let mut tree = ExpressionTree::new();
    let owner = series(&mut tree, 0);
    assert_eq!(
        tree.add_prefix(owner, ItemId(99)),
        Err(TreeError::UnknownItem(ItemId(99)))
    );
}

// ============================================================================
// Section order
// ============================================================================

#[test]
fn test_section_order_enforced() {
    let mut tree = ExpressionTree::new();
    let owner = series(&mut tree, 0);
    let middle = keyword(&mut tree, "a", 5);
    tree.add_keyword(owner, middle).unwrap();

    let earlier = keyword(&mut tree, "b", 2);
    assert_eq!(
        tree.add_keyword(owner, earlier),
        Err(TreeError::OrderViolation {
            owner,
            item: earlier,
            section: Section::Keyword,
            position: 2
        })
    );

    let postfix = tree.create_token(TokenKind::Custom, "z", 1);
    assert!(matches!(
        tree.add_postfix(owner, postfix),
        Err(TreeError::OrderViolation {
            section: Section::Postfix,
            ..
        })
    ));

    let prefix = tree.create_token(TokenKind::Custom, "p", 9);
    assert!(matches!(
        tree.add_prefix(owner, prefix),
        Err(TreeError::OrderViolation {
            section: Section::Prefix,
            ..
        })
    ));

    // Rejected items stay detached
    assert_eq!(tree.parent(earlier), None);
    assert_eq!(tree[owner].keywords(), &[middle]);
}

#[test]
fn test_validation_suspended_in_scope() {
    let mut tree = ExpressionTree::new();
    let owner = series(&mut tree, 0);
    let late = keyword(&mut tree, "a", 5);
    let early = keyword(&mut tree, "b", 2);
    tree.add_keyword(owner, late).unwrap();

    let result = tree.with_validation_suspended(|tree| {
        assert!(!tree.is_validation_on());
        let nested = tree.with_validation_suspended(|tree| tree.is_validation_on());
        assert!(!nested);
        assert!(!tree.is_validation_on());
        tree.add_keyword(owner, early)
    });
    assert_eq!(result, Ok(()));
    assert!(tree.is_validation_on());

    // Parent checks stay on while suspended
    let cycle = tree.with_validation_suspended(|tree| tree.add_prefix(owner, owner));
    assert!(matches!(cycle, Err(TreeError::CircularParent { .. })));
}

#[test]
fn test_complex_span_follows_parts() {
    let mut tree = ExpressionTree::new();
    let owner = series(&mut tree, 40);
    assert_eq!(tree.span(owner), (40, 0));

    let first = keyword(&mut tree, "public", 3);
    let last = tree.create_token(TokenKind::Custom, "end", 20);
    tree.add_keyword(owner, first).unwrap();
    tree.add_postfix(owner, last).unwrap();
    assert_eq!(tree.span(owner), (3, 20));
}

// ============================================================================
// Trees built by the parser
// ============================================================================

#[test]
fn test_parsed_tree_links() {
    let result = parse("public F(a, -b) { c++; d = 'e' }", &arithmetic());
    assert!(result.errors().is_empty());
    let tree = result.tree();

    for item in tree.iter() {
        for part in item.parts().all() {
            assert_eq!(tree.parent(part), Some(item.id()));
        }
        for child in item.children() {
            assert!(item.regular_items().contains(child));
        }
    }

    let b = tree
        .iter()
        .find(|item| matches!(item.kind(), ItemKind::Literal { name } if name == "b"))
        .unwrap();
    assert_eq!(tree.topmost_ancestor(b.id()), result.root());
    assert!(tree.is_ancestor_or_self(result.root(), b.id()));
}

#[test]
fn test_item_at_finds_deepest() {
    let result = parse("F(a + bc)", &arithmetic());
    let tree = result.tree();

    let item = result.item_at(7).unwrap();
    assert!(matches!(tree[item].kind(), ItemKind::Token(token) if token.text == "bc"));

    let parent = tree.parent(item).unwrap();
    assert!(matches!(tree[parent].kind(), ItemKind::Literal { .. }));
}
