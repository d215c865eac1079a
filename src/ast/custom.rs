use std::any::Any;
use std::fmt;

use serde::Serialize;

use super::{ExpressionTree, ItemId};
use crate::language::KeywordId;

/// Where a custom expression sits relative to the expression it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomCategory {
    /// Applied to the expression that follows
    Prefix,
    /// An operand on its own
    Regular,
    /// Applied to the expression just before it
    Postfix,
}

impl fmt::Display for CustomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomCategory::Prefix => write!(f, "prefix"),
            CustomCategory::Regular => write!(f, "regular"),
            CustomCategory::Postfix => write!(f, "postfix"),
        }
    }
}

/// Plugin specific payload of a custom expression.
///
/// Hosts downcast through [`as_any`](CustomExpressionData::as_any) to get
/// their own type back.
pub trait CustomExpressionData: fmt::Debug {
    /// Short name used in outlines and JSON output.
    fn name(&self) -> &str;

    /// Whether `postfix` may be attached to the expression carrying this data.
    fn is_valid_postfix(&self, tree: &ExpressionTree, postfix: ItemId) -> bool {
        let _ = (tree, postfix);
        true
    }

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug)]
pub struct CustomExpressionItem {
    pub category: CustomCategory,
    /// Keyword that triggered the plugin
    pub trigger: KeywordId,
    pub data: Box<dyn CustomExpressionData>,
}

impl CustomExpressionItem {
    pub fn data_as<T: 'static>(&self) -> Option<&T> {
        self.data.as_any().downcast_ref::<T>()
    }
}
