//! Nested, API-facing view of a menu item

use serde::Serialize;

use super::menu_item::{MenuId, MenuItem};

/// A menu item together with its sorted children.
///
/// Built fresh from rows on every read and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    pub id: MenuId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<MenuId>,
    pub order: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

impl From<&MenuItem> for MenuNode {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            url: item.url.clone(),
            parent_id: item.parent_id,
            order: item.order,
            children: Vec::new(),
        }
    }
}

impl MenuNode {
    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(MenuNode::subtree_len).sum::<usize>()
    }
}
