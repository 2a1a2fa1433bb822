// ============================================================================
// Menu Core - Menu Item Entity
// File: crates/menu-core/src/domain/menu_item.rs
// Description: Persisted menu row, creation input, and field patches
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::MenuError;

/// Store-assigned identifier of a menu item.
pub type MenuId = i64;

/// Menu item row.
///
/// `order` is the zero-based position among items sharing `parent_id`;
/// it carries no meaning across parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<MenuId>,
    pub order: i32,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MenuItem {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for creating a menu item. `order: None` appends after the current
/// siblings; an explicit order is stored as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct NewMenuItem {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(max = 1024, message = "URL too long"))]
    pub url: Option<String>,

    #[validate(length(max = 255, message = "Icon too long"))]
    pub icon: Option<String>,

    pub parent_id: Option<MenuId>,

    #[validate(range(min = 0, message = "Order must not be negative"))]
    pub order: Option<i32>,
}

impl NewMenuItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent_id: MenuId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Trim free-text fields and validate; blank titles are rejected.
    pub fn normalized(self) -> Result<Self, MenuError> {
        let item = Self {
            title: self.title.trim().to_string(),
            url: self.url.map(|u| u.trim().to_string()),
            icon: self.icon.map(|i| i.trim().to_string()),
            ..self
        };
        item.validate()?;
        Ok(item)
    }
}

/// Non-positional fields a patch may overwrite. `Some(None)` clears a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPatch {
    pub title: Option<String>,
    pub url: Option<Option<String>>,
    pub icon: Option<Option<String>>,
}

impl FieldPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.url.is_none() && self.icon.is_none()
    }
}

/// Partial update of a menu item, one optional slot per mutable field.
///
/// `parent_id` and `order` are positional and are applied through the move
/// engine, never written directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuItemPatch {
    pub title: Option<String>,
    pub url: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub parent_id: Option<Option<MenuId>>,
    pub order: Option<i32>,
}

impl MenuItemPatch {
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty() && !self.changes_position()
    }

    pub fn changes_position(&self) -> bool {
        self.parent_id.is_some() || self.order.is_some()
    }

    pub fn fields(&self) -> FieldPatch {
        FieldPatch {
            title: self.title.as_ref().map(|t| t.trim().to_string()),
            url: self.url.clone(),
            icon: self.icon.clone(),
        }
    }
}
