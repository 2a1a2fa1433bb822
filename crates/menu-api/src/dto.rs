// ============================================================================
// Menu API - Request/Response DTOs
// File: crates/menu-api/src/dto.rs
// ============================================================================

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use menu_core::{DeleteOutcome, MenuId, MenuItemPatch, MoveOutcome, NewMenuItem};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// POST /api/menus
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMenuRequest {
    #[validate(length(min = 1, max = 255, message = "title is required"))]
    pub title: String,

    #[validate(length(max = 1024))]
    pub url: Option<String>,

    #[validate(length(max = 255))]
    pub icon: Option<String>,

    pub parent_id: Option<MenuId>,

    #[validate(range(min = 0, message = "order must be >= 0"))]
    pub order: Option<i32>,
}

impl From<CreateMenuRequest> for NewMenuItem {
    fn from(req: CreateMenuRequest) -> Self {
        NewMenuItem {
            title: req.title,
            url: req.url,
            icon: req.icon,
            parent_id: req.parent_id,
            order: req.order,
        }
    }
}

/// PUT /api/menus/{id}. `null` clears `url`, `icon`, or moves the item to the root.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMenuRequest {
    #[validate(length(max = 255))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 1024))]
    pub url: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 255))]
    pub icon: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<MenuId>>,

    #[validate(range(min = 0, message = "order must be >= 0"))]
    pub order: Option<i32>,
}

impl From<UpdateMenuRequest> for MenuItemPatch {
    fn from(req: UpdateMenuRequest) -> Self {
        MenuItemPatch {
            title: req.title,
            url: req.url,
            icon: req.icon,
            parent_id: req.parent_id,
            order: req.order,
        }
    }
}

/// PATCH /api/menus/{id}/reorder
#[derive(Debug, Deserialize, Validate)]
pub struct ReorderRequest {
    #[validate(
        required(message = "new_order is required and must be >= 0"),
        range(min = 0, message = "new_order is required and must be >= 0")
    )]
    pub new_order: Option<i32>,
}

/// PATCH /api/menus/{id}/move. A missing or `null` parent moves to the root;
/// a missing order appends.
#[derive(Debug, Deserialize, Validate)]
pub struct MoveRequest {
    pub new_parent_id: Option<MenuId>,

    #[validate(range(min = 0, message = "new_order must be >= 0"))]
    pub new_order: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub id: MenuId,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<MenuId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl MoveResponse {
    pub fn new(id: MenuId, outcome: MoveOutcome) -> Self {
        match outcome {
            MoveOutcome::Unchanged => Self {
                id,
                changed: false,
                parent_id: None,
                order: None,
            },
            MoveOutcome::Moved { parent_id, order } => Self {
                id,
                changed: true,
                parent_id,
                order: Some(order),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted_ids: Vec<MenuId>,
}

impl From<DeleteOutcome> for DeleteResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            deleted_ids: outcome.deleted_ids,
        }
    }
}
