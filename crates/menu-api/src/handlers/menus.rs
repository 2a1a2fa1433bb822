// ============================================================================
// Menu API - Menu Handlers
// File: crates/menu-api/src/handlers/menus.rs
// ============================================================================
//! Menu tree HTTP handlers (list, create, update, reorder, move, delete)

use axum::{extract::State, http::StatusCode, Json};

use menu_core::{MenuItem, MenuNode};

use crate::dto::{CreateMenuRequest, DeleteResponse, MoveRequest, MoveResponse, ReorderRequest, UpdateMenuRequest};
use crate::error::ApiError;
use crate::extract::{MenuIdPath, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/menus - full tree, `[]` when empty
pub async fn get_menus(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MenuNode>>>, ApiError> {
    let tree = state.menus.get_tree().await?;
    Ok(Json(ApiResponse::success(tree)))
}

/// POST /api/menus
pub async fn create_menu(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateMenuRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MenuItem>>), ApiError> {
    let created = state.menus.create_item(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// PUT /api/menus/{id}
pub async fn update_menu(
    State(state): State<AppState>,
    MenuIdPath(id): MenuIdPath,
    ValidatedJson(payload): ValidatedJson<UpdateMenuRequest>,
) -> Result<Json<ApiResponse<MenuItem>>, ApiError> {
    let updated = state.menus.update_item(id, payload.into()).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// PATCH /api/menus/{id}/reorder
pub async fn reorder_menu(
    State(state): State<AppState>,
    MenuIdPath(id): MenuIdPath,
    ValidatedJson(payload): ValidatedJson<ReorderRequest>,
) -> Result<Json<ApiResponse<MoveResponse>>, ApiError> {
    let new_order = payload
        .new_order
        .ok_or_else(|| ApiError::BadRequest("new_order is required and must be >= 0".to_string()))?;
    let outcome = state.menus.reorder_item(id, new_order).await?;
    Ok(Json(ApiResponse::success(MoveResponse::new(id, outcome))))
}

/// PATCH /api/menus/{id}/move
pub async fn move_menu(
    State(state): State<AppState>,
    MenuIdPath(id): MenuIdPath,
    ValidatedJson(payload): ValidatedJson<MoveRequest>,
) -> Result<Json<ApiResponse<MoveResponse>>, ApiError> {
    let outcome = state
        .menus
        .move_item(id, payload.new_parent_id, payload.new_order)
        .await?;
    Ok(Json(ApiResponse::success(MoveResponse::new(id, outcome))))
}

/// DELETE /api/menus/{id} - removes the item and its whole subtree
pub async fn delete_menu(
    State(state): State<AppState>,
    MenuIdPath(id): MenuIdPath,
) -> Result<Json<ApiResponse<DeleteResponse>>, ApiError> {
    let outcome = state.menus.delete_subtree(id).await?;
    Ok(Json(ApiResponse::success(outcome.into())))
}
