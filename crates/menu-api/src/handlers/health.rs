use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    name: String,
    version: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            name: state.config.app.name.clone(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Ready once the menu store answers a ping.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state
        .menus
        .ping()
        .await
        .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;
    Ok(StatusCode::OK)
}
