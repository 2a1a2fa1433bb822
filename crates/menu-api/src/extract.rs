//! Request extractors that reject with [`ApiError`] instead of axum's plain-text rejections

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use menu_core::MenuId;

use crate::error::ApiError;

/// JSON body that has passed `validator` checks.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| ApiError::BadRequest(errors.to_string()))?;
        Ok(Self(value))
    }
}

/// `{id}` path segment parsed as a [`MenuId`].
pub struct MenuIdPath(pub MenuId);

impl<S> FromRequestParts<S> for MenuIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<MenuId>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::BadRequest("invalid id".to_string()))?;
        Ok(Self(id))
    }
}
