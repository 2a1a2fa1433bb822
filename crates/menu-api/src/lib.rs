//! # Menu API
//! 
//! HTTP handlers, request DTOs, extractors, and router construction.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
