//! HTTP API layer for quill.
//!
//! - **Endpoints**: users, follows, posts and comments under `/api/v1`
//! - **Extractors**: the request's [`quill_core::Viewer`]
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
use middleware::{AppState, auth_middleware};

/// The API router nested under `/api/v1` with authentication applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", router())
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
