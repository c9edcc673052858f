//! API endpoints.

mod comments;
mod following;
mod posts;
mod users;

use axum::Router;
use serde::Deserialize;

use crate::middleware::AppState;

/// Largest page a list endpoint returns.
pub const MAX_LIMIT: u64 = 100;

/// Paging parameters shared by list endpoints.
///
/// Post and comment lists page by ID cursor; follower lists by offset.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub until_id: Option<String>,
    pub since_id: Option<String>,
    pub offset: Option<u64>,
}

impl PageQuery {
    /// Requested page size clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn limit(&self, default: u64) -> u64 {
        self.limit.unwrap_or(default).clamp(1, MAX_LIMIT)
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router().merge(following::router()))
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
}
