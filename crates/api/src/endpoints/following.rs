//! Following endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use quill_common::AppResult;
use quill_core::UserJson;
use serde::Serialize;

use super::PageQuery;
use crate::{extractors::CurrentViewer, middleware::AppState, response::ApiResponse};

/// Relationship after a follow or unfollow.
#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub following: bool,
    /// Whether the request added or removed an edge.
    pub changed: bool,
}

/// Follow a user.
async fn follow(
    CurrentViewer(viewer): CurrentViewer,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<FollowResponse>> {
    let changed = state.following_service.follow(&viewer, &user_id).await?;
    Ok(ApiResponse::ok(FollowResponse {
        following: true,
        changed,
    }))
}

/// Unfollow a user.
async fn unfollow(
    CurrentViewer(viewer): CurrentViewer,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<FollowResponse>> {
    let changed = state.following_service.unfollow(&viewer, &user_id).await?;
    Ok(ApiResponse::ok(FollowResponse {
        following: false,
        changed,
    }))
}

/// Users following a user.
async fn followers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<UserJson>>> {
    let users = state
        .following_service
        .followers(&user_id, page.limit(state.page_size), page.offset.unwrap_or(0))
        .await?;
    Ok(ApiResponse::ok(state.user_service.to_json_many(&users).await?))
}

/// Users a user follows.
async fn following(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<UserJson>>> {
    let users = state
        .following_service
        .following(&user_id, page.limit(state.page_size), page.offset.unwrap_or(0))
        .await?;
    Ok(ApiResponse::ok(state.user_service.to_json_many(&users).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/follow", post(follow))
        .route("/{id}/unfollow", post(unfollow))
        .route("/{id}/followers", get(followers))
        .route("/{id}/following", get(following))
}
