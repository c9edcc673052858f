//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use quill_common::AppResult;
use quill_core::{AdminUpdateUserInput, PostJson, UpdateProfileInput, UserJson};

use super::PageQuery;
use crate::{
    extractors::{AuthUser, CurrentViewer},
    middleware::AppState,
    response::ApiResponse,
};

/// Show a user.
async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<UserJson>> {
    let user = state.user_service.get(&user_id).await?;
    Ok(ApiResponse::ok(state.user_service.to_json(&user).await?))
}

/// Show the signed-in user.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserJson>> {
    Ok(ApiResponse::ok(state.user_service.to_json(&user.user).await?))
}

/// Edit the signed-in user's profile.
async fn update_me(
    CurrentViewer(viewer): CurrentViewer,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserJson>> {
    let user = state.user_service.update_profile(&viewer, input).await?;
    Ok(ApiResponse::ok(state.user_service.to_json(&user).await?))
}

/// Edit any user as an administrator.
async fn update(
    CurrentViewer(viewer): CurrentViewer,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(input): Json<AdminUpdateUserInput>,
) -> AppResult<ApiResponse<UserJson>> {
    let user = state
        .user_service
        .admin_update(&viewer, &user_id, input)
        .await?;
    Ok(ApiResponse::ok(state.user_service.to_json(&user).await?))
}

/// Posts written by a user.
async fn posts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<PostJson>>> {
    let posts = state
        .post_service
        .list_by_author(&user_id, page.limit(state.page_size), page.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(state.post_service.to_json_many(&posts).await?))
}

/// Posts by everyone a user follows.
async fn timeline(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<PostJson>>> {
    let posts = state
        .post_service
        .followed_posts(&user_id, page.limit(state.page_size), page.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(state.post_service.to_json_many(&posts).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).patch(update_me))
        .route("/{id}", get(show).patch(update))
        .route("/{id}/posts", get(posts))
        .route("/{id}/timeline", get(timeline))
}
