//! Comment endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use quill_common::AppResult;
use quill_core::{CommentJson, Viewer};

use super::PageQuery;
use crate::{extractors::CurrentViewer, middleware::AppState, response::ApiResponse};

/// Comments on every post, newest first.
async fn list(
    CurrentViewer(viewer): CurrentViewer,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<CommentJson>>> {
    let comments = state
        .comment_service
        .list_recent(page.limit(state.page_size), page.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        state.comment_service.to_json_many(&comments, &viewer),
    ))
}

/// Show a comment.
async fn show(
    CurrentViewer(viewer): CurrentViewer,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> AppResult<ApiResponse<CommentJson>> {
    let comment = state.comment_service.get(&comment_id).await?;
    Ok(ApiResponse::ok(
        state.comment_service.to_json(&comment, &viewer),
    ))
}

async fn set_disabled(
    state: &AppState,
    viewer: &Viewer,
    comment_id: &str,
    disabled: bool,
) -> AppResult<ApiResponse<CommentJson>> {
    let comment = state
        .comment_service
        .set_disabled(viewer, comment_id, disabled)
        .await?;
    Ok(ApiResponse::ok(
        state.comment_service.to_json(&comment, viewer),
    ))
}

/// Make a disabled comment visible again.
async fn enable(
    CurrentViewer(viewer): CurrentViewer,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> AppResult<ApiResponse<CommentJson>> {
    set_disabled(&state, &viewer, &comment_id, false).await
}

/// Hide a comment's body from non-moderators.
async fn disable(
    CurrentViewer(viewer): CurrentViewer,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> AppResult<ApiResponse<CommentJson>> {
    set_disabled(&state, &viewer, &comment_id, true).await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show))
        .route("/{id}/enable", post(enable))
        .route("/{id}/disable", post(disable))
}
