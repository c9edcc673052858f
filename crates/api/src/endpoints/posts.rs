//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use quill_common::AppResult;
use quill_core::{CommentJson, CreateCommentInput, PostInput, PostJson};

use super::PageQuery;
use crate::{extractors::CurrentViewer, middleware::AppState, response::ApiResponse};

/// List all posts, newest first.
async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<PostJson>>> {
    let posts = state
        .post_service
        .list(page.limit(state.page_size), page.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(state.post_service.to_json_many(&posts).await?))
}

/// Publish a post.
async fn create(
    CurrentViewer(viewer): CurrentViewer,
    State(state): State<AppState>,
    Json(input): Json<PostInput>,
) -> AppResult<ApiResponse<PostJson>> {
    let post = state.post_service.create(&viewer, input).await?;
    Ok(ApiResponse::created(state.post_service.to_json(&post).await?))
}

/// Show a post.
async fn show(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<PostJson>> {
    let post = state.post_service.get(&post_id).await?;
    Ok(ApiResponse::ok(state.post_service.to_json(&post).await?))
}

/// Replace a post's body.
async fn edit(
    CurrentViewer(viewer): CurrentViewer,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(input): Json<PostInput>,
) -> AppResult<ApiResponse<PostJson>> {
    let post = state.post_service.edit(&viewer, &post_id, input).await?;
    Ok(ApiResponse::ok(state.post_service.to_json(&post).await?))
}

/// Comments on a post, oldest first.
async fn comments(
    CurrentViewer(viewer): CurrentViewer,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<CommentJson>>> {
    let comments = state
        .comment_service
        .list_for_post(&post_id, page.limit(state.page_size), page.since_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(
        state.comment_service.to_json_many(&comments, &viewer),
    ))
}

/// Comment on a post.
async fn comment(
    CurrentViewer(viewer): CurrentViewer,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentJson>> {
    let comment = state
        .comment_service
        .create(&viewer, &post_id, input)
        .await?;
    Ok(ApiResponse::created(
        state.comment_service.to_json(&comment, &viewer),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(edit))
        .route("/{id}/comments", get(comments).post(comment))
}
