//! API middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use quill_common::Config;
use quill_core::{CommentService, FollowingService, PostService, RoleService, UserService, Viewer};
use quill_db::repositories::{
    CommentRepository, FollowRepository, PostRepository, RoleRepository, UserRepository,
};
use sea_orm::DatabaseConnection;
use tracing::warn;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub role_service: RoleService,
    pub following_service: FollowingService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    /// Items per page when a list request gives no `limit`.
    pub page_size: u64,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let role_repo = RoleRepository::new(Arc::clone(&db));
        let follow_repo = FollowRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(db);

        Self {
            user_service: UserService::new(
                user_repo.clone(),
                role_repo.clone(),
                follow_repo.clone(),
                post_repo.clone(),
                config,
            ),
            role_service: RoleService::new(role_repo),
            following_service: FollowingService::new(follow_repo, user_repo.clone()),
            post_service: PostService::new(
                post_repo.clone(),
                comment_repo.clone(),
                user_repo,
                config,
            ),
            comment_service: CommentService::new(comment_repo, post_repo, config),
            page_size: config.app.page_size,
        }
    }
}

/// Resolve the bearer token into a [`Viewer`] stored in request extensions.
///
/// Missing or unknown tokens make the request anonymous. Signed-in users get
/// their last-seen time refreshed.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string);

    let mut viewer = match state.user_service.resolve_viewer(token.as_deref()).await {
        Ok(viewer) => viewer,
        Err(e) => return e.into_response(),
    };

    if let Viewer::Authenticated(user) = &mut viewer {
        match state.user_service.ping(user.id()).await {
            Ok(seen) => user.user.last_seen = seen,
            Err(e) => warn!(error = %e, user_id = %user.id(), "Failed to update last seen"),
        }
    }

    req.extensions_mut().insert(viewer);
    next.run(req).await
}
