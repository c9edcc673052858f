//! Following service.

use crate::permissions::Permission;
use crate::viewer::Viewer;
use chrono::Utc;
use quill_common::{AppError, AppResult};
use quill_db::{
    entities::{follow, user},
    repositories::{FollowRepository, UserRepository},
};
use sea_orm::Set;
use std::collections::HashMap;
use tracing::debug;

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
        }
    }

    /// Add the edge `follower_id -> followed_id` unless it already exists.
    ///
    /// Returns whether an edge was created. A concurrent insert of the same
    /// pair counts as already existing.
    pub async fn follow_user(&self, follower_id: &str, followed_id: &str) -> AppResult<bool> {
        if self.follow_repo.is_following(follower_id, followed_id).await? {
            return Ok(false);
        }

        let model = follow::ActiveModel {
            follower_id: Set(follower_id.to_string()),
            followed_id: Set(followed_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        match self.follow_repo.create(model).await {
            Ok(_) => {
                debug!(follower_id, followed_id, "Followed user");
                Ok(true)
            }
            Err(AppError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Remove the edge `follower_id -> followed_id` if present.
    ///
    /// Returns whether an edge was removed.
    pub async fn unfollow_user(&self, follower_id: &str, followed_id: &str) -> AppResult<bool> {
        let removed = self
            .follow_repo
            .delete_by_pair(follower_id, followed_id)
            .await?;
        if removed {
            debug!(follower_id, followed_id, "Unfollowed user");
        }
        Ok(removed)
    }

    /// Follow `target_id` as the signed-in viewer. Requires `FOLLOW`.
    pub async fn follow(&self, viewer: &Viewer, target_id: &str) -> AppResult<bool> {
        let current = viewer.require(Permission::FOLLOW)?;
        self.user_repo.get_by_id(target_id).await?;
        self.follow_user(current.id(), target_id).await
    }

    /// Unfollow `target_id` as the signed-in viewer. Requires `FOLLOW`.
    ///
    /// The edge from a user to themselves cannot be removed.
    pub async fn unfollow(&self, viewer: &Viewer, target_id: &str) -> AppResult<bool> {
        let current = viewer.require(Permission::FOLLOW)?;
        if current.id() == target_id {
            return Err(AppError::BadRequest("Cannot unfollow yourself".to_string()));
        }
        self.user_repo.get_by_id(target_id).await?;
        self.unfollow_user(current.id(), target_id).await
    }

    /// Whether `follower_id` follows `followed_id`.
    pub async fn is_following(&self, follower_id: &str, followed_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, followed_id).await
    }

    /// Whether `user_id` is followed by `follower_id`.
    pub async fn is_followed_by(&self, user_id: &str, follower_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, user_id).await
    }

    /// Users following `user_id`, most recent first.
    pub async fn followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        let edges = self
            .follow_repo
            .find_followers(user_id, limit, offset)
            .await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.follower_id).collect();
        self.users_in_order(ids).await
    }

    /// Users `user_id` follows, most recent first.
    pub async fn following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        let edges = self
            .follow_repo
            .find_following(user_id, limit, offset)
            .await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.followed_id).collect();
        self.users_in_order(ids).await
    }

    async fn users_in_order(&self, ids: Vec<String>) -> AppResult<Vec<user::Model>> {
        let mut by_id: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::viewer::tests::{test_user, viewer_with};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn edge(follower_id: &str, followed_id: &str) -> follow::Model {
        follow::Model {
            follower_id: follower_id.to_string(),
            followed_id: followed_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_service(
        follow_db: Arc<DatabaseConnection>,
        user_db: Arc<DatabaseConnection>,
    ) -> FollowingService {
        FollowingService::new(FollowRepository::new(follow_db), UserRepository::new(user_db))
    }

    #[tokio::test]
    async fn test_follow_user_creates_edge() {
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new()])
                .append_query_results([[edge("a", "b")]])
                .into_connection(),
        );
        let service = create_test_service(follow_db, empty_db());

        assert!(service.follow_user("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn test_follow_twice_creates_one_edge() {
        // Second call only sees the existing edge; an insert would exhaust the mock.
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new()])
                .append_query_results([[edge("a", "b")]])
                .append_query_results([[edge("a", "b")]])
                .into_connection(),
        );
        let service = create_test_service(follow_db, empty_db());

        assert!(service.follow_user("a", "b").await.unwrap());
        assert!(!service.follow_user("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn test_unfollow_without_edge_is_noop() {
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let service = create_test_service(follow_db, empty_db());

        assert!(!service.unfollow_user("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn test_follow_requires_permission() {
        let service = create_test_service(empty_db(), empty_db());

        let anonymous = service.follow(&Viewer::Anonymous, "b").await;
        assert!(matches!(anonymous, Err(AppError::Unauthorized)));

        let no_follow = service
            .follow(&viewer_with("a", Permission::COMMENT), "b")
            .await;
        assert!(matches!(no_follow, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_follow_unknown_user() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(empty_db(), user_db);

        let result = service
            .follow(&viewer_with("a", Permission::USER), "ghost")
            .await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_cannot_unfollow_self() {
        let service = create_test_service(empty_db(), empty_db());

        let result = service
            .unfollow(&viewer_with("a", Permission::USER), "a")
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_is_followed_by() {
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge("b", "a")]])
                .into_connection(),
        );
        let service = create_test_service(follow_db, empty_db());

        assert!(service.is_followed_by("a", "b").await.unwrap());
    }

    #[tokio::test]
    async fn test_followers_keep_edge_order() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("a")]])
                .append_query_results([[test_user("b"), test_user("c")]])
                .into_connection(),
        );
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge("c", "a"), edge("b", "a")]])
                .into_connection(),
        );
        let service = create_test_service(follow_db, user_db);

        let followers = service.followers("a", 20, 0).await.unwrap();
        let ids: Vec<_> = followers.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }
}
