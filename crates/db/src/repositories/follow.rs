//! Follow repository.

use std::sync::Arc;

use crate::entities::{Follow, follow};
use crate::write_error;
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

/// Excludes the edge every user holds to themselves.
fn not_self() -> sea_orm::sea_query::SimpleExpr {
    Expr::col((follow::Entity, follow::Column::FollowerId))
        .ne(Expr::col((follow::Entity, follow::Column::FollowedId)))
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a follow edge by follower and followed.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        followed_id: &str,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find_by_id((follower_id.to_string(), followed_id.to_string()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, follower_id: &str, followed_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, followed_id).await?.is_some())
    }

    /// Create a new follow edge.
    pub async fn create(&self, model: follow::ActiveModel) -> AppResult<follow::Model> {
        model.insert(self.db.as_ref()).await.map_err(write_error)
    }

    /// Delete a follow edge by pair. Returns whether an edge was removed.
    pub async fn delete_by_pair(&self, follower_id: &str, followed_id: &str) -> AppResult<bool> {
        let result = Follow::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowedId.eq(followed_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Get edges from a user to the users they follow, newest first.
    pub async fn find_following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<follow::Model>> {
        Follow::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .filter(not_self())
            .order_by_desc(follow::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get edges from the users following a user, newest first.
    pub async fn find_followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<follow::Model>> {
        Follow::find()
            .filter(follow::Column::FollowedId.eq(user_id))
            .filter(not_self())
            .order_by_desc(follow::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count followers of a user, not counting the user themselves.
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::FollowedId.eq(user_id))
            .filter(not_self())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users a user follows, not counting the user themselves.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .filter(not_self())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
