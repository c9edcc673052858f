//! User repository.

use std::sync::Arc;

use crate::entities::{User, follow, user};
use crate::write_error;
use chrono::Utc;
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, prelude::DateTimeWithTimeZone,
    sea_query::Expr,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find a user by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by API token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find users by IDs. Missing IDs are skipped; order is unspecified.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the user at `offset` in ID order.
    pub async fn find_by_offset(&self, offset: u64) -> AppResult<Option<user::Model>> {
        User::find()
            .order_by_asc(user::Column::Id)
            .offset(offset)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List users in ID order.
    pub async fn find_all(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        User::find()
            .order_by_asc(user::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all users.
    pub async fn count(&self) -> AppResult<u64> {
        User::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a user together with the edge that makes them follow themselves.
    ///
    /// Both rows are written in one transaction; a failure on either insert
    /// rolls back and leaves no partial account behind.
    pub async fn create_with_self_follow(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user = match model.insert(&txn).await {
            Ok(user) => user,
            Err(e) => {
                txn.rollback()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                return Err(write_error(e));
            }
        };

        let edge = follow::ActiveModel {
            follower_id: Set(user.id.clone()),
            followed_id: Set(user.id.clone()),
            created_at: Set(user.member_since),
        };

        if let Err(e) = edge.insert(&txn).await {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(write_error(e));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.update(self.db.as_ref()).await.map_err(write_error)
    }

    /// Refresh the last-seen timestamp and return the value written.
    pub async fn touch_last_seen(&self, id: &str) -> AppResult<DateTimeWithTimeZone> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        User::update_many()
            .col_expr(user::Column::LastSeen, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(now)
    }
}
