//! Role repository.

use std::sync::Arc;

use crate::entities::{Role, role};
use crate::write_error;
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Role repository for database operations.
#[derive(Clone)]
pub struct RoleRepository {
    db: Arc<DatabaseConnection>,
}

impl RoleRepository {
    /// Create a new role repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a role by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<role::Model>> {
        Role::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a role by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<role::Model>> {
        Role::find()
            .filter(role::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the role assigned to new accounts.
    pub async fn find_default(&self) -> AppResult<Option<role::Model>> {
        Role::find()
            .filter(role::Column::IsDefault.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a role with exactly the given permission bits.
    pub async fn find_by_permissions(&self, permissions: i32) -> AppResult<Option<role::Model>> {
        Role::find()
            .filter(role::Column::Permissions.eq(permissions))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new role.
    pub async fn create(&self, model: role::ActiveModel) -> AppResult<role::Model> {
        model.insert(self.db.as_ref()).await.map_err(write_error)
    }

    /// Update a role.
    pub async fn update(&self, model: role::ActiveModel) -> AppResult<role::Model> {
        model.update(self.db.as_ref()).await.map_err(write_error)
    }
}
