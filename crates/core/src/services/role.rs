//! Role service.

use crate::permissions::Permission;
use quill_common::{AppResult, IdGenerator};
use quill_db::{entities::role, repositories::RoleRepository};
use sea_orm::Set;
use tracing::info;

/// Roles every instance has: name, permissions, default flag.
const BUILTIN_ROLES: [(&str, Permission, bool); 3] = [
    ("User", Permission::USER, true),
    ("Moderator", Permission::MODERATOR, false),
    ("Administrator", Permission::ADMINISTRATOR, false),
];

/// Role service for business logic.
#[derive(Clone)]
pub struct RoleService {
    role_repo: RoleRepository,
    id_gen: IdGenerator,
}

impl RoleService {
    /// Create a new role service.
    #[must_use]
    pub const fn new(role_repo: RoleRepository) -> Self {
        Self {
            role_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Insert the built-in roles, or bring existing ones back in line.
    ///
    /// Roles are matched by name, so running this repeatedly never creates
    /// duplicates. Rows that already match are left untouched.
    pub async fn seed_roles(&self) -> AppResult<Vec<role::Model>> {
        let mut roles = Vec::with_capacity(BUILTIN_ROLES.len());

        for (name, permissions, is_default) in BUILTIN_ROLES {
            let role = match self.role_repo.find_by_name(name).await? {
                Some(existing)
                    if existing.permissions == permissions.to_db()
                        && existing.is_default == is_default =>
                {
                    existing
                }
                Some(existing) => {
                    let mut active: role::ActiveModel = existing.into();
                    active.permissions = Set(permissions.to_db());
                    active.is_default = Set(is_default);
                    let updated = self.role_repo.update(active).await?;
                    info!(role = name, "Updated role");
                    updated
                }
                None => {
                    let model = role::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        name: Set(name.to_string()),
                        permissions: Set(permissions.to_db()),
                        is_default: Set(is_default),
                    };
                    let created = self.role_repo.create(model).await?;
                    info!(role = name, "Created role");
                    created
                }
            };
            roles.push(role);
        }

        Ok(roles)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn role(id: &str, name: &str, permissions: Permission, is_default: bool) -> role::Model {
        role::Model {
            id: id.to_string(),
            name: name.to_string(),
            permissions: permissions.to_db(),
            is_default,
        }
    }

    fn seeded() -> [role::Model; 3] {
        [
            role("r1", "User", Permission::USER, true),
            role("r2", "Moderator", Permission::MODERATOR, false),
            role("r3", "Administrator", Permission::ADMINISTRATOR, false),
        ]
    }

    #[tokio::test]
    async fn test_seed_roles_on_empty_database() {
        let [user, moderator, admin] = seeded();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<role::Model>::new()])
                .append_query_results([[user]])
                .append_query_results([Vec::<role::Model>::new()])
                .append_query_results([[moderator]])
                .append_query_results([Vec::<role::Model>::new()])
                .append_query_results([[admin]])
                .into_connection(),
        );

        let service = RoleService::new(RoleRepository::new(db));
        let roles = service.seed_roles().await.unwrap();

        assert_eq!(roles.len(), 3);
        assert_eq!(roles[0].permissions, 0x07);
        assert!(roles[0].is_default);
        assert_eq!(roles[1].permissions, 0x0f);
        assert_eq!(roles[2].permissions, 0xff);
    }

    #[tokio::test]
    async fn test_reseed_leaves_matching_roles_alone() {
        let [user, moderator, admin] = seeded();
        // Only lookups are queued: any write would exhaust the mock.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_results([[moderator.clone()]])
                .append_query_results([[admin.clone()]])
                .into_connection(),
        );

        let service = RoleService::new(RoleRepository::new(db));
        let roles = service.seed_roles().await.unwrap();

        assert_eq!(roles, vec![user, moderator, admin]);
    }

    #[tokio::test]
    async fn test_reseed_repairs_changed_role() {
        let [user, _, admin] = seeded();
        let drifted = role("r2", "Moderator", Permission::FOLLOW, true);
        let repaired = role("r2", "Moderator", Permission::MODERATOR, false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .append_query_results([[drifted]])
                .append_query_results([[repaired.clone()]])
                .append_query_results([[admin]])
                .into_connection(),
        );

        let service = RoleService::new(RoleRepository::new(db));
        let roles = service.seed_roles().await.unwrap();

        assert_eq!(roles[1], repaired);
        assert_eq!(roles.iter().filter(|r| r.is_default).count(), 1);
    }
}
