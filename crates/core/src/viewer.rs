//! The identity a request is made under.

use crate::permissions::{Permission, role_can};
use quill_common::{AppError, AppResult};
use quill_db::entities::{role, user};

/// A signed-in user together with their role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The account.
    pub user: user::Model,
    /// The account's role, if it still has one.
    pub role: Option<role::Model>,
}

impl AuthenticatedUser {
    /// Create an authenticated user.
    #[must_use]
    pub const fn new(user: user::Model, role: Option<role::Model>) -> Self {
        Self { user, role }
    }

    /// Account ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.user.id
    }

    /// Whether the role grants every bit of `permission`.
    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        role_can(self.role.as_ref(), permission)
    }

    /// Whether the role grants `ADMINISTER`.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        self.can(Permission::ADMINISTER)
    }
}

/// Who is looking: a signed-in user or an anonymous visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    /// A request carrying a valid token.
    Authenticated(AuthenticatedUser),
    /// A request without a token, or with one that matches no user.
    Anonymous,
}

impl Viewer {
    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    /// Anonymous viewers never hold a permission.
    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        self.user().is_some_and(|u| u.can(permission))
    }

    /// Anonymous viewers are never administrators.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        self.can(Permission::ADMINISTER)
    }

    /// Require a signed-in user.
    pub fn require_user(&self) -> AppResult<&AuthenticatedUser> {
        self.user().ok_or(AppError::Unauthorized)
    }

    /// Require a signed-in user whose role grants `permission`.
    ///
    /// Anonymous viewers get `Unauthorized`, signed-in users lacking the
    /// permission get `Forbidden`.
    pub fn require(&self, permission: Permission) -> AppResult<&AuthenticatedUser> {
        let user = self.require_user()?;
        if user.can(permission) {
            Ok(user)
        } else {
            Err(AppError::insufficient_permissions())
        }
    }
}

impl From<AuthenticatedUser> for Viewer {
    fn from(user: AuthenticatedUser) -> Self {
        Self::Authenticated(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn test_user(id: &str) -> user::Model {
        let now = Utc::now();
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            name: Some(id.to_string()),
            location: None,
            about_me: None,
            avatar_url: None,
            token: Some(format!("token-{id}")),
            role_id: Some("role".to_string()),
            member_since: now.into(),
            last_seen: now.into(),
        }
    }

    pub(crate) fn test_role(permission: Permission) -> role::Model {
        role::Model {
            id: "role".to_string(),
            name: "Test".to_string(),
            permissions: permission.to_db(),
            is_default: false,
        }
    }

    pub(crate) fn viewer_with(id: &str, permission: Permission) -> Viewer {
        Viewer::Authenticated(AuthenticatedUser::new(
            test_user(id),
            Some(test_role(permission)),
        ))
    }

    #[test]
    fn test_anonymous_has_no_permissions() {
        let viewer = Viewer::Anonymous;
        for bits in 0u32..=0xff {
            assert!(!viewer.can(Permission::from_bits_retain(bits)));
        }
        assert!(!viewer.is_administrator());
        assert!(matches!(
            viewer.require(Permission::FOLLOW),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_user_without_role() {
        let viewer = Viewer::Authenticated(AuthenticatedUser::new(test_user("u1"), None));
        assert!(!viewer.can(Permission::FOLLOW));
        assert!(!viewer.can(Permission::empty()));
        assert!(viewer.require_user().is_ok());
        assert!(matches!(
            viewer.require(Permission::FOLLOW),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_moderator() {
        let viewer = viewer_with("mod", Permission::MODERATOR);
        assert!(viewer.can(Permission::MODERATE));
        assert!(viewer.can(Permission::FOLLOW | Permission::WRITE));
        assert!(!viewer.is_administrator());
        assert_eq!(viewer.require(Permission::MODERATE).unwrap().id(), "mod");
    }

    #[test]
    fn test_administrator() {
        let viewer = viewer_with("admin", Permission::ADMINISTRATOR);
        assert!(viewer.is_administrator());
        assert!(viewer.can(Permission::all()));
    }
}
