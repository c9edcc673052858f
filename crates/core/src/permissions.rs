//! Role permissions using bitflags.
//!
//! Each role stores a bitmask of granted permissions. A request for a set
//! of permissions succeeds only when every requested bit is granted.

use bitflags::bitflags;
use quill_db::entities::role;

bitflags! {
    /// Permissions a role can grant.
    ///
    /// Stored as INTEGER in `PostgreSQL`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permission: u32 {
        /// Follow other users
        const FOLLOW     = 0x01;
        /// Comment on posts
        const COMMENT    = 0x02;
        /// Write posts
        const WRITE      = 0x04;
        /// Enable and disable comments written by others
        const MODERATE   = 0x08;
        /// Manage users and roles
        const ADMINISTER = 0x80;
    }
}

impl Permission {
    // === Role presets ===

    /// Permissions of the default `User` role.
    pub const USER: Self = Self::FOLLOW.union(Self::COMMENT).union(Self::WRITE);

    /// Permissions of the `Moderator` role.
    pub const MODERATOR: Self = Self::USER.union(Self::MODERATE);

    /// Permissions of the `Administrator` role: every bit, named or not.
    pub const ADMINISTRATOR: Self = Self::from_bits_retain(0xff);

    // === Database conversion ===

    /// Create permissions from a database INTEGER value.
    ///
    /// Unnamed bits are kept so a role's mask round-trips unchanged.
    #[must_use]
    pub const fn from_db(value: i32) -> Self {
        Self::from_bits_retain(value as u32)
    }

    /// Convert permissions to a database INTEGER value.
    #[must_use]
    pub const fn to_db(self) -> i32 {
        self.bits() as i32
    }
}

/// Whether `role` grants every bit of `permission`.
///
/// A missing role grants nothing, not even the empty set.
#[must_use]
pub fn role_can(role: Option<&role::Model>, permission: Permission) -> bool {
    role.is_some_and(|r| Permission::from_db(r.permissions).contains(permission))
}
