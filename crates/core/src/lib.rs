//! Core business logic for quill.
//!
//! Services take a [`Viewer`] for every operation that depends on who is
//! asking, check the role's [`Permission`] bits, and hand back entity models
//! or their JSON projections.

pub mod content;
pub mod json;
pub mod permissions;
pub mod services;
pub mod viewer;

pub use json::{CommentJson, PostJson, ResourceUrls, UserCounts, UserJson};
pub use permissions::{Permission, role_can};
pub use services::*;
pub use viewer::{AuthenticatedUser, Viewer};
