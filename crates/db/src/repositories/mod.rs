//! Repositories wrapping database access for each entity.

pub mod comment;
pub mod follow;
pub mod post;
pub mod role;
pub mod user;

pub use comment::CommentRepository;
pub use follow::FollowRepository;
pub use post::PostRepository;
pub use role::RoleRepository;
pub use user::UserRepository;
