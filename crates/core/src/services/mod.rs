//! Business logic services.

pub mod comment;
#[cfg(feature = "fake-data")]
pub mod fake_data;
pub mod following;
pub mod post;
pub mod role;
pub mod user;

pub use comment::{CommentService, CreateCommentInput};
#[cfg(feature = "fake-data")]
pub use fake_data::{FakeDataGenerator, FakeDataReport};
pub use following::FollowingService;
pub use post::{PostInput, PostService};
pub use role::RoleService;
pub use user::{AdminUpdateUserInput, CreateUserInput, UpdateProfileInput, UserService};
