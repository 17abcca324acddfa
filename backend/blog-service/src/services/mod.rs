/// Business logic layer for blog-service
///
/// Services validate payloads, apply the author-or-read-only permission and
/// translate store constraint violations into field errors. Each one wraps the
/// shared `Arc<dyn BlogStore>`.
pub mod comments;
pub mod follows;
pub mod groups;
pub mod posts;
pub mod users;

// Re-export commonly used services
pub use comments::CommentService;
pub use follows::FollowService;
pub use groups::GroupService;
pub use posts::{PostService, UpdateMode};
pub use users::UserService;
