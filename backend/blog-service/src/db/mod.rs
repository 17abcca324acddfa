/// Database access layer
///
/// Repository traits per entity, implemented by [`PgStore`] (PostgreSQL) and
/// [`MemoryStore`] (in-process, for development and tests). Handlers only see
/// `Arc<dyn BlogStore>`.
pub mod comment_repo;
pub mod follow_repo;
pub mod group_repo;
pub mod memory;
pub mod post_repo;
pub mod user_repo;

pub use memory::MemoryStore;

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::PgPool;

use crate::models::{
    Comment, Follow, Group, NewComment, NewGroup, NewPost, Post, PostChanges, User,
};

pub const FOLLOWS_UNIQUE_PAIR: &str = "follows_unique_pair";
pub const FOLLOWS_NO_SELF_FOLLOW: &str = "follows_no_self_follow";
pub const USERS_USERNAME_KEY: &str = "users_username_key";

/// Store failures, with constraint violations split out so callers can turn
/// them into field errors
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKey(String),

    #[error("check constraint violated: {0}")]
    CheckViolation(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl RepoError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, RepoError::UniqueViolation(_))
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, RepoError::ForeignKey(_))
    }

    pub fn is_check_violation(&self) -> bool {
        matches!(self, RepoError::CheckViolation(_))
    }

    /// Name of the violated constraint, if any
    pub fn constraint(&self) -> Option<&str> {
        match self {
            RepoError::UniqueViolation(c)
            | RepoError::ForeignKey(c)
            | RepoError::CheckViolation(c) => Some(c),
            RepoError::Sqlx(_) => None,
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.kind() {
                ErrorKind::UniqueViolation => return RepoError::UniqueViolation(constraint),
                ErrorKind::ForeignKeyViolation => return RepoError::ForeignKey(constraint),
                ErrorKind::CheckViolation => return RepoError::CheckViolation(constraint),
                _ => {}
            }
        }
        RepoError::Sqlx(err)
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<User>;

    async fn find_user_by_id(&self, id: i64) -> RepoResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// All groups ordered by id
    async fn list_groups(&self) -> RepoResult<Vec<Group>>;

    async fn find_group(&self, id: i64) -> RepoResult<Option<Group>>;

    /// Groups are managed outside the public API; used for seeding
    async fn create_group(&self, group: &NewGroup) -> RepoResult<Group>;

    /// Deleting a group detaches its posts
    async fn delete_group(&self, id: i64) -> RepoResult<bool>;
}

/// Limit/offset window applied to a list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn count_posts(&self) -> RepoResult<i64>;

    /// Posts ordered by `pub_date`, then `id`; everything when `window` is `None`
    async fn list_posts(&self, window: Option<Window>) -> RepoResult<Vec<Post>>;

    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>>;

    async fn create_post(&self, post: &NewPost) -> RepoResult<Post>;

    /// Returns `None` when the post does not exist
    async fn update_post(&self, id: i64, changes: &PostChanges) -> RepoResult<Option<Post>>;

    /// Removes the post and its comments
    async fn delete_post(&self, id: i64) -> RepoResult<bool>;
}

/// Comment lookups are always scoped to their parent post
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn list_comments(&self, post_id: i64) -> RepoResult<Vec<Comment>>;

    async fn find_comment(&self, post_id: i64, id: i64) -> RepoResult<Option<Comment>>;

    async fn create_comment(&self, comment: &NewComment) -> RepoResult<Comment>;

    async fn update_comment(&self, post_id: i64, id: i64, text: &str)
        -> RepoResult<Option<Comment>>;

    async fn delete_comment(&self, post_id: i64, id: i64) -> RepoResult<bool>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Outgoing edges of `user_id` ordered by id. Every term must be a
    /// case-insensitive substring of either username on the edge.
    async fn list_follows(&self, user_id: i64, terms: &[String]) -> RepoResult<Vec<Follow>>;

    async fn follow_exists(&self, user_id: i64, following_id: i64) -> RepoResult<bool>;

    async fn create_follow(&self, user_id: i64, following_id: i64) -> RepoResult<Follow>;
}

/// Everything the HTTP layer needs from storage
#[async_trait]
pub trait BlogStore:
    UserRepository + GroupRepository + PostRepository + CommentRepository + FollowRepository
{
    fn backend(&self) -> &'static str;

    /// Readiness probe
    async fn ping(&self) -> RepoResult<()>;
}

/// PostgreSQL-backed store; the per-entity impls live in the `*_repo` modules
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BlogStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Escape `%`, `_` and `\` so a search term matches literally inside `ILIKE`
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
