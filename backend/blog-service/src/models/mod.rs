/// Data models for blog-service
///
/// Rows are loaded with `sqlx::FromRow` and serialized straight to the wire;
/// internal ids that clients never see are skipped during serialization.
/// Request payloads live next to the records they create.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::validation::{validate_password, validate_username};

// =====================================================================
// Records
// =====================================================================

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    /// Author username
    pub author: String,
    #[serde(skip)]
    pub author_id: i64,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    #[serde(rename = "group")]
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub author: String,
    #[serde(skip)]
    pub author_id: i64,
    #[serde(rename = "post")]
    pub post_id: i64,
    pub created: DateTime<Utc>,
}

/// Directed follow edge; `user` follows `following`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Follow {
    pub id: i64,
    pub user: String,
    #[serde(skip)]
    pub user_id: i64,
    pub following: String,
    #[serde(skip)]
    pub following_id: i64,
}

// =====================================================================
// Store inputs
// =====================================================================

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub text: String,
    pub image: Option<String>,
    pub group_id: Option<i64>,
}

/// Field changes applied by PUT/PATCH. `None` leaves the column untouched;
/// `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub text: Option<String>,
    pub image: Option<Option<String>>,
    pub group_id: Option<Option<i64>>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

// =====================================================================
// Request payloads
// =====================================================================

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Body of post create, update and partial update
///
/// Read-only fields (`id`, `author`, `pub_date`) are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct PostPayload {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub text: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub group: Option<Option<i64>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentPayload {
    #[serde(default, deserialize_with = "deserialize_some")]
    pub text: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct FollowPayload {
    #[validate(required(message = "This field is required."))]
    pub following: Option<String>,
}

/// Registration body
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_username")
    )]
    pub username: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_password")
    )]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct TokenObtainRequest {
    #[validate(required(message = "This field is required."))]
    pub username: Option<String>,
    #[validate(required(message = "This field is required."))]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct TokenRefreshRequest {
    #[validate(required(message = "This field is required."))]
    pub refresh: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct TokenVerifyRequest {
    #[validate(required(message = "This field is required."))]
    pub token: Option<String>,
}
