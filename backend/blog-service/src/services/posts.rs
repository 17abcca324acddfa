/// Post service - handles post creation, retrieval, and management
use std::sync::Arc;

use actix_middleware::AuthenticatedUser;
use actix_web::http::Method;

use crate::db::{BlogStore, RepoError, Window};
use crate::error::{AppError, Result};
use crate::metrics::record_write;
use crate::middleware::check_author_or_read_only;
use crate::models::{NewPost, Post, PostChanges, PostPayload};
use crate::validation::FieldErrors;

/// How an update treats missing fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// PUT: `text` is required
    Full,
    /// PATCH: only supplied fields are validated and written
    Partial,
}

impl UpdateMode {
    pub fn method(self) -> Method {
        match self {
            UpdateMode::Full => Method::PUT,
            UpdateMode::Partial => Method::PATCH,
        }
    }
}

pub(crate) fn invalid_pk(id: i64) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

pub struct PostService {
    store: Arc<dyn BlogStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    pub async fn count_posts(&self) -> Result<i64> {
        Ok(self.store.count_posts().await?)
    }

    /// Posts in publication order, restricted to `window` when given
    pub async fn list_posts(&self, window: Option<Window>) -> Result<Vec<Post>> {
        Ok(self.store.list_posts(window).await?)
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: i64) -> Result<Post> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or_else(AppError::not_found)
    }

    /// Validate `group` against the store, adding a field error when it does not exist
    async fn check_group(&self, group: Option<Option<i64>>, errors: &mut FieldErrors) -> Result<()> {
        if let Some(Some(group_id)) = group {
            if self.store.find_group(group_id).await?.is_none() {
                errors.add("group", invalid_pk(group_id));
            }
        }
        Ok(())
    }

    /// A group deleted between the check and the write
    fn map_write_error(err: RepoError, group: Option<Option<i64>>) -> AppError {
        match (err, group) {
            (e, Some(Some(group_id))) if e.is_foreign_key_violation() => {
                AppError::field("group", invalid_pk(group_id))
            }
            (e, _) => e.into(),
        }
    }

    pub async fn create_post(&self, author: &AuthenticatedUser, payload: PostPayload) -> Result<Post> {
        let mut errors = FieldErrors::new();
        errors.text("text", &payload.text, true);
        self.check_group(payload.group, &mut errors).await?;
        errors.into_result()?;

        let new_post = NewPost {
            author_id: author.id,
            text: payload.text.flatten().unwrap_or_default(),
            image: payload.image.flatten(),
            group_id: payload.group.flatten(),
        };

        let post = self
            .store
            .create_post(&new_post)
            .await
            .map_err(|e| Self::map_write_error(e, payload.group))?;

        record_write("post", "create");
        tracing::info!(post_id = post.id, author = %author.username, "Post created");
        Ok(post)
    }

    pub async fn update_post(
        &self,
        identity: Option<&AuthenticatedUser>,
        post_id: i64,
        payload: PostPayload,
        mode: UpdateMode,
    ) -> Result<Post> {
        let post = self.get_post(post_id).await?;
        check_author_or_read_only("post", &mode.method(), identity, post.author_id)?;

        let mut errors = FieldErrors::new();
        errors.text("text", &payload.text, mode == UpdateMode::Full);
        self.check_group(payload.group, &mut errors).await?;
        errors.into_result()?;

        let changes = PostChanges {
            text: payload.text.flatten(),
            image: payload.image,
            group_id: payload.group,
        };

        let updated = self
            .store
            .update_post(post_id, &changes)
            .await
            .map_err(|e| Self::map_write_error(e, changes.group_id))?
            .ok_or_else(AppError::not_found)?;

        record_write("post", "update");
        tracing::info!(post_id, "Post updated");
        Ok(updated)
    }

    pub async fn delete_post(&self, identity: Option<&AuthenticatedUser>, post_id: i64) -> Result<()> {
        let post = self.get_post(post_id).await?;
        check_author_or_read_only("post", &Method::DELETE, identity, post.author_id)?;

        if !self.store.delete_post(post_id).await? {
            return Err(AppError::not_found());
        }

        record_write("post", "delete");
        tracing::info!(post_id, "Post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, UserRepository};

    async fn setup() -> (PostService, AuthenticatedUser, AuthenticatedUser) {
        let store = Arc::new(MemoryStore::new());
        let leo = store.create_user("leo", "x").await.unwrap();
        let anna = store.create_user("anna", "x").await.unwrap();
        let as_identity = |u: crate::models::User| AuthenticatedUser {
            id: u.id,
            username: u.username,
        };
        (PostService::new(store), as_identity(leo), as_identity(anna))
    }

    fn text(value: &str) -> PostPayload {
        PostPayload {
            text: Some(Some(value.to_string())),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_forces_author() {
        let (service, leo, _) = setup().await;
        let post = service.create_post(&leo, text("hello")).await.unwrap();
        assert_eq!(post.author, "leo");
        assert_eq!(post.author_id, leo.id);
    }

    #[tokio::test]
    async fn create_rejects_missing_text_and_unknown_group() {
        let (service, leo, _) = setup().await;
        let payload = PostPayload {
            text: None,
            image: None,
            group: Some(Some(42)),
        };

        match service.create_post(&leo, payload).await {
            Err(AppError::Validation(fields)) => {
                assert!(fields.get("text").is_some());
                assert_eq!(fields.get("group"), Some(&[invalid_pk(42)][..]));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(service.count_posts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn non_author_cannot_update() {
        let (service, leo, anna) = setup().await;
        let post = service.create_post(&leo, text("hello")).await.unwrap();

        let result = service
            .update_post(Some(&anna), post.id, text("hacked"), UpdateMode::Partial)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(service.get_post(post.id).await.unwrap().text, "hello");
    }

    #[tokio::test]
    async fn full_update_requires_text() {
        let (service, leo, _) = setup().await;
        let post = service.create_post(&leo, text("hello")).await.unwrap();

        let result = service
            .update_post(Some(&leo), post.id, PostPayload::default(), UpdateMode::Full)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let patched = service
            .update_post(Some(&leo), post.id, PostPayload::default(), UpdateMode::Partial)
            .await
            .unwrap();
        assert_eq!(patched.text, "hello");
    }

    #[tokio::test]
    async fn missing_post_is_not_found_before_permission() {
        let (service, _, _) = setup().await;
        assert!(matches!(
            service.delete_post(None, 99).await,
            Err(AppError::NotFound(_))
        ));
    }
}
