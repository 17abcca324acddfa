/// Comment service - comments always belong to the post named in the URL
use std::sync::Arc;

use actix_middleware::AuthenticatedUser;
use actix_web::http::Method;

use crate::db::BlogStore;
use crate::error::{AppError, Result};
use crate::metrics::record_write;
use crate::middleware::check_author_or_read_only;
use crate::models::{Comment, CommentPayload, NewComment, Post};
use crate::services::UpdateMode;
use crate::validation::FieldErrors;

pub struct CommentService {
    store: Arc<dyn BlogStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// Resolve the parent post; 404 when it does not exist
    async fn parent(&self, post_id: i64) -> Result<Post> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or_else(AppError::not_found)
    }

    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let post = self.parent(post_id).await?;
        Ok(self.store.list_comments(post.id).await?)
    }

    pub async fn get_comment(&self, post_id: i64, comment_id: i64) -> Result<Comment> {
        let post = self.parent(post_id).await?;
        self.store
            .find_comment(post.id, comment_id)
            .await?
            .ok_or_else(AppError::not_found)
    }

    pub async fn create_comment(
        &self,
        author: &AuthenticatedUser,
        post_id: i64,
        payload: CommentPayload,
    ) -> Result<Comment> {
        let post = self.parent(post_id).await?;

        let mut errors = FieldErrors::new();
        errors.text("text", &payload.text, true);
        errors.into_result()?;

        let comment = self
            .store
            .create_comment(&NewComment {
                post_id: post.id,
                author_id: author.id,
                text: payload.text.flatten().unwrap_or_default(),
            })
            .await
            .map_err(|e| {
                // Post deleted between lookup and insert
                if e.is_foreign_key_violation() {
                    AppError::not_found()
                } else {
                    e.into()
                }
            })?;

        record_write("comment", "create");
        tracing::info!(
            post_id,
            comment_id = comment.id,
            author = %author.username,
            "Comment created"
        );
        Ok(comment)
    }

    pub async fn update_comment(
        &self,
        identity: Option<&AuthenticatedUser>,
        post_id: i64,
        comment_id: i64,
        payload: CommentPayload,
        mode: UpdateMode,
    ) -> Result<Comment> {
        let comment = self.get_comment(post_id, comment_id).await?;
        check_author_or_read_only("comment", &mode.method(), identity, comment.author_id)?;

        let mut errors = FieldErrors::new();
        errors.text("text", &payload.text, mode == UpdateMode::Full);
        errors.into_result()?;

        let Some(text) = payload.text.flatten() else {
            return Ok(comment);
        };

        let updated = self
            .store
            .update_comment(post_id, comment_id, &text)
            .await?
            .ok_or_else(AppError::not_found)?;

        record_write("comment", "update");
        tracing::info!(post_id, comment_id, "Comment updated");
        Ok(updated)
    }

    pub async fn delete_comment(
        &self,
        identity: Option<&AuthenticatedUser>,
        post_id: i64,
        comment_id: i64,
    ) -> Result<()> {
        let comment = self.get_comment(post_id, comment_id).await?;
        check_author_or_read_only("comment", &Method::DELETE, identity, comment.author_id)?;

        if !self.store.delete_comment(post_id, comment_id).await? {
            return Err(AppError::not_found());
        }

        record_write("comment", "delete");
        tracing::info!(post_id, comment_id, "Comment deleted");
        Ok(())
    }
}
