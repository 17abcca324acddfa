use async_trait::async_trait;

use super::{PgStore, PostRepository, RepoResult, Window};
use crate::models::{NewPost, Post, PostChanges};

/// Columns of `Post`, expecting `posts p JOIN users u`
const POST_COLUMNS: &str =
    "p.id, p.text, u.username AS author, p.author_id, p.pub_date, p.image, p.group_id";

#[async_trait]
impl PostRepository for PgStore {
    async fn count_posts(&self) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool())
            .await?;

        Ok(count)
    }

    async fn list_posts(&self, window: Option<Window>) -> RepoResult<Vec<Post>> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            ORDER BY p.pub_date, p.id
            LIMIT $1 OFFSET $2
            "#
        );

        // LIMIT NULL means no limit
        let (limit, offset) = match window {
            Some(w) => (Some(w.limit), w.offset),
            None => (None, 0),
        };

        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?;

        Ok(posts)
    }

    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = $1
            "#
        );

        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(post)
    }

    async fn create_post(&self, post: &NewPost) -> RepoResult<Post> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts (text, author_id, image, group_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {POST_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.author_id
            "#
        );

        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(&post.text)
            .bind(post.author_id)
            .bind(&post.image)
            .bind(post.group_id)
            .fetch_one(self.pool())
            .await?;

        Ok(post)
    }

    async fn update_post(&self, id: i64, changes: &PostChanges) -> RepoResult<Option<Post>> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET text     = COALESCE($2, text),
                    image    = CASE WHEN $3 THEN $4 ELSE image END,
                    group_id = CASE WHEN $5 THEN $6 ELSE group_id END
                WHERE id = $1
                RETURNING *
            )
            SELECT {POST_COLUMNS}
            FROM p
            JOIN users u ON u.id = p.author_id
            "#
        );

        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(&changes.text)
            .bind(changes.image.is_some())
            .bind(changes.image.clone().flatten())
            .bind(changes.group_id.is_some())
            .bind(changes.group_id.flatten())
            .fetch_optional(self.pool())
            .await?;

        Ok(post)
    }

    /// Comments go with the post (`ON DELETE CASCADE`)
    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
