use async_trait::async_trait;

use super::{CommentRepository, PgStore, RepoResult};
use crate::models::{Comment, NewComment};

const COMMENT_COLUMNS: &str =
    "c.id, c.text, u.username AS author, c.author_id, c.post_id, c.created";

#[async_trait]
impl CommentRepository for PgStore {
    async fn list_comments(&self, post_id: i64) -> RepoResult<Vec<Comment>> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created, c.id
            "#
        );

        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .fetch_all(self.pool())
            .await?;

        Ok(comments)
    }

    async fn find_comment(&self, post_id: i64, id: i64) -> RepoResult<Option<Comment>> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.id = $1 AND c.post_id = $2
            "#
        );

        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .bind(post_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(comment)
    }

    async fn create_comment(&self, comment: &NewComment) -> RepoResult<Comment> {
        let sql = format!(
            r#"
            WITH c AS (
                INSERT INTO comments (text, author_id, post_id)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM c
            JOIN users u ON u.id = c.author_id
            "#
        );

        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(&comment.text)
            .bind(comment.author_id)
            .bind(comment.post_id)
            .fetch_one(self.pool())
            .await?;

        Ok(comment)
    }

    async fn update_comment(
        &self,
        post_id: i64,
        id: i64,
        text: &str,
    ) -> RepoResult<Option<Comment>> {
        let sql = format!(
            r#"
            WITH c AS (
                UPDATE comments
                SET text = $3
                WHERE id = $1 AND post_id = $2
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM c
            JOIN users u ON u.id = c.author_id
            "#
        );

        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .bind(post_id)
            .bind(text)
            .fetch_optional(self.pool())
            .await?;

        Ok(comment)
    }

    async fn delete_comment(&self, post_id: i64, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND post_id = $2")
            .bind(id)
            .bind(post_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
