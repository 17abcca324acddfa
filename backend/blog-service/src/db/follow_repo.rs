use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use super::{like_pattern, FollowRepository, PgStore, RepoResult};
use crate::models::Follow;

const FOLLOW_SELECT: &str = r#"
    SELECT f.id, fu.username AS "user", f.user_id, fo.username AS following, f.following_id
    FROM follows f
    JOIN users fu ON fu.id = f.user_id
    JOIN users fo ON fo.id = f.following_id
"#;

#[async_trait]
impl FollowRepository for PgStore {
    async fn list_follows(&self, user_id: i64, terms: &[String]) -> RepoResult<Vec<Follow>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(FOLLOW_SELECT);
        query.push(" WHERE f.user_id = ").push_bind(user_id);

        for term in terms {
            let pattern = like_pattern(term);
            query
                .push(" AND (fu.username ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR fo.username ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        query.push(" ORDER BY f.id");

        let follows = query
            .build_query_as::<Follow>()
            .fetch_all(self.pool())
            .await?;

        Ok(follows)
    }

    async fn follow_exists(&self, user_id: i64, following_id: i64) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND following_id = $2)",
        )
        .bind(user_id)
        .bind(following_id)
        .fetch_one(self.pool())
        .await?;

        Ok(exists)
    }

    /// Duplicate pairs and self-follows are rejected by table constraints
    async fn create_follow(&self, user_id: i64, following_id: i64) -> RepoResult<Follow> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO follows (user_id, following_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(following_id)
        .fetch_one(self.pool())
        .await?;

        let follow = sqlx::query_as::<_, Follow>(&format!("{FOLLOW_SELECT} WHERE f.id = $1"))
            .bind(id)
            .fetch_one(self.pool())
            .await?;

        Ok(follow)
    }
}
