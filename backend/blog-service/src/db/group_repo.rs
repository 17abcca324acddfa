use async_trait::async_trait;

use super::{GroupRepository, PgStore, RepoResult};
use crate::models::{Group, NewGroup};

#[async_trait]
impl GroupRepository for PgStore {
    async fn list_groups(&self) -> RepoResult<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups ORDER BY id",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(groups)
    }

    async fn find_group(&self, id: i64) -> RepoResult<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(group)
    }

    async fn create_group(&self, group: &NewGroup) -> RepoResult<Group> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .fetch_one(self.pool())
        .await?;

        Ok(group)
    }

    /// Posts keep existing with `group_id` set to NULL (`ON DELETE SET NULL`)
    async fn delete_group(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
