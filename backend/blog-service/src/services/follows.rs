/// Follow service - directed follow edges owned by the requesting user
use std::sync::Arc;

use actix_middleware::AuthenticatedUser;

use crate::db::{BlogStore, FOLLOWS_NO_SELF_FOLLOW};
use crate::error::{AppError, Result};
use crate::metrics::record_write;
use crate::models::{Follow, FollowPayload};
use crate::validation;

pub const SELF_FOLLOW_MESSAGE: &str = "You cannot follow yourself.";
pub const DUPLICATE_FOLLOW_MESSAGE: &str = "You are already following this user.";

/// Split a search string into terms on whitespace and commas
pub fn search_terms(search: &str) -> Vec<String> {
    search
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct FollowService {
    store: Arc<dyn BlogStore>,
}

impl FollowService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// Edges where `identity` is the follower, optionally filtered by `search`
    pub async fn list_follows(
        &self,
        identity: &AuthenticatedUser,
        search: Option<&str>,
    ) -> Result<Vec<Follow>> {
        let terms = search.map(search_terms).unwrap_or_default();
        Ok(self.store.list_follows(identity.id, &terms).await?)
    }

    pub async fn create_follow(
        &self,
        identity: &AuthenticatedUser,
        payload: FollowPayload,
    ) -> Result<Follow> {
        validation::collect(&payload).into_result()?;
        let username = payload.following.unwrap_or_default();

        let target = self
            .store
            .find_user_by_username(&username)
            .await?
            .ok_or_else(|| {
                AppError::field(
                    "following",
                    format!("Object with username={username} does not exist."),
                )
            })?;

        if target.id == identity.id {
            return Err(AppError::field("following", SELF_FOLLOW_MESSAGE));
        }
        if self.store.follow_exists(identity.id, target.id).await? {
            return Err(AppError::field("non_field_errors", DUPLICATE_FOLLOW_MESSAGE));
        }

        let follow = self
            .store
            .create_follow(identity.id, target.id)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    AppError::field("non_field_errors", DUPLICATE_FOLLOW_MESSAGE)
                } else if e.constraint() == Some(FOLLOWS_NO_SELF_FOLLOW) {
                    AppError::field("following", SELF_FOLLOW_MESSAGE)
                } else {
                    e.into()
                }
            })?;

        record_write("follow", "create");
        tracing::info!(
            follower = %identity.username,
            following = %follow.following,
            "Follow created"
        );
        Ok(follow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, UserRepository};

    #[test]
    fn terms_split_on_whitespace_and_commas() {
        assert_eq!(search_terms(" leo, anna  tol "), vec!["leo", "anna", "tol"]);
        assert!(search_terms(" , ").is_empty());
    }

    async fn setup() -> (FollowService, AuthenticatedUser) {
        let store = Arc::new(MemoryStore::new());
        let leo = store.create_user("leo", "x").await.unwrap();
        for name in ["anna", "sonya", "natasha"] {
            store.create_user(name, "x").await.unwrap();
        }
        (
            FollowService::new(store),
            AuthenticatedUser {
                id: leo.id,
                username: leo.username,
            },
        )
    }

    fn follow(username: &str) -> FollowPayload {
        FollowPayload {
            following: Some(username.into()),
        }
    }

    fn field_message(result: Result<Follow>, field: &str) -> String {
        match result {
            Err(AppError::Validation(fields)) => fields.get(field).unwrap()[0].clone(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn self_follow_is_rejected() {
        let (service, leo) = setup().await;
        let result = service.create_follow(&leo, follow("leo")).await;
        assert_eq!(field_message(result, "following"), SELF_FOLLOW_MESSAGE);
        assert!(service.list_follows(&leo, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_follow_is_rejected() {
        let (service, leo) = setup().await;
        let created = service.create_follow(&leo, follow("anna")).await.unwrap();
        assert_eq!(created.user, "leo");
        assert_eq!(created.following, "anna");

        let result = service.create_follow(&leo, follow("anna")).await;
        assert_eq!(
            field_message(result, "non_field_errors"),
            DUPLICATE_FOLLOW_MESSAGE
        );
        assert_eq!(service.list_follows(&leo, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_and_missing_target() {
        let (service, leo) = setup().await;
        let result = service.create_follow(&leo, follow("pierre")).await;
        assert!(field_message(result, "following").contains("pierre"));

        let result = service.create_follow(&leo, FollowPayload::default()).await;
        assert_eq!(field_message(result, "following"), validation::REQUIRED);
    }

    #[tokio::test]
    async fn search_requires_every_term() {
        let (service, leo) = setup().await;
        for name in ["anna", "sonya", "natasha"] {
            service.create_follow(&leo, follow(name)).await.unwrap();
        }

        let hits = service.list_follows(&leo, Some("NA")).await.unwrap();
        let names: Vec<&str> = hits.iter().map(|f| f.following.as_str()).collect();
        assert_eq!(names, vec!["anna", "natasha"]);

        let hits = service.list_follows(&leo, Some("nat,sha")).await.unwrap();
        assert_eq!(hits.len(), 1);

        // The follower's own name matches every edge
        let hits = service.list_follows(&leo, Some("leo")).await.unwrap();
        assert_eq!(hits.len(), 3);

        assert!(service.list_follows(&leo, Some("anna sonya")).await.unwrap().is_empty());
    }
}
