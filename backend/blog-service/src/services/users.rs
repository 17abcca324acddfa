/// User service - registration and credential checks for the token endpoints
use std::sync::Arc;

use crate::db::BlogStore;
use crate::error::{AppError, Result};
use crate::metrics::record_write;
use crate::models::{RegisterRequest, TokenObtainRequest, User};
use crate::security::{hash_password, verify_password};
use crate::validation;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "No active account found with the given credentials";
pub const USERNAME_TAKEN_MESSAGE: &str = "A user with that username already exists.";

pub struct UserService {
    store: Arc<dyn BlogStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, payload: RegisterRequest) -> Result<User> {
        validation::collect(&payload).into_result()?;
        let username = payload.username.unwrap_or_default();
        let password = payload.password.unwrap_or_default();

        if self.store.find_user_by_username(&username).await?.is_some() {
            return Err(AppError::field("username", USERNAME_TAKEN_MESSAGE));
        }

        let password_hash = hash_password(&password)?;
        let user = self
            .store
            .create_user(&username, &password_hash)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    AppError::field("username", USERNAME_TAKEN_MESSAGE)
                } else {
                    e.into()
                }
            })?;

        record_write("user", "create");
        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check a username/password pair; any mismatch is the same 401
    pub async fn authenticate(&self, payload: TokenObtainRequest) -> Result<User> {
        validation::collect(&payload).into_result()?;
        let username = payload.username.unwrap_or_default();
        let password = payload.password.unwrap_or_default();

        let invalid = || AppError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string());

        let user = self
            .store
            .find_user_by_username(&username)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&password, &user.password_hash)? {
            tracing::warn!(username = %username, "Failed login attempt");
            return Err(invalid());
        }

        Ok(user)
    }
}
