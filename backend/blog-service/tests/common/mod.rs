//! Shared fixtures for the HTTP tests
//!
//! Every test runs the real route table against a fresh in-memory store.
#![allow(dead_code)]

use std::sync::Arc;

use blog_service::config::PaginationConfig;
use blog_service::db::{BlogStore, GroupRepository, MemoryStore, PostRepository, UserRepository};
use blog_service::models::{Group, NewGroup, NewPost, Post, User};
use blog_service::security::hash_password;
use blog_service::AppState;

pub const PASSWORD: &str = "war-and-peace";

/// Build the service for `$state` the way `main` does, minus the server
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .configure(blog_service::routes::configure),
        )
        .await
    };
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
}

impl Fixture {
    pub fn new() -> Self {
        crypto_core::testing::init_test_keys();
        Self {
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub fn state(&self) -> AppState {
        self.state_with(PaginationConfig::default())
    }

    pub fn state_with(&self, pagination: PaginationConfig) -> AppState {
        let store: Arc<dyn BlogStore> = self.store.clone();
        AppState::new(store, pagination)
    }

    /// User with a real password hash so `/v1/jwt/create/` works
    pub async fn user(&self, username: &str) -> User {
        let hash = hash_password(PASSWORD).unwrap();
        self.store.create_user(username, &hash).await.unwrap()
    }

    pub async fn group(&self, slug: &str) -> Group {
        self.store
            .create_group(&NewGroup {
                title: slug.to_uppercase(),
                slug: slug.to_string(),
                description: format!("All about {slug}"),
            })
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &User, text: &str) -> Post {
        self.store
            .create_post(&NewPost {
                author_id: author.id,
                text: text.to_string(),
                image: None,
                group_id: None,
            })
            .await
            .unwrap()
    }
}

/// `Authorization` header carrying an access token for `user`
pub fn bearer(user: &User) -> (&'static str, String) {
    let token = crypto_core::jwt::generate_access_token(user.id, &user.username).unwrap();
    ("Authorization", format!("Bearer {token}"))
}
