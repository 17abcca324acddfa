/// Blog Service Library
///
/// REST API for a blogging platform: posts (optionally in a group), comments
/// nested under posts, follow edges between users, JWT token endpoints and
/// user registration.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `routes`: URL layout under `/v1/`
/// - `models`: records and request payloads
/// - `services`: business logic layer
/// - `db`: repository traits with PostgreSQL and in-memory stores
/// - `middleware`: author-or-read-only permission checks
/// - `pagination`: limit/offset pagination
/// - `validation`: field-level validation
/// - `security`: password hashing
/// - `error`: error types and handling
/// - `config`: configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod security;
pub mod services;
pub mod validation;

use std::sync::Arc;

pub use config::Config;
pub use error::{AppError, Result};

use config::PaginationConfig;
use db::BlogStore;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub pagination: PaginationConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn BlogStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }
}
