//! # Actix Middleware Library
//!
//! Middleware components shared by the blog HTTP services
//!
//! ## Modules
//! - `jwt_auth`: optional Bearer token authentication and the identity extractor
//! - `logging`: structured request start/completion events
//! - `metrics`: Prometheus request counters and latency histograms

pub mod jwt_auth;
pub mod logging;
pub mod metrics;

pub use jwt_auth::{AuthenticatedUser, JwtAuthMiddleware};
pub use logging::Logging;
pub use metrics::{gather_metrics, MetricsMiddleware};
