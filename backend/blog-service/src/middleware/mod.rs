/// HTTP middleware utilities for blog-service
///
/// Authentication, request logging and metrics come from the shared
/// `actix-middleware` crate; this module adds the per-object permission checks.
pub mod permissions;

pub use permissions::*;
