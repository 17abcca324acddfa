/// Authorization module for blog-service
///
/// Posts and comments may be read by anyone; only their author may change or
/// delete them.
use actix_middleware::AuthenticatedUser;
use actix_web::http::Method;

use crate::error::{AppError, Result};
use crate::metrics::record_denial;

pub const FORBIDDEN_MESSAGE: &str = "Changing another user's content is forbidden.";
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Authentication credentials were not provided.";

/// GET, HEAD and OPTIONS never modify anything
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// True when the request may proceed against content owned by `author_id`
pub fn is_author_or_read_only(
    method: &Method,
    identity: Option<&AuthenticatedUser>,
    author_id: i64,
) -> bool {
    is_safe_method(method) || identity.map_or(false, |user| user.id == author_id)
}

/// Same predicate, as an error: 401 without identity, 403 for a non-author
pub fn check_author_or_read_only(
    resource: &str,
    method: &Method,
    identity: Option<&AuthenticatedUser>,
    author_id: i64,
) -> Result<()> {
    if is_author_or_read_only(method, identity, author_id) {
        return Ok(());
    }

    match identity {
        None => {
            record_denial(resource, "anonymous");
            Err(AppError::Unauthorized(NOT_AUTHENTICATED_MESSAGE.to_string()))
        }
        Some(user) => {
            record_denial(resource, "not_author");
            tracing::warn!(
                resource,
                user_id = user.id,
                author_id,
                method = %method,
                "Permission denied: not the author"
            );
            Err(AppError::Forbidden(FORBIDDEN_MESSAGE.to_string()))
        }
    }
}
