//! Shared cryptographic helpers for the blog backend.
//!
//! - `jwt`: RS256 token issuance and validation used by the token endpoints
//!   and the authentication middleware.

pub mod jwt;

#[cfg(any(test, feature = "test-keys"))]
pub mod testing;

pub use jwt::{Claims, JwtError, TokenPair, TokenType};
