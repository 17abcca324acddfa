/// JWT issuance and validation for the blog backend
///
/// Tokens are signed with RS256 only. Keys are loaded once at startup from PEM
/// strings and kept in process-wide cells; the HTTP layer never sees key
/// material.
///
/// ## Usage
///
/// ```rust,ignore
/// use crypto_core::jwt;
///
/// let private_key = std::env::var("JWT_PRIVATE_KEY_PEM")?;
/// let public_key = std::env::var("JWT_PUBLIC_KEY_PEM")?;
/// jwt::initialize_jwt_keys(&private_key, &public_key)?;
///
/// let pair = jwt::generate_token_pair(42, "leo")?;
/// let claims = jwt::validate_access_token(&pair.access)?;
/// assert_eq!(claims.user_id()?, 42);
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 24;
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

// ============================================================================
// Data Structures
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT keys not initialized")]
    NotInitialized,

    #[error("JWT keys already initialized")]
    AlreadyInitialized,

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("failed to sign token: {0}")]
    Encoding(String),

    #[error("token has expired")]
    Expired,

    #[error("token is invalid: {0}")]
    Invalid(String),

    #[error("expected {expected} token, got {found}")]
    WrongTokenType { expected: TokenType, found: TokenType },
}

pub type JwtResult<T> = Result<T, JwtError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims carried by every token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (numeric user id rendered as a string)
    pub sub: String,
    pub username: String,
    pub token_type: TokenType,
    /// Unique token id
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> JwtResult<i64> {
        self.sub
            .parse()
            .map_err(|_| JwtError::Invalid(format!("malformed subject '{}'", self.sub)))
    }
}

/// Token pair returned by the token obtain endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

// ============================================================================
// Key Storage
// ============================================================================

static JWT_ENCODING_KEY: OnceCell<EncodingKey> = OnceCell::new();
static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Initialize signing and verification keys from PEM strings.
///
/// Must be called once during startup; a second call fails.
pub fn initialize_jwt_keys(private_key_pem: &str, public_key_pem: &str) -> JwtResult<()> {
    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| JwtError::InvalidKey(format!("RSA private key: {e}")))?;
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| JwtError::InvalidKey(format!("RSA public key: {e}")))?;

    JWT_ENCODING_KEY
        .set(encoding_key)
        .map_err(|_| JwtError::AlreadyInitialized)?;
    JWT_DECODING_KEY
        .set(decoding_key)
        .map_err(|_| JwtError::AlreadyInitialized)?;

    tracing::debug!("JWT keys initialized");
    Ok(())
}

pub fn is_initialized() -> bool {
    JWT_ENCODING_KEY.get().is_some() && JWT_DECODING_KEY.get().is_some()
}

fn encoding_key() -> JwtResult<&'static EncodingKey> {
    JWT_ENCODING_KEY.get().ok_or(JwtError::NotInitialized)
}

fn decoding_key() -> JwtResult<&'static DecodingKey> {
    JWT_DECODING_KEY.get().ok_or(JwtError::NotInitialized)
}

// ============================================================================
// Token Generation
// ============================================================================

fn generate_token(user_id: i64, username: &str, token_type: TokenType) -> JwtResult<String> {
    let now = Utc::now();
    let lifetime = match token_type {
        TokenType::Access => Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS),
        TokenType::Refresh => Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
    };

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        token_type,
        jti: Uuid::new_v4().simple().to_string(),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
    };

    encode(&Header::new(JWT_ALGORITHM), &claims, encoding_key()?)
        .map_err(|e| JwtError::Encoding(e.to_string()))
}

/// Generate a short-lived access token
pub fn generate_access_token(user_id: i64, username: &str) -> JwtResult<String> {
    generate_token(user_id, username, TokenType::Access)
}

/// Generate a long-lived refresh token
pub fn generate_refresh_token(user_id: i64, username: &str) -> JwtResult<String> {
    generate_token(user_id, username, TokenType::Refresh)
}

pub fn generate_token_pair(user_id: i64, username: &str) -> JwtResult<TokenPair> {
    Ok(TokenPair {
        refresh: generate_refresh_token(user_id, username)?,
        access: generate_access_token(user_id, username)?,
    })
}

// ============================================================================
// Token Validation
// ============================================================================

/// Verify signature and expiry, returning the claims of any token type.
pub fn validate_token(token: &str) -> JwtResult<Claims> {
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(token, decoding_key()?, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

fn validate_typed(token: &str, expected: TokenType) -> JwtResult<Claims> {
    let claims = validate_token(token)?;
    if claims.token_type != expected {
        return Err(JwtError::WrongTokenType {
            expected,
            found: claims.token_type,
        });
    }
    Ok(claims)
}

/// Validate a token presented in an `Authorization: Bearer` header
pub fn validate_access_token(token: &str) -> JwtResult<Claims> {
    validate_typed(token, TokenType::Access)
}

pub fn validate_refresh_token(token: &str) -> JwtResult<Claims> {
    validate_typed(token, TokenType::Refresh)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::init_test_keys;

    #[test]
    fn access_token_has_three_segments() {
        init_test_keys();

        let token = generate_access_token(7, "leo").unwrap();
        assert_eq!(token.matches('.').count(), 2);
    }

    #[test]
    fn access_token_round_trips_identity() {
        init_test_keys();

        let token = generate_access_token(7, "leo").unwrap();
        let claims = validate_access_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.username, "leo");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn garbage_is_rejected() {
        init_test_keys();

        assert!(matches!(
            validate_token("invalid.token.here"),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        init_test_keys();

        let token = generate_access_token(7, "leo").unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = generate_access_token(8, "mallory").unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap();
        parts[1] = forged_payload;

        assert!(validate_token(&parts.join(".")).is_err());
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        init_test_keys();

        let pair = generate_token_pair(7, "leo").unwrap();
        assert!(matches!(
            validate_access_token(&pair.refresh),
            Err(JwtError::WrongTokenType {
                expected: TokenType::Access,
                found: TokenType::Refresh
            })
        ));
        assert!(validate_refresh_token(&pair.refresh).is_ok());
    }

    #[test]
    fn refresh_outlives_access() {
        init_test_keys();

        let pair = generate_token_pair(7, "leo").unwrap();
        let access = validate_token(&pair.access).unwrap();
        let refresh = validate_token(&pair.refresh).unwrap();

        assert!(refresh.exp > access.exp);
        assert_ne!(refresh.jti, access.jti);
    }

    #[test]
    fn malformed_subject_is_reported() {
        let claims = Claims {
            sub: "not-a-number".into(),
            username: "leo".into(),
            token_type: TokenType::Access,
            jti: "x".into(),
            iat: 0,
            exp: 0,
        };
        assert!(claims.user_id().is_err());
    }
}
