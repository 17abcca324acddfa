/// Configuration management for Blog Service
///
/// Everything is read from environment variables (a `.env` file is loaded by
/// the binary before this runs).
use db_pool::{parse_env_optional, parse_env_with_default};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Storage backend selection
    pub storage: StorageConfig,
    /// Post list pagination
    pub pagination: PaginationConfig,
    /// JWT key material
    #[serde(skip_serializing)]
    pub jwt: JwtConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

impl CorsConfig {
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Limit/offset pagination of the post list
///
/// Without a default limit the list is only paginated when the client sends
/// `limit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_limit: Option<i64>,
    pub max_limit: Option<i64>,
}

#[derive(Clone, Default, Deserialize)]
pub struct JwtConfig {
    pub private_key_pem: String,
    pub public_key_pem: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("private_key_pem", &"[REDACTED]")
            .field("public_key_pem", &"[REDACTED]")
            .finish()
    }
}

/// PEM values in env files often carry literal `\n` sequences
fn read_pem(key: &str) -> Result<String, String> {
    let value = std::env::var(key).map_err(|_| format!("{key} must be set"))?;
    Ok(value.replace("\\n", "\n"))
}

fn positive_limit(key: &str) -> Result<Option<i64>, String> {
    match std::env::var(key) {
        Err(_) => Ok(None),
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => match raw.trim().parse::<i64>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(format!("{key} must be a positive integer, got '{raw}'")),
        },
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let is_production = app_env.eq_ignore_ascii_case("production");

        let cors = {
            let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                Ok(value) => value,
                Err(_) if is_production => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                Err(_) => "http://localhost:3000".to_string(),
            };

            if is_production && allowed_origins.trim() == "*" {
                return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
            }

            CorsConfig { allowed_origins }
        };

        let backend = match parse_env_optional::<String>("STORAGE_BACKEND")
            .map(|b| b.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") if is_production => {
                return Err("STORAGE_BACKEND=memory is not allowed in production".to_string())
            }
            Some("memory") => StorageBackend::Memory,
            Some(other) => return Err(format!("Unknown STORAGE_BACKEND '{other}'")),
        };

        let pagination = PaginationConfig {
            default_limit: positive_limit("POSTS_DEFAULT_LIMIT")?,
            max_limit: positive_limit("POSTS_MAX_LIMIT")?,
        };

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("BLOG_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_with_default("BLOG_SERVICE_PORT", 8000),
            },
            cors,
            storage: StorageConfig { backend },
            pagination,
            jwt: JwtConfig {
                private_key_pem: read_pem("JWT_PRIVATE_KEY_PEM")?,
                public_key_pem: read_pem("JWT_PUBLIC_KEY_PEM")?,
            },
        })
    }
}
