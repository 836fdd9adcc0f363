/// Configuration management for Blog Service
///
/// Loads configuration from environment variables.
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Secret used only when `APP_ENV=development` and `JWT_SECRET` is unset.
const DEVELOPMENT_JWT_SECRET: &str = "blog-service-development-secret";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Persistence backend
    pub store: StoreConfig,
    /// Page cache configuration
    pub cache: CacheConfig,
    /// Listing configuration
    pub feed: FeedConfig,
    /// Identity/session configuration
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Expose `/admin/*` maintenance routes
    pub admin_endpoints_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Database URL (postgres backend only)
    pub database_url: Option<String>,
    /// Max connections in pool
    pub max_connections: u32,
    /// Min connections in pool
    pub min_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Redis,
}

/// Page cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Redis URL (redis backend only)
    pub redis_url: Option<String>,
    /// Lifetime of a cached index page
    pub ttl_secs: u64,
    /// Bound on pages held by the memory backend
    pub max_entries: u64,
}

/// Listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub posts_per_page: u64,
}

/// Identity/session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Where anonymous users are sent for authenticated routes
    pub login_url: String,
    /// Cookie carrying the session token when no Authorization header is sent
    pub session_cookie_name: String,
    /// HS256 secret shared with the identity service
    #[serde(skip_serializing)]
    pub jwt_secret: String,
}

// Default values
fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_cache_ttl_secs() -> u64 {
    page_cache::DEFAULT_PAGE_TTL_SECS
}

fn default_posts_per_page() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let is_development = env.eq_ignore_ascii_case("development");

        let app = AppConfig {
            env: env.clone(),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: parse_env_or("PORT", 8000)?,
            admin_endpoints_enabled: parse_flag("ADMIN_ENDPOINTS_ENABLED"),
        };

        let backend = match std::env::var("STORE_BACKEND") {
            Ok(value) => parse_store_backend(&value)?,
            Err(_) => StoreBackend::Postgres,
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL environment variable not set");
        }
        let store = StoreConfig {
            backend,
            database_url,
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", default_max_connections())?,
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", default_min_connections())?,
        };

        let cache_backend = match std::env::var("PAGE_CACHE_BACKEND") {
            Ok(value) => parse_cache_backend(&value)?,
            Err(_) => CacheBackend::Memory,
        };
        let redis_url = std::env::var("REDIS_URL").ok();
        if cache_backend == CacheBackend::Redis && redis_url.is_none() {
            bail!("REDIS_URL environment variable not set");
        }
        let cache = CacheConfig {
            backend: cache_backend,
            redis_url,
            ttl_secs: parse_env_or("PAGE_CACHE_TTL_SECS", default_cache_ttl_secs())?,
            max_entries: parse_env_or("PAGE_CACHE_MAX_ENTRIES", page_cache::DEFAULT_MAX_ENTRIES)?,
        };

        let posts_per_page = parse_env_or("POSTS_PER_PAGE", default_posts_per_page())?;
        if posts_per_page == 0 {
            bail!("POSTS_PER_PAGE must be greater than zero");
        }
        let feed = FeedConfig { posts_per_page };

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if is_development => {
                tracing::warn!("JWT_SECRET not set; using the development secret");
                DEVELOPMENT_JWT_SECRET.to_string()
            }
            _ => bail!("JWT_SECRET must be set outside development"),
        };
        let auth = AuthConfig {
            login_url: std::env::var("LOGIN_URL").unwrap_or_else(|_| "/login/".to_string()),
            session_cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "session".to_string()),
            jwt_secret,
        };

        Ok(Config {
            app,
            store,
            cache,
            feed,
            auth,
        })
    }
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Failed to parse {}='{}'", key, val)),
        Err(_) => Ok(default),
    }
}

fn parse_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn parse_store_backend(value: &str) -> Result<StoreBackend> {
    match value.trim().to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
        "memory" => Ok(StoreBackend::Memory),
        other => bail!("Unknown STORE_BACKEND '{}'", other),
    }
}

fn parse_cache_backend(value: &str) -> Result<CacheBackend> {
    match value.trim().to_ascii_lowercase().as_str() {
        "memory" => Ok(CacheBackend::Memory),
        "redis" => Ok(CacheBackend::Redis),
        other => bail!("Unknown PAGE_CACHE_BACKEND '{}'", other),
    }
}
