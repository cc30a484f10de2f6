/// Configuration management for blog-service
///
/// Everything is read from environment variables (a `.env` file is honoured by
/// `main`). Defaults are suitable for local development.
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::pagination::DEFAULT_PAGE_SIZE;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Store backend and database configuration
    pub database: DatabaseConfig,
    /// Feed, cache and session settings shared with request handlers
    pub site: SiteConfig,
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

/// Which entity store implementation backs the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown STORE_BACKEND '{}'", other)),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Min connections kept warm
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

/// Settings consumed by handlers at request time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Page size for every feed
    pub posts_per_page: usize,
    /// Lifetime of a cached global feed page
    pub feed_cache_ttl_secs: u64,
    /// Upper bound on cached pages
    pub feed_cache_max_entries: usize,
    /// Where anonymous users are sent for protected actions
    pub login_url: String,
    /// Cookie carrying the signed session token
    pub session_cookie_name: String,
    /// HMAC secret used to verify session tokens
    #[serde(skip_serializing)]
    pub session_secret: String,
}

impl SiteConfig {
    pub fn feed_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.feed_cache_ttl_secs)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            posts_per_page: DEFAULT_PAGE_SIZE,
            feed_cache_ttl_secs: 20,
            feed_cache_max_entries: 256,
            login_url: "/auth/login/".to_string(),
            session_cookie_name: "sessionid".to_string(),
            session_secret: "insecure-development-session-secret".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let is_production = app_env.eq_ignore_ascii_case("production");
        let site_defaults = SiteConfig::default();

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("BLOG_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("BLOG_SERVICE_PORT", 8080)?,
            },
            cors: {
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
            },
            database: DatabaseConfig {
                backend: std::env::var("STORE_BACKEND")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()?
                    .unwrap_or(StoreBackend::Postgres),
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/yatube".to_string()),
                max_connections: parse_env_or_default("DB_MAX_CONNECTIONS", 10)?,
                min_connections: parse_env_or_default("DB_MIN_CONNECTIONS", 2)?,
                acquire_timeout_secs: parse_env_or_default("DB_ACQUIRE_TIMEOUT_SECS", 10)?,
                idle_timeout_secs: parse_env_or_default("DB_IDLE_TIMEOUT_SECS", 600)?,
                run_migrations: parse_env_or_default("DB_RUN_MIGRATIONS", true)?,
            },
            site: {
                let session_secret = match std::env::var("SESSION_SECRET") {
                    Ok(value) if !value.trim().is_empty() => value,
                    _ if is_production => {
                        return Err("SESSION_SECRET must be set in production".to_string())
                    }
                    _ => site_defaults.session_secret.clone(),
                };

                SiteConfig {
                    posts_per_page: parse_env_or_default(
                        "POSTS_PER_PAGE",
                        site_defaults.posts_per_page,
                    )?,
                    feed_cache_ttl_secs: parse_env_or_default(
                        "FEED_CACHE_TTL_SECS",
                        site_defaults.feed_cache_ttl_secs,
                    )?,
                    feed_cache_max_entries: parse_env_or_default(
                        "FEED_CACHE_MAX_ENTRIES",
                        site_defaults.feed_cache_max_entries,
                    )?,
                    login_url: std::env::var("LOGIN_URL").unwrap_or(site_defaults.login_url),
                    session_cookie_name: std::env::var("SESSION_COOKIE_NAME")
                        .unwrap_or(site_defaults.session_cookie_name),
                    session_secret,
                }
            },
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!("postgres".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert_eq!(" Memory ".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("mongo".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_site_defaults() {
        let site = SiteConfig::default();
        assert_eq!(site.posts_per_page, 10);
        assert_eq!(site.feed_cache_ttl(), Duration::from_secs(20));
        assert_eq!(site.login_url, "/auth/login/");
    }
}
