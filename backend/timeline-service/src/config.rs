//! Configuration management for the timeline service.
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Global-feed cache configuration
    pub cache: CacheConfig,
    /// Feed composition settings
    pub feed: FeedConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Comma-separated allowed CORS origins; empty means permissive (dev)
    pub cors_allowed_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Global-feed cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis URL
    pub url: String,
    /// TTL for cached global-feed pages, in seconds
    #[serde(default = "default_global_feed_ttl_secs")]
    pub global_feed_ttl_secs: u64,
    /// Key prefix for cached global-feed pages
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

/// Feed composition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Items per feed page. Deployment-wide constant, not user-controlled.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

// Default values
fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_global_feed_ttl_secs() -> u64 {
    20
}

fn default_key_prefix() -> String {
    "feed:global:v1".to_string()
}

fn default_page_size() -> u32 {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8083),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_max_connections),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_min_connections),
        };

        let cache = CacheConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            global_feed_ttl_secs: std::env::var("GLOBAL_FEED_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_global_feed_ttl_secs),
            key_prefix: std::env::var("GLOBAL_FEED_KEY_PREFIX")
                .unwrap_or_else(|_| default_key_prefix()),
        };

        let feed = FeedConfig {
            page_size: std::env::var("FEED_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or_else(default_page_size),
        };

        Ok(Config {
            app,
            database,
            cache,
            feed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_optional_vars() {
        for var in [
            "APP_ENV",
            "APP_HOST",
            "PORT",
            "CORS_ALLOWED_ORIGINS",
            "DB_MAX_CONNECTIONS",
            "DB_MIN_CONNECTIONS",
            "REDIS_URL",
            "GLOBAL_FEED_TTL_SECS",
            "GLOBAL_FEED_KEY_PREFIX",
            "FEED_PAGE_SIZE",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_default_values() {
        clear_optional_vars();
        std::env::set_var("DATABASE_URL", "postgres://test");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.port, 8083);
        assert!(config.app.cors_allowed_origins.is_empty());
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.cache.url, "redis://127.0.0.1:6379");
        assert_eq!(config.cache.global_feed_ttl_secs, 20);
        assert_eq!(config.cache.key_prefix, "feed:global:v1");
        assert_eq!(config.feed.page_size, 10);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_optional_vars();
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("FEED_PAGE_SIZE", "25");
        std::env::set_var("GLOBAL_FEED_TTL_SECS", "45");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://gazette.dev, https://admin.gazette.dev");

        let config = Config::from_env().unwrap();

        assert_eq!(config.feed.page_size, 25);
        assert_eq!(config.cache.global_feed_ttl_secs, 45);
        assert_eq!(
            config.app.cors_allowed_origins,
            vec!["https://gazette.dev", "https://admin.gazette.dev"]
        );

        clear_optional_vars();
    }

    #[test]
    #[serial]
    fn test_invalid_page_size_falls_back_to_default() {
        clear_optional_vars();
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("FEED_PAGE_SIZE", "0");

        let config = Config::from_env().unwrap();
        assert_eq!(config.feed.page_size, 10);

        clear_optional_vars();
    }
}
