//! Configuration structures
//!
//! Every field has an environment variable and a default, so the server
//! starts with no configuration at all.

use std::env;

use crate::errors::{PeanutError, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheConfig,
    pub attribution: AttributionConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SERVER_HOST, default 127.0.0.1
    pub host: String,
    /// SERVER_PORT, default 8080
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// LOG_LEVEL, default "info"; any EnvFilter directive works
    pub level: String,
    /// LOG_FORMAT, "text" (default) or "json"
    pub format: String,
    /// LOG_FILE; empty or unset logs to stdout
    pub file: Option<String>,
    /// LOG_ROTATION, default true; daily rotation when logging to a file
    pub enable_rotation: bool,
    /// LOG_MAX_BACKUPS, default 7
    pub max_backups: u32,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// CACHE_ENABLED, default true
    pub enabled: bool,
    /// CACHE_DEFAULT_TTL in seconds, default 300
    pub default_ttl: u64,
    /// CACHE_MAX_CAPACITY entries, default 1024
    pub max_capacity: u64,
}

#[derive(Debug, Clone)]
pub struct AttributionConfig {
    /// ATTRIBUTION_HALF_LIFE_DAYS for the time-decay model, default 7
    pub half_life_days: f64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env_or("SERVER_PORT", 8080),
            },
            logging: LoggingConfig {
                level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
                file: env::var("LOG_FILE").ok().filter(|f| !f.is_empty()),
                enable_rotation: env_or("LOG_ROTATION", true),
                max_backups: env_or("LOG_MAX_BACKUPS", 7),
            },
            cache: CacheConfig {
                enabled: env_or("CACHE_ENABLED", true),
                default_ttl: env_or("CACHE_DEFAULT_TTL", 300),
                max_capacity: env_or("CACHE_MAX_CAPACITY", 1024),
            },
            attribution: AttributionConfig {
                half_life_days: env_or("ATTRIBUTION_HALF_LIFE_DAYS", 7.0),
            },
        }
    }

    /// Reject configurations that would make the attribution math blow up
    pub fn validate(&self) -> Result<()> {
        let half_life = self.attribution.half_life_days;
        if !half_life.is_finite() || half_life <= 0.0 {
            return Err(PeanutError::config_error(format!(
                "ATTRIBUTION_HALF_LIFE_DAYS must be a positive number, got {}",
                half_life
            )));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
