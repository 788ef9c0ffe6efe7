use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,
    pub log_format: String,

    // Database configuration
    pub database_url: String,
    pub database_namespace: String,
    pub database_name: String,
    pub database_username: String,
    pub database_password: String,

    // Authentication configuration
    pub jwt_secret: String,
    pub jwt_access_ttl_minutes: i64,
    pub jwt_refresh_ttl_days: i64,

    // CORS configuration
    pub cors_allowed_origins: String,

    // Fixtures
    pub groups_fixture: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            environment: "development".to_string(),
            log_level: "yatube_api=debug,tower_http=debug".to_string(),
            log_format: "text".to_string(),
            database_url: "memory".to_string(),
            database_namespace: "yatube".to_string(),
            database_name: "api".to_string(),
            database_username: "root".to_string(),
            database_password: "root".to_string(),
            jwt_secret: "development-secret".to_string(),
            jwt_access_ttl_minutes: 1440,
            jwt_refresh_ttl_days: 30,
            cors_allowed_origins: "http://localhost:3000".to_string(),
            groups_fixture: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| defaults.server_port.to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),

            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            database_namespace: env::var("DATABASE_NAMESPACE")
                .unwrap_or(defaults.database_namespace),
            database_name: env::var("DATABASE_NAME").unwrap_or(defaults.database_name),
            database_username: env::var("DATABASE_USERNAME")
                .unwrap_or(defaults.database_username),
            database_password: env::var("DATABASE_PASSWORD")
                .unwrap_or(defaults.database_password),

            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            jwt_access_ttl_minutes: env::var("JWT_ACCESS_TTL_MINUTES")
                .unwrap_or_else(|_| defaults.jwt_access_ttl_minutes.to_string())
                .parse()?,
            jwt_refresh_ttl_days: env::var("JWT_REFRESH_TTL_DAYS")
                .unwrap_or_else(|_| defaults.jwt_refresh_ttl_days.to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),

            groups_fixture: env::var("GROUPS_FIXTURE").ok(),
        })
    }

    /// `memory` 使用内存存储，其他值视为 SurrealDB 地址
    pub fn uses_memory_store(&self) -> bool {
        self.database_url == "memory"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_memory_store() {
        let config = Config::default();
        assert!(config.uses_memory_store());
        assert!(config.is_development());
        assert!(!config.is_production());
    }

    #[test]
    fn test_surreal_url_is_not_memory_store() {
        let config = Config {
            database_url: "http://localhost:8000".to_string(),
            ..Config::default()
        };
        assert!(!config.uses_memory_store());
    }
}
