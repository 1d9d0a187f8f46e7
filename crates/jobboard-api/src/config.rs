//! API configuration.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Shortest accepted signing secret, in bytes.
const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in production")]
    MissingJwtSecret,

    #[error("JWT_SECRET must be at least {} bytes", MIN_JWT_SECRET_LEN)]
    WeakJwtSecret,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Requests per second per client IP on `/api/v1`.
    pub rate_limit_rps: u32,
    /// Requests per second per client IP on login and register.
    pub auth_rate_limit_rps: u32,
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["http://localhost:5173".to_string()],
            rate_limit_rps: 20,
            auth_rate_limit_rps: 5,
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            jwt_secret: random_secret(),
            token_ttl: Duration::from_secs(60 * 60),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| defaults.environment.clone());
        let production = environment.eq_ignore_ascii_case("production");

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= MIN_JWT_SECRET_LEN => secret,
            Ok(secret) if !secret.is_empty() => return Err(ConfigError::WeakJwtSecret),
            _ if production => return Err(ConfigError::MissingJwtSecret),
            _ => {
                warn!("JWT_SECRET not set; using an ephemeral secret, sessions will not survive restarts");
                defaults.jwt_secret.clone()
            }
        };

        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_parse("API_PORT")
                .or_else(|| env_parse("PORT"))
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: env_parse("RATE_LIMIT_RPS").unwrap_or(defaults.rate_limit_rps),
            auth_rate_limit_rps: env_parse("AUTH_RATE_LIMIT_RPS")
                .unwrap_or(defaults.auth_rate_limit_rps),
            max_body_size: env_parse("MAX_BODY_SIZE").unwrap_or(defaults.max_body_size),
            environment,
            jwt_secret,
            token_ttl: env_parse("TOKEN_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.token_ttl),
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn random_secret() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "ENVIRONMENT",
            "JWT_SECRET",
            "API_PORT",
            "PORT",
            "CORS_ORIGINS",
            "TOKEN_TTL_SECS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_in_development() {
        clear_env();
        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.token_ttl, Duration::from_secs(3600));
        assert!(config.jwt_secret.len() >= MIN_JWT_SECRET_LEN);
        assert!(!config.is_production());
    }

    #[test]
    #[serial]
    fn test_production_requires_secret() {
        clear_env();
        std::env::set_var("ENVIRONMENT", "production");
        assert!(matches!(ApiConfig::from_env(), Err(ConfigError::MissingJwtSecret)));

        std::env::set_var("JWT_SECRET", "short");
        assert!(matches!(ApiConfig::from_env(), Err(ConfigError::WeakJwtSecret)));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_port_fallback_and_origins() {
        clear_env();
        std::env::set_var("PORT", "8080");
        std::env::set_var("CORS_ORIGINS", "https://a.example, https://b.example,");
        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
        clear_env();
    }
}
