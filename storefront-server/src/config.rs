//! Server configuration
//!
//! Read once at start-up; the resulting value is passed into the services
//! and never re-read while handling requests.

use shared::error::AppError;

use crate::auth::jwt::{JwtConfig, MIN_SECRET_LEN, generate_printable_secret, parse_ttl_minutes};
use crate::auth::password::PasswordPolicy;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    /// PostgreSQL connection URL; `None` selects the in-memory store
    pub database_url: Option<String>,
    /// Pool size for PostgreSQL
    pub database_max_connections: u32,
    /// Token signing and lifetimes
    pub jwt: JwtConfig,
    /// The signing secret was generated for this process (development only)
    pub jwt_secret_generated: bool,
    /// argon2 cost parameters
    pub password: PasswordPolicy,
    /// Default log filter (overridden by `RUST_LOG`)
    pub log_level: String,
    /// JSON log output
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Failures carry `ErrorCode::ConfigError`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(var: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let is_development = environment == "development";

        let database_url = var("DATABASE_URL").filter(|s| !s.is_empty());
        if database_url.is_none() && !is_development {
            return Err(AppError::config(format!(
                "DATABASE_URL must be set in {environment} environment"
            )));
        }

        let defaults = PasswordPolicy::default();
        let password = PasswordPolicy {
            memory_kib: parse_or(var("ARGON2_MEMORY_KIB"), defaults.memory_kib),
            iterations: parse_or(var("ARGON2_ITERATIONS"), defaults.iterations),
            parallelism: parse_or(var("ARGON2_PARALLELISM"), defaults.parallelism),
        };

        let (secret, jwt_secret_generated) =
            Self::require_jwt_secret(var("JWT_SECRET"), &environment)?;

        Ok(Self {
            http_port: parse_or(var("HTTP_PORT"), 8080),
            database_url,
            database_max_connections: parse_or(var("DATABASE_MAX_CONNECTIONS"), 10),
            jwt: JwtConfig {
                secret,
                access_ttl_minutes: parse_ttl_minutes(var("ACCESS_TOKEN_TTL_MINUTES").as_deref()),
                refresh_ttl_minutes: parse_ttl_minutes(
                    var("REFRESH_TOKEN_TTL_MINUTES").as_deref(),
                ),
            },
            jwt_secret_generated,
            password,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: var("LOG_JSON").is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
            environment,
        })
    }

    /// Signing secret: mandatory and at least 32 bytes outside development.
    /// Development without a usable secret gets a random one per process.
    fn require_jwt_secret(
        value: Option<String>,
        environment: &str,
    ) -> Result<(String, bool), AppError> {
        match value.filter(|s| !s.is_empty()) {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => Ok((secret, false)),
            _ if environment == "development" => Ok((generate_printable_secret(), true)),
            Some(_) => Err(AppError::config(format!(
                "JWT_SECRET must be at least {MIN_SECRET_LEN} bytes"
            ))),
            None => Err(AppError::config(format!(
                "JWT_SECRET must be set in {environment} environment"
            ))),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::DEFAULT_TOKEN_TTL_MINUTES;
    use shared::error::ErrorCode;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_development_defaults() {
        let config = load(&[]).unwrap();
        assert!(config.is_development());
        assert_eq!(config.http_port, 8080);
        assert!(config.database_url.is_none());
        assert_eq!(config.jwt.secret.len(), 64);
        assert!(config.jwt_secret_generated);
        assert_eq!(config.jwt.access_ttl_minutes, DEFAULT_TOKEN_TTL_MINUTES);
        assert_eq!(config.jwt.refresh_ttl_minutes, DEFAULT_TOKEN_TTL_MINUTES);
        assert_eq!(config.password, PasswordPolicy::default());
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn test_ttl_fallbacks() {
        let config = load(&[
            ("ACCESS_TOKEN_TTL_MINUTES", "15"),
            ("REFRESH_TOKEN_TTL_MINUTES", "a week"),
        ])
        .unwrap();
        assert_eq!(config.jwt.access_ttl_minutes, 15);
        assert_eq!(config.jwt.refresh_ttl_minutes, DEFAULT_TOKEN_TTL_MINUTES);
    }

    #[test]
    fn test_production_requires_secret_and_database() {
        let err = load(&[("ENVIRONMENT", "production"), ("JWT_SECRET", SECRET)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = load(&[
            ("ENVIRONMENT", "production"),
            ("DATABASE_URL", "postgres://localhost/shop"),
        ])
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
        assert!(err.to_string().contains("JWT_SECRET"));

        let err = load(&[
            ("ENVIRONMENT", "production"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", "short"),
        ])
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
        assert!(err.to_string().contains("32"));

        let config = load(&[
            ("ENVIRONMENT", "production"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", SECRET),
            ("HTTP_PORT", "9000"),
            ("LOG_JSON", "true"),
        ])
        .unwrap();
        assert_eq!(config.jwt.secret, SECRET);
        assert!(!config.jwt_secret_generated);
        assert_eq!(config.http_port, 9000);
        assert!(config.log_json);
    }

    #[test]
    fn test_argon2_overrides() {
        let config = load(&[
            ("ARGON2_MEMORY_KIB", "65536"),
            ("ARGON2_ITERATIONS", "3"),
            ("ARGON2_PARALLELISM", "not-a-number"),
        ])
        .unwrap();
        assert_eq!(config.password.memory_kib, 65536);
        assert_eq!(config.password.iterations, 3);
        assert_eq!(
            config.password.parallelism,
            PasswordPolicy::default().parallelism
        );
    }
}
