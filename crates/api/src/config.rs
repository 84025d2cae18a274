//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `REGISTRY_HOST` - Bind address (default: 127.0.0.1)
//! - `REGISTRY_PORT` - Listen port (default: 3000)
//! - `REGISTRY_ENV` - `development` or `production` (default: production).
//!   Diagnostic details are only included in error responses in development.
//! - `REGISTRY_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`). When neither is set, records are kept in memory.
//! - `REGISTRY_LOG_FORMAT` - `text` or `json` (default: text)
//! - `POSTAL_LOOKUP_BASE_URL` - Postal code service (default: <https://viacep.com.br>)
//! - `POSTAL_LOOKUP_TIMEOUT_SECS` - Bounded wait for one lookup (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sampling (default: 1.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default postal code lookup service.
pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://viacep.com.br";

/// Default bounded wait for a single lookup, in seconds.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Error responses carry diagnostic details.
    Development,
    /// Error responses never carry diagnostic details.
    #[default]
    Production,
}

impl Environment {
    /// Whether diagnostic details may be exposed to clients.
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("expected development or production, got {other:?}")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected text or json, got {other:?}")),
        }
    }
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deployment mode
    pub environment: Environment,
    /// `PostgreSQL` connection URL (contains password); `None` selects the in-memory store
    pub database_url: Option<SecretString>,
    /// Log output format
    pub log_format: LogFormat,
    /// Postal code lookup service configuration
    pub lookup: LookupConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Postal code lookup service configuration.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Base URL of the lookup service
    pub base_url: Url,
    /// Bounded wait for one lookup
    pub timeout: Duration,
    /// `User-Agent` sent with every lookup
    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_LOOKUP_BASE_URL).expect("default lookup URL is valid"),
            timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            environment: Environment::default(),
            database_url: None,
            log_format: LogFormat::default(),
            lookup: LookupConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_or_default(&get, "REGISTRY_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port = parse_or_default(&get, "REGISTRY_PORT", 3000_u16)?;
        let environment = parse_or_default(&get, "REGISTRY_ENV", Environment::Production)?;
        let log_format = parse_or_default(&get, "REGISTRY_LOG_FORMAT", LogFormat::Text)?;

        // Fallback to generic DATABASE_URL (set by most hosted postgres attach flows)
        let database_url = get("REGISTRY_DATABASE_URL")
            .or_else(|| get("DATABASE_URL"))
            .filter(|url| !url.trim().is_empty())
            .map(SecretString::from);

        let lookup = LookupConfig::from_source(&get)?;

        let sentry_dsn = get("SENTRY_DSN");
        let sentry_environment = get("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            environment,
            database_url,
            log_format,
            lookup,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl LookupConfig {
    fn from_source(get: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = match get("POSTAL_LOOKUP_BASE_URL") {
            Some(raw) => Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("POSTAL_LOOKUP_BASE_URL".to_string(), e.to_string())
            })?,
            None => Self::default().base_url,
        };

        let timeout_secs = parse_or_default(
            get,
            "POSTAL_LOOKUP_TIMEOUT_SECS",
            DEFAULT_LOOKUP_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "POSTAL_LOOKUP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            user_agent: default_user_agent(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_user_agent() -> String {
    format!("customer-registry/{}", env!("CARGO_PKG_VERSION"))
}

/// Parse an optional variable, falling back to `default` when it is unset.
fn parse_or_default<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ApiConfig::from_source(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.database_url.is_none());
        assert_eq!(config.lookup.base_url.as_str(), "https://viacep.com.br/");
        assert_eq!(config.lookup.timeout, Duration::from_secs(10));
        assert!(config.lookup.user_agent.starts_with("customer-registry/"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("REGISTRY_HOST", "0.0.0.0"),
            ("REGISTRY_PORT", "8080"),
            ("REGISTRY_ENV", "Development"),
            ("REGISTRY_LOG_FORMAT", "json"),
            ("POSTAL_LOOKUP_BASE_URL", "http://localhost:9999"),
            ("POSTAL_LOOKUP_TIMEOUT_SECS", "3"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(config.environment.is_development());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.lookup.base_url.as_str(), "http://localhost:9999/");
        assert_eq!(config.lookup.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/registry")]).unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://localhost/registry"
        );

        let config = load(&[
            ("REGISTRY_DATABASE_URL", "postgres://primary/registry"),
            ("DATABASE_URL", "postgres://fallback/registry"),
        ])
        .unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://primary/registry"
        );
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("REGISTRY_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "REGISTRY_PORT"));
    }

    #[test]
    fn test_invalid_environment() {
        let err = load(&[("REGISTRY_ENV", "staging")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "REGISTRY_ENV"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = load(&[("POSTAL_LOOKUP_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_lookup_url() {
        let err = load(&[("POSTAL_LOOKUP_BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "POSTAL_LOOKUP_BASE_URL"));
    }
}
