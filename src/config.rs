//! Runtime configuration read from the environment.
//!
//! Every loader has a `from_lookup` twin taking a variable lookup function,
//! so parsing is testable without touching the process environment. Empty or
//! whitespace-only values count as unset.
//!
//! # Environment Variables
//!
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `5000`)
//! - `LOG_FORMAT`: `pretty` (default) | `json`
//! - `TASK_API_URL`: Base URL used by the client (default: `http://localhost:5000/api`)
//! - `TASK_API_TIMEOUT_SECS`: Client request timeout (default: `10`)

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default client base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default client request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory', 'postgres' or 'redis'")]
    InvalidStorageMode(String),

    /// Invalid pool size.
    #[error("Invalid DATABASE_MAX_CONNECTIONS: '{0}'. Expected a positive integer")]
    InvalidMaxConnections(String),

    /// Missing `DATABASE_URL` when storage mode is Postgres.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// Missing `REDIS_URL` when storage mode is Redis.
    #[error("REDIS_URL environment variable is required when STORAGE_MODE=redis")]
    MissingRedisUrl,

    /// Host is not an IP address.
    #[error("Invalid HOST: '{0}'. Expected an IP address")]
    InvalidHost(String),

    /// Port is not a valid `u16`.
    #[error("Invalid PORT: '{0}'. Expected a number between 0 and 65535")]
    InvalidPort(String),

    /// Unknown log format.
    #[error("Invalid LOG_FORMAT: '{0}'. Expected 'pretty' or 'json'")]
    InvalidLogFormat(String),

    /// Client base URL does not use http(s).
    #[error("Invalid TASK_API_URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidApiUrl(String),

    /// Timeout is not a positive number of seconds.
    #[error("Invalid TASK_API_TIMEOUT_SECS: '{0}'. Expected a positive integer")]
    InvalidTimeout(String),
}

/// Reads a variable through `lookup`, trimming and dropping empty values.
pub(crate) fn read_variable<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn environment(name: &str) -> Option<String> {
    env::var(name).ok()
}

// =============================================================================
// Server
// =============================================================================

/// Address the HTTP server binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Creates a configuration for the given host and port.
    #[must_use]
    pub const fn new(host: IpAddr, port: u16) -> Self {
        Self { host, port }
    }

    /// Reads `HOST` and `PORT` from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if either value does not parse.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(environment)
    }

    /// Reads `HOST` and `PORT` through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if either value does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = read_variable(&lookup, "HOST")
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = host
            .parse()
            .map_err(|_| ConfigurationError::InvalidHost(host))?;

        let port = read_variable(&lookup, "PORT")
            .map(|value| {
                value
                    .parse::<u16>()
                    .map_err(|_| ConfigurationError::InvalidPort(value))
            })
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        Ok(Self { host, port })
    }

    /// Returns the socket address to bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigurationError::InvalidLogFormat(value.to_string())),
        }
    }
}

impl LogFormat {
    /// Reads `LOG_FORMAT` from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidLogFormat` for unknown values.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(environment)
    }

    /// Reads `LOG_FORMAT` through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidLogFormat` for unknown values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        read_variable(&lookup, "LOG_FORMAT")
            .map(|value| value.parse::<Self>())
            .transpose()
            .map(Option::unwrap_or_default)
    }
}

// =============================================================================
// Client
// =============================================================================

/// Settings for [`crate::client::TaskApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the API, without trailing slash (e.g. `http://localhost:5000/api`).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for `base_url` with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `TASK_API_URL` and `TASK_API_TIMEOUT_SECS` from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` for a non-http URL or a bad timeout.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(environment)
    }

    /// Reads the client settings through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` for a non-http URL or a bad timeout.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url =
            read_variable(&lookup, "TASK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigurationError::InvalidApiUrl(base_url));
        }

        let timeout = read_variable(&lookup, "TASK_API_TIMEOUT_SECS")
            .map(|value| {
                value
                    .parse::<u64>()
                    .ok()
                    .filter(|seconds| *seconds > 0)
                    .map(Duration::from_secs)
                    .ok_or(ConfigurationError::InvalidTimeout(value))
            })
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self::new(base_url).with_timeout(timeout))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use rstest::rstest;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let variables: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        move |name| variables.get(name).cloned()
    }

    mod server_config {
        use super::*;

        #[rstest]
        fn default_config() {
            let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();

            assert_eq!(config, ServerConfig::default());
            assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
        }

        #[rstest]
        fn reads_host_and_port() {
            let config =
                ServerConfig::from_lookup(lookup_from(&[("HOST", "127.0.0.1"), ("PORT", "8080")]))
                    .unwrap();

            assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        }

        #[rstest]
        fn blank_port_uses_default() {
            let config = ServerConfig::from_lookup(lookup_from(&[("PORT", "  ")])).unwrap();
            assert_eq!(config.port, DEFAULT_PORT);
        }

        #[rstest]
        #[case("70000")]
        #[case("http")]
        #[case("-1")]
        fn rejects_invalid_port(#[case] port: &str) {
            let result = ServerConfig::from_lookup(lookup_from(&[("PORT", port)]));
            assert_eq!(
                result.unwrap_err(),
                ConfigurationError::InvalidPort(port.to_string())
            );
        }

        #[rstest]
        fn rejects_invalid_host() {
            let result = ServerConfig::from_lookup(lookup_from(&[("HOST", "not a host")]));
            assert!(matches!(result, Err(ConfigurationError::InvalidHost(_))));
        }
    }

    mod log_format {
        use super::*;

        #[rstest]
        #[case(&[], LogFormat::Pretty)]
        #[case(&[("LOG_FORMAT", "pretty")], LogFormat::Pretty)]
        #[case(&[("LOG_FORMAT", "JSON")], LogFormat::Json)]
        fn parses(#[case] pairs: &[(&str, &str)], #[case] expected: LogFormat) {
            assert_eq!(LogFormat::from_lookup(lookup_from(pairs)).unwrap(), expected);
        }

        #[rstest]
        fn rejects_unknown() {
            let result = LogFormat::from_lookup(lookup_from(&[("LOG_FORMAT", "xml")]));
            assert_eq!(
                result.unwrap_err(),
                ConfigurationError::InvalidLogFormat("xml".to_string())
            );
        }
    }

    mod client_config {
        use super::*;

        #[rstest]
        fn defaults() {
            let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();

            assert_eq!(config.base_url, "http://localhost:5000/api");
            assert_eq!(config.timeout, Duration::from_secs(10));
        }

        #[rstest]
        fn trims_trailing_slash_and_reads_timeout() {
            let config = ClientConfig::from_lookup(lookup_from(&[
                ("TASK_API_URL", "https://tasks.example.com/api/"),
                ("TASK_API_TIMEOUT_SECS", "3"),
            ]))
            .unwrap();

            assert_eq!(config.base_url, "https://tasks.example.com/api");
            assert_eq!(config.timeout, Duration::from_secs(3));
        }

        #[rstest]
        fn rejects_non_http_url() {
            let result =
                ClientConfig::from_lookup(lookup_from(&[("TASK_API_URL", "ftp://tasks/api")]));
            assert!(matches!(result, Err(ConfigurationError::InvalidApiUrl(_))));
        }

        #[rstest]
        #[case("0")]
        #[case("soon")]
        fn rejects_bad_timeout(#[case] value: &str) {
            let result =
                ClientConfig::from_lookup(lookup_from(&[("TASK_API_TIMEOUT_SECS", value)]));
            assert_eq!(
                result.unwrap_err(),
                ConfigurationError::InvalidTimeout(value.to_string())
            );
        }
    }
}
