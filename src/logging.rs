//! Tracing subscriber set-up shared by the server and the console client.

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ConfigurationError, LogFormat};

/// Default filter for the server when `RUST_LOG` is unset.
pub const SERVER_DEFAULT_FILTER: &str = "task_manager_api=debug,tower_http=debug";

/// Default filter for the console client when `RUST_LOG` is unset.
pub const CONSOLE_DEFAULT_FILTER: &str = "task_manager_api=warn";

/// Builds the env filter, preferring `RUST_LOG` over `default_filter`.
fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into())
}

/// Installs the global subscriber.
///
/// Later calls are ignored so tests and binaries can both call it.
pub fn init_tracing(format: LogFormat, default_filter: &str, writer: BoxMakeWriter) {
    let registry = tracing_subscriber::registry().with(env_filter(default_filter));

    let result = match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init(),
    };

    if let Err(error) = result {
        tracing::debug!(%error, "Tracing subscriber already installed");
    }
}

/// Reads `LOG_FORMAT` from the environment, then installs the subscriber.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidLogFormat` for an unknown format; nothing
/// is installed in that case.
pub fn init_tracing_from_env(
    default_filter: &str,
    writer: BoxMakeWriter,
) -> Result<LogFormat, ConfigurationError> {
    init_tracing_from_lookup(|name| std::env::var(name).ok(), default_filter, writer)
}

/// Reads `LOG_FORMAT` through `lookup`, then installs the subscriber.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidLogFormat` for an unknown format; nothing
/// is installed in that case.
pub fn init_tracing_from_lookup<F>(
    lookup: F,
    default_filter: &str,
    writer: BoxMakeWriter,
) -> Result<LogFormat, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    let format = LogFormat::from_lookup(lookup)?;
    init_tracing(format, default_filter, writer);
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_init_tracing_twice_does_not_panic() {
        init_tracing(
            LogFormat::Pretty,
            SERVER_DEFAULT_FILTER,
            BoxMakeWriter::new(std::io::sink),
        );
        init_tracing(
            LogFormat::Json,
            SERVER_DEFAULT_FILTER,
            BoxMakeWriter::new(std::io::sink),
        );
    }

    #[rstest]
    fn test_invalid_log_format_is_rejected() {
        let result = init_tracing_from_lookup(
            |name| (name == "LOG_FORMAT").then(|| "xml".to_string()),
            SERVER_DEFAULT_FILTER,
            BoxMakeWriter::new(std::io::sink),
        );

        assert_eq!(
            result,
            Err(ConfigurationError::InvalidLogFormat("xml".to_string()))
        );
    }

    #[rstest]
    #[case(None, LogFormat::Pretty)]
    #[case(Some("json"), LogFormat::Json)]
    fn test_log_format_is_read_before_install(
        #[case] value: Option<&str>,
        #[case] expected: LogFormat,
    ) {
        let result = init_tracing_from_lookup(
            |name| value.filter(|_| name == "LOG_FORMAT").map(str::to_string),
            SERVER_DEFAULT_FILTER,
            BoxMakeWriter::new(std::io::sink),
        );

        assert_eq!(result, Ok(expected));
    }
}
