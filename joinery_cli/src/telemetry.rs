use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Environment variable read before `RUST_LOG`
pub const LOG_ENV: &str = "JOINERY_LOG";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}'")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },

    #[error("telemetry error: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Install a compact stderr subscriber.
///
/// Filter precedence: `JOINERY_LOG`, then `RUST_LOG`, then `fallback_level`.
pub fn init(fallback_level: &str) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_env(LOG_ENV).or_else(|_| EnvFilter::try_from_default_env()) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback_level).map_err(|source| TelemetryError::EnvFilter {
            value: fallback_level.to_string(),
            source,
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_invalid_fallback_level() {
        let source = EnvFilter::try_new("foo=notalevel").unwrap_err();
        let err = TelemetryError::EnvFilter {
            value: "foo=notalevel".to_string(),
            source,
        };
        assert_eq!(err.to_string(), "invalid log level/filter 'foo=notalevel'");
        assert!(err.source().is_some());
    }
}
