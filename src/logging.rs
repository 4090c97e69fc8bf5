//! Tracing subscriber setup for the binary.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::RuntimeConfig;

type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Installs the global subscriber: JSON in production, compact otherwise.
///
/// `RUST_LOG` is ignored; the filter comes from `runtime.log_level`. An
/// unparsable directive falls back to `info`.
pub fn init_tracing(config: &RuntimeConfig) -> Result<(), InitError> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.is_production() {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_target(false)
            .try_init()
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_error_instead_of_panicking() {
        let config = RuntimeConfig {
            log_level: "not a [valid directive".to_string(),
            ..Default::default()
        };

        // The first call may lose to another test; the second always finds
        // a subscriber installed.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
