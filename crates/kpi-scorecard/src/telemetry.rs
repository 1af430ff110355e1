use crate::config::TelemetryConfig;
use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("log filter '{value}' is not a valid tracing directive")]
    InvalidFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("unable to install the scorecard log subscriber")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Build a filter from a level or directive list such as `kpi_scorecard=debug,warn`.
pub fn parse_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|source| TelemetryError::InvalidFilter {
        value: directives.to_string(),
        source,
    })
}

fn resolve_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => parse_filter(&config.log_level),
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over `APP_LOG_LEVEL`; events go to
/// stderr so rubric and scorecard output on stdout stays pipeable.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = resolve_filter(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Install)
}
