use crate::scoring::policy::{BandWidthPolicy, WidthBounds};
use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the scorecard tooling.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = BandWidthPolicy::default();
        let band_policy = BandWidthPolicy {
            eps: positive_var("SCORECARD_BAND_EPS", defaults.eps)?,
            span_fraction: positive_var("SCORECARD_SPAN_FRACTION", defaults.span_fraction)?,
            pct_bounds: width_bounds(
                "SCORECARD_PCT_WIDTH_MIN",
                "SCORECARD_PCT_WIDTH_MAX",
                defaults.pct_bounds,
            )?,
            score_bounds: width_bounds(
                "SCORECARD_SCORE_WIDTH_MIN",
                "SCORECARD_SCORE_WIDTH_MAX",
                defaults.score_bounds,
            )?,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig { band_policy },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Constants injected into rubric generation.
#[derive(Debug, Clone, Default)]
pub struct ScoringConfig {
    pub band_policy: BandWidthPolicy,
}

fn positive_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let raw = match env::var(name) {
        Ok(raw) => raw,
        Err(_) => return Ok(default),
    };

    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::InvalidNumber { name, value: raw.clone() })?;

    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidNumber { name, value: raw });
    }

    Ok(value)
}

fn width_bounds(
    min_name: &'static str,
    max_name: &'static str,
    default: WidthBounds,
) -> Result<WidthBounds, ConfigError> {
    let min = positive_var(min_name, default.min)?;
    let max = positive_var(max_name, default.max)?;

    if min > max {
        return Err(ConfigError::InvertedWidthBounds {
            min_name,
            max_name,
        });
    }

    Ok(WidthBounds::new(min, max))
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { name: &'static str, value: String },
    InvertedWidthBounds { min_name: &'static str, max_name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a positive number (got '{value}')")
            }
            ConfigError::InvertedWidthBounds { min_name, max_name } => {
                write!(f, "{min_name} must not exceed {max_name}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
