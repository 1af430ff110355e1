use serde::{Deserialize, Serialize};

use super::domain::KpiDefinition;

pub(crate) const DEFAULT_MIN_BOUND: f64 = 0.0;
pub(crate) const DEFAULT_MAX_BOUND: f64 = 100.0;

/// Unit string that selects the wider score width bounds.
pub const SCORE_UNIT: &str = "score";

/// Absolute limits for the generated MEETS band width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidthBounds {
    pub min: f64,
    pub max: f64,
}

impl WidthBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, width: f64) -> f64 {
        width.max(self.min).min(self.max)
    }
}

/// Tunable constants for rubric default generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandWidthPolicy {
    /// Gap kept between adjacent generated bands.
    pub eps: f64,
    /// Share of the KPI's declared span used as the raw MEETS width.
    pub span_fraction: f64,
    pub pct_bounds: WidthBounds,
    pub score_bounds: WidthBounds,
}

impl Default for BandWidthPolicy {
    fn default() -> Self {
        Self {
            eps: 0.01,
            span_fraction: 0.02,
            pct_bounds: WidthBounds::new(0.5, 5.0),
            score_bounds: WidthBounds::new(2.0, 10.0),
        }
    }
}

impl BandWidthPolicy {
    pub fn bounds_for_unit(&self, unit: &str) -> WidthBounds {
        if unit == SCORE_UNIT {
            self.score_bounds
        } else {
            self.pct_bounds
        }
    }

    /// Width of the MEETS band; an undeclared domain side falls back to 0..100.
    pub fn meets_width(&self, definition: &KpiDefinition) -> f64 {
        let min_bound = definition.min_value.unwrap_or(DEFAULT_MIN_BOUND);
        let max_bound = definition.max_value.unwrap_or(DEFAULT_MAX_BOUND);
        let span = (max_bound - min_bound).abs();

        self.bounds_for_unit(&definition.unit)
            .clamp(span * self.span_fraction)
    }
}
