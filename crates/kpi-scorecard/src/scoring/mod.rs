//! KPI rubric generation, band classification, and weighted rollup.
//!
//! Every scoring function is pure and infallible: missing or malformed input degrades
//! to `NO_DATA`, zero points, or a partial total so a report can always render.

pub mod audit;
pub mod classifier;
pub mod defaults;
pub mod domain;
pub mod engine;
pub mod import;
pub mod policy;
pub mod report;
pub mod rollup;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use audit::{audit_rubric, RubricIssue};
pub use classifier::{band_to_score, classify, pick_band, score_kpi, BandMatch};
pub use defaults::{
    compute_rubric_defaults, compute_rubric_defaults_with, BandDefault, GenerateError,
    GeneratedRubric, RubricDefaults, RubricGenerator,
};
pub use domain::{
    BandKey, ClassKpiConfig, ClassType, ComputedKpiResult, Direction, KpiDefinition,
    MatchReason, ParseKeyError, RawObservation, RubricBand,
};
pub use engine::{
    ClassValidation, EntityScorecard, KpiRubricIssues, KpiScoreLine, ScoringEngine,
};
pub use import::{read_observations, read_observations_path, ImportError};
pub use policy::{BandWidthPolicy, WidthBounds};
pub use report::{RubricView, ScorecardView};
pub use rollup::{
    check_weights, rollup_detailed, rollup_weighted, RollupBreakdown, SkipReason, WeightCheck,
    WeightedScore,
};
pub use snapshot::{ConfigSnapshot, SnapshotError};

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}
