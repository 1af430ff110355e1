use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{BandKey, ClassType, Direction, KpiDefinition, RubricBand};
use super::policy::BandWidthPolicy;
use super::round_to;
use super::snapshot::ConfigSnapshot;

const MEETS_SCORE_FRACTION: f64 = 0.75;
const NEEDS_IMPROVEMENT_SCORE_FRACTION: f64 = 0.5;
const SCORE_PRECISION: i32 = 4;
const BOUND_PRECISION: i32 = 10;

/// Generated range and points for a single band.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BandDefault {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub score_value: Option<f64>,
}

/// Complete five-band output of the default generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RubricDefaults {
    bands: BTreeMap<BandKey, BandDefault>,
}

impl RubricDefaults {
    pub fn get(&self, band: BandKey) -> BandDefault {
        self.bands.get(&band).copied().unwrap_or_default()
    }

    /// Bands in priority order, `NoData` last.
    pub fn iter(&self) -> impl Iterator<Item = (BandKey, BandDefault)> + '_ {
        self.bands.iter().map(|(band, value)| (*band, *value))
    }

    pub fn into_rubric_rows(self, class_type: ClassType, kpi_key: &str) -> Vec<RubricBand> {
        self.bands
            .into_iter()
            .map(|(band_key, band)| RubricBand {
                class_type,
                kpi_key: kpi_key.to_string(),
                band_key,
                min_value: band.min_value,
                max_value: band.max_value,
                score_value: band.score_value,
            })
            .collect()
    }
}

/// Generate default bands with the stock [`BandWidthPolicy`].
pub fn compute_rubric_defaults(
    definition: &KpiDefinition,
    threshold: f64,
    grade_value: Option<f64>,
) -> RubricDefaults {
    compute_rubric_defaults_with(&BandWidthPolicy::default(), definition, threshold, grade_value)
}

/// Derive five bands from a single threshold.
///
/// MEETS sits on the favourable side of `threshold`, NEEDS_IMPROVEMENT on the other,
/// each one MEETS-width wide; EXCEEDS and MISSES run out to the declared domain edges
/// (unbounded when undeclared). Every bound is clamped into the declared domain; the
/// edge pinned to `threshold` is kept exact and the rest are rounded to ten decimals.
/// A non-finite threshold leaves every threshold-derived edge `None`.
pub fn compute_rubric_defaults_with(
    policy: &BandWidthPolicy,
    definition: &KpiDefinition,
    threshold: f64,
    grade_value: Option<f64>,
) -> RubricDefaults {
    let width = policy.meets_width(definition);
    let eps = policy.eps;
    let min_bound = definition.min_value.and_then(finite);
    let max_bound = definition.max_value.and_then(finite);

    // The threshold edge is clamped but never rounded; derived edges only shed float noise.
    let at_threshold = finite(threshold).map(|value| clamp_bound(value, min_bound, max_bound));
    let derived = |raw: f64| {
        finite(raw)
            .map(|value| round_to(clamp_bound(value, min_bound, max_bound), BOUND_PRECISION))
            .and_then(finite)
    };

    let ranges: [(BandKey, Option<f64>, Option<f64>); 4] = match definition.direction {
        Direction::HigherBetter => {
            let meets_max = threshold + width - eps;
            let needs_min = threshold - width;
            [
                (BandKey::Exceeds, derived(meets_max + eps), max_bound),
                (BandKey::Meets, at_threshold, derived(meets_max)),
                (BandKey::NeedsImprovement, derived(needs_min), derived(threshold - eps)),
                (BandKey::Misses, min_bound, derived(needs_min - eps)),
            ]
        }
        Direction::LowerBetter => {
            let meets_min = threshold - width + eps;
            let needs_max = threshold + width;
            [
                (BandKey::Exceeds, min_bound, derived(meets_min - eps)),
                (BandKey::Meets, derived(meets_min), at_threshold),
                (BandKey::NeedsImprovement, derived(threshold + eps), derived(needs_max)),
                (BandKey::Misses, derived(needs_max + eps), max_bound),
            ]
        }
    };

    let scores = band_scores(grade_value);
    let mut bands: BTreeMap<BandKey, BandDefault> = ranges
        .into_iter()
        .map(|(band, min_value, max_value)| {
            (
                band,
                BandDefault {
                    min_value,
                    max_value,
                    score_value: scores.get(&band).copied().flatten(),
                },
            )
        })
        .collect();
    bands.insert(BandKey::NoData, BandDefault::default());

    RubricDefaults { bands }
}

fn band_scores(grade_value: Option<f64>) -> BTreeMap<BandKey, Option<f64>> {
    let grade = grade_value.filter(|value| value.is_finite());
    BandKey::range_bands()
        .into_iter()
        .map(|band| {
            let score = grade.map(|grade| match band {
                BandKey::Exceeds => grade,
                BandKey::Meets => round_to(grade * MEETS_SCORE_FRACTION, SCORE_PRECISION),
                BandKey::NeedsImprovement => {
                    round_to(grade * NEEDS_IMPROVEMENT_SCORE_FRACTION, SCORE_PRECISION)
                }
                BandKey::Misses | BandKey::NoData => 0.0,
            });
            (band, score)
        })
        .collect()
}

fn finite(value: f64) -> Option<f64> {
    Some(value).filter(|value| value.is_finite())
}

fn clamp_bound(value: f64, min_bound: Option<f64>, max_bound: Option<f64>) -> f64 {
    let value = min_bound.map_or(value, |min| value.max(min));
    max_bound.map_or(value, |max| value.min(max))
}

/// Reasons a checked generation request cannot produce a rubric.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    #[error("no KPI definition for '{0}'")]
    UnknownKpi(String),
    #[error("{class_type} has no threshold configured for '{kpi_key}'")]
    MissingThreshold { class_type: ClassType, kpi_key: String },
    #[error("{class_type} threshold for '{kpi_key}' is not a finite number")]
    InvalidThreshold { class_type: ClassType, kpi_key: String },
}

/// Rows generated for one KPI by [`RubricGenerator::generate_class`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedRubric {
    pub kpi_key: String,
    pub rows: Vec<RubricBand>,
}

/// Generator bound to a policy that resolves its inputs from a configuration snapshot.
#[derive(Debug, Clone, Default)]
pub struct RubricGenerator {
    policy: BandWidthPolicy,
}

impl RubricGenerator {
    pub fn new(policy: BandWidthPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BandWidthPolicy {
        &self.policy
    }

    pub fn generate(
        &self,
        snapshot: &ConfigSnapshot,
        class_type: ClassType,
        kpi_key: &str,
    ) -> Result<Vec<RubricBand>, GenerateError> {
        let definition = snapshot
            .definition(kpi_key)
            .ok_or_else(|| GenerateError::UnknownKpi(kpi_key.to_string()))?;
        let config = snapshot.class_config(class_type, kpi_key);

        let threshold = config
            .threshold
            .ok_or_else(|| GenerateError::MissingThreshold {
                class_type,
                kpi_key: kpi_key.to_string(),
            })?;
        if !threshold.is_finite() {
            return Err(GenerateError::InvalidThreshold {
                class_type,
                kpi_key: kpi_key.to_string(),
            });
        }

        let defaults =
            compute_rubric_defaults_with(&self.policy, definition, threshold, config.grade_value);
        debug!(%class_type, kpi_key, threshold, "generated rubric defaults");
        Ok(defaults.into_rubric_rows(class_type, kpi_key))
    }

    /// Generate and overwrite all five stored bands for the pair.
    pub fn regenerate(
        &self,
        snapshot: &mut ConfigSnapshot,
        class_type: ClassType,
        kpi_key: &str,
    ) -> Result<Vec<RubricBand>, GenerateError> {
        let rows = self.generate(snapshot, class_type, kpi_key)?;
        snapshot.upsert_rubric(class_type, kpi_key, rows.clone());
        Ok(rows)
    }

    /// Generate rubrics for every KPI of a class that has a usable threshold.
    pub fn generate_class(
        &self,
        snapshot: &ConfigSnapshot,
        class_type: ClassType,
    ) -> Vec<GeneratedRubric> {
        snapshot
            .kpis
            .iter()
            .filter_map(|definition| {
                match self.generate(snapshot, class_type, &definition.kpi_key) {
                    Ok(rows) => Some(GeneratedRubric {
                        kpi_key: definition.kpi_key.clone(),
                        rows,
                    }),
                    Err(GenerateError::MissingThreshold { .. }) => {
                        debug!(
                            %class_type,
                            kpi_key = %definition.kpi_key,
                            "no threshold; skipping"
                        );
                        None
                    }
                    Err(err) => {
                        warn!(
                            %class_type,
                            kpi_key = %definition.kpi_key,
                            error = %err,
                            "skipping rubric generation"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}
