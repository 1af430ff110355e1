use serde::Serialize;

use super::domain::{BandKey, ComputedKpiResult, MatchReason, RubricBand};

/// Classifier output with the reason behind the chosen band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BandMatch {
    pub band_key: BandKey,
    pub reason: MatchReason,
}

impl BandMatch {
    fn no_data(reason: MatchReason) -> Self {
        Self {
            band_key: BandKey::NoData,
            reason,
        }
    }
}

/// Classify a value, distinguishing a missing value from an uncovered one.
///
/// Among all range rows containing the value the one with the lowest
/// [`BandKey::rank`] wins, so row storage order never affects the outcome.
pub fn classify(metric_value: Option<f64>, rubric_rows: &[RubricBand]) -> BandMatch {
    let value = match metric_value {
        Some(value) if value.is_finite() => value,
        _ => return BandMatch::no_data(MatchReason::MissingValue),
    };

    rubric_rows
        .iter()
        .filter(|row| row.band_key.is_range_band())
        .filter(|row| row.contains(value))
        .map(|row| row.band_key)
        .min_by_key(|band| band.rank())
        .map(|band_key| BandMatch {
            band_key,
            reason: MatchReason::Matched,
        })
        .unwrap_or_else(|| BandMatch::no_data(MatchReason::NoCoveringBand))
}

pub fn pick_band(metric_value: Option<f64>, rubric_rows: &[RubricBand]) -> BandKey {
    classify(metric_value, rubric_rows).band_key
}

/// Points for a band. `NoData`, a missing row, or a non-finite score all yield zero.
pub fn band_to_score(band_key: BandKey, rubric_rows: &[RubricBand]) -> f64 {
    if band_key == BandKey::NoData {
        return 0.0;
    }

    rubric_rows
        .iter()
        .find(|row| row.band_key == band_key)
        .and_then(|row| row.score_value)
        .filter(|score| score.is_finite())
        .unwrap_or(0.0)
}

pub fn score_kpi(metric_value: Option<f64>, rubric_rows: &[RubricBand]) -> ComputedKpiResult {
    let matched = classify(metric_value, rubric_rows);
    ComputedKpiResult {
        band_key: matched.band_key,
        score_value: band_to_score(matched.band_key, rubric_rows),
        reason: matched.reason,
    }
}
