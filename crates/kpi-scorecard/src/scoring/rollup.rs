use serde::{Deserialize, Serialize};

/// Tolerance used when judging whether enabled weights add up to 100.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// A scored KPI ready to be folded into a classification total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedScore {
    pub kpi_key: String,
    pub score_value: f64,
    pub weight_percent: Option<f64>,
    pub enabled: bool,
}

/// Why an entry was left out of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Disabled,
    NoWeight,
    NonFiniteScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub kpi_key: String,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntry {
    pub kpi_key: String,
    pub reason: SkipReason,
}

/// Audit trail of a rollup; `total` always equals [`rollup_weighted`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RollupBreakdown {
    pub total: f64,
    pub contributions: Vec<Contribution>,
    pub skipped: Vec<SkippedEntry>,
}

fn usable_weight(weight_percent: Option<f64>) -> Option<f64> {
    weight_percent.filter(|weight| weight.is_finite() && *weight > 0.0)
}

fn skip_reason(entry: &WeightedScore) -> Option<SkipReason> {
    if !entry.enabled {
        Some(SkipReason::Disabled)
    } else if usable_weight(entry.weight_percent).is_none() {
        Some(SkipReason::NoWeight)
    } else if !entry.score_value.is_finite() {
        Some(SkipReason::NonFiniteScore)
    } else {
        None
    }
}

/// Points an entry adds to the total; zero when it is skipped.
pub fn contribution(entry: &WeightedScore) -> f64 {
    match (skip_reason(entry), usable_weight(entry.weight_percent)) {
        (None, Some(weight)) => entry.score_value * (weight / 100.0),
        _ => 0.0,
    }
}

/// Weighted sum of enabled scores. Weights are trusted as configured and never rescaled.
pub fn rollup_weighted(scored: &[WeightedScore]) -> f64 {
    rollup_detailed(scored).total
}

pub fn rollup_detailed(scored: &[WeightedScore]) -> RollupBreakdown {
    let mut breakdown = RollupBreakdown::default();

    for entry in scored {
        if let Some(reason) = skip_reason(entry) {
            breakdown.skipped.push(SkippedEntry {
                kpi_key: entry.kpi_key.clone(),
                reason,
            });
            continue;
        }

        let points = contribution(entry);
        breakdown.total += points;
        breakdown.contributions.push(Contribution {
            kpi_key: entry.kpi_key.clone(),
            points,
        });
    }

    breakdown
}

/// Advisory check of the configured weights; scoring ignores the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightCheck {
    pub enabled_weight_total: f64,
    pub nominal: bool,
}

pub fn check_weights(scored: &[WeightedScore]) -> WeightCheck {
    let enabled_weight_total: f64 = scored
        .iter()
        .filter(|entry| entry.enabled)
        .filter_map(|entry| usable_weight(entry.weight_percent))
        .sum();

    WeightCheck {
        enabled_weight_total,
        nominal: (enabled_weight_total - 100.0).abs() <= WEIGHT_SUM_TOLERANCE,
    }
}
