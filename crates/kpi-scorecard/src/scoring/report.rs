use serde::Serialize;

use super::domain::{BandKey, ClassType, RubricBand};
use super::engine::EntityScorecard;
use super::round_to;

const DISPLAY_PRECISION: i32 = 2;

#[derive(Debug, Clone, Serialize)]
pub struct ScorecardRowView {
    pub kpi_key: String,
    pub label: String,
    pub metric_value: Option<f64>,
    pub band: BandKey,
    pub band_label: &'static str,
    pub points: f64,
    pub weight_percent: Option<f64>,
    pub weighted_points: f64,
}

/// Display-ready scorecard; only enabled KPIs are listed.
#[derive(Debug, Clone, Serialize)]
pub struct ScorecardView {
    pub entity_id: String,
    pub class_type: ClassType,
    pub class_label: &'static str,
    pub rows: Vec<ScorecardRowView>,
    pub total: f64,
}

impl EntityScorecard {
    pub fn to_view(&self) -> ScorecardView {
        let rows = self
            .lines
            .iter()
            .filter(|line| line.enabled)
            .map(|line| ScorecardRowView {
                kpi_key: line.kpi_key.clone(),
                label: line.label.clone(),
                metric_value: line.metric_value,
                band: line.band_key,
                band_label: line.band_key.label(),
                points: round_to(line.score_value, DISPLAY_PRECISION),
                weight_percent: line.weight_percent,
                weighted_points: round_to(line.weighted_points, DISPLAY_PRECISION),
            })
            .collect();

        ScorecardView {
            entity_id: self.entity_id.clone(),
            class_type: self.class_type,
            class_label: self.class_type.code(),
            rows,
            total: round_to(self.total, DISPLAY_PRECISION),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RubricRowView {
    pub band: BandKey,
    pub band_label: &'static str,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub score_value: Option<f64>,
}

/// Rubric rows for one KPI, ordered by band priority.
#[derive(Debug, Clone, Serialize)]
pub struct RubricView {
    pub class_type: ClassType,
    pub kpi_key: String,
    pub rows: Vec<RubricRowView>,
}

impl RubricView {
    pub fn from_rows(class_type: ClassType, kpi_key: &str, rows: &[RubricBand]) -> Self {
        let mut rows: Vec<RubricRowView> = rows
            .iter()
            .map(|row| RubricRowView {
                band: row.band_key,
                band_label: row.band_key.label(),
                min_value: row.min_value,
                max_value: row.max_value,
                score_value: row.score_value,
            })
            .collect();
        rows.sort_by_key(|row| row.band.rank());

        Self {
            class_type,
            kpi_key: kpi_key.to_string(),
            rows,
        }
    }
}

/// Renders an optional bound, using an open marker for unbounded sides.
pub fn format_bound(value: Option<f64>, open: &str) -> String {
    match value {
        Some(value) => format!("{value}"),
        None => open.to_string(),
    }
}
