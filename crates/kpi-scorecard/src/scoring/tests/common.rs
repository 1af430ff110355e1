use chrono::NaiveDate;

use crate::scoring::domain::{
    BandKey, ClassKpiConfig, ClassType, Direction, KpiDefinition, RawObservation, RubricBand,
};
use crate::scoring::rollup::WeightedScore;
use crate::scoring::snapshot::ConfigSnapshot;

pub(super) fn definition(
    kpi_key: &str,
    unit: &str,
    min_value: Option<f64>,
    max_value: Option<f64>,
    direction: Direction,
) -> KpiDefinition {
    KpiDefinition {
        kpi_key: kpi_key.to_string(),
        label: kpi_key.replace('_', " "),
        customer_label: None,
        unit: unit.to_string(),
        min_value,
        max_value,
        direction,
    }
}

pub(super) fn first_time_right() -> KpiDefinition {
    KpiDefinition {
        customer_label: Some("First Time Right".to_string()),
        ..definition("ftr", "pct", Some(0.0), Some(100.0), Direction::HigherBetter)
    }
}

pub(super) fn repeat_rate() -> KpiDefinition {
    definition("repeat_rate", "pct", Some(0.0), Some(20.0), Direction::LowerBetter)
}

pub(super) fn band(
    band_key: BandKey,
    min_value: Option<f64>,
    max_value: Option<f64>,
    score_value: Option<f64>,
) -> RubricBand {
    RubricBand {
        class_type: ClassType::Tech,
        kpi_key: "ftr".to_string(),
        band_key,
        min_value,
        max_value,
        score_value,
    }
}

/// Hand-authored FTR rubric mirroring the generated defaults for threshold 80.
pub(super) fn ftr_rubric() -> Vec<RubricBand> {
    vec![
        band(BandKey::Misses, Some(0.0), Some(77.99), Some(0.0)),
        band(BandKey::NeedsImprovement, Some(78.0), Some(79.99), Some(5.0)),
        band(BandKey::Meets, Some(80.0), Some(81.99), Some(7.5)),
        band(BandKey::Exceeds, Some(82.0), Some(100.0), Some(10.0)),
        band(BandKey::NoData, None, None, None),
    ]
}

pub(super) fn class_config(
    kpi_key: &str,
    enabled: bool,
    weight_percent: Option<f64>,
    threshold: Option<f64>,
    grade_value: Option<f64>,
) -> ClassKpiConfig {
    ClassKpiConfig {
        class_type: ClassType::Tech,
        kpi_key: kpi_key.to_string(),
        enabled,
        weight_percent,
        threshold,
        grade_value,
    }
}

pub(super) fn weighted(
    kpi_key: &str,
    score_value: f64,
    weight_percent: Option<f64>,
    enabled: bool,
) -> WeightedScore {
    WeightedScore {
        kpi_key: kpi_key.to_string(),
        score_value,
        weight_percent,
        enabled,
    }
}

/// TECH snapshot with FTR (60%) and repeat rate (40%) enabled and an unconfigured
/// tardy KPI that has no class row at all.
pub(super) fn tech_snapshot() -> ConfigSnapshot {
    let mut rubric = ftr_rubric();
    rubric.extend(
        [
            (BandKey::Exceeds, Some(0.0), Some(4.5), Some(10.0)),
            (BandKey::Meets, Some(4.51), Some(5.0), Some(7.5)),
            (BandKey::NeedsImprovement, Some(5.01), Some(5.5), Some(5.0)),
            (BandKey::Misses, Some(5.51), Some(20.0), Some(0.0)),
            (BandKey::NoData, None, None, None),
        ]
        .into_iter()
        .map(|(band_key, min_value, max_value, score_value)| RubricBand {
            kpi_key: "repeat_rate".to_string(),
            ..band(band_key, min_value, max_value, score_value)
        }),
    );

    ConfigSnapshot {
        kpis: vec![
            first_time_right(),
            repeat_rate(),
            definition("tardy", "count", None, None, Direction::LowerBetter),
        ],
        class_kpis: vec![
            class_config("ftr", true, Some(60.0), Some(80.0), Some(10.0)),
            class_config("repeat_rate", true, Some(40.0), Some(5.0), Some(10.0)),
        ],
        rubric,
    }
}

pub(super) fn observation(
    entity_id: &str,
    kpi_key: &str,
    value: Option<f64>,
    day: Option<u32>,
) -> RawObservation {
    RawObservation {
        entity_id: entity_id.to_string(),
        kpi_key: kpi_key.to_string(),
        value,
        observed_at: day.map(|day| {
            NaiveDate::from_ymd_opt(2025, 6, day)
                .expect("valid date")
                .and_hms_opt(0, 0, 0)
                .expect("valid time")
        }),
    }
}
