use super::common::*;
use crate::scoring::classifier::pick_band;
use crate::scoring::defaults::{
    compute_rubric_defaults, compute_rubric_defaults_with, BandDefault, GenerateError,
    RubricGenerator,
};
use crate::scoring::domain::{BandKey, ClassType, Direction};
use crate::scoring::policy::{BandWidthPolicy, WidthBounds};

fn range(min_value: f64, max_value: f64, score_value: Option<f64>) -> BandDefault {
    BandDefault {
        min_value: Some(min_value),
        max_value: Some(max_value),
        score_value,
    }
}

#[test]
fn higher_better_places_meets_above_threshold() {
    let defaults = compute_rubric_defaults(&first_time_right(), 80.0, Some(10.0));

    assert_eq!(defaults.get(BandKey::Meets), range(80.0, 81.99, Some(7.5)));
    assert_eq!(defaults.get(BandKey::Exceeds), range(82.0, 100.0, Some(10.0)));
    assert_eq!(
        defaults.get(BandKey::NeedsImprovement),
        range(78.0, 79.99, Some(5.0))
    );
    assert_eq!(defaults.get(BandKey::Misses), range(0.0, 77.99, Some(0.0)));
    assert_eq!(defaults.get(BandKey::NoData), BandDefault::default());
}

#[test]
fn lower_better_mirrors_bands_below_threshold() {
    let defaults = compute_rubric_defaults(&repeat_rate(), 5.0, Some(10.0));

    assert_eq!(defaults.get(BandKey::Meets), range(4.51, 5.0, Some(7.5)));
    assert_eq!(defaults.get(BandKey::Exceeds), range(0.0, 4.5, Some(10.0)));
    assert_eq!(
        defaults.get(BandKey::NeedsImprovement),
        range(5.01, 5.5, Some(5.0))
    );
    assert_eq!(defaults.get(BandKey::Misses), range(5.51, 20.0, Some(0.0)));
}

#[test]
fn generation_is_idempotent() {
    let definition = repeat_rate();
    let first = compute_rubric_defaults(&definition, 7.25, Some(12.5));
    let second = compute_rubric_defaults(&definition, 7.25, Some(12.5));

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serializes"),
        serde_json::to_string(&second).expect("serializes")
    );
}

#[test]
fn clamps_bounds_into_declared_domain() {
    let defaults = compute_rubric_defaults(&first_time_right(), 1.0, Some(10.0));

    let misses = defaults.get(BandKey::Misses);
    assert_eq!(misses.min_value, Some(0.0));
    assert_eq!(misses.max_value, Some(0.0));
    assert_eq!(defaults.get(BandKey::NeedsImprovement).min_value, Some(0.0));

    let near_top = compute_rubric_defaults(&first_time_right(), 99.5, Some(10.0));
    assert_eq!(near_top.get(BandKey::Meets).max_value, Some(100.0));
    assert_eq!(near_top.get(BandKey::Exceeds), range(100.0, 100.0, Some(10.0)));
}

#[test]
fn undeclared_bounds_leave_outer_edges_open() {
    let definition = definition("tardy", "count", None, None, Direction::LowerBetter);
    let defaults = compute_rubric_defaults(&definition, 3.0, Some(4.0));

    let exceeds = defaults.get(BandKey::Exceeds);
    assert_eq!(exceeds.min_value, None);
    assert_eq!(exceeds.max_value, Some(1.0));

    let misses = defaults.get(BandKey::Misses);
    assert_eq!(misses.min_value, Some(5.01));
    assert_eq!(misses.max_value, None);

    assert_eq!(defaults.get(BandKey::Meets), range(1.01, 3.0, Some(3.0)));
}

#[test]
fn fine_grained_threshold_stays_the_meets_edge() {
    let definition = definition("uptime", "pct", Some(0.0), Some(1.0), Direction::HigherBetter);
    let defaults = compute_rubric_defaults(&definition, 0.123456, Some(10.0));

    assert_eq!(defaults.get(BandKey::Meets), range(0.123456, 0.613456, Some(7.5)));
    assert_eq!(
        defaults.get(BandKey::NeedsImprovement),
        range(0.0, 0.113456, Some(5.0))
    );

    let rows = defaults.into_rubric_rows(ClassType::Tech, "uptime");
    assert_eq!(pick_band(Some(0.123456), &rows), BandKey::Meets);
    assert_eq!(pick_band(Some(0.12346), &rows), BandKey::Meets);
    assert_eq!(pick_band(Some(0.1134), &rows), BandKey::NeedsImprovement);
}

#[test]
fn threshold_edge_is_never_rounded() {
    let threshold = 4.123456789012;
    let higher = compute_rubric_defaults(&first_time_right(), threshold, Some(10.0));
    assert_eq!(higher.get(BandKey::Meets).min_value, Some(threshold));

    let lower = compute_rubric_defaults(&repeat_rate(), threshold, Some(10.0));
    assert_eq!(lower.get(BandKey::Meets).max_value, Some(threshold));
}

#[test]
fn non_finite_threshold_leaves_derived_edges_open() {
    for threshold in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let defaults = compute_rubric_defaults(&first_time_right(), threshold, Some(10.0));

        let exceeds = defaults.get(BandKey::Exceeds);
        assert_eq!((exceeds.min_value, exceeds.max_value), (None, Some(100.0)));
        for band in [BandKey::Meets, BandKey::NeedsImprovement] {
            let bounds = defaults.get(band);
            assert_eq!((bounds.min_value, bounds.max_value), (None, None), "{band:?}");
        }
        let misses = defaults.get(BandKey::Misses);
        assert_eq!((misses.min_value, misses.max_value), (Some(0.0), None));
        assert_eq!(defaults.get(BandKey::Meets).score_value, Some(7.5));
    }
}

#[test]
fn single_declared_bound_clamps_one_side_only() {
    let ceiling_only = definition("backlog", "pct", None, Some(10.0), Direction::LowerBetter);
    let defaults = compute_rubric_defaults(&ceiling_only, 9.5, Some(4.0));

    let exceeds = defaults.get(BandKey::Exceeds);
    assert_eq!((exceeds.min_value, exceeds.max_value), (None, Some(9.0)));
    assert_eq!(defaults.get(BandKey::Meets), range(9.01, 9.5, Some(3.0)));
    assert_eq!(defaults.get(BandKey::NeedsImprovement), range(9.51, 10.0, Some(2.0)));
    assert_eq!(defaults.get(BandKey::Misses), range(10.0, 10.0, Some(0.0)));

    let floor_only = definition("callbacks", "pct", Some(0.0), None, Direction::HigherBetter);
    let defaults = compute_rubric_defaults(&floor_only, 1.0, Some(4.0));
    assert_eq!(defaults.get(BandKey::Misses), range(0.0, 0.0, Some(0.0)));
    assert_eq!(defaults.get(BandKey::NeedsImprovement), range(0.0, 0.99, Some(2.0)));
    let exceeds = defaults.get(BandKey::Exceeds);
    assert_eq!((exceeds.min_value, exceeds.max_value), (Some(3.0), None));
}

#[test]
fn score_units_use_wider_bands() {
    let definition = definition("csat", "score", Some(0.0), Some(10.0), Direction::HigherBetter);
    let defaults = compute_rubric_defaults(&definition, 6.0, Some(20.0));

    assert_eq!(defaults.get(BandKey::Meets), range(6.0, 7.99, Some(15.0)));
    assert_eq!(defaults.get(BandKey::Exceeds), range(8.0, 10.0, Some(20.0)));
    assert_eq!(defaults.get(BandKey::NeedsImprovement), range(4.0, 5.99, Some(10.0)));
    assert_eq!(defaults.get(BandKey::Misses), range(0.0, 3.99, Some(0.0)));
}

#[test]
fn missing_grade_value_nulls_every_score() {
    let defaults = compute_rubric_defaults(&first_time_right(), 80.0, None);
    assert!(defaults.iter().all(|(_, band)| band.score_value.is_none()));

    let nan_grade = compute_rubric_defaults(&first_time_right(), 80.0, Some(f64::NAN));
    assert!(nan_grade.iter().all(|(_, band)| band.score_value.is_none()));
}

#[test]
fn fractional_scores_round_to_four_places() {
    let defaults = compute_rubric_defaults(&first_time_right(), 80.0, Some(1.23456));

    assert_eq!(defaults.get(BandKey::Exceeds).score_value, Some(1.23456));
    assert_eq!(defaults.get(BandKey::Meets).score_value, Some(0.9259));
    assert_eq!(
        defaults.get(BandKey::NeedsImprovement).score_value,
        Some(0.6173)
    );
}

#[test]
fn injected_policy_changes_width_and_gap() {
    let policy = BandWidthPolicy {
        eps: 0.1,
        span_fraction: 0.05,
        pct_bounds: WidthBounds::new(1.0, 10.0),
        score_bounds: WidthBounds::new(2.0, 10.0),
    };
    let defaults = compute_rubric_defaults_with(&policy, &first_time_right(), 80.0, Some(10.0));

    assert_eq!(defaults.get(BandKey::Meets), range(80.0, 84.9, Some(7.5)));
    assert_eq!(defaults.get(BandKey::Exceeds).min_value, Some(85.0));
    assert_eq!(defaults.get(BandKey::NeedsImprovement), range(75.0, 79.9, Some(5.0)));
}

#[test]
fn rows_cover_all_five_bands_in_priority_order() {
    let rows = compute_rubric_defaults(&first_time_right(), 80.0, Some(10.0))
        .into_rubric_rows(ClassType::P4p, "ftr");

    let keys: Vec<BandKey> = rows.iter().map(|row| row.band_key).collect();
    assert_eq!(keys, BandKey::ordered().to_vec());
    assert!(rows
        .iter()
        .all(|row| row.class_type == ClassType::P4p && row.kpi_key == "ftr"));
}

#[test]
fn generator_reports_unusable_inputs() {
    let mut snapshot = tech_snapshot();
    let generator = RubricGenerator::default();

    assert_eq!(
        generator.generate(&snapshot, ClassType::Tech, "unknown"),
        Err(GenerateError::UnknownKpi("unknown".to_string()))
    );
    assert!(matches!(
        generator.generate(&snapshot, ClassType::Tech, "tardy"),
        Err(GenerateError::MissingThreshold { .. })
    ));

    snapshot
        .class_kpis
        .push(class_config("tardy", true, Some(10.0), Some(f64::INFINITY), None));
    assert!(matches!(
        generator.generate(&snapshot, ClassType::Tech, "tardy"),
        Err(GenerateError::InvalidThreshold { .. })
    ));
}

#[test]
fn regenerate_overwrites_stored_bands() {
    let mut snapshot = tech_snapshot();
    snapshot
        .class_kpis
        .iter_mut()
        .filter(|config| config.kpi_key == "ftr")
        .for_each(|config| config.threshold = Some(90.0));

    let rows = RubricGenerator::default()
        .regenerate(&mut snapshot, ClassType::Tech, "ftr")
        .expect("generation succeeds");

    let stored = snapshot.rubric_for(ClassType::Tech, "ftr");
    assert_eq!(stored, rows);
    assert_eq!(stored.len(), 5);
    let meets = stored
        .iter()
        .find(|row| row.band_key == BandKey::Meets)
        .expect("meets band stored");
    assert_eq!(meets.min_value, Some(90.0));
    assert_eq!(snapshot.rubric_for(ClassType::Tech, "repeat_rate").len(), 5);
}

#[test]
fn generate_class_skips_kpis_without_threshold() {
    let generated = RubricGenerator::default().generate_class(&tech_snapshot(), ClassType::Tech);

    let keys: Vec<&str> = generated.iter().map(|rubric| rubric.kpi_key.as_str()).collect();
    assert_eq!(keys, vec!["ftr", "repeat_rate"]);
    assert!(RubricGenerator::default()
        .generate_class(&tech_snapshot(), ClassType::Smart)
        .is_empty());
}
