use kpi_scorecard::scoring::engine::ClassValidation;
use kpi_scorecard::scoring::report::format_bound;
use kpi_scorecard::scoring::{RubricView, ScorecardView};
use std::fmt::Write;

pub(crate) fn render_rubrics(views: &[RubricView]) -> String {
    let mut out = String::new();
    if views.is_empty() {
        let _ = writeln!(out, "No KPIs with a configured threshold.");
        return out;
    }

    for view in views {
        let _ = writeln!(out, "{} rubric for {}", view.class_type, view.kpi_key);
        for row in &view.rows {
            let points = row
                .score_value
                .map(|score| score.to_string())
                .unwrap_or_else(|| "-".to_string());
            if row.band.is_range_band() {
                let _ = writeln!(
                    out,
                    "- {:<18} {:>10} .. {:<10} points {}",
                    row.band_label,
                    format_bound(row.min_value, "-inf"),
                    format_bound(row.max_value, "+inf"),
                    points
                );
            } else {
                let _ = writeln!(out, "- {:<18} (fallback)", row.band_label);
            }
        }
        out.push('\n');
    }
    out
}

pub(crate) fn render_scorecards(views: &[ScorecardView]) -> String {
    let mut out = String::new();
    if views.is_empty() {
        let _ = writeln!(out, "No observations to score.");
        return out;
    }

    for view in views {
        let _ = writeln!(out, "{} ({})", view.entity_id, view.class_label);
        for row in &view.rows {
            let value = row
                .metric_value
                .map(|value| value.to_string())
                .unwrap_or_else(|| "-".to_string());
            let weight = row
                .weight_percent
                .map(|weight| format!("{weight}%"))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "- {}: {} -> {} ({} pts x {} = {})",
                row.label, value, row.band_label, row.points, weight, row.weighted_points
            );
        }
        let _ = writeln!(out, "  Total: {}\n", view.total);
    }
    out
}

pub(crate) fn render_validation(validation: &ClassValidation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} configuration check", validation.class_type);

    let weights = &validation.weights;
    if weights.nominal {
        let _ = writeln!(out, "Weights: enabled KPIs total 100%");
    } else {
        let _ = writeln!(
            out,
            "Weights: enabled KPIs total {}% (scores are not rescaled)",
            weights.enabled_weight_total
        );
    }

    if validation.rubric_issues.is_empty() {
        let _ = writeln!(out, "Rubrics: no issues");
    } else {
        let _ = writeln!(out, "Rubrics");
        for kpi in &validation.rubric_issues {
            for issue in &kpi.issues {
                let _ = writeln!(out, "- {}: {}", kpi.kpi_key, issue.summary());
            }
        }
    }
    out
}
