use serde::Serialize;

use super::domain::{BandKey, KpiDefinition, RubricBand};
use super::policy::BandWidthPolicy;

const FLOAT_SLACK: f64 = 1e-9;

/// Structural problem found in a rubric. Classification is unaffected by any of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum RubricIssue {
    MissingBand { band: BandKey },
    DuplicateBand { band: BandKey, count: usize },
    InvertedRange { band: BandKey, min_value: f64, max_value: f64 },
    Overlap { higher: BandKey, lower: BandKey },
    Gap { below: BandKey, above: BandKey, from: f64, to: f64 },
    DomainNotCovered { from: f64, to: f64 },
}

impl RubricIssue {
    pub fn summary(&self) -> String {
        match self {
            RubricIssue::MissingBand { band } => format!("{} band is missing", band.label()),
            RubricIssue::DuplicateBand { band, count } => {
                format!("{} band is defined {count} times", band.label())
            }
            RubricIssue::InvertedRange {
                band,
                min_value,
                max_value,
            } => format!(
                "{} band minimum {min_value} exceeds maximum {max_value}",
                band.label()
            ),
            RubricIssue::Overlap { higher, lower } => format!(
                "{} and {} ranges overlap; {} wins",
                higher.label(),
                lower.label(),
                higher.label()
            ),
            RubricIssue::Gap {
                below,
                above,
                from,
                to,
            } => format!(
                "values between {from} and {to} ({} to {}) classify as No Data",
                below.label(),
                above.label()
            ),
            RubricIssue::DomainNotCovered { from, to } => {
                format!("declared domain {from} to {to} is not covered by any band")
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Span {
    band: BandKey,
    low: f64,
    high: f64,
}

impl Span {
    fn from_row(row: &RubricBand) -> Self {
        Self {
            band: row.band_key,
            low: row.min_value.unwrap_or(f64::NEG_INFINITY),
            high: row.max_value.unwrap_or(f64::INFINITY),
        }
    }

    fn intersects(&self, other: &Span) -> bool {
        self.low.max(other.low) <= self.high.min(other.high)
    }

    /// A band squeezed onto a single point of the declared domain edge by clamping.
    fn pinned_to_edge(&self, definition: &KpiDefinition) -> bool {
        self.low == self.high
            && (definition.min_value == Some(self.low) || definition.max_value == Some(self.high))
    }
}

/// Inspect one KPI's rubric rows for missing, duplicated, inverted, overlapping,
/// or gapped bands.
pub fn audit_rubric(
    definition: &KpiDefinition,
    rows: &[RubricBand],
    policy: &BandWidthPolicy,
) -> Vec<RubricIssue> {
    let mut issues = Vec::new();

    for band in BandKey::range_bands() {
        let count = rows.iter().filter(|row| row.band_key == band).count();
        match count {
            0 => issues.push(RubricIssue::MissingBand { band }),
            1 => {}
            _ => issues.push(RubricIssue::DuplicateBand { band, count }),
        }
    }

    let mut spans = Vec::new();
    for row in rows.iter().filter(|row| row.band_key.is_range_band()) {
        if let (Some(min_value), Some(max_value)) = (row.min_value, row.max_value) {
            if min_value > max_value {
                issues.push(RubricIssue::InvertedRange {
                    band: row.band_key,
                    min_value,
                    max_value,
                });
                continue;
            }
        }
        spans.push(Span::from_row(row));
    }

    let mut overlaps: Vec<(BandKey, BandKey)> = Vec::new();
    for (index, span) in spans.iter().enumerate() {
        for other in &spans[index + 1..] {
            if span.band == other.band || !span.intersects(other) {
                continue;
            }
            if span.pinned_to_edge(definition) || other.pinned_to_edge(definition) {
                continue;
            }
            let pair = if span.band < other.band {
                (span.band, other.band)
            } else {
                (other.band, span.band)
            };
            if !overlaps.contains(&pair) {
                overlaps.push(pair);
            }
        }
    }
    overlaps.sort();
    issues.extend(
        overlaps
            .into_iter()
            .map(|(higher, lower)| RubricIssue::Overlap { higher, lower }),
    );

    spans.sort_by(|a, b| a.low.total_cmp(&b.low));
    if let Some(first) = spans.first() {
        if let Some(domain_min) = definition.min_value.filter(|value| value.is_finite()) {
            if first.low > domain_min + FLOAT_SLACK {
                issues.push(RubricIssue::DomainNotCovered {
                    from: domain_min,
                    to: first.low,
                });
            }
        }

        let mut reach = *first;
        for span in &spans[1..] {
            if span.low - reach.high > policy.eps + FLOAT_SLACK {
                issues.push(RubricIssue::Gap {
                    below: reach.band,
                    above: span.band,
                    from: reach.high,
                    to: span.low,
                });
            }
            if span.high > reach.high {
                reach = *span;
            }
        }

        if let Some(domain_max) = definition.max_value.filter(|value| value.is_finite()) {
            if reach.high < domain_max - FLOAT_SLACK {
                issues.push(RubricIssue::DomainNotCovered {
                    from: reach.high,
                    to: domain_max,
                });
            }
        }
    }

    issues
}
