use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Scoring program a KPI configuration and rubric belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassType {
    #[serde(rename = "P4P")]
    P4p,
    #[serde(rename = "SMART")]
    Smart,
    #[serde(rename = "TECH")]
    Tech,
}

impl ClassType {
    pub const fn ordered() -> [Self; 3] {
        [Self::P4p, Self::Smart, Self::Tech]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::P4p => "P4P",
            Self::Smart => "SMART",
            Self::Tech => "TECH",
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ClassType {
    type Err = ParseKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "P4P" => Ok(Self::P4p),
            "SMART" => Ok(Self::Smart),
            "TECH" => Ok(Self::Tech),
            _ => Err(ParseKeyError::new("class type", value)),
        }
    }
}

/// Whether higher or lower raw values are better for a KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

impl FromStr for Direction {
    type Err = ParseKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "HIGHER_BETTER" => Ok(Self::HigherBetter),
            "LOWER_BETTER" => Ok(Self::LowerBetter),
            _ => Err(ParseKeyError::new("direction", value)),
        }
    }
}

/// Performance tier a raw value is classified into.
///
/// Variants are declared in classification priority order, so the derived `Ord`
/// agrees with [`BandKey::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BandKey {
    Exceeds,
    Meets,
    NeedsImprovement,
    Misses,
    NoData,
}

impl BandKey {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Exceeds,
            Self::Meets,
            Self::NeedsImprovement,
            Self::Misses,
            Self::NoData,
        ]
    }

    /// Bands that are matched by value range. `NoData` is only ever a fallback.
    pub const fn range_bands() -> [Self; 4] {
        [
            Self::Exceeds,
            Self::Meets,
            Self::NeedsImprovement,
            Self::Misses,
        ]
    }

    /// Classification priority; lower wins when several rows cover a value.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Exceeds => 0,
            Self::Meets => 1,
            Self::NeedsImprovement => 2,
            Self::Misses => 3,
            Self::NoData => 4,
        }
    }

    pub const fn is_range_band(self) -> bool {
        !matches!(self, Self::NoData)
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Exceeds => "EXCEEDS",
            Self::Meets => "MEETS",
            Self::NeedsImprovement => "NEEDS_IMPROVEMENT",
            Self::Misses => "MISSES",
            Self::NoData => "NO_DATA",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Exceeds => "Exceeds",
            Self::Meets => "Meets",
            Self::NeedsImprovement => "Needs Improvement",
            Self::Misses => "Misses",
            Self::NoData => "No Data",
        }
    }
}

impl fmt::Display for BandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BandKey {
    type Err = ParseKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        BandKey::ordered()
            .into_iter()
            .find(|band| band.code() == normalized)
            .ok_or_else(|| ParseKeyError::new("band key", value))
    }
}

/// Raised when a textual class type, direction, or band key is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseKeyError {
    kind: &'static str,
    value: String,
}

impl ParseKeyError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Definition of a measured indicator, shared across every class type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDefinition {
    pub kpi_key: String,
    pub label: String,
    #[serde(default)]
    pub customer_label: Option<String>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    pub direction: Direction,
}

impl KpiDefinition {
    pub fn display_label(&self) -> &str {
        self.customer_label
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .unwrap_or(&self.label)
    }
}

/// Per-class settings for one KPI. A missing row behaves like [`ClassKpiConfig::disabled`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassKpiConfig {
    pub class_type: ClassType,
    pub kpi_key: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub weight_percent: Option<f64>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub grade_value: Option<f64>,
}

impl ClassKpiConfig {
    pub fn disabled(class_type: ClassType, kpi_key: impl Into<String>) -> Self {
        Self {
            class_type,
            kpi_key: kpi_key.into(),
            enabled: false,
            weight_percent: None,
            threshold: None,
            grade_value: None,
        }
    }
}

/// One band row of a rubric; bounds are inclusive and `None` means unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricBand {
    pub class_type: ClassType,
    pub kpi_key: String,
    pub band_key: BandKey,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub score_value: Option<f64>,
}

impl RubricBand {
    pub fn contains(&self, value: f64) -> bool {
        self.min_value.map_or(true, |min| value >= min)
            && self.max_value.map_or(true, |max| value <= max)
    }
}

/// An entity's raw value for a KPI at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub entity_id: String,
    pub kpi_key: String,
    pub value: Option<f64>,
    #[serde(default)]
    pub observed_at: Option<NaiveDateTime>,
}

/// Why the classifier settled on a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    Matched,
    MissingValue,
    NoCoveringBand,
}

/// Scored outcome for one (entity, class type, KPI) triple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedKpiResult {
    pub band_key: BandKey,
    pub score_value: f64,
    pub reason: MatchReason,
}
