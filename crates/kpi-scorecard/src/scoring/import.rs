use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::domain::RawObservation;

/// Failure reading an observation export.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read observations: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid observation CSV data: {0}")]
    Csv(#[from] csv::Error),
}

pub fn read_observations_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawObservation>, ImportError> {
    let file = File::open(path)?;
    read_observations(file)
}

/// Read `entity_id,kpi_key,value[,observed_at]` rows.
///
/// Blank or unparseable values are kept as `None` so they classify as no data.
pub fn read_observations<R: Read>(reader: R) -> Result<Vec<RawObservation>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut observations = Vec::new();

    for record in csv_reader.deserialize::<ObservationRow>() {
        let row = record?;
        let value = row.numeric_value();
        if value.is_none() && row.value.is_some() {
            debug!(
                entity_id = %row.entity_id,
                kpi_key = %row.kpi_key,
                raw = ?row.value,
                "unparseable observation value treated as missing"
            );
        }
        let observed_at = row.observed_at.as_deref().and_then(parse_datetime);

        observations.push(RawObservation {
            entity_id: row.entity_id,
            kpi_key: row.kpi_key,
            value,
            observed_at,
        });
    }

    Ok(observations)
}

#[derive(Debug, Deserialize)]
struct ObservationRow {
    entity_id: String,
    kpi_key: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    value: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    observed_at: Option<String>,
}

impl ObservationRow {
    fn numeric_value(&self) -> Option<f64> {
        self.value
            .as_deref()
            .and_then(|raw| raw.trim().trim_end_matches('%').trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}
