use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{ClassKpiConfig, ClassType, KpiDefinition, RubricBand};

/// Immutable-per-run view of KPI definitions, class configuration, and rubric rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default)]
    pub kpis: Vec<KpiDefinition>,
    #[serde(default)]
    pub class_kpis: Vec<ClassKpiConfig>,
    #[serde(default)]
    pub rubric: Vec<RubricBand>,
}

/// Failure loading or saving a snapshot document.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to access snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigSnapshot {
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    pub fn to_json_writer<W: Write>(&self, writer: W) -> Result<(), SnapshotError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn to_json_path<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_json_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn definition(&self, kpi_key: &str) -> Option<&KpiDefinition> {
        self.kpis.iter().find(|definition| definition.kpi_key == kpi_key)
    }

    /// Configuration for the pair, or a disabled row without threshold when none is stored.
    pub fn class_config(&self, class_type: ClassType, kpi_key: &str) -> ClassKpiConfig {
        self.class_kpis
            .iter()
            .find(|config| config.class_type == class_type && config.kpi_key == kpi_key)
            .cloned()
            .unwrap_or_else(|| ClassKpiConfig::disabled(class_type, kpi_key))
    }

    /// Rubric rows for the pair in storage order.
    pub fn rubric_for(&self, class_type: ClassType, kpi_key: &str) -> Vec<RubricBand> {
        self.rubric
            .iter()
            .filter(|row| row.class_type == class_type && row.kpi_key == kpi_key)
            .cloned()
            .collect()
    }

    /// Replace every stored band of the pair with `rows`.
    pub fn upsert_rubric(&mut self, class_type: ClassType, kpi_key: &str, rows: Vec<RubricBand>) {
        self.rubric
            .retain(|row| !(row.class_type == class_type && row.kpi_key == kpi_key));
        self.rubric.extend(rows.into_iter().map(|mut row| {
            row.class_type = class_type;
            row.kpi_key = kpi_key.to_string();
            row
        }));
    }
}
