use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::audit::{audit_rubric, RubricIssue};
use super::classifier::score_kpi;
use super::domain::{BandKey, ClassType, MatchReason, RawObservation};
use super::policy::BandWidthPolicy;
use super::rollup::{
    check_weights, contribution, rollup_weighted, WeightCheck, WeightedScore,
};
use super::snapshot::ConfigSnapshot;

/// Scored line for one KPI of an entity's scorecard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiScoreLine {
    pub kpi_key: String,
    pub label: String,
    pub metric_value: Option<f64>,
    pub band_key: BandKey,
    pub reason: MatchReason,
    pub score_value: f64,
    pub weight_percent: Option<f64>,
    pub enabled: bool,
    pub weighted_points: f64,
}

impl KpiScoreLine {
    fn weighted(&self) -> WeightedScore {
        WeightedScore {
            kpi_key: self.kpi_key.clone(),
            score_value: self.score_value,
            weight_percent: self.weight_percent,
            enabled: self.enabled,
        }
    }
}

/// Every KPI line plus the weighted total for one entity and class type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityScorecard {
    pub entity_id: String,
    pub class_type: ClassType,
    pub lines: Vec<KpiScoreLine>,
    pub total: f64,
}

/// Configuration findings for one class type, produced by [`ScoringEngine::validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassValidation {
    pub class_type: ClassType,
    pub weights: WeightCheck,
    pub rubric_issues: Vec<KpiRubricIssues>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiRubricIssues {
    pub kpi_key: String,
    pub issues: Vec<RubricIssue>,
}

/// Scores observations against a configuration snapshot. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    snapshot: ConfigSnapshot,
    policy: BandWidthPolicy,
}

impl ScoringEngine {
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self::with_policy(snapshot, BandWidthPolicy::default())
    }

    pub fn with_policy(snapshot: ConfigSnapshot, policy: BandWidthPolicy) -> Self {
        Self { snapshot, policy }
    }

    pub fn snapshot(&self) -> &ConfigSnapshot {
        &self.snapshot
    }

    /// Score one entity. Each KPI uses the entity's most recent observation.
    pub fn score_entity(
        &self,
        entity_id: &str,
        class_type: ClassType,
        observations: &[RawObservation],
    ) -> EntityScorecard {
        let latest = latest_values(
            observations
                .iter()
                .filter(|observation| observation.entity_id == entity_id),
        );

        let lines: Vec<KpiScoreLine> = self
            .snapshot
            .kpis
            .iter()
            .map(|definition| {
                let config = self.snapshot.class_config(class_type, &definition.kpi_key);
                let rows = self.snapshot.rubric_for(class_type, &definition.kpi_key);
                let metric_value = latest.get(definition.kpi_key.as_str()).copied().flatten();
                let result = score_kpi(metric_value, &rows);

                if config.enabled && result.reason == MatchReason::NoCoveringBand {
                    debug!(
                        entity_id,
                        %class_type,
                        kpi_key = %definition.kpi_key,
                        ?metric_value,
                        "value not covered by any rubric band"
                    );
                }

                let mut line = KpiScoreLine {
                    kpi_key: definition.kpi_key.clone(),
                    label: definition.display_label().to_string(),
                    metric_value,
                    band_key: result.band_key,
                    reason: result.reason,
                    score_value: result.score_value,
                    weight_percent: config.weight_percent,
                    enabled: config.enabled,
                    weighted_points: 0.0,
                };
                line.weighted_points = contribution(&line.weighted());
                line
            })
            .collect();

        let weighted: Vec<WeightedScore> = lines.iter().map(KpiScoreLine::weighted).collect();
        let total = rollup_weighted(&weighted);
        debug!(entity_id, %class_type, total, "scored entity");

        EntityScorecard {
            entity_id: entity_id.to_string(),
            class_type,
            lines,
            total,
        }
    }

    /// Score every entity present in `observations`, ordered by entity id.
    pub fn score_roster(
        &self,
        class_type: ClassType,
        observations: &[RawObservation],
    ) -> Vec<EntityScorecard> {
        let mut by_entity: BTreeMap<&str, Vec<RawObservation>> = BTreeMap::new();
        for observation in observations {
            by_entity
                .entry(observation.entity_id.as_str())
                .or_default()
                .push(observation.clone());
        }

        by_entity
            .into_iter()
            .map(|(entity_id, entity_observations)| {
                self.score_entity(entity_id, class_type, &entity_observations)
            })
            .collect()
    }

    /// Advisory checks for a class: weight sum and rubric structure per enabled KPI.
    pub fn validate(&self, class_type: ClassType) -> ClassValidation {
        let weighted: Vec<WeightedScore> = self
            .snapshot
            .kpis
            .iter()
            .map(|definition| {
                let config = self.snapshot.class_config(class_type, &definition.kpi_key);
                WeightedScore {
                    kpi_key: definition.kpi_key.clone(),
                    score_value: 0.0,
                    weight_percent: config.weight_percent,
                    enabled: config.enabled,
                }
            })
            .collect();
        let weights = check_weights(&weighted);
        if !weights.nominal {
            warn!(
                %class_type,
                total = weights.enabled_weight_total,
                "enabled KPI weights do not sum to 100"
            );
        }

        let rubric_issues = self
            .snapshot
            .kpis
            .iter()
            .filter(|definition| {
                self.snapshot
                    .class_config(class_type, &definition.kpi_key)
                    .enabled
            })
            .filter_map(|definition| {
                let rows = self.snapshot.rubric_for(class_type, &definition.kpi_key);
                let issues = audit_rubric(definition, &rows, &self.policy);
                (!issues.is_empty()).then(|| KpiRubricIssues {
                    kpi_key: definition.kpi_key.clone(),
                    issues,
                })
            })
            .collect();

        ClassValidation {
            class_type,
            weights,
            rubric_issues,
        }
    }
}

/// Latest value per KPI. Untimestamped observations rank oldest; among equals the
/// later input wins.
fn latest_values<'a, I>(observations: I) -> BTreeMap<&'a str, Option<f64>>
where
    I: IntoIterator<Item = &'a RawObservation>,
{
    let mut latest: BTreeMap<&'a str, &'a RawObservation> = BTreeMap::new();
    for observation in observations {
        let replace = match latest.get(observation.kpi_key.as_str()) {
            Some(current) => observation.observed_at >= current.observed_at,
            None => true,
        };
        if replace {
            latest.insert(observation.kpi_key.as_str(), observation);
        }
    }

    latest
        .into_iter()
        .map(|(kpi_key, observation)| (kpi_key, observation.value))
        .collect()
}
