use crate::render::{render_rubrics, render_scorecards, render_validation};
use clap::Args;
use kpi_scorecard::error::AppError;
use kpi_scorecard::scoring::{
    read_observations_path, BandWidthPolicy, ClassType, ConfigSnapshot, GeneratedRubric,
    RubricGenerator, RubricView, ScorecardView, ScoringEngine,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct RubricArgs {
    /// Configuration snapshot (JSON)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Class type to generate for (P4P, SMART, TECH)
    #[arg(long = "class", value_parser = parse_class)]
    pub(crate) class_type: ClassType,
    /// Limit generation to a single KPI
    #[arg(long)]
    pub(crate) kpi: Option<String>,
    /// Write the snapshot with refreshed rubric rows to this path
    #[arg(long)]
    pub(crate) write: Option<PathBuf>,
    /// Emit JSON instead of a text table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Configuration snapshot (JSON)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Observation export (CSV: entity_id,kpi_key,value[,observed_at])
    #[arg(long)]
    pub(crate) observations: PathBuf,
    /// Class type to score (P4P, SMART, TECH)
    #[arg(long = "class", value_parser = parse_class)]
    pub(crate) class_type: ClassType,
    /// Only report this entity
    #[arg(long)]
    pub(crate) entity: Option<String>,
    /// Emit JSON instead of a text table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Configuration snapshot (JSON)
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Class type to check (P4P, SMART, TECH)
    #[arg(long = "class", value_parser = parse_class)]
    pub(crate) class_type: ClassType,
    /// Emit JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn parse_class(raw: &str) -> Result<ClassType, String> {
    raw.parse::<ClassType>().map_err(|err| err.to_string())
}

pub(crate) fn run_rubric(args: RubricArgs, policy: BandWidthPolicy) -> Result<(), AppError> {
    let RubricArgs {
        snapshot,
        class_type,
        kpi,
        write,
        json,
    } = args;

    let mut snapshot = ConfigSnapshot::from_json_path(snapshot)?;
    let generated = refresh_rubrics(&mut snapshot, class_type, kpi.as_deref(), policy)?;
    info!(%class_type, kpis = generated.len(), "generated rubric defaults");

    let views: Vec<RubricView> = generated
        .iter()
        .map(|rubric| RubricView::from_rows(class_type, &rubric.kpi_key, &rubric.rows))
        .collect();

    if let Some(path) = write {
        snapshot.to_json_path(&path)?;
        info!(path = %path.display(), "wrote refreshed snapshot");
    }

    emit(&views, json, || render_rubrics(&views))
}

/// Regenerate one KPI (failing loudly) or every thresholded KPI of the class, storing
/// the rows back into the snapshot.
pub(crate) fn refresh_rubrics(
    snapshot: &mut ConfigSnapshot,
    class_type: ClassType,
    kpi: Option<&str>,
    policy: BandWidthPolicy,
) -> Result<Vec<GeneratedRubric>, AppError> {
    let generator = RubricGenerator::new(policy);

    let generated = match kpi {
        Some(kpi_key) => vec![GeneratedRubric {
            kpi_key: kpi_key.to_string(),
            rows: generator.regenerate(snapshot, class_type, kpi_key)?,
        }],
        None => {
            let generated = generator.generate_class(snapshot, class_type);
            for rubric in &generated {
                snapshot.upsert_rubric(class_type, &rubric.kpi_key, rubric.rows.clone());
            }
            generated
        }
    };

    Ok(generated)
}

pub(crate) fn run_score(args: ScoreArgs, policy: BandWidthPolicy) -> Result<(), AppError> {
    let ScoreArgs {
        snapshot,
        observations,
        class_type,
        entity,
        json,
    } = args;

    let snapshot = ConfigSnapshot::from_json_path(snapshot)?;
    let observations = read_observations_path(observations)?;
    let engine = ScoringEngine::with_policy(snapshot, policy);

    let views: Vec<ScorecardView> = match entity {
        Some(entity_id) => vec![engine
            .score_entity(&entity_id, class_type, &observations)
            .to_view()],
        None => engine
            .score_roster(class_type, &observations)
            .iter()
            .map(|scorecard| scorecard.to_view())
            .collect(),
    };
    info!(%class_type, entities = views.len(), "scored observations");

    emit(&views, json, || render_scorecards(&views))
}

pub(crate) fn run_validate(args: ValidateArgs, policy: BandWidthPolicy) -> Result<(), AppError> {
    let ValidateArgs {
        snapshot,
        class_type,
        json,
    } = args;

    let snapshot = ConfigSnapshot::from_json_path(snapshot)?;
    let validation = ScoringEngine::with_policy(snapshot, policy).validate(class_type);

    emit(&validation, json, || render_validation(&validation))
}

fn emit<T, F>(value: &T, json: bool, text: F) -> Result<(), AppError>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    if json {
        let body = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
        println!("{body}");
    } else {
        print!("{}", text());
    }
    Ok(())
}
