use crate::commands::{run_rubric, run_score, run_validate, RubricArgs, ScoreArgs, ValidateArgs};
use clap::{Parser, Subcommand};
use kpi_scorecard::config::AppConfig;
use kpi_scorecard::error::AppError;
use kpi_scorecard::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "kpi-scorecard",
    about = "Generate KPI rubrics and score technician performance from configuration snapshots",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate default rubric bands from configured thresholds
    Rubric(RubricArgs),
    /// Score raw observations against the snapshot's rubrics
    Score(ScoreArgs),
    /// Check weight totals and rubric coverage for a class type
    Validate(ValidateArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(?config.environment, "configuration loaded");

    let policy = config.scoring.band_policy;
    match cli.command {
        Command::Rubric(args) => run_rubric(args, policy),
        Command::Score(args) => run_score(args, policy),
        Command::Validate(args) => run_validate(args, policy),
    }
}
