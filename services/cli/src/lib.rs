mod cli;
mod commands;
mod render;

use kpi_scorecard::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
