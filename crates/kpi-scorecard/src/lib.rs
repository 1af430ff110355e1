//! Rubric default generation and weighted KPI scoring.
//!
//! The [`scoring`] tree holds the pure engine. [`config`], [`error`], and [`telemetry`]
//! carry the process-level concerns shared by the command-line front end.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
