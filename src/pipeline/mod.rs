//! Pipeline module - The ingest, clean and transform stages

pub mod clean;
pub mod ingest;
pub mod transform;

use crate::config::PipelineConfig;
use crate::data::LoaderError;
use polars::prelude::PolarsError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// One of the three batch stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Ingest,
    Clean,
    Transform,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Ingest, Stage::Clean, Stage::Transform];

    /// Execute this stage with the given configuration.
    pub fn run(self, config: &PipelineConfig) -> Result<StageReport, StageError> {
        match self {
            Stage::Ingest => ingest::run(config),
            Stage::Clean => clean::run(config),
            Stage::Transform => transform::run(config),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Ingest => "ingest",
            Stage::Clean => "clean",
            Stage::Transform => "transform",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum StageError {
    #[error("Source file not found: {0}")]
    MissingSourceFile(PathBuf),
    #[error("Upstream output not found: {path} (run {upstream} first)")]
    MissingUpstreamOutput { path: PathBuf, upstream: Stage },
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Summary of a completed stage run.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub rows_in: usize,
    pub rows_out: usize,
    pub outputs: Vec<PathBuf>,
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} rows in, {} rows out ->",
            self.stage, self.rows_in, self.rows_out
        )?;
        for path in &self.outputs {
            write!(f, " {}", path.display())?;
        }
        Ok(())
    }
}

/// Run every stage in order, stopping at the first failure.
pub fn run_all(config: &PipelineConfig) -> Result<Vec<StageReport>, StageError> {
    Stage::ALL.iter().map(|stage| stage.run(config)).collect()
}
