//! La Liga player statistics pipeline.
//!
//! Three batch stages hand tables to each other through CSV files:
//! ingest maps the raw export onto the canonical schema, clean enforces
//! types and value domains, and transform derives per-player rates and
//! per-team aggregates.

pub mod config;
pub mod data;
pub mod pipeline;
pub mod stats;

pub use config::{ConfigError, PipelineConfig};
pub use pipeline::{run_all, Stage, StageError, StageReport};
