//! Ingest Stage
//! Loads the raw table, maps source headers onto the canonical schema,
//! drops fully empty rows and validates the required columns.

use super::{Stage, StageError, StageReport};
use crate::config::PipelineConfig;
use crate::data::schema::{canonical_for, required_columns};
use crate::data::{DataLoader, PlayerColumn};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;

/// Load the raw source table.
pub fn load_raw(path: &Path) -> Result<DataFrame, StageError> {
    if !path.exists() {
        return Err(StageError::MissingSourceFile(path.to_path_buf()));
    }
    Ok(DataLoader::read_csv(path)?)
}

/// Trim headers and rename known source columns to their canonical names.
///
/// A column already carrying a canonical name wins over an alias of it; the
/// alias column then keeps its own (non-canonical) name. Repeated headers
/// keep their first occurrence only.
pub fn rename_columns(df: &DataFrame) -> PolarsResult<DataFrame> {
    let direct: HashSet<&str> = df
        .get_columns()
        .iter()
        .map(|column| column.name().as_str().trim())
        .filter(|name| PlayerColumn::from_name(name).is_some())
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let trimmed = column.name().as_str().trim();
        let target = match canonical_for(trimmed) {
            Some(canonical) if canonical.name() == trimmed => trimmed,
            Some(canonical) if !direct.contains(canonical.name()) => canonical.name(),
            _ => trimmed,
        };

        if !seen.insert(target.to_string()) {
            tracing::debug!(header = %column.name(), "dropping repeated column");
            continue;
        }
        if target != column.name().as_str() {
            tracing::debug!(from = %column.name(), to = target, "renamed column");
        }
        columns.push(column.clone().with_name(target.into()));
    }

    DataFrame::new(columns)
}

/// Drop rows in which every cell is missing.
pub fn drop_empty_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    let mut keep = vec![false; df.height()];
    for column in df.get_columns() {
        for (i, present) in column.is_not_null().into_iter().enumerate() {
            if present.unwrap_or(false) {
                keep[i] = true;
            }
        }
    }
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    df.filter(&mask)
}

/// Rename headers, then drop fully empty rows.
pub fn canonicalize(df: &DataFrame) -> PolarsResult<DataFrame> {
    let renamed = rename_columns(df)?;
    drop_empty_rows(&renamed)
}

/// Required canonical columns absent from the table, sorted by name.
pub fn missing_columns(df: &DataFrame) -> Vec<String> {
    let present: HashSet<&str> = df
        .get_columns()
        .iter()
        .map(|column| column.name().as_str())
        .collect();
    let mut missing: Vec<String> = required_columns()
        .into_iter()
        .filter(|name| !present.contains(name))
        .map(String::from)
        .collect();
    missing.sort();
    missing
}

/// Fail with [`StageError::MissingColumns`] unless every required column is present.
pub fn validate_columns(df: &DataFrame) -> Result<(), StageError> {
    let missing = missing_columns(df);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StageError::MissingColumns(missing))
    }
}

/// Project onto the canonical columns, in canonical order.
pub fn select_canonical(df: &DataFrame) -> PolarsResult<DataFrame> {
    let extra: Vec<&str> = df
        .get_columns()
        .iter()
        .map(|column| column.name().as_str())
        .filter(|name| PlayerColumn::from_name(name).is_none())
        .collect();
    if !extra.is_empty() {
        tracing::debug!(?extra, "discarding non-canonical columns");
    }
    df.select(required_columns())
}

pub fn run(config: &PipelineConfig) -> Result<StageReport, StageError> {
    tracing::info!(source = %config.raw_path.display(), "ingest started");

    let raw = load_raw(&config.raw_path)?;
    let rows_in = raw.height();

    let canonical = canonicalize(&raw)?;
    validate_columns(&canonical)?;
    let mut canonical = select_canonical(&canonical)?;

    DataLoader::write_csv(&mut canonical, &config.canonical_path)?;

    let report = StageReport {
        stage: Stage::Ingest,
        rows_in,
        rows_out: canonical.height(),
        outputs: vec![config.canonical_path.clone()],
    };
    tracing::info!(
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        output = %config.canonical_path.display(),
        "ingest finished"
    );
    Ok(report)
}
