//! Transform Stage
//! Derives per-player rate metrics and builds the per-team aggregate table.

use super::clean::convert_types;
use super::{Stage, StageError, StageReport};
use crate::config::PipelineConfig;
use crate::data::coerce::to_float_column;
use crate::data::schema::derived;
use crate::data::{DataLoader, PlayerColumn};
use crate::stats::MetricsCalculator;
use polars::prelude::*;
use std::path::Path;

/// Load the cleaned table written by the clean stage.
pub fn load_cleaned(path: &Path) -> Result<DataFrame, StageError> {
    if !path.exists() {
        return Err(StageError::MissingUpstreamOutput {
            path: path.to_path_buf(),
            upstream: Stage::Clean,
        });
    }
    Ok(DataLoader::read_csv(path)?)
}

/// Restore column types lost in the CSV hand-off and make the columns
/// carried through cleaning as loaded (`App`, `PS%`) numeric.
pub fn restore_types(df: DataFrame) -> PolarsResult<DataFrame> {
    let mut df = convert_types(df)?;
    for column in [PlayerColumn::App, PlayerColumn::PassSuccess] {
        let coerced = to_float_column(df.column(column.name())?)?;
        df.with_column(coerced)?;
    }
    Ok(df)
}

/// Append the derived metric columns. Rate metrics that could not be
/// computed are set to zero; `Rating_norm` and `PS_Category` stay missing.
pub fn add_player_metrics(mut df: DataFrame) -> PolarsResult<DataFrame> {
    let metrics = MetricsCalculator::compute_player_metrics(&df)?;

    let categories: Vec<Option<&str>> = metrics
        .ps_category
        .iter()
        .map(|c| c.map(|c| c.label()))
        .collect();

    df.with_column(Column::new(derived::GOALS_PER90.into(), metrics.goals_per90))?;
    df.with_column(Column::new(
        derived::ASSISTS_PER90.into(),
        metrics.assists_per90,
    ))?;
    df.with_column(Column::new(derived::GI_PER90.into(), metrics.gi_per90))?;
    df.with_column(Column::new(derived::CARDS_PER90.into(), metrics.cards_per90))?;
    df.with_column(Column::new(derived::RATING_NORM.into(), metrics.rating_norm))?;
    df.with_column(Column::new(derived::PS_CATEGORY.into(), categories))?;

    let fills: Vec<Expr> = derived::ZERO_FILLED
        .iter()
        .map(|name| col(*name).fill_null(lit(0.0)))
        .collect();
    df.lazy().with_columns(fills).collect()
}

/// One row per team, sorted by team name.
pub fn build_team_stats(df: &DataFrame) -> PolarsResult<DataFrame> {
    MetricsCalculator::compute_team_stats(df)
}

/// Produce both output tables, rounded to two decimals, from a cleaned table.
pub fn transform_table(df: DataFrame) -> PolarsResult<(DataFrame, DataFrame)> {
    let df = restore_types(df)?;
    let players = add_player_metrics(df)?;
    let teams = build_team_stats(&players)?;
    Ok((
        MetricsCalculator::round_numeric(&players)?,
        MetricsCalculator::round_numeric(&teams)?,
    ))
}

pub fn run(config: &PipelineConfig) -> Result<StageReport, StageError> {
    tracing::info!(source = %config.cleaned_path.display(), "transform started");

    let cleaned = load_cleaned(&config.cleaned_path)?;
    let rows_in = cleaned.height();

    let (mut players, mut teams) = transform_table(cleaned)?;
    tracing::debug!(teams = teams.height(), "team aggregation built");

    DataLoader::write_csv(&mut players, &config.players_path)?;
    DataLoader::write_csv(&mut teams, &config.teams_path)?;

    let report = StageReport {
        stage: Stage::Transform,
        rows_in,
        rows_out: players.height(),
        outputs: vec![config.players_path.clone(), config.teams_path.clone()],
    };
    tracing::info!(
        rows_in = report.rows_in,
        teams = teams.height(),
        players_output = %config.players_path.display(),
        teams_output = %config.teams_path.display(),
        "transform finished"
    );
    Ok(report)
}
