//! Clean Stage
//! Coerces column types, normalizes text, filters implausible ages and
//! resolves missing values on the canonical table.

use super::{Stage, StageError, StageReport};
use crate::config::PipelineConfig;
use crate::data::coerce::{map_text_column, title_case, to_float_column, to_int_column};
use crate::data::{ColumnKind, DataLoader, PlayerColumn};
use polars::prelude::*;
use std::path::Path;

/// Youngest plausible player age, inclusive.
pub const MIN_AGE: i64 = 14;
/// Oldest plausible player age, inclusive.
pub const MAX_AGE: i64 = 50;

/// Load the canonical table written by ingest.
pub fn load_canonical(path: &Path) -> Result<DataFrame, StageError> {
    if !path.exists() {
        return Err(StageError::MissingUpstreamOutput {
            path: path.to_path_buf(),
            upstream: Stage::Ingest,
        });
    }
    Ok(DataLoader::read_csv(path)?)
}

/// Coerce integer columns to nullable Int64 and float columns to nullable
/// Float64. Unparseable values become null.
pub fn convert_types(mut df: DataFrame) -> PolarsResult<DataFrame> {
    for column in PlayerColumn::ALL {
        let source = df.column(column.name())?;
        let coerced = match column.kind() {
            ColumnKind::Integer => to_int_column(source)?,
            ColumnKind::Float => to_float_column(source)?,
            ColumnKind::Text | ColumnKind::Raw => continue,
        };
        df.with_column(coerced)?;
    }
    Ok(df)
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Trim names, title-case team names and upper-case positions.
/// Text left empty after trimming is treated as missing.
pub fn normalize_strings(mut df: DataFrame) -> PolarsResult<DataFrame> {
    let player = map_text_column(df.column(PlayerColumn::PlayerName.name())?, |v| {
        non_empty(v.trim().to_string())
    })?;
    let team = map_text_column(df.column(PlayerColumn::TeamName.name())?, |v| {
        non_empty(title_case(v.trim()))
    })?;
    let position = map_text_column(df.column(PlayerColumn::Position.name())?, |v| {
        non_empty(v.trim().to_uppercase())
    })?;

    df.with_column(player)?;
    df.with_column(team)?;
    df.with_column(position)?;
    Ok(df)
}

/// Keep rows with `MIN_AGE <= Age <= MAX_AGE`. A missing age fails both bounds.
pub fn fix_invalid_values(df: DataFrame) -> PolarsResult<DataFrame> {
    let age = col(PlayerColumn::Age.name());
    df.lazy()
        .filter(
            age.clone()
                .gt_eq(lit(MIN_AGE))
                .and(age.lt_eq(lit(MAX_AGE))),
        )
        .collect()
}

/// Zero-fill the counting columns, then drop rows without a player or team name.
pub fn handle_missing_values(df: DataFrame) -> PolarsResult<DataFrame> {
    let fills: Vec<Expr> = PlayerColumn::ZERO_FILLED
        .iter()
        .map(|column| col(column.name()).fill_null(lit(0i64)))
        .collect();
    let identity = PlayerColumn::IDENTITY
        .iter()
        .map(|column| col(column.name()).is_not_null())
        .reduce(|acc, e| acc.and(e))
        .unwrap_or_else(|| lit(true));

    df.lazy().with_columns(fills).filter(identity).collect()
}

/// Run every cleaning step in order on an in-memory canonical table.
pub fn clean_table(df: DataFrame) -> PolarsResult<DataFrame> {
    let df = convert_types(df)?;
    let df = normalize_strings(df)?;
    let before = df.height();
    let df = fix_invalid_values(df)?;
    tracing::debug!(removed = before - df.height(), "age filter applied");
    let before = df.height();
    let df = handle_missing_values(df)?;
    tracing::debug!(removed = before - df.height(), "rows without identity dropped");
    Ok(df)
}

pub fn run(config: &PipelineConfig) -> Result<StageReport, StageError> {
    tracing::info!(source = %config.canonical_path.display(), "clean started");

    let canonical = load_canonical(&config.canonical_path)?;
    let rows_in = canonical.height();

    let mut cleaned = clean_table(canonical)?;
    DataLoader::write_csv(&mut cleaned, &config.cleaned_path)?;

    let report = StageReport {
        stage: Stage::Clean,
        rows_in,
        rows_out: cleaned.height(),
        outputs: vec![config.cleaned_path.clone()],
    };
    tracing::info!(
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        output = %config.cleaned_path.display(),
        "clean finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::required_columns;

    /// Canonical text table with one row per entry of `rows`; unspecified
    /// cells are plausible defaults.
    fn canonical(rows: &[&[(&str, Option<&str>)]]) -> DataFrame {
        let defaults: &[(&str, &str)] = &[
            ("Player Name", "Pedri"),
            ("Team-name", "barcelona"),
            ("Age", "21"),
            ("Position", "am(c)"),
            ("App", "30"),
            ("MinP", "2400"),
            ("Goals", "5"),
            ("Assists", "4"),
            ("YC", "3"),
            ("RC", "0"),
            ("SPG", "1.2"),
            ("PS%", "88.5"),
            ("AW", "0.3"),
            ("MOTM", "2"),
            ("Rating", "7.12"),
        ];
        let columns = required_columns()
            .into_iter()
            .map(|name| {
                let default = defaults
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, v)| *v);
                let values: Vec<Option<&str>> = rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .find(|(n, _)| *n == name)
                            .map(|(_, v)| *v)
                            .unwrap_or(default)
                    })
                    .collect();
                Column::new(name.into(), values)
            })
            .collect();
        DataFrame::new(columns).expect("frame")
    }

    #[test]
    fn coerces_integer_and_float_columns() {
        let df = canonical(&[&[("Age", Some("x")), ("Rating", Some("seven"))]]);
        let df = convert_types(df).expect("convert");
        assert_eq!(df.column("Age").expect("age").dtype(), &DataType::Int64);
        assert_eq!(df.column("Rating").expect("rating").dtype(), &DataType::Float64);
        assert_eq!(df.column("Age").expect("age").null_count(), 1);
        assert_eq!(df.column("PS%").expect("ps").dtype(), &DataType::String);
    }

    #[test]
    fn normalizes_text_columns() {
        let df = canonical(&[&[
            ("Player Name", Some("  Vinicius Junior ")),
            ("Team-name", Some(" real madrid ")),
            ("Position", Some(" fw ")),
        ]]);
        let df = normalize_strings(df).expect("normalize");
        let text = |name: &str| -> Option<String> {
            df.column(name)
                .expect("column")
                .str()
                .expect("text")
                .get(0)
                .map(String::from)
        };
        assert_eq!(text("Player Name").as_deref(), Some("Vinicius Junior"));
        assert_eq!(text("Team-name").as_deref(), Some("Real Madrid"));
        assert_eq!(text("Position").as_deref(), Some("FW"));
    }

    #[test]
    fn age_bounds_are_inclusive_and_missing_age_is_dropped() {
        let df = canonical(&[
            &[("Age", Some("13"))],
            &[("Age", Some("14"))],
            &[("Age", Some("50"))],
            &[("Age", Some("51"))],
            &[("Age", None)],
        ]);
        let df = clean_table(df).expect("clean");
        let ages: Vec<Option<i64>> = df
            .column("Age")
            .expect("age")
            .i64()
            .expect("i64")
            .into_iter()
            .collect();
        assert_eq!(ages, vec![Some(14), Some(50)]);
    }

    #[test]
    fn fills_counts_and_drops_rows_without_identity() {
        let df = canonical(&[
            &[("Goals", None), ("MOTM", Some("n/a"))],
            &[("Player Name", None)],
            &[("Team-name", Some("   "))],
        ]);
        let df = clean_table(df).expect("clean");
        assert_eq!(df.height(), 1);
        for name in ["Goals", "Assists", "YC", "RC", "MOTM"] {
            assert_eq!(df.column(name).expect("column").null_count(), 0);
        }
        assert_eq!(df.column("Goals").expect("goals").i64().expect("i64").get(0), Some(0));
        assert_eq!(df.column("MOTM").expect("motm").i64().expect("i64").get(0), Some(0));
    }
}
