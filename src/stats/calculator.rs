//! Metrics Calculator Module
//! Null-safe per-player rate metrics and per-team aggregation.

use crate::data::coerce::float_values;
use crate::data::schema::{derived, team};
use crate::data::PlayerColumn;
use polars::prelude::*;
use std::fmt;

/// Minutes in a full match, the per-90 normalization base.
pub const MINUTES_PER_MATCH: f64 = 90.0;

/// Pass-success bucket. Bins are right-inclusive: `(0, 70]`, `(70, 80]`,
/// `(80, 90]`, `(90, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassCategory {
    Poor,
    Average,
    Good,
    Excellent,
}

impl PassCategory {
    /// Bucket a pass-success percentage. Values outside `(0, 100]` have no bucket.
    pub fn from_pass_success(pct: f64) -> Option<PassCategory> {
        if !(pct > 0.0 && pct <= 100.0) {
            return None;
        }
        Some(if pct <= 70.0 {
            PassCategory::Poor
        } else if pct <= 80.0 {
            PassCategory::Average
        } else if pct <= 90.0 {
            PassCategory::Good
        } else {
            PassCategory::Excellent
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            PassCategory::Poor => "Poor",
            PassCategory::Average => "Average",
            PassCategory::Good => "Good",
            PassCategory::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for PassCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived metrics for every row of a player table, before zero-filling.
#[derive(Debug, Clone, Default)]
pub struct PlayerMetrics {
    pub goals_per90: Vec<Option<f64>>,
    pub assists_per90: Vec<Option<f64>>,
    pub gi_per90: Vec<Option<f64>>,
    pub cards_per90: Vec<Option<f64>>,
    pub rating_norm: Vec<Option<f64>>,
    pub ps_category: Vec<Option<PassCategory>>,
}

/// Handles the metric computations of the transform stage.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Rate of `count` per 90 minutes. Zero or missing minutes give `None`.
    pub fn per90(count: Option<f64>, minutes: Option<f64>) -> Option<f64> {
        let minutes = minutes.filter(|m| *m != 0.0)?;
        Some(count? / minutes * MINUTES_PER_MATCH)
    }

    /// Largest rating in the table, ignoring missing values.
    pub fn rating_max(ratings: &[Option<f64>]) -> Option<f64> {
        ratings
            .iter()
            .flatten()
            .copied()
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
    }

    /// Rating scaled by the table maximum. A non-positive or undefined maximum
    /// gives `None` for every row.
    pub fn rating_norm(rating: Option<f64>, max: Option<f64>) -> Option<f64> {
        let max = max.filter(|m| *m > 0.0)?;
        Some(rating? / max)
    }

    /// Sum of two optional values, missing if either side is.
    fn add(a: Option<f64>, b: Option<f64>) -> Option<f64> {
        Some(a? + b?)
    }

    /// Compute every derived player metric for the given table.
    pub fn compute_player_metrics(df: &DataFrame) -> PolarsResult<PlayerMetrics> {
        let minutes = float_values(df, PlayerColumn::MinP.name())?;
        let goals = float_values(df, PlayerColumn::Goals.name())?;
        let assists = float_values(df, PlayerColumn::Assists.name())?;
        let yellow = float_values(df, PlayerColumn::YC.name())?;
        let red = float_values(df, PlayerColumn::RC.name())?;
        let ratings = float_values(df, PlayerColumn::Rating.name())?;
        let pass_success = float_values(df, PlayerColumn::PassSuccess.name())?;

        let max_rating = Self::rating_max(&ratings);
        if max_rating.filter(|m| *m > 0.0).is_none() {
            tracing::warn!(
                ?max_rating,
                "rating maximum is not positive, Rating_norm left empty"
            );
        }

        let mut metrics = PlayerMetrics::default();
        for i in 0..df.height() {
            let g90 = Self::per90(goals[i], minutes[i]);
            let a90 = Self::per90(assists[i], minutes[i]);
            metrics.goals_per90.push(g90);
            metrics.assists_per90.push(a90);
            metrics.gi_per90.push(Self::add(g90, a90));
            metrics
                .cards_per90
                .push(Self::per90(Self::add(yellow[i], red[i]), minutes[i]));
            metrics
                .rating_norm
                .push(Self::rating_norm(ratings[i], max_rating));
            metrics
                .ps_category
                .push(pass_success[i].and_then(PassCategory::from_pass_success));
        }

        Ok(metrics)
    }

    /// Aggregate a player table into one row per team, ordered by team name.
    ///
    /// Goals per 90 are recomputed from the raw columns with the same
    /// zero-minutes rule as the player metrics, and left unfilled so that
    /// players without minutes do not drag the team mean down.
    pub fn compute_team_stats(df: &DataFrame) -> PolarsResult<DataFrame> {
        let minutes = float_values(df, PlayerColumn::MinP.name())?;
        let goals = float_values(df, PlayerColumn::Goals.name())?;
        let goals_per90: Vec<Option<f64>> = goals
            .iter()
            .zip(&minutes)
            .map(|(g, m)| Self::per90(*g, *m))
            .collect();

        let mut work = df.clone();
        work.with_column(Column::new(derived::GOALS_PER90.into(), goals_per90))?;

        let team_col = PlayerColumn::TeamName.name();
        work.lazy()
            .group_by([col(team_col)])
            .agg([
                col(PlayerColumn::PlayerName.name())
                    .count()
                    .cast(DataType::Int64)
                    .alias(team::PLAYERS),
                col(PlayerColumn::Age.name())
                    .cast(DataType::Float64)
                    .mean()
                    .alias(team::AVG_AGE),
                Self::total(PlayerColumn::Goals).alias(team::TOTAL_GOALS),
                col(derived::GOALS_PER90)
                    .mean()
                    .alias(team::AVG_GOALS_PER90),
                Self::total(PlayerColumn::Assists).alias(team::TOTAL_ASSISTS),
                col(PlayerColumn::Rating.name())
                    .cast(DataType::Float64)
                    .mean()
                    .alias(team::AVG_RATING),
                Self::total(PlayerColumn::MinP).alias(team::TOTAL_MINUTES),
                Self::total(PlayerColumn::YC).alias(team::TOTAL_YC),
                Self::total(PlayerColumn::RC).alias(team::TOTAL_RC),
            ])
            .sort([team_col], SortMultipleOptions::default())
            .collect()
    }

    fn total(column: PlayerColumn) -> Expr {
        col(column.name()).cast(DataType::Int64).sum()
    }

    /// Round to two decimal places, ties to even.
    pub fn round2(value: f64) -> f64 {
        (value * 100.0).round_ties_even() / 100.0
    }

    /// Round every floating point column of a table to two decimals.
    pub fn round_numeric(df: &DataFrame) -> PolarsResult<DataFrame> {
        let columns = df
            .get_columns()
            .iter()
            .map(|column| -> PolarsResult<Column> {
                match column.dtype() {
                    DataType::Float32 | DataType::Float64 => {
                        let values: Vec<Option<f64>> = column
                            .cast(&DataType::Float64)?
                            .f64()?
                            .into_iter()
                            .map(|v| v.map(Self::round2))
                            .collect();
                        Ok(Column::new(column.name().clone(), values))
                    }
                    _ => Ok(column.clone()),
                }
            })
            .collect::<PolarsResult<Vec<_>>>()?;
        DataFrame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per90_is_null_safe() {
        assert_eq!(MetricsCalculator::per90(Some(5.0), Some(0.0)), None);
        assert_eq!(MetricsCalculator::per90(Some(5.0), None), None);
        assert_eq!(MetricsCalculator::per90(None, Some(900.0)), None);
        assert_eq!(MetricsCalculator::per90(Some(5.0), Some(900.0)), Some(0.5));
    }

    #[test]
    fn pass_category_bins_are_right_inclusive() {
        assert_eq!(PassCategory::from_pass_success(0.0), None);
        assert_eq!(PassCategory::from_pass_success(0.1), Some(PassCategory::Poor));
        assert_eq!(PassCategory::from_pass_success(70.0), Some(PassCategory::Poor));
        assert_eq!(
            PassCategory::from_pass_success(70.01),
            Some(PassCategory::Average)
        );
        assert_eq!(PassCategory::from_pass_success(80.0), Some(PassCategory::Average));
        assert_eq!(PassCategory::from_pass_success(90.0), Some(PassCategory::Good));
        assert_eq!(
            PassCategory::from_pass_success(100.0),
            Some(PassCategory::Excellent)
        );
        assert_eq!(PassCategory::from_pass_success(100.5), None);
        assert_eq!(PassCategory::from_pass_success(f64::NAN), None);
    }

    #[test]
    fn rating_norm_needs_positive_max() {
        let ratings = [Some(6.0), None, Some(7.5)];
        let max = MetricsCalculator::rating_max(&ratings);
        assert_eq!(max, Some(7.5));
        assert_eq!(MetricsCalculator::rating_norm(Some(6.0), max), Some(0.8));
        assert_eq!(MetricsCalculator::rating_norm(Some(6.0), Some(0.0)), None);
        assert_eq!(MetricsCalculator::rating_norm(Some(6.0), None), None);
        assert_eq!(MetricsCalculator::rating_max(&[None, None]), None);
    }

    #[test]
    fn round2_rounds_ties_to_even() {
        assert_eq!(MetricsCalculator::round2(0.125), 0.12);
        assert_eq!(MetricsCalculator::round2(0.375), 0.38);
        assert_eq!(MetricsCalculator::round2(0.456), 0.46);
        assert_eq!(MetricsCalculator::round2(1.0), 1.0);
        assert_eq!(MetricsCalculator::round2(-2.344), -2.34);
    }

    #[test]
    fn team_stats_sum_and_count_per_team() {
        let df = DataFrame::new(vec![
            Column::new("Player Name".into(), vec!["A", "B", "C"]),
            Column::new("Team-name".into(), vec!["Real Madrid", "Barcelona", "Real Madrid"]),
            Column::new("Age".into(), vec![Some(20i64), Some(30), Some(30)]),
            Column::new("MinP".into(), vec![Some(900i64), Some(0), Some(1800)]),
            Column::new("Goals".into(), vec![3i64, 2, 5]),
            Column::new("Assists".into(), vec![1i64, 0, 2]),
            Column::new("YC".into(), vec![0i64, 1, 2]),
            Column::new("RC".into(), vec![0i64, 0, 1]),
            Column::new("Rating".into(), vec![Some(7.0), Some(6.0), None]),
        ])
        .expect("frame");

        let teams = MetricsCalculator::compute_team_stats(&df).expect("teams");
        assert_eq!(teams.height(), 2);

        let names: Vec<Option<&str>> = teams
            .column("Team-name")
            .expect("team")
            .str()
            .expect("str")
            .into_iter()
            .collect();
        assert_eq!(names, vec![Some("Barcelona"), Some("Real Madrid")]);

        let goals: Vec<Option<i64>> = teams
            .column(team::TOTAL_GOALS)
            .expect("goals")
            .i64()
            .expect("i64")
            .into_iter()
            .collect();
        assert_eq!(goals, vec![Some(2), Some(8)]);

        let players: Vec<Option<i64>> = teams
            .column(team::PLAYERS)
            .expect("players")
            .i64()
            .expect("i64")
            .into_iter()
            .collect();
        assert_eq!(players, vec![Some(1), Some(2)]);

        let g90: Vec<Option<f64>> = teams
            .column(team::AVG_GOALS_PER90)
            .expect("g90")
            .f64()
            .expect("f64")
            .into_iter()
            .collect();
        // Barcelona's only player has zero minutes.
        assert_eq!(g90[0], None);
        assert!((g90[1].expect("real madrid rate") - 0.275).abs() < 1e-9);

        let rating: Vec<Option<f64>> = teams
            .column(team::AVG_RATING)
            .expect("rating")
            .f64()
            .expect("f64")
            .into_iter()
            .collect();
        assert_eq!(rating, vec![Some(6.0), Some(7.0)]);
    }
}
