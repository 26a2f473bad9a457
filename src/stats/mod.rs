//! Stats module - Player metrics and team aggregation

mod calculator;

pub use calculator::{MetricsCalculator, PassCategory, PlayerMetrics, MINUTES_PER_MATCH};
