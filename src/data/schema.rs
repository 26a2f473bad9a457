//! Canonical Schema Module
//! Column names and groups shared by every pipeline stage.

use std::fmt;

/// Storage class a canonical column is coerced to during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text, kept as loaded apart from string normalization.
    Text,
    /// Whole numbers stored as nullable Int64.
    Integer,
    /// Real numbers stored as nullable Float64.
    Float,
    /// Numeric by meaning but carried through cleaning untouched.
    Raw,
}

/// Typed handle for a canonical player column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerColumn {
    PlayerName,
    TeamName,
    Age,
    Position,
    App,
    MinP,
    Goals,
    Assists,
    YC,
    RC,
    SPG,
    PassSuccess,
    AW,
    MOTM,
    Rating,
}

impl PlayerColumn {
    /// Every canonical column, in the order they are written.
    pub const ALL: [PlayerColumn; 15] = [
        PlayerColumn::PlayerName,
        PlayerColumn::TeamName,
        PlayerColumn::Age,
        PlayerColumn::Position,
        PlayerColumn::App,
        PlayerColumn::MinP,
        PlayerColumn::Goals,
        PlayerColumn::Assists,
        PlayerColumn::YC,
        PlayerColumn::RC,
        PlayerColumn::SPG,
        PlayerColumn::PassSuccess,
        PlayerColumn::AW,
        PlayerColumn::MOTM,
        PlayerColumn::Rating,
    ];

    /// Integer-semantic columns coerced to Int64 by the clean stage.
    pub const INTEGER: [PlayerColumn; 7] = [
        PlayerColumn::Age,
        PlayerColumn::MinP,
        PlayerColumn::Goals,
        PlayerColumn::Assists,
        PlayerColumn::YC,
        PlayerColumn::RC,
        PlayerColumn::MOTM,
    ];

    /// Float-semantic columns coerced to Float64 by the clean stage.
    pub const FLOAT: [PlayerColumn; 3] =
        [PlayerColumn::SPG, PlayerColumn::AW, PlayerColumn::Rating];

    /// Counting columns whose missing values are filled with zero.
    pub const ZERO_FILLED: [PlayerColumn; 5] = [
        PlayerColumn::Goals,
        PlayerColumn::Assists,
        PlayerColumn::YC,
        PlayerColumn::RC,
        PlayerColumn::MOTM,
    ];

    /// Text columns a row cannot exist without.
    pub const IDENTITY: [PlayerColumn; 2] = [PlayerColumn::PlayerName, PlayerColumn::TeamName];

    pub fn name(self) -> &'static str {
        match self {
            PlayerColumn::PlayerName => "Player Name",
            PlayerColumn::TeamName => "Team-name",
            PlayerColumn::Age => "Age",
            PlayerColumn::Position => "Position",
            PlayerColumn::App => "App",
            PlayerColumn::MinP => "MinP",
            PlayerColumn::Goals => "Goals",
            PlayerColumn::Assists => "Assists",
            PlayerColumn::YC => "YC",
            PlayerColumn::RC => "RC",
            PlayerColumn::SPG => "SPG",
            PlayerColumn::PassSuccess => "PS%",
            PlayerColumn::AW => "AW",
            PlayerColumn::MOTM => "MOTM",
            PlayerColumn::Rating => "Rating",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            PlayerColumn::PlayerName | PlayerColumn::TeamName | PlayerColumn::Position => {
                ColumnKind::Text
            }
            PlayerColumn::Age
            | PlayerColumn::MinP
            | PlayerColumn::Goals
            | PlayerColumn::Assists
            | PlayerColumn::YC
            | PlayerColumn::RC
            | PlayerColumn::MOTM => ColumnKind::Integer,
            PlayerColumn::SPG | PlayerColumn::AW | PlayerColumn::Rating => ColumnKind::Float,
            PlayerColumn::App | PlayerColumn::PassSuccess => ColumnKind::Raw,
        }
    }

    /// Look up a canonical column by its exact name.
    pub fn from_name(name: &str) -> Option<PlayerColumn> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for PlayerColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source column names mapped onto canonical ones. Matched case-insensitively
/// after trimming. `Assist` is the legacy spelling of `Assists`.
pub const SOURCE_ALIASES: &[(&str, PlayerColumn)] = &[
    ("Player", PlayerColumn::PlayerName),
    ("Name", PlayerColumn::PlayerName),
    ("Team", PlayerColumn::TeamName),
    ("Team Name", PlayerColumn::TeamName),
    ("Club", PlayerColumn::TeamName),
    ("Pos", PlayerColumn::Position),
    ("Apps", PlayerColumn::App),
    ("Appearances", PlayerColumn::App),
    ("Mins", PlayerColumn::MinP),
    ("Minutes", PlayerColumn::MinP),
    ("Minutes Played", PlayerColumn::MinP),
    ("Assist", PlayerColumn::Assists),
    ("Yellow Cards", PlayerColumn::YC),
    ("Red Cards", PlayerColumn::RC),
    ("Shots per Game", PlayerColumn::SPG),
    ("Shots", PlayerColumn::SPG),
    ("Pass Success", PlayerColumn::PassSuccess),
    ("Pass Success %", PlayerColumn::PassSuccess),
    ("PassSuccPerc", PlayerColumn::PassSuccess),
    ("Aerials Won", PlayerColumn::AW),
    ("AerialsWon", PlayerColumn::AW),
    ("Man of the Match", PlayerColumn::MOTM),
    ("ManOfTheMatch", PlayerColumn::MOTM),
];

/// Resolve a raw header to its canonical column, if it names one.
pub fn canonical_for(header: &str) -> Option<PlayerColumn> {
    let header = header.trim();
    PlayerColumn::from_name(header).or_else(|| {
        SOURCE_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(header))
            .map(|(_, column)| *column)
    })
}

/// Canonical column names in output order.
pub fn required_columns() -> Vec<&'static str> {
    PlayerColumn::ALL.iter().map(|c| c.name()).collect()
}

/// Derived per-player columns appended by the transform stage.
pub mod derived {
    pub const GOALS_PER90: &str = "Goals_per90";
    pub const ASSISTS_PER90: &str = "Assists_per90";
    pub const GI_PER90: &str = "GI_per90";
    pub const CARDS_PER90: &str = "Cards_per90";
    pub const RATING_NORM: &str = "Rating_norm";
    pub const PS_CATEGORY: &str = "PS_Category";

    /// Rate columns whose missing values are filled with zero.
    pub const ZERO_FILLED: [&str; 4] = [GOALS_PER90, ASSISTS_PER90, GI_PER90, CARDS_PER90];
}

/// Column names of the per-team aggregate table.
pub mod team {
    pub const PLAYERS: &str = "Players";
    pub const AVG_AGE: &str = "Avg_Age";
    pub const TOTAL_GOALS: &str = "Total_Goals";
    pub const AVG_GOALS_PER90: &str = "Avg_Goals_per90";
    pub const TOTAL_ASSISTS: &str = "Total_Assists";
    pub const AVG_RATING: &str = "Avg_rating";
    pub const TOTAL_MINUTES: &str = "Total_minutes";
    pub const TOTAL_YC: &str = "Total_YC";
    pub const TOTAL_RC: &str = "Total_RC";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_resolve_to_themselves() {
        for column in PlayerColumn::ALL {
            assert_eq!(canonical_for(column.name()), Some(column));
        }
    }

    #[test]
    fn legacy_assist_resolves_to_assists() {
        assert_eq!(canonical_for("Assist"), Some(PlayerColumn::Assists));
        assert_eq!(canonical_for("  assist "), Some(PlayerColumn::Assists));
    }

    #[test]
    fn aliases_match_case_insensitively() {
        assert_eq!(canonical_for("team"), Some(PlayerColumn::TeamName));
        assert_eq!(canonical_for("MINUTES PLAYED"), Some(PlayerColumn::MinP));
        assert_eq!(canonical_for("Nationality"), None);
    }

    #[test]
    fn column_groups_agree_with_kinds() {
        assert!(PlayerColumn::INTEGER
            .iter()
            .all(|c| c.kind() == ColumnKind::Integer));
        assert!(PlayerColumn::FLOAT.iter().all(|c| c.kind() == ColumnKind::Float));
        assert_eq!(required_columns().len(), 15);
    }
}
