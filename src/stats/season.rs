use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// First month of a new NBA season; October games belong to the season
/// that starts that year.
const SEASON_START_MONTH: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SeasonType {
    #[default]
    RegularSeason,
    Playoffs,
    PlayIn,
    PreSeason,
}

impl SeasonType {
    /// Value of the `SeasonType` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            SeasonType::RegularSeason => "Regular Season",
            SeasonType::Playoffs => "Playoffs",
            SeasonType::PlayIn => "PlayIn",
            SeasonType::PreSeason => "Pre Season",
        }
    }
}

/// Calendar year the season containing `date` started in.
pub fn season_start_year(date: NaiveDate) -> i32 {
    if date.month() >= SEASON_START_MONTH {
        date.year()
    } else {
        date.year() - 1
    }
}

/// Season identifier in the `YYYY-YY` form, e.g. `2024-25`.
pub fn season_id(start_year: i32) -> String {
    format!("{}-{:02}", start_year, (start_year + 1).rem_euclid(100))
}
