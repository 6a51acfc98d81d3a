use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The time slice a batch of ratings belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeSlice {
    Date { date: NaiveDate },
    Interval { start: NaiveDate, end: NaiveDate },
}

/// One team's unnormalized performance for one time slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTeamRating {
    /// Canonical team display name
    pub team: String,
    pub slice: TimeSlice,
    /// Points scored per 100 possessions
    pub offense_metric: f64,
    /// Points allowed per 100 possessions (lower is better)
    pub defense_metric: f64,
}

/// One team's rescaled position on the unit square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPosition {
    pub team: String,
    /// Normalized offense, 1.0 = best offense in the batch
    pub x: f64,
    /// Normalized defense, 1.0 = best (lowest) defense in the batch
    pub y: f64,
}

/// A stored row of the historical day-by-day table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRating {
    pub date: NaiveDate,
    pub team: String,
    pub off_rating: f64,
    pub def_rating: f64,
}

impl DailyRating {
    pub fn to_raw(&self) -> RawTeamRating {
        RawTeamRating {
            team: self.team.clone(),
            slice: TimeSlice::Date { date: self.date },
            offense_metric: self.off_rating,
            defense_metric: self.def_rating,
        }
    }
}

/// First/last date present in the historical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}
