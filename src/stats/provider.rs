use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use super::season::SeasonType;

/// Parameters of one team-ratings request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingsRequest {
    /// `YYYY-YY` season identifier
    pub season: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub season_type: SeasonType,
}

/// One team row as returned by the provider, before registry reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRow {
    pub team_name: String,
    pub off_rating: f64,
    pub def_rating: f64,
}

/// Trait that every team-statistics provider must implement.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Advanced per-team ratings for the requested window.
    async fn fetch_team_ratings(&self, request: &RatingsRequest) -> Result<Vec<ProviderRow>>;

    /// Human-readable name for logging and error reports.
    fn name(&self) -> &str;
}
