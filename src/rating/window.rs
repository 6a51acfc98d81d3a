use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::db::models::{RawTeamRating, TimeSlice};
use crate::db::HistoricalTable;
use crate::error::ContenderError;
use crate::stats::{season_id, season_start_year, RatingsRequest, SeasonType, StatsProvider, TeamRegistry};

/// What the caller wants to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WindowQuery {
    PointInTime { date: NaiveDate },
    Interval { start: NaiveDate, end: NaiveDate },
}

impl WindowQuery {
    pub fn point_in_time(date: NaiveDate) -> Self {
        WindowQuery::PointInTime { date }
    }

    /// Build an interval query, rejecting `start > end`.
    pub fn interval(start: NaiveDate, end: NaiveDate) -> Result<Self, ContenderError> {
        if start > end {
            return Err(ContenderError::InvalidInput(format!(
                "interval start {} is after end {}",
                start, end
            )));
        }
        Ok(WindowQuery::Interval { start, end })
    }
}

/// A live provider plus what is needed to call it and check its answer.
#[derive(Clone, Copy)]
pub struct LiveSource<'a> {
    pub provider: &'a dyn StatsProvider,
    pub registry: &'a TeamRegistry,
    pub season_type: SeasonType,
    pub timeout: Duration,
}

/// Where rows for a query come from.
#[derive(Clone, Copy)]
pub enum DataSource<'a> {
    /// Materialized day-by-day table, queried by date.
    Static(&'a HistoricalTable),
    /// External provider, queried per window.
    Live(LiveSource<'a>),
}

/// Resolve `query` against `source` into one batch of rows sharing a time slice.
///
/// Live requests use the season of the window, which must be a single season
/// no later than the one `as_of` falls in; the selector never reads the clock.
///
/// * Static, point-in-time: rows stamped exactly `date` (possibly none).
/// * Static, interval: all rows of the latest snapshot date inside the interval.
/// * Live: one provider request for the interval (a single day for a
///   point-in-time query), bounded by the source timeout. Team names are
///   reconciled against the registry.
pub async fn select_window(
    source: &DataSource<'_>,
    query: &WindowQuery,
    as_of: NaiveDate,
) -> Result<Vec<RawTeamRating>, ContenderError> {
    if let WindowQuery::Interval { start, end } = *query {
        if start > end {
            return Err(ContenderError::InvalidInput(format!(
                "interval start {} is after end {}",
                start, end
            )));
        }
    }

    match source {
        DataSource::Static(table) => Ok(select_static(table, query)),
        DataSource::Live(live) => {
            let (start, end) = match *query {
                WindowQuery::PointInTime { date } => (date, date),
                WindowQuery::Interval { start, end } => (start, end),
            };
            fetch_live(live, start, end, as_of).await
        }
    }
}

fn select_static(table: &HistoricalTable, query: &WindowQuery) -> Vec<RawTeamRating> {
    match *query {
        WindowQuery::PointInTime { date } => table.rows_on(date),
        WindowQuery::Interval { start, end } => table
            .latest_within(start, end)
            .map(|date| table.rows_on(date))
            .unwrap_or_default(),
    }
}

async fn fetch_live(
    live: &LiveSource<'_>,
    start: NaiveDate,
    end: NaiveDate,
    as_of: NaiveDate,
) -> Result<Vec<RawTeamRating>, ContenderError> {
    let season = season_start_year(start);
    if season_start_year(end) != season {
        return Err(ContenderError::InvalidInput(format!(
            "live window {} to {} spans more than one season",
            start, end
        )));
    }
    if season > season_start_year(as_of) {
        return Err(ContenderError::InvalidInput(format!(
            "live window starting {} is after the {} season",
            start,
            season_id(season_start_year(as_of))
        )));
    }

    let request = RatingsRequest {
        season: season_id(season),
        date_from: start,
        date_to: end,
        season_type: live.season_type,
    };
    let provider_name = live.provider.name();

    let rows = match tokio::time::timeout(live.timeout, live.provider.fetch_team_ratings(&request)).await {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => return Err(ContenderError::unavailable(provider_name, e)),
        Err(_) => {
            return Err(ContenderError::unavailable(
                provider_name,
                anyhow::anyhow!("timed out after {:?}", live.timeout),
            ))
        }
    };

    let slice = TimeSlice::Interval { start, end };
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let team = live.registry.resolve(&row.team_name)?;
        if !seen.insert(team) {
            return Err(ContenderError::DataIntegrity {
                team: row.team_name,
            });
        }
        out.push(RawTeamRating {
            team: team.to_string(),
            slice,
            offense_metric: row.off_rating,
            defense_metric: row.def_rating,
        });
    }
    Ok(out)
}

const DATE_TIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a query date, discarding any time-of-day component.
pub fn parse_query_date(raw: &str) -> Result<NaiveDate, ContenderError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| ContenderError::InvalidInput(format!("unrecognised date '{}'", raw)))
}
