use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::provider::{ProviderRow, RatingsRequest, StatsProvider};

const DEFAULT_BASE_URL: &str = "https://stats.nba.com/stats";
const TEAM_STATS_ENDPOINT: &str = "leaguedashteamstats";

/// Team-ratings provider backed by the stats.nba.com `leaguedashteamstats`
/// endpoint with `MeasureType=Advanced`.
pub struct NbaStats {
    http: Client,
    /// Base URL for overriding in tests
    base_url: String,
}

impl NbaStats {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .default_headers(stats_headers())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(NbaStats {
            http,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn request_url(&self, request: &RatingsRequest) -> Result<Url> {
        let endpoint = format!("{}/{}", self.base_url, TEAM_STATS_ENDPOINT);
        let date_from = stats_date(request.date_from);
        let date_to = stats_date(request.date_to);
        Url::parse_with_params(
            &endpoint,
            &[
                ("MeasureType", "Advanced"),
                ("PerMode", "PerGame"),
                ("LeagueID", "00"),
                ("Season", request.season.as_str()),
                ("SeasonType", request.season_type.as_param()),
                ("DateFrom", date_from.as_str()),
                ("DateTo", date_to.as_str()),
                ("PlusMinus", "N"),
                ("PaceAdjust", "N"),
                ("Rank", "N"),
                ("LastNGames", "0"),
                ("Month", "0"),
                ("OpponentTeamID", "0"),
                ("PORound", "0"),
                ("Period", "0"),
                ("TeamID", "0"),
                ("TwoWay", "0"),
                ("Conference", ""),
                ("Division", ""),
                ("GameScope", ""),
                ("GameSegment", ""),
                ("Location", ""),
                ("Outcome", ""),
                ("PlayerExperience", ""),
                ("PlayerPosition", ""),
                ("SeasonSegment", ""),
                ("ShotClockRange", ""),
                ("StarterBench", ""),
                ("VsConference", ""),
                ("VsDivision", ""),
            ],
        )
        .with_context(|| format!("Invalid stats endpoint URL {}", endpoint))
    }
}

#[async_trait]
impl StatsProvider for NbaStats {
    fn name(&self) -> &str {
        "NBA Stats"
    }

    async fn fetch_team_ratings(&self, request: &RatingsRequest) -> Result<Vec<ProviderRow>> {
        let url = self.request_url(request)?;
        debug!("Fetching team ratings from {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("NBA Stats request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("NBA Stats error {}: {}", status, body);
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .context("Failed to parse NBA Stats response")?;

        let rows = parse_team_stats_response(&raw)?;
        info!(
            "Fetched {} team ratings for {} ({} → {})",
            rows.len(),
            request.season,
            request.date_from,
            request.date_to
        );
        Ok(rows)
    }
}

fn stats_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
        ),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers.insert("x-nba-stats-origin", HeaderValue::from_static("stats"));
    headers.insert("x-nba-stats-token", HeaderValue::from_static("true"));
    headers
}

/// The endpoint takes `MM/DD/YYYY` dates.
fn stats_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// Pull `TEAM_NAME`, `OFF_RATING` and `DEF_RATING` out of the first result set.
fn parse_team_stats_response(raw: &serde_json::Value) -> Result<Vec<ProviderRow>> {
    let set = raw["resultSets"]
        .as_array()
        .and_then(|sets| sets.first())
        .context("NBA Stats response has no resultSets")?;

    // Non-string headers keep their slot so later indices still line up.
    let headers: Vec<Option<&str>> = set["headers"]
        .as_array()
        .context("NBA Stats result set has no headers")?
        .iter()
        .map(|h| h.as_str())
        .collect();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| *h == Some(name))
            .with_context(|| format!("NBA Stats response is missing column {}", name))
    };
    let team_idx = column("TEAM_NAME")?;
    let off_idx = column("OFF_RATING")?;
    let def_idx = column("DEF_RATING")?;

    let rows = match set["rowSet"].as_array() {
        Some(rows) => rows,
        None => return Ok(vec![]),
    };

    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<ProviderRow> {
            let team_name = row[team_idx]
                .as_str()
                .with_context(|| format!("row {}: TEAM_NAME is not a string", i))?
                .to_string();
            let off_rating = row[off_idx]
                .as_f64()
                .with_context(|| format!("row {} ({}): OFF_RATING is not a number", i, team_name))?;
            let def_rating = row[def_idx]
                .as_f64()
                .with_context(|| format!("row {} ({}): DEF_RATING is not a number", i, team_name))?;
            Ok(ProviderRow {
                team_name,
                off_rating,
                def_rating,
            })
        })
        .collect()
}
