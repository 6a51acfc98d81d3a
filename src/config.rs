use chrono::NaiveDate;
use clap::Parser;
use std::time::Duration;

use crate::stats::SeasonType;

/// Era-independent NBA team strength map with a contender-zone dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "contender-zone", version, about)]
pub struct Config {
    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
    pub dashboard_addr: String,

    /// SQLite database holding the day-by-day ratings table
    #[arg(long, env = "DATABASE_PATH", default_value = "ratings.db")]
    pub database_path: String,

    /// Day-by-day ratings CSV to import into the database on start-up
    #[arg(long, env = "IMPORT_CSV")]
    pub import_csv: Option<String>,

    /// Stats API base URL
    #[arg(long, env = "STATS_API_URL", default_value = "https://stats.nba.com/stats")]
    pub stats_api_url: String,

    /// Timeout for a single stats API request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Season type requested from the stats API
    #[arg(long, env = "SEASON_TYPE", value_enum, default_value = "regular-season")]
    pub season_type: SeasonType,

    /// Folder of `<team>.png` logos served under /logos
    #[arg(long, env = "LOGOS_DIR", default_value = "NBA Team Logos")]
    pub logos_dir: String,

    /// Pin the date used to pick the current season (YYYY-MM-DD); defaults to today (UTC)
    #[arg(long, env = "AS_OF")]
    pub as_of: Option<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=300).contains(&self.request_timeout_secs) {
            anyhow::bail!("request_timeout_secs must be between 1 and 300");
        }
        if self.stats_api_url.trim().is_empty() {
            anyhow::bail!("stats_api_url must not be empty");
        }
        self.as_of_date()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The pinned `as_of` date, if one was given.
    pub fn as_of_date(&self) -> anyhow::Result<Option<NaiveDate>> {
        match self.as_of.as_deref() {
            None => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(Some)
                .map_err(|e| anyhow::anyhow!("AS_OF must be YYYY-MM-DD (got '{}'): {}", raw, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["contender-zone"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_validate() {
        let config = parse(&[]);
        config.validate().unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.season_type, SeasonType::RegularSeason);
        assert_eq!(config.as_of_date().unwrap(), None);
    }

    #[test]
    fn test_timeout_out_of_range() {
        let config = parse(&["--request-timeout-secs", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_as_of_parsing() {
        let config = parse(&["--as-of", "2025-01-15", "--season-type", "playoffs"]);
        config.validate().unwrap();
        assert_eq!(
            config.as_of_date().unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
        assert_eq!(config.season_type, SeasonType::Playoffs);

        let bad = parse(&["--as-of", "15/01/2025"]);
        assert!(bad.validate().is_err());
    }
}
