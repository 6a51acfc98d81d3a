use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use super::models::DailyRating;
use crate::rating::parse_query_date;
use crate::stats::TeamRegistry;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: {message}")]
    Row { line: u64, message: String },
}

/// One line of the day-by-day ratings CSV.
#[derive(Debug, Deserialize)]
struct RawDailyRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Team")]
    team: String,
    #[serde(rename = "Offensive Rating", alias = "ORTG", alias = "OFF_RATING")]
    off_rating: f64,
    #[serde(rename = "Defensive Rating", alias = "DRTG", alias = "DEF_RATING")]
    def_rating: f64,
}

/// Read a day-by-day ratings CSV from disk.
pub fn load_daily_csv(path: &Path, registry: &TeamRegistry) -> Result<Vec<DailyRating>, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_daily_from_reader(file, registry)
}

/// Parse day-by-day ratings, dropping time-of-day from dates and checking
/// every team against `registry`.
pub fn load_daily_from_reader<R: Read>(
    rdr: R,
    registry: &TeamRegistry,
) -> Result<Vec<DailyRating>, ImportError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let headers = reader.headers()?.clone();
    let mut record = csv::StringRecord::new();
    let mut out = Vec::new();
    while reader.read_record(&mut record)? {
        let raw: RawDailyRow = record.deserialize(Some(&headers))?;
        let line = record.position().map_or(0, |pos| pos.line());
        let date = parse_query_date(&raw.date).map_err(|e| ImportError::Row {
            line,
            message: e.to_string(),
        })?;
        let team = registry.resolve(&raw.team).map_err(|e| ImportError::Row {
            line,
            message: e.to_string(),
        })?;
        if !raw.off_rating.is_finite() || !raw.def_rating.is_finite() {
            return Err(ImportError::Row {
                line,
                message: format!("non-finite rating for {}", team),
            });
        }
        out.push(DailyRating {
            date,
            team: team.to_string(),
            off_rating: raw.off_rating,
            def_rating: raw.def_rating,
        });
    }
    Ok(out)
}
