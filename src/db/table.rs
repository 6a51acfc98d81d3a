use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::models::{DailyRating, DateBounds, RawTeamRating};
use super::Database;

/// Immutable, in-memory view of the day-by-day ratings table.
///
/// Rows are grouped by date; within a date they keep the order they were
/// loaded in.
#[derive(Debug, Clone, Default)]
pub struct HistoricalTable {
    by_date: BTreeMap<NaiveDate, Vec<DailyRating>>,
}

impl HistoricalTable {
    pub fn from_rows(rows: Vec<DailyRating>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<DailyRating>> = BTreeMap::new();
        for row in rows {
            by_date.entry(row.date).or_default().push(row);
        }
        HistoricalTable { by_date }
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_date.values().map(Vec::len).sum()
    }

    /// All rows stamped with exactly `date`.
    pub fn rows_on(&self, date: NaiveDate) -> Vec<RawTeamRating> {
        self.by_date
            .get(&date)
            .map(|rows| rows.iter().map(DailyRating::to_raw).collect())
            .unwrap_or_default()
    }

    /// Latest snapshot date inside `[start, end]`, if any.
    pub fn latest_within(&self, start: NaiveDate, end: NaiveDate) -> Option<NaiveDate> {
        if start > end {
            return None;
        }
        self.by_date.range(start..=end).next_back().map(|(d, _)| *d)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.by_date.keys().copied().collect()
    }

    pub fn bounds(&self) -> Option<DateBounds> {
        let min = *self.by_date.keys().next()?;
        let max = *self.by_date.keys().next_back()?;
        Some(DateBounds { min, max })
    }
}

/// Load-once wrapper around the historical table.
///
/// The first caller reads the database; later callers share the same
/// `Arc`. A failed load is not cached, so the next call retries it.
pub struct TableCache {
    db: Database,
    cell: OnceCell<Arc<HistoricalTable>>,
}

impl TableCache {
    pub fn new(db: Database) -> Self {
        TableCache {
            db,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<Arc<HistoricalTable>> {
        let table = self
            .cell
            .get_or_try_init(|| async {
                let rows = self.db.load_ratings()?;
                let table = HistoricalTable::from_rows(rows);
                if table.is_empty() {
                    warn!("Historical table loaded with no rows");
                } else {
                    info!(
                        "Historical table loaded: {} rows across {} dates",
                        table.len(),
                        table.dates().len()
                    );
                }
                Ok::<_, anyhow::Error>(Arc::new(table))
            })
            .await?;
        Ok(Arc::clone(table))
    }
}
