use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

pub mod import;
pub mod models;
pub mod table;

use models::*;

pub use table::{HistoricalTable, TableCache};

/// Thread-safe SQLite handle (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open ratings database {}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("ratings database lock poisoned"))
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to create ratings schema")?;
        Ok(())
    }

    // ── Day-by-day ratings ───────────────────────────────────────────────────

    /// Insert or replace a batch of daily ratings in one transaction.
    /// Returns the number of rows written.
    pub fn upsert_ratings(&self, rows: &[DailyRating]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().context("Failed to begin ratings import")?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO daily_ratings (date, team, off_rating, def_rating)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(date, team) DO UPDATE SET
                    off_rating=excluded.off_rating,
                    def_rating=excluded.def_rating",
            )?;
            for row in rows {
                stmt.execute(params![row.date, row.team, row.off_rating, row.def_rating])
                    .with_context(|| format!("Failed to upsert {} on {}", row.team, row.date))?;
            }
        }
        tx.commit().context("Failed to commit ratings import")?;
        Ok(rows.len())
    }

    /// Load the full table ordered by date, then team.
    pub fn load_ratings(&self) -> Result<Vec<DailyRating>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT date, team, off_rating, def_rating
             FROM daily_ratings ORDER BY date ASC, team ASC",
        )?;
        let rows = stmt
            .query_map([], map_daily_rating)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to decode daily ratings")?;
        Ok(rows)
    }

    /// First and last stored date, `None` when the table is empty.
    pub fn date_bounds(&self) -> Result<Option<DateBounds>> {
        let conn = self.lock()?;
        let (min, max): (Option<NaiveDate>, Option<NaiveDate>) = conn.query_row(
            "SELECT MIN(date), MAX(date) FROM daily_ratings",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(match (min, max) {
            (Some(min), Some(max)) => Some(DateBounds { min, max }),
            _ => None,
        })
    }

    pub fn count_ratings(&self) -> Result<i64> {
        let conn = self.lock()?;
        let n = conn.query_row("SELECT COUNT(*) FROM daily_ratings", [], |r| r.get(0))?;
        Ok(n)
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn map_daily_rating(row: &rusqlite::Row) -> rusqlite::Result<DailyRating> {
    Ok(DailyRating {
        date: row.get(0)?,
        team: row.get(1)?,
        off_rating: row.get(2)?,
        def_rating: row.get(3)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS daily_ratings (
    date        TEXT    NOT NULL,
    team        TEXT    NOT NULL,
    off_rating  REAL    NOT NULL,
    def_rating  REAL    NOT NULL,
    PRIMARY KEY (date, team)
);

CREATE INDEX IF NOT EXISTS idx_daily_ratings_date ON daily_ratings(date);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(date: &str, team: &str, off: f64, def: f64) -> DailyRating {
        DailyRating {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            team: team.into(),
            off_rating: off,
            def_rating: def,
        }
    }

    #[test]
    fn test_empty_database_has_no_bounds() {
        let db = Database::open(":memory:").unwrap();
        assert_eq!(db.date_bounds().unwrap(), None);
        assert!(db.load_ratings().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_and_load_ordered() {
        let db = Database::open(":memory:").unwrap();
        db.upsert_ratings(&[
            rating("2024-11-02", "Boston Celtics", 121.0, 110.0),
            rating("2024-11-01", "Denver Nuggets", 115.0, 112.0),
            rating("2024-11-01", "Boston Celtics", 120.0, 109.0),
        ])
        .unwrap();

        let rows = db.load_ratings().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].team, "Boston Celtics");
        assert_eq!(rows[0].date.to_string(), "2024-11-01");
        assert_eq!(rows[1].team, "Denver Nuggets");
        assert_eq!(rows[2].date.to_string(), "2024-11-02");

        let bounds = db.date_bounds().unwrap().unwrap();
        assert_eq!(bounds.min.to_string(), "2024-11-01");
        assert_eq!(bounds.max.to_string(), "2024-11-02");
    }

    #[test]
    fn test_upsert_replaces_existing_row() {
        let db = Database::open(":memory:").unwrap();
        db.upsert_ratings(&[rating("2024-11-01", "Boston Celtics", 120.0, 109.0)])
            .unwrap();
        db.upsert_ratings(&[rating("2024-11-01", "Boston Celtics", 118.5, 111.0)])
            .unwrap();

        assert_eq!(db.count_ratings().unwrap(), 1);
        let rows = db.load_ratings().unwrap();
        assert_eq!(rows[0].off_rating, 118.5);
        assert_eq!(rows[0].def_rating, 111.0);
    }
}
