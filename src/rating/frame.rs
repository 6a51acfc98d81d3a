use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::normalize::normalize;
use super::window::{select_window, DataSource, WindowQuery};
use crate::db::models::{NormalizedPosition, RawTeamRating, TimeSlice};
use crate::error::ContenderError;

/// Fixed highlight region of the strength map: a circle around the
/// best-offense/best-defense corner. It reaches past the unit square on
/// purpose so it reads as "top-right corner and beyond".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContenderZone {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

impl ContenderZone {
    pub const DEFAULT: ContenderZone = ContenderZone {
        center_x: 1.0,
        center_y: 1.0,
        radius: 0.52,
    };

    /// Bounding box `(x0, y0, x1, y1)` for renderers that draw by corners.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (
            self.center_x - self.radius,
            self.center_y - self.radius,
            self.center_x + self.radius,
            self.center_y + self.radius,
        )
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

impl Default for ContenderZone {
    fn default() -> Self {
        ContenderZone::DEFAULT
    }
}

/// One query's result, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContenderFrame {
    pub query: WindowQuery,
    /// Slice the query resolved to; `None` when no rows matched
    pub slice: Option<TimeSlice>,
    pub positions: Vec<NormalizedPosition>,
    pub zone: ContenderZone,
}

/// Normalize one batch of rows into per-team positions.
///
/// All rows must belong to the same time slice; mixing slices is not
/// detected here. Offense is scaled as-is, defense is inverted, and the
/// output keeps the input row order. An empty batch yields an empty frame
/// without touching the normalizer.
pub fn build_frame(rows: &[RawTeamRating]) -> Result<Vec<NormalizedPosition>, ContenderError> {
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let offense: Vec<f64> = rows.iter().map(|r| r.offense_metric).collect();
    let defense: Vec<f64> = rows.iter().map(|r| r.defense_metric).collect();
    let xs = normalize(&offense, false)?;
    let ys = normalize(&defense, true)?;

    Ok(rows
        .iter()
        .zip(xs.into_iter().zip(ys))
        .map(|(row, (x, y))| NormalizedPosition {
            team: row.team.clone(),
            x,
            y,
        })
        .collect())
}

/// Select the rows for `query` and build its frame.
///
/// Either the whole frame is returned or the first error; never a partial frame.
pub async fn frame_for_query(
    source: &DataSource<'_>,
    query: WindowQuery,
    as_of: NaiveDate,
) -> Result<ContenderFrame, ContenderError> {
    let rows = select_window(source, &query, as_of).await?;
    let positions = build_frame(&rows)?;
    Ok(ContenderFrame {
        query,
        slice: rows.first().map(|r| r.slice),
        positions,
        zone: ContenderZone::DEFAULT,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::DailyRating;
    use crate::db::HistoricalTable;
    use crate::rating::window::LiveSource;
    use crate::stats::provider::ProviderRow;
    use crate::stats::{RatingsRequest, SeasonType, StatsProvider, TeamRegistry};
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use std::time::Duration;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn raw(team: &str, off: f64, def: f64) -> RawTeamRating {
        RawTeamRating {
            team: team.into(),
            slice: TimeSlice::Date { date: d("2025-01-15") },
            offense_metric: off,
            defense_metric: def,
        }
    }

    fn batch() -> Vec<RawTeamRating> {
        vec![
            raw("Boston Celtics", 122.0, 108.0),
            raw("Denver Nuggets", 118.0, 114.0),
            raw("Washington Wizards", 106.0, 119.0),
            raw("Oklahoma City Thunder", 117.0, 104.0),
        ]
    }

    fn position<'a>(frame: &'a [NormalizedPosition], team: &str) -> &'a NormalizedPosition {
        frame.iter().find(|p| p.team == team).unwrap()
    }

    #[test]
    fn test_axes_and_inversion() {
        let frame = build_frame(&batch()).unwrap();
        assert_eq!(frame.len(), 4);

        let bos = position(&frame, "Boston Celtics");
        assert_relative_eq!(bos.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(bos.y, 1.0 - 4.0 / 15.0, epsilon = 1e-12);

        let was = position(&frame, "Washington Wizards");
        assert_relative_eq!(was.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(was.y, 0.0, epsilon = 1e-12);

        let okc = position(&frame, "Oklahoma City Thunder");
        assert_relative_eq!(okc.x, 11.0 / 16.0, epsilon = 1e-12);
        assert_relative_eq!(okc.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_input_order_is_kept() {
        let frame = build_frame(&batch()).unwrap();
        let teams: Vec<&str> = frame.iter().map(|p| p.team.as_str()).collect();
        assert_eq!(
            teams,
            vec![
                "Boston Celtics",
                "Denver Nuggets",
                "Washington Wizards",
                "Oklahoma City Thunder"
            ]
        );
    }

    #[test]
    fn test_permutation_does_not_move_teams() {
        let original = build_frame(&batch()).unwrap();

        let mut reversed = batch();
        reversed.reverse();
        let mut by_name = batch();
        by_name.sort_by(|a, b| a.team.cmp(&b.team));

        for permuted in [reversed, by_name] {
            let frame = build_frame(&permuted).unwrap();
            for p in &original {
                let q = position(&frame, &p.team);
                assert_eq!(p.x.to_bits(), q.x.to_bits());
                assert_eq!(p.y.to_bits(), q.y.to_bits());
            }
        }
    }

    #[test]
    fn test_repeat_calls_are_bit_identical() {
        let rows = batch();
        assert_eq!(build_frame(&rows).unwrap(), build_frame(&rows).unwrap());
    }

    #[test]
    fn test_empty_rows_short_circuit() {
        assert!(build_frame(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_flat_axis_goes_to_zero() {
        let rows = vec![
            raw("Boston Celtics", 110.0, 105.0),
            raw("Denver Nuggets", 110.0, 115.0),
        ];
        let frame = build_frame(&rows).unwrap();
        assert_eq!(frame[0].x, 0.0);
        assert_eq!(frame[1].x, 0.0);
        assert_eq!(frame[0].y, 1.0);
        assert_eq!(frame[1].y, 0.0);
    }

    #[test]
    fn test_zone_geometry() {
        let zone = ContenderZone::default();
        let (x0, y0, x1, y1) = zone.bounds();
        assert_relative_eq!(x0, 0.48, epsilon = 1e-12);
        assert_relative_eq!(y0, 0.48, epsilon = 1e-12);
        assert_relative_eq!(x1, 1.52, epsilon = 1e-12);
        assert_relative_eq!(y1, 1.52, epsilon = 1e-12);
        assert!(zone.contains(1.0, 1.0));
        assert!(zone.contains(0.7, 0.9));
        assert!(!zone.contains(0.5, 0.5));
        assert!(!zone.contains(0.0, 1.0));
    }

    #[tokio::test]
    async fn test_frame_for_empty_date_is_empty() {
        let table = HistoricalTable::from_rows(vec![DailyRating {
            date: d("2025-01-15"),
            team: "Boston Celtics".into(),
            off_rating: 120.0,
            def_rating: 110.0,
        }]);
        let query = WindowQuery::point_in_time(d("2025-01-16"));
        let frame = frame_for_query(&DataSource::Static(&table), query, d("2025-01-16"))
            .await
            .unwrap();
        assert!(frame.positions.is_empty());
        assert_eq!(frame.query, query);
        assert_eq!(frame.slice, None);
        assert_eq!(frame.zone, ContenderZone::DEFAULT);
    }

    #[tokio::test]
    async fn test_frame_reports_resolved_snapshot_date() {
        let rating = |date: &str, team: &str, off: f64, def: f64| DailyRating {
            date: d(date),
            team: team.into(),
            off_rating: off,
            def_rating: def,
        };
        let table = HistoricalTable::from_rows(vec![
            rating("2024-11-01", "Boston Celtics", 120.0, 109.0),
            rating("2024-11-01", "Denver Nuggets", 115.0, 112.0),
            rating("2024-11-05", "Boston Celtics", 121.0, 110.0),
            rating("2024-11-05", "Denver Nuggets", 116.0, 111.0),
        ]);
        let query = WindowQuery::interval(d("2024-11-02"), d("2024-11-30")).unwrap();
        let frame = frame_for_query(&DataSource::Static(&table), query, d("2024-12-01"))
            .await
            .unwrap();
        assert_eq!(frame.query, query);
        assert_eq!(frame.slice, Some(TimeSlice::Date { date: d("2024-11-05") }));
        assert_eq!(frame.positions.len(), 2);
    }

    struct HangingProvider;

    #[async_trait]
    impl StatsProvider for HangingProvider {
        async fn fetch_team_ratings(&self, _: &RatingsRequest) -> anyhow::Result<Vec<ProviderRow>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec![])
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    #[tokio::test]
    async fn test_frame_for_timed_out_query_is_error() {
        let registry = TeamRegistry::nba();
        let source = DataSource::Live(LiveSource {
            provider: &HangingProvider,
            registry: &registry,
            season_type: SeasonType::RegularSeason,
            timeout: Duration::from_millis(20),
        });
        let result = frame_for_query(
            &source,
            WindowQuery::interval(d("2025-01-01"), d("2025-01-15")).unwrap(),
            d("2025-01-15"),
        )
        .await;
        assert!(matches!(
            result,
            Err(ContenderError::DataSourceUnavailable { .. })
        ));
    }
}
