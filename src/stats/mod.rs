pub mod nba;
pub mod provider;
pub mod season;
pub mod teams;

pub use nba::NbaStats;
pub use provider::{RatingsRequest, StatsProvider};
pub use season::{season_id, season_start_year, SeasonType};
pub use teams::TeamRegistry;
