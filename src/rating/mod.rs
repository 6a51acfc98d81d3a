pub mod frame;
pub mod normalize;
pub mod window;

pub use frame::{frame_for_query, ContenderFrame};
pub use window::{parse_query_date, DataSource, LiveSource, WindowQuery};
