//! Shared helpers used by every reader and by the fix-up engine
//!
//! - [`sort`]: lap and participant orderings with explicit tie-breaks
//! - [`time`]: formatted time strings to seconds and back
//! - [`session_type`]: free-form session tokens to [`SessionType`](crate::SessionType)

pub mod session_type;
pub mod sort;
pub mod time;

pub use session_type::detect_session;
pub use sort::{
    compare_laps_by_elapsed_time, compare_laps_by_sector, compare_laps_by_time,
    compare_participants_by_best_lap, compare_participants_by_consistency,
    compare_participants_by_last_lap_position, compare_participants_by_total_time,
    sort_laps_by_elapsed_time, sort_laps_by_sector, sort_laps_by_time,
    sort_participants_by_best_lap, sort_participants_by_consistency,
    sort_participants_by_last_lap_position, sort_participants_by_total_time,
};
pub use time::{format_time, seconds_from_formatted_time};
