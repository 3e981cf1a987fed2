//! Pure calculations shared by the host and its handlers
//!
//! Primitive inputs, primitive outputs, no state.

pub mod geo;
pub mod progression;
pub mod reward;

pub use geo::{haversine_distance, run_xp, track_distance, GeoPoint};
pub use progression::{
    format_clock, leaderboard_title, level_for_xp, rank_for_level, xp_progress_percent, Class,
};
pub use reward::{RewardPolicy, RewardRule};
