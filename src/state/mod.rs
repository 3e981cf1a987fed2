//! State management module
//!
//! Session host state: the active timer slot, the signed-in identity and
//! the channels background tasks listen on.

pub mod active_timer;
pub mod app_state;
pub mod identity;

// Re-export main types
pub use active_timer::{ActiveTimer, CompletionNotice, RewardOutcome};
pub use app_state::{AppState, TimerView};
pub use identity::{AuthContext, SignedInUser};
