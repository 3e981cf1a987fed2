//! Fit Timer - A state-managed HTTP server hosting interval workout timers
//!
//! This library provides EMOM and Tabata timer state machines, the session
//! host that drives them once per tick, XP rewards for completed runs and
//! the small profile layer (levels, runs, leaderboard) around them.

pub mod api;
pub mod calc;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
