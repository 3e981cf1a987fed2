//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod identity_watch;
pub mod reward_award;
pub mod tick_driver;

// Re-export main functions
pub use identity_watch::identity_watch_task;
pub use reward_award::{award_completion, reward_award_task};
pub use tick_driver::tick_driver_task;
