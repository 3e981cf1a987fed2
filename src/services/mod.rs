//! External service module
//!
//! This module contains the backend collaborators the server persists
//! profiles, XP, runs and coaching sessions to.

pub mod error;
pub mod profile_store;
pub mod session_store;

// Re-export main types
pub use error::StoreError;
pub use profile_store::{InMemoryProfileStore, Profile, ProfileStore, ProfileUpdate, Role, RunRecord};
pub use session_store::{live_window, InMemorySessionStore, NewSession, Session, SessionStore};
