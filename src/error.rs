//! Errors surfaced by the session host

use thiserror::Error;

use crate::{services::StoreError, timer::ConfigError};

#[derive(Debug, Error)]
pub enum AppError {
    /// Timer configuration rejected before any controller exists
    #[error("invalid timer configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid request: {0}")]
    InvalidInput(String),

    #[error("no timer has been created")]
    NoTimer,

    #[error("no user is signed in")]
    NotSignedIn,

    /// Signed in, but the role does not allow the action
    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to lock {0} state")]
    Poisoned(&'static str),
}
