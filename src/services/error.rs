use thiserror::Error;

/// Failures reported by the hosted backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("profile {0} not found")]
    NotFound(String),

    #[error("profile {0} already exists")]
    AlreadyExists(String),

    #[error("session {0} not found")]
    SessionNotFound(u64),

    #[error("session {0} is full")]
    SessionFull(u64),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
