//! Domain error types

use crate::generation::session::SessionState;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid provider id: {0}")]
    InvalidProviderId(String),

    #[error("Session is already {0} and cannot be modified")]
    SessionClosed(SessionState),

    #[error("Continuation attempts exhausted ({0} allowed)")]
    AttemptsExhausted(u32),
}

impl DomainError {
    /// Check if this error represents a closed (terminal) session
    pub fn is_session_closed(&self) -> bool {
        matches!(self, DomainError::SessionClosed(_))
    }
}
