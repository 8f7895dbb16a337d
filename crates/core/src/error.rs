//! Domain error model.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Business-rule failures raised by catalog logic.
///
/// Each variant maps onto one client-facing outcome: bad input, missing
/// record, or a state change that cannot happen from the current state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// Malformed or non-positive record key.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("not found")]
    NotFound,

    /// e.g. approving a product that is already confirmed.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
