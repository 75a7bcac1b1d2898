//! crates/seminar_core/src/error.rs
//!
//! The error taxonomy surfaced by the core services.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A record the caller asked for does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Input rejected before touching storage (empty roster, malformed upload, ...).
    #[error("{0}")]
    Validation(String),

    /// Every topic in the class has been claimed.
    #[error("All topics have been assigned. Please contact your lecturer.")]
    Exhausted,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Storage or other infrastructure failure.
    #[error("Service Port Error: {0}")]
    Unexpected(String),
}

impl From<PortError> for ServiceError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(key) => {
                ServiceError::NotFound(format!("Key \"{}\" not found", key))
            }
            PortError::Unauthorized => ServiceError::Unauthorized("Unauthorized".to_string()),
            PortError::Unexpected(msg) => ServiceError::Unexpected(msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
