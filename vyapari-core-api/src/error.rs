use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// A rejected input, naming the offending field and (for list arguments)
/// its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub position: Option<usize>,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            position: None,
            reason: reason.into(),
        }
    }

    pub fn at(field: &'static str, position: usize, reason: impl Into<String>) -> Self {
        Self {
            field,
            position: Some(position),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "invalid {} at position {}: {}", self.field, position, self.reason),
            None => write!(f, "invalid {}: {}", self.field, self.reason),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// Wraps a store failure so callers can retry the whole operation.
    pub fn storage(err: impl fmt::Display) -> Self {
        ApiError::StorageError(err.to_string())
    }

    pub fn transport(err: impl fmt::Display) -> Self {
        ApiError::TransportError(err.to_string())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::StorageError(_) | ApiError::TransportError(_) | ApiError::Timeout(_)
        )
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_field_and_position() {
        let err: ApiError = ValidationError::at("quantity", 2, "must be a positive integer").into();
        assert_eq!(
            err.to_string(),
            "Validation error: invalid quantity at position 2: must be a positive integer"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn storage_failures_are_retryable() {
        assert!(ApiError::storage("connection refused").is_retryable());
        assert!(!ApiError::NotFound("invoice".into()).is_retryable());
    }

    #[test]
    fn timeouts_keep_sub_second_precision() {
        let err = ApiError::Timeout(Duration::from_millis(300));
        assert_eq!(err.to_string(), "Operation timed out after 300ms");
        assert!(err.is_retryable());
    }
}
