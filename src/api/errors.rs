use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Failures surfaced by a remote collection.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Rejected before the mutation was applied; the user can correct the input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The record no longer exists.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Network or server failure; the same operation may be retried.
    #[error("Transient error: {0}")]
    Transient(String),

    /// The response body did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Maps an HTTP failure status to the error taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message),
            400..=499 => ApiError::Validation(message),
            _ => ApiError::Transient(message),
        }
    }

    /// Whether re-invoking the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transient(_))
    }

    /// Message suitable for a toast or an inline form error.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(message) => message.clone(),
            ApiError::NotFound(message) if !message.is_empty() => message.clone(),
            ApiError::NotFound(_) => "The requested record no longer exists".to_string(),
            ApiError::Unauthorized(_) => "Not authorized, please sign in again".to_string(),
            ApiError::Transient(_) => {
                "The server is unavailable, please check the connection and retry".to_string()
            }
            ApiError::Decode(_) => "The server sent an unexpected response".to_string(),
        }
    }
}

impl From<TypeConstraintError> for ApiError {
    fn from(val: TypeConstraintError) -> Self {
        ApiError::Validation(val.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), err.to_string())
        } else {
            ApiError::Transient(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
