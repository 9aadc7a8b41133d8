//! Form definitions for customer input.

use thiserror::Error;
use validator::ValidationErrors;

use crate::api::errors::ApiError;

pub mod customer;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("credit code must be 18 letters or digits")]
    InvalidCreditCode,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid url")]
    InvalidUrl,

    #[error("remarks cannot be empty")]
    InvalidRemarks,

    #[error("invalid value for {0}")]
    InvalidChoice(&'static str),

    #[error("nothing to update")]
    NothingToUpdate,
}

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        ApiError::Validation(err.to_string())
    }
}
