//! Validation errors for protocol types.

use thiserror::Error;

/// A field failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required string field was empty
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Result type alias using ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub(crate) fn non_empty(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(())
}
