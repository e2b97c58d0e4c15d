//! Input validation errors surfaced to callers as HTTP 400.

use thiserror::Error;

/// A record field that cannot be coerced into the training-time feature
/// space. Raised before assembly so a bad value never reaches the model.
#[derive(Debug, Error)]
pub enum InputError {
    /// Numeric field holds a value that is neither a number nor one of the
    /// recognized boolean-like strings.
    #[error("field '{field}' has non-numeric value '{value}'")]
    InvalidNumeric { field: String, value: String },

    /// Numeric field holds a JSON array or object.
    #[error("field '{field}' must be a scalar value")]
    UnsupportedType { field: String },
}
