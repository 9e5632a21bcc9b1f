//! Input validation shared by category and product drafts.
//!
//! All length bounds are measured in Unicode scalar values after trimming,
//! so a Thai category name is bounded by what the user sees, not by its
//! UTF-8 byte length.

/// A draft failed boundary validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    /// Builds a validation error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trims `value` and checks that its length lies within `min..=max`.
///
/// # Errors
///
/// Returns [`ValidationError`] naming `field` when the trimmed value is
/// empty (and `min > 0`) or out of bounds.
pub fn trimmed_within(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 && min > 0 {
        return Err(ValidationError::new(format!("{field} is required")));
    }
    if len < min || len > max {
        return Err(ValidationError::new(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}
