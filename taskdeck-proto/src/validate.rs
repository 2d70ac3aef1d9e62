//! Client-side validation performed before a request is sent.

use thiserror::Error;

/// A request rejected locally, before reaching the API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task title cannot be empty.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Task title exceeds the configured maximum length.
    #[error("task title too long (max {max} characters)")]
    TitleTooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
    /// Tag name cannot be empty.
    #[error("tag name cannot be empty")]
    TagNameEmpty,
    /// A required form field was left empty.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// A due date that is neither `YYYY-MM-DD` nor RFC 3339.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Checks a task title against emptiness and `max` characters.
///
/// # Errors
///
/// Returns [`ValidationError::TitleEmpty`] or [`ValidationError::TitleTooLong`].
pub fn check_title(title: &str, max: usize) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::TitleEmpty);
    }
    if title.chars().count() > max {
        return Err(ValidationError::TitleTooLong { max });
    }
    Ok(())
}

/// Rejects an empty (or whitespace-only) required field.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] naming `field`.
pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}
