//! Validation Support
//!
//! Write views are checked field by field before anything touches the
//! database. Errors accumulate in [`ValidationErrors`] so a single response
//! can name every bad field:
//!
//! ```rust,ignore
//! let mut errors = ValidationErrors::new();
//! if let Some(title) = required(&mut errors, "title", data.title.as_deref(), mode) {
//!     errors.check(validators::validate_required("title", title));
//!     errors.check(validators::validate_length("title", title, None, Some(255)));
//! }
//! errors.result()?;
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::core::WriteMode;

/// Key used for errors that do not belong to a single field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Validation error with field name and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn required(field: &str) -> Self {
        Self::new(field, "This field is required.")
    }

    /// A related identifier that resolves to no row
    #[must_use]
    pub fn missing_related(field: &str, id: i32) -> Self {
        Self::new(field, format!("Invalid pk \"{id}\" - object does not exist."))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record the error of a single validator, if any
    pub fn check(&mut self, outcome: Result<(), ValidationError>) {
        if let Err(error) = outcome {
            self.add(error);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// True when at least one error was recorded against `field`
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// Group messages by field, the shape sent back to clients
    #[must_use]
    pub fn field_map(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for error in &self.errors {
            map.entry(error.field.clone())
                .or_default()
                .push(error.message.clone());
        }
        map
    }

    /// Convert to Result
    ///
    /// # Errors
    ///
    /// Returns `self` when any error was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{joined}")
    }
}

impl std::error::Error for ValidationErrors {}

/// Presence check shared by every write view.
///
/// Returns the value when it was supplied. A missing value is an error only
/// when `mode` requires every field.
pub fn required<T>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<T>,
    mode: WriteMode,
) -> Option<T> {
    if value.is_none() && mode.requires_all_fields() {
        errors.add(ValidationError::required(field));
    }
    value
}

/// Helper validators for common patterns
pub mod validators {
    use super::ValidationError;
    use std::fmt;

    /// Validate string length (in characters) is within range
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming `field` when out of range.
    pub fn validate_length(
        field: &str,
        value: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<(), ValidationError> {
        let len = value.chars().count();

        if let Some(min_len) = min {
            if len < min_len {
                return Err(ValidationError::new(
                    field,
                    format!("Ensure this field has at least {min_len} characters."),
                ));
            }
        }

        if let Some(max_len) = max {
            if len > max_len {
                return Err(ValidationError::new(
                    field,
                    format!("Ensure this field has no more than {max_len} characters."),
                ));
            }
        }

        Ok(())
    }

    /// Validate number is within range
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming `field` when out of range.
    pub fn validate_range<T: PartialOrd + fmt::Display>(
        field: &str,
        value: T,
        min: Option<T>,
        max: Option<T>,
    ) -> Result<(), ValidationError> {
        if let Some(min_val) = min {
            if value < min_val {
                return Err(ValidationError::new(
                    field,
                    format!("Ensure this value is greater than or equal to {min_val}."),
                ));
            }
        }

        if let Some(max_val) = max {
            if value > max_val {
                return Err(ValidationError::new(
                    field,
                    format!("Ensure this value is less than or equal to {max_val}."),
                ));
            }
        }

        Ok(())
    }

    /// Validate value is not blank
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` when the value is empty after trimming.
    pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new(field, "This field may not be blank."));
        }
        Ok(())
    }

    /// Non-negative integer that still fits the 32-bit column
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` when negative or too large.
    pub fn validate_positive_integer(field: &str, value: i64) -> Result<(), ValidationError> {
        validate_range(field, value, Some(0), Some(i64::from(i32::MAX)))
    }
}
