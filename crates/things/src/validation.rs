//! Field constraint checking.
//!
//! Parsing only checks that the XML has the right shape. Value constraints
//! (ranges, non-empty text, calendar validity) are checked by [`Validate`],
//! which every value and item type implements. Errors carry the dotted path
//! of the offending field, built up with [`ValidationError::within`].

use thiserror::Error;

/// A field constraint violation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: f64 },

    #[error("{field}: {message}")]
    Invalid { field: String, message: String },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Path of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::Invalid { field, .. } => field,
        }
    }

    /// Prefixes the field path with `parent`.
    pub fn within(mut self, parent: &str) -> Self {
        let field = match &mut self {
            ValidationError::Required { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::Invalid { field, .. } => field,
        };
        *field = if field.is_empty() {
            parent.to_string()
        } else {
            format!("{}.{}", parent, field)
        };
        self
    }
}

/// Constraint checking for a value or item type.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Some(value) => value.validate(),
            None => Ok(()),
        }
    }
}

/// Text must contain something other than whitespace.
pub fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::required(field))
    } else {
        Ok(())
    }
}

/// Optional text, when present, must not be blank.
pub fn validate_optional_text(field: &str, value: &Option<String>) -> Result<(), ValidationError> {
    match value {
        Some(text) => require_text(field, text),
        None => Ok(()),
    }
}

/// A list that must hold at least one entry.
pub fn require_non_empty<T>(field: &str, values: &[T]) -> Result<(), ValidationError> {
    if values.is_empty() {
        Err(ValidationError::required(field))
    } else {
        Ok(())
    }
}

/// The value must not be NaN or infinite.
pub fn require_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::invalid(field, "must be a finite number"))
    }
}

pub fn require_finite_optional(field: &str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(value) => require_finite(field, value),
        None => Ok(()),
    }
}

/// Inclusive range check. Non-finite values are out of every range.
pub fn require_range<T>(field: &str, value: T, min: T, max: T) -> Result<(), ValidationError>
where
    T: Into<f64> + PartialOrd + Copy,
{
    require_finite(field, value.into())?;
    if value < min || value > max {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: min.into(),
            max: max.into(),
            value: value.into(),
        })
    } else {
        Ok(())
    }
}

pub fn require_non_negative<T>(field: &str, value: T) -> Result<(), ValidationError>
where
    T: Into<f64> + Copy,
{
    let value = value.into();
    require_finite(field, value)?;
    if value < 0.0 {
        Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        })
    } else {
        Ok(())
    }
}

pub fn require_positive<T>(field: &str, value: T) -> Result<(), ValidationError>
where
    T: Into<f64> + Copy,
{
    let value = value.into();
    require_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::invalid(field, "must be greater than zero"))
    }
}

/// Validates a nested value, prefixing errors with `field`.
pub fn validate_field<T: Validate + ?Sized>(field: &str, value: &T) -> Result<(), ValidationError> {
    value.validate().map_err(|e| e.within(field))
}

pub fn validate_optional<T: Validate>(
    field: &str,
    value: &Option<T>,
) -> Result<(), ValidationError> {
    validate_field(field, value)
}

/// Validates every entry of a list; errors name the entry index.
pub fn validate_each<T: Validate>(field: &str, values: &[T]) -> Result<(), ValidationError> {
    for (index, value) in values.iter().enumerate() {
        value
            .validate()
            .map_err(|e| e.within(&format!("{}[{}]", field, index)))?;
    }
    Ok(())
}
