//! Error types for item parsing, validation and unit conversion.

use hvt_serde::SerdeError;
use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationError;

/// The primary error type for item operations.
#[derive(Error, Debug)]
pub enum ThingError {
    /// The XML could not be read or written
    #[error(transparent)]
    Serde(#[from] SerdeError),

    /// A field violates its constraints
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A display unit code has no conversion to the canonical unit
    #[error("unknown {dimension} units '{units}'")]
    UnknownUnits {
        units: String,
        dimension: &'static str,
    },

    /// No item type is registered under the given type id
    #[error("no item type registered for type id {0}")]
    UnknownType(Uuid),

    /// No item type uses the given root element
    #[error("no item type registered for element <{0}>")]
    UnknownElement(String),
}

/// Result type alias for item operations
pub type Result<T> = std::result::Result<T, ThingError>;
