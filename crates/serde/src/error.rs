//! Error types for item XML and JSON serialization.

use thiserror::Error;

/// Errors raised while reading or writing item XML and JSON.
#[derive(Error, Debug)]
pub enum SerdeError {
    /// JSON serialization or deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is not well-formed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error while reading or writing a document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document bytes are not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The document contains no root element
    #[error("document has no root element")]
    NoRootElement,

    /// A mandatory child element is absent or empty
    #[error("<{parent}> is missing required element <{element}>")]
    MissingElement { parent: String, element: String },

    /// A mandatory attribute is absent
    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    /// Element text could not be converted to the expected type
    #[error("<{element}> has invalid value '{value}': {message}")]
    InvalidValue {
        element: String,
        value: String,
        message: String,
    },

    /// An element was found where a different one was expected
    #[error("expected <{expected}> but found <{found}>")]
    UnexpectedElement { expected: String, found: String },

    /// Custom error message
    #[error("{0}")]
    Custom(String),
}

impl From<String> for SerdeError {
    fn from(msg: String) -> Self {
        SerdeError::Custom(msg)
    }
}

impl From<&str> for SerdeError {
    fn from(msg: &str) -> Self {
        SerdeError::Custom(msg.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SerdeError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        SerdeError::Xml(quick_xml::Error::InvalidAttr(err))
    }
}

impl From<quick_xml::escape::EscapeError> for SerdeError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        SerdeError::Xml(quick_xml::Error::Escape(err))
    }
}

/// Result type alias for item serialization operations
pub type Result<T> = std::result::Result<T, SerdeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_message() {
        let err = SerdeError::MissingElement {
            parent: "weight".to_string(),
            element: "when".to_string(),
        };
        assert_eq!(err.to_string(), "<weight> is missing required element <when>");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: SerdeError = json_err.into();
        assert!(matches!(err, SerdeError::Json(_)));
    }

    #[test]
    fn test_from_str() {
        let err: SerdeError = "boom".into();
        assert!(matches!(err, SerdeError::Custom(ref m) if m == "boom"));
    }
}
