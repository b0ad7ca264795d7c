//! Error taxonomy.
//!
//! [`StyleError`] covers loading and refreshing stylesheets; [`ValueError`]
//! covers turning raw property text into typed values. Neither is fatal:
//! callers get them back as values and the repositories log them.

use crate::css::parser::ParseError;
use crate::property::PropertyType;
use crate::stylesheet::SourceUrl;

/// Errors from stylesheet loading, registration and refresh.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("stylesheet source not found: {0}")]
    NotFound(String),
    #[error("failed to read stylesheet {url}")]
    ReadFailed {
        url: SourceUrl,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse stylesheet {url}")]
    ParseFailed {
        url: SourceUrl,
        #[source]
        source: ParseError,
    },
    #[error("stylesheet {0} is not refreshable")]
    NotRefreshable(SourceUrl),
    #[error("unknown stylesheet id")]
    UnknownStyleSheet,
}

/// Errors from typed property-value parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("no parser registered for property type {0}")]
    UnknownType(PropertyType),
    #[error("a parser is already registered for property type {0}")]
    DuplicateType(PropertyType),
    #[error("invalid {property_type} value: {message}")]
    Invalid {
        property_type: PropertyType,
        message: String,
    },
    #[error("unrecognized character at byte {position} in {property_type} value")]
    Tokenize {
        property_type: PropertyType,
        position: usize,
    },
}

impl ValueError {
    /// Shorthand for [`ValueError::Invalid`].
    pub fn invalid(property_type: &PropertyType, message: impl Into<String>) -> Self {
        ValueError::Invalid {
            property_type: property_type.clone(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn style_error_messages() {
        let err = StyleError::NotFound("main.css".into());
        assert_eq!(err.to_string(), "stylesheet source not found: main.css");

        let err = StyleError::ParseFailed {
            url: SourceUrl::new("file:///a.css"),
            source: ParseError::UnexpectedEof("expected BraceClose".into()),
        };
        assert_eq!(err.to_string(), "failed to parse stylesheet file:///a.css");
        assert!(err.source().is_some());
    }

    #[test]
    fn value_error_messages() {
        let err = ValueError::invalid(&PropertyType::RECT, "expected 4 components");
        assert_eq!(err.to_string(), "invalid Rect value: expected 4 components");

        let err = ValueError::UnknownType(PropertyType::new("Gradient"));
        assert_eq!(err.to_string(), "no parser registered for property type Gradient");
    }
}
