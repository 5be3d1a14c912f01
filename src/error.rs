use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main library error type that encompasses all possible failure modes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DdmsError {
    /// A component failed validation. `locator` is an XPath-like path to the
    /// offending element, built up as the error travels through ancestors.
    #[error("{}", describe_invalid(.message, .locator))]
    InvalidDdms { message: String, locator: String },

    #[error("Vocabulary error: {key} - {details}")]
    Vocabulary { key: String, details: String },

    #[error("Unsupported DDMS version: {0}")]
    UnsupportedVersion(String),

    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("IO error: {path} - {details}")]
    Io { path: PathBuf, details: String },

    #[error("Schema validation failed: {}", .diagnostics.join("; "))]
    SchemaValidation { diagnostics: Vec<String> },
}

fn describe_invalid(message: &str, locator: &str) -> String {
    if locator.is_empty() {
        message.to_string()
    } else {
        format!("{} (at {})", message, locator)
    }
}

impl DdmsError {
    /// A validation failure with no locator yet; the owning component adds one.
    pub fn invalid(message: impl Into<String>) -> Self {
        DdmsError::InvalidDdms {
            message: message.into(),
            locator: String::new(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        DdmsError::Io {
            path: path.into(),
            details: err.to_string(),
        }
    }

    /// Prepend `prefix` (e.g. `/ddms:Resource`) to the locator of a validation
    /// failure. Other variants pass through untouched.
    pub fn locate(self, prefix: &str) -> Self {
        match self {
            DdmsError::InvalidDdms { message, locator } => DdmsError::InvalidDdms {
                message,
                locator: format!("{}{}", prefix, locator),
            },
            other => other,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, DdmsError::InvalidDdms { .. })
    }

    /// The message without locator decoration.
    pub fn message(&self) -> String {
        match self {
            DdmsError::InvalidDdms { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn locator(&self) -> Option<&str> {
        match self {
            DdmsError::InvalidDdms { locator, .. } => Some(locator),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DdmsError>;

/// Severity of a validation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A located message produced during validation.
///
/// Errors abort construction and are only ever seen as [`DdmsError`]; messages
/// with [`Severity::Warning`] are stored on successfully built components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub severity: Severity,
    pub text: String,
    pub locator: String,
}

impl ValidationMessage {
    pub fn warning(text: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
            locator: locator.into(),
        }
    }

    pub fn error(text: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
            locator: locator.into(),
        }
    }

    /// Same message, located one level further up the tree.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self {
            severity: self.severity,
            text: self.text.clone(),
            locator: format!("{}{}", prefix, self.locator),
        }
    }
}

impl From<&DdmsError> for ValidationMessage {
    fn from(err: &DdmsError) -> Self {
        ValidationMessage::error(err.message(), err.locator().unwrap_or_default())
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.locator.is_empty() {
            write!(f, "[{}] {}", self.severity, self.text)
        } else {
            write!(f, "[{}] {} (at {})", self.severity, self.text, self.locator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_display_includes_locator() {
        let err = DdmsError::invalid("qualifier is required.");
        assert_eq!(err.to_string(), "qualifier is required.");

        let err = err.locate("/ddms:identifier").locate("/ddms:Resource");
        assert_eq!(
            err.to_string(),
            "qualifier is required. (at /ddms:Resource/ddms:identifier)"
        );
        assert_eq!(err.message(), "qualifier is required.");
        assert_eq!(err.locator(), Some("/ddms:Resource/ddms:identifier"));
    }

    #[test]
    fn test_locate_ignores_other_variants() {
        let err = DdmsError::Vocabulary {
            key: "CVEnumISMSAR".to_string(),
            details: "file not found".to_string(),
        };
        let located = err.clone().locate("/ddms:Resource");
        assert_eq!(err, located);
        assert!(!located.is_invalid());
        assert!(located.to_string().contains("CVEnumISMSAR"));
    }

    #[test]
    fn test_schema_validation_display() {
        let err = DdmsError::SchemaValidation {
            diagnostics: vec!["line 1: bad".to_string(), "line 2: worse".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Schema validation failed: line 1: bad; line 2: worse"
        );
    }

    #[test]
    fn test_warning_prefixing() {
        let warning = ValidationMessage::warning("A ddms:description element was found with no value.", "/ddms:description");
        let merged = warning.with_prefix("/ddms:Resource");
        assert_eq!(merged.locator, "/ddms:Resource/ddms:description");
        assert_eq!(merged.text, warning.text);
        assert_eq!(merged.severity, Severity::Warning);
        assert!(merged.to_string().starts_with("[WARNING]"));
    }

    #[test]
    fn test_message_from_error() {
        let err = DdmsError::invalid("bad").locate("/ddms:title");
        let message = ValidationMessage::from(&err);
        assert_eq!(message.severity, Severity::Error);
        assert_eq!(message.locator, "/ddms:title");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err = DdmsError::io("/tmp/missing.xml", io_error);
        match err {
            DdmsError::Io { path, details } => {
                assert_eq!(path, PathBuf::from("/tmp/missing.xml"));
                assert!(details.contains("File not found"));
            }
            _ => panic!("Expected DdmsError::Io"),
        }
    }
}
