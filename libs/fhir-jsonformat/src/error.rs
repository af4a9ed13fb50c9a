//! Error types.
//!
//! [`ValidationError`] is the per-value outcome handed back to callers. Its
//! `detail` is built only from fixed vocabulary and schema names; anything
//! taken from the input goes into `diagnostics`, which is left out of
//! `Display` so the error can be logged safely.
//!
//! [`SchemaError`] reports a broken schema set and only ever comes out of
//! [`FormatContext::new`](crate::FormatContext::new).

use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid {kind} precision {precision}")]
    InvalidPrecision {
        kind: &'static str,
        precision: String,
    },

    #[error("timestamp out of range")]
    TimestampOutOfRange,

    #[error("{0}")]
    Descriptor(String),

    #[error(transparent)]
    Reflect(#[from] ferrum_reflect::Error),
}

impl Error {
    pub fn descriptor(message: impl Into<String>) -> Self {
        Self::Descriptor(message.into())
    }

    /// The validation error carried by this error, if any
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Schema defects found while building a [`FormatContext`](crate::FormatContext).
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("configured type {0} is not in the descriptor pool")]
    UnknownType(String),

    #[error("invalid value regex on {type_name}: {source}")]
    InvalidRegex {
        type_name: String,
        #[source]
        source: regex::Error,
    },

    #[error("{type_name} has no \"reference\" oneof")]
    MissingReferenceOneof { type_name: String },

    #[error("conflicting field types: {field} maps to both {existing} and {conflicting}")]
    ConflictingReferenceType {
        field: String,
        existing: String,
        conflicting: String,
    },

    #[error("conflicting field names: {resource_type} maps to both {existing} and {conflicting}")]
    ConflictingReferenceField {
        resource_type: String,
        existing: String,
        conflicting: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Lexical or grammar mismatch
    Malformed,
    MissingRequired,
    ReferenceTypeMismatch,
    StringTooLong,
    InvalidCharacters,
}

impl ErrorKind {
    /// OperationOutcome issue type code
    pub fn issue_code(&self) -> &'static str {
        match self {
            Self::Malformed => "value",
            Self::MissingRequired => "required",
            Self::ReferenceTypeMismatch => "structure",
            Self::StringTooLong => "too-long",
            Self::InvalidCharacters => "invalid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ErrorKind,
    /// Location of the offending value, empty when unknown
    pub path: String,
    pub detail: String,
    /// May contain input data; never log this
    pub diagnostics: Option<String>,
}

impl ValidationError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            path: String::new(),
            detail: detail.into(),
            diagnostics: None,
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Malformed, detail)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the path unless one is already recorded
    pub fn or_path(self, path: &str) -> Self {
        if self.path.is_empty() {
            self.with_path(path)
        } else {
            self
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: impl Into<String>) -> Self {
        self.diagnostics = Some(diagnostics.into());
        self
    }

    /// Render as an OperationOutcome issue, diagnostics included.
    pub fn to_issue(&self) -> Value {
        let mut issue = json!({
            "severity": "error",
            "code": self.kind.issue_code(),
            "details": { "text": self.detail },
        });

        if let Some(ref diagnostics) = self.diagnostics {
            issue["diagnostics"] = json!(diagnostics);
        }

        if !self.path.is_empty() {
            issue["expression"] = json!([self.path]);
        }

        issue
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() {
            write!(f, "error at {:?}: ", self.path)?;
        }
        f.write_str(&self.detail)
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_omits_diagnostics() {
        let err = ValidationError::malformed("code type mismatch")
            .with_path("Patient.gender")
            .with_diagnostics("\"x\" is not a AdministrativeGenderCode");
        assert_eq!(err.to_string(), "error at \"Patient.gender\": code type mismatch");

        let bare = ValidationError::new(ErrorKind::StringTooLong, "string exceeds maximum size of 1 MB");
        assert_eq!(bare.to_string(), "string exceeds maximum size of 1 MB");
    }

    #[test]
    fn test_or_path_keeps_inner_path() {
        let err = ValidationError::malformed("invalid time").with_path("Observation.valueTime");
        assert_eq!(err.or_path("Observation").path, "Observation.valueTime");
        let err = ValidationError::malformed("invalid time");
        assert_eq!(err.or_path("Observation").path, "Observation");
    }

    #[test]
    fn test_to_issue() {
        let issue = ValidationError::new(ErrorKind::MissingRequired, "missing required field \"status\"")
            .with_path("Observation")
            .to_issue();
        assert_eq!(issue["severity"], "error");
        assert_eq!(issue["code"], "required");
        assert_eq!(issue["details"]["text"], "missing required field \"status\"");
        assert_eq!(issue["expression"], json!(["Observation"]));
        assert!(issue.get("diagnostics").is_none());
    }
}
