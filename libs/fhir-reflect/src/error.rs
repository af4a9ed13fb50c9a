//! Error types for descriptor pools and dynamic messages

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("duplicate type name: {0}")]
    DuplicateType(String),

    #[error("duplicate field {field} in {message}")]
    DuplicateField { message: String, field: String },

    #[error("field {field} has no typeName")]
    MissingTypeName { field: String },

    #[error("field {field} references unknown type {type_name}")]
    UnresolvedType { field: String, type_name: String },

    #[error("field {field} references unknown oneof {oneof}")]
    UnknownOneof { field: String, oneof: String },

    #[error("field {field} does not belong to {message}")]
    FieldNotInMessage { message: String, field: String },

    #[error("no field named {field} in {message}")]
    FieldNotFound { message: String, field: String },

    #[error("value does not match the type of field {0}")]
    TypeMismatch(String),

    #[error("field {0} is not repeated")]
    NotRepeated(String),

    #[error("field {0} is not a singular message field")]
    NotMessage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
