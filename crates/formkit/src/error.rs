// File: src/error.rs
// Purpose: Per-field validation errors and form-level failures

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// What kind of rule produced a field error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Required,
    MinLength,
    MaxLength,
    Email,
    Url,
    Pattern,
    Type,
    /// Reported after the fact, e.g. by a submit callback
    Custom,
}

/// A validation failure attached to a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Error reported by application code rather than the schema
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Custom, message)
    }
}

/// Field name to its current error. Only invalid fields have an entry.
pub type FieldErrors = BTreeMap<String, FieldError>;

/// Failures that stop a form from being rendered or configured.
///
/// Field-level problems are never reported here; they live in
/// [`FieldErrors`] on the form state.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("unknown field type `{field_type}` for field `{name}`")]
    UnknownFieldType { name: String, field_type: String },

    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("failed to read form options from {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse form options")]
    Config(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_error_kind() {
        let error = FieldError::custom("Name is already taken");
        assert_eq!(error.kind, ErrorKind::Custom);
        assert_eq!(error.message, "Name is already taken");
    }

    #[test]
    fn test_form_error_messages() {
        let err = FormError::UnknownFieldType {
            name: "color".to_string(),
            field_type: "color-wheel".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown field type `color-wheel` for field `color`"
        );
        assert_eq!(
            FormError::DuplicateField("name".to_string()).to_string(),
            "field `name` is declared more than once"
        );
    }

    #[test]
    fn test_field_error_serializes_kind_in_snake_case() {
        let json = serde_json::to_value(FieldError::new(ErrorKind::MinLength, "too short")).unwrap();
        assert_eq!(json["kind"], "min_length");
        assert_eq!(json["message"], "too short");
    }
}
