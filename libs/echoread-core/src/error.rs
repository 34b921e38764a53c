//! Error types for echoread-core.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type alias using ValidationError.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Required field absent or null.
    Missing,
    /// Value could not be decoded into the declared type.
    InvalidType,
    /// Value decoded but violates a declared constraint.
    Constraint,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Missing => "missing",
            Self::InvalidType => "invalid type",
            Self::Constraint => "constraint violated",
        };
        f.write_str(s)
    }
}

/// A rejected field with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn missing(field: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: FieldErrorKind::Missing,
            message: "required field is missing".to_string(),
        }
    }

    pub fn invalid_type(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            kind: FieldErrorKind::InvalidType,
            message: message.into(),
        }
    }

    pub fn constraint(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            kind: FieldErrorKind::Constraint,
            message: message.into(),
        }
    }
}

/// Rejection of a whole write payload.
///
/// Always carries at least one field error, sorted by field name.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("validation failed: {}", summarize(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    /// Build from collected field errors. Returns `None` when nothing failed.
    pub fn from_errors(mut errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        Some(Self { errors })
    }

    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// First error reported for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({}: {})", e.field, e.kind, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut errors = Vec::new();
        for (field, field_errors) in errs.field_errors() {
            for e in field_errors.iter() {
                let message = match &e.message {
                    Some(m) => m.to_string(),
                    None => e.code.to_string(),
                };
                errors.push(FieldError::constraint(&field.to_string(), message));
            }
        }
        Self::from_errors(errors)
            .unwrap_or_else(|| Self::single(FieldError::constraint("$", "invalid payload")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_errors_are_not_an_error() {
        assert!(ValidationError::from_errors(vec![]).is_none());
    }

    #[test]
    fn errors_are_sorted_by_field() {
        let err = ValidationError::from_errors(vec![
            FieldError::missing("title"),
            FieldError::missing("book_id"),
        ])
        .unwrap();
        assert_eq!(err.errors()[0].field, "book_id");
        assert_eq!(err.errors()[1].field, "title");
    }

    #[test]
    fn display_lists_every_field() {
        let err = ValidationError::from_errors(vec![
            FieldError::missing("name"),
            FieldError::constraint("slug", "length"),
        ])
        .unwrap();
        assert_eq!(
            err.to_string(),
            "validation failed: name (missing: required field is missing), \
             slug (constraint violated: length)"
        );
    }
}
