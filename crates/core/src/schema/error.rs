use thiserror::Error;

/// Errors produced while building or applying an attribute template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The data does not have the shape the template expects at `path`.
    #[error("Shape mismatch at '{path}': expected {expected}, found {found}")]
    ShapeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    /// The JSON form of a template is not a valid template.
    #[error("Invalid attribute template at '{path}': {reason}")]
    TemplateError { path: String, reason: String },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
