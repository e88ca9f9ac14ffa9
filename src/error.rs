//! Error types for schema compilation and document construction

use thiserror::Error;

/// Result type for builder operations
pub type Result<T> = std::result::Result<T, BuilderError>;

/// Builder errors
#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("Unresolved type reference: {type_name}.{attr_name} references undeclared type '{ref_name}'{}", hint(.suggestion))]
    UnresolvedTypeReference {
        type_name: String,
        attr_name: String,
        ref_name: String,
        suggestion: Option<String>,
    },

    #[error("Unknown type: '{name}'{}", hint(.suggestion))]
    UnknownType {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Unknown accessor: {kind} has no attribute '{name}'{}", hint(.suggestion))]
    UnknownAccessor {
        kind: String,
        name: String,
        suggestion: Option<String>,
    },

    #[error("Type mismatch: {attr} expects {expected}, got {found}")]
    TypeMismatch {
        attr: String,
        expected: String,
        found: String,
    },

    #[error("Cannot configure {attr}: installed value is not a node")]
    NotANode { attr: String },

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}
