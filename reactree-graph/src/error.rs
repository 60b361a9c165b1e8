//! Error types for graph serialization.

use thiserror::Error;

/// Errors that can occur while serializing an object graph.
///
/// Cyclic references are not errors; they are pruned during the walk.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// A value has no text encoding (e.g. a native host handle).
    #[error("Cannot encode {kind} value at {path}")]
    EncodingError { path: String, kind: String },

    /// A function was found outside the type-descriptor field while the
    /// function policy is `reject`.
    #[error("Function '{name}' at {path} is not serializable")]
    UnsupportedFunction { path: String, name: String },

    /// The graph nests deeper than the configured limit.
    #[error("Nesting depth limit of {limit} exceeded at {path}")]
    DepthLimitExceeded { path: String, limit: usize },

    /// The final text encoding step failed.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl SerializationError {
    /// Location of the offending value, when known.
    pub fn path(&self) -> Option<&str> {
        match self {
            SerializationError::EncodingError { path, .. }
            | SerializationError::UnsupportedFunction { path, .. }
            | SerializationError::DepthLimitExceeded { path, .. } => Some(path),
            SerializationError::Json(_) => None,
        }
    }
}
