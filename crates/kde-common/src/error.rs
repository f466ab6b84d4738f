//! Error types for density estimation and contouring.

use thiserror::Error;

/// Result type alias using KdeError.
pub type KdeResult<T> = Result<T, KdeError>;

/// Primary error type for the kde crates.
#[derive(Debug, Error)]
pub enum KdeError {
    // === Parameter Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Non-finite sample coordinate ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },

    #[error("Degenerate bounding box: {0}")]
    DegenerateBounds(String),

    // === Layer Errors ===
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Layer already exists: {0}")]
    LayerExists(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl KdeError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by caller-supplied input rather than
    /// the environment (files, parsing).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            KdeError::InvalidParameter { .. }
                | KdeError::NonFiniteCoordinate { .. }
                | KdeError::DegenerateBounds(_)
        )
    }
}

impl From<std::io::Error> for KdeError {
    fn from(err: std::io::Error) -> Self {
        KdeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KdeError {
    fn from(err: serde_json::Error) -> Self {
        KdeError::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for KdeError {
    fn from(err: serde_yaml::Error) -> Self {
        KdeError::Yaml(err.to_string())
    }
}
