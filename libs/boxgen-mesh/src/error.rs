//! # Mesh Errors
//!
//! Error types for parameter resolution, mesh generation and export.

use thiserror::Error;

/// Errors that can occur while generating or exporting box geometry.
///
/// Most out-of-range inputs are clamped rather than rejected; these variants
/// cover the remaining cases where no sensible geometry exists.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A parameter has no usable value (non-finite, non-positive, no cavity)
    #[error("Invalid parameter `{name}`: {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// Degenerate geometry
    #[error("Degenerate geometry: {message}")]
    DegenerateGeometry { message: String },

    /// Boolean operation failed
    #[error("Boolean operation failed: {message}")]
    BooleanFailed { message: String },

    /// A font could not be loaded
    #[error("Font error: {message}")]
    Font { message: String },

    /// Malformed ASCII STL input
    #[error("STL parse error at line {line}: {message}")]
    StlParse { line: usize, message: String },

    /// Parameter JSON could not be decoded
    #[error("Invalid parameter JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MeshError {
    /// Creates an invalid parameter error.
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            message: message.into(),
        }
    }

    /// Creates a boolean operation failed error.
    pub fn boolean_failed(message: impl Into<String>) -> Self {
        Self::BooleanFailed {
            message: message.into(),
        }
    }

    /// Creates a font error.
    pub fn font(message: impl Into<String>) -> Self {
        Self::Font {
            message: message.into(),
        }
    }

    /// Creates an STL parse error for a 1-based line number.
    pub fn stl_parse(line: usize, message: impl Into<String>) -> Self {
        Self::StlParse {
            line,
            message: message.into(),
        }
    }

    /// Name of the offending parameter, if this error concerns one.
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            Self::InvalidParameter { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Result type for kernel operations.
pub type MeshResult<T> = Result<T, MeshError>;
