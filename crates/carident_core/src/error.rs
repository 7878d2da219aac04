//! Error types for carident_core.

use thiserror::Error;

use crate::status::DiagnosisStatus;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur in carident_core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input image unreadable or missing. Fatal to the current request.
    #[error("Input error: {0}")]
    Input(String),

    /// Mask buffer length does not match the declared dimensions.
    #[error("Invalid mask: expected {expected} values for {height}x{width}, got {got}")]
    InvalidMask {
        /// Mask height in pixels.
        height: usize,
        /// Mask width in pixels.
        width: usize,
        /// Expected buffer length.
        expected: usize,
        /// Actual buffer length.
        got: usize,
    },

    /// Shape mismatch between tensors or buffers.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The model or one of its layers is unavailable.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Tensor data could not be read back from the backend.
    #[error("Tensor error: {0}")]
    Tensor(String),

    /// Out-of-memory or encoding failure. Fatal to that artifact only.
    #[error("Resource error: {0}")]
    Resource(String),

    /// Illegal diagnosis status transition.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// State the record was in.
        from: DiagnosisStatus,
        /// State that was requested.
        to: DiagnosisStatus,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
