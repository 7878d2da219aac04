//! Error types for carident_explain.

use thiserror::Error;

use carident_core::CoreError;

/// Result type alias using [`ExplainError`].
pub type Result<T> = std::result::Result<T, ExplainError>;

/// Errors raised by attribution methods.
///
/// Saliency is the one place in the pipeline that is allowed to fail loudly:
/// callers assembling a multi-panel report catch these per panel and render
/// a placeholder instead of aborting the report.
#[derive(Error, Debug)]
pub enum ExplainError {
    /// The model or a required layer is unavailable for gradient capture.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Tensor shapes or payloads were unusable.
    #[error("Tensor error: {0}")]
    Tensor(String),

    /// Error propagated from the core types or the model boundary.
    #[error(transparent)]
    Core(#[from] CoreError),
}
