//! Error types for carident_render.

use thiserror::Error;

use carident_core::CoreError;

/// Result type alias using [`RenderError`].
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors raised while rendering or encoding visual artifacts.
///
/// A failure here is fatal to the specific artifact being produced, never
/// to the diagnosis itself.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Image encoding failed.
    #[error("Encoding error: {0}")]
    Encode(#[from] image::ImageError),

    /// A rendering buffer could not be allocated or assembled.
    #[error("Resource error: {0}")]
    Resource(String),

    /// Error propagated from the core types.
    #[error(transparent)]
    Core(#[from] CoreError),
}
