//! # carident_core
//!
//! Core types for the carident caries analysis pipeline.
//!
//! This crate provides:
//! - [`ProbabilityMask`] for per-pixel lesion probability maps
//! - [`NormalizedPrediction`] tagged union produced by [`normalize`]
//! - [`Severity`], [`SeverityResult`] and [`LesionBox`] result types
//! - [`CariesPolicy`] for the caller-selected "has caries" decision
//! - [`DiagnosisStatus`] processing state machine
//! - [`CariesModel`] / [`InspectableModel`] model boundary traits and the
//!   process-wide [`ModelCache`]
//!
//! ## Shape Convention
//!
//! Model tensors follow the NHWC convention `(B, H, W, C)`:
//! - `B`: Batch size (always 1 at this boundary)
//! - `H`, `W`: Spatial dimensions
//! - `C`: Channels (1 for segmentation output)

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod lesion;
mod mask;
mod model;
mod policy;
mod prediction;
mod severity;
mod status;

pub use error::{CoreError, Result};
pub use lesion::LesionBox;
pub use mask::ProbabilityMask;
pub use model::{CariesModel, InspectableModel, ModelCache};
pub use policy::CariesPolicy;
pub use prediction::{normalize, NormalizedPrediction, PredictionMode};
pub use severity::{Severity, SeverityResult, SEVERITY_LABELS};
pub use status::DiagnosisStatus;

/// Backend type aliases for convenience
pub mod backend {
    #[cfg(feature = "backend-ndarray")]
    pub use burn_ndarray::NdArray;
}
