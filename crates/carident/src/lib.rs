//! # carident
//!
//! Post-inference analysis for dental caries radiographs.
//!
//! carident turns a segmentation model's raw per-pixel probability map into:
//!
//! - **Severity**: a clinical verdict with confidence and area statistics
//! - **Lesions**: discrete bounding boxes with per-region confidence
//! - **Explanations**: colored overlays, Grad-CAM saliency, and a
//!   multi-panel explanation report
//!
//! Model inference itself sits behind the [`carident_core::CariesModel`]
//! boundary; this crate wires the stages into a synchronous per-request
//! pipeline.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use carident::prelude::*;
//!
//! static MODEL: ModelCache<MyModel> = ModelCache::new();
//!
//! let model = MODEL.acquire(|| MyModel::load("adult_teeth.mpk"))?;
//! let pipeline = CariesPipeline::new(model, device, PipelineConfig::default());
//! let diagnosis = pipeline.diagnose(&image)?;
//! println!("{}: {:.1}%", diagnosis.severity.severity, diagnosis.severity.confidence);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export all crates
pub use carident_core as core;
pub use carident_detect as detect;
pub use carident_explain as explain;
pub use carident_render as render;

mod pipeline;

pub use pipeline::{CariesPipeline, Diagnosis, PipelineConfig, PipelineError};

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use carident::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use carident_core::{
        normalize, CariesModel, CariesPolicy, DiagnosisStatus, InspectableModel, LesionBox,
        ModelCache, NormalizedPrediction, ProbabilityMask, Severity, SeverityResult,
    };

    // Detection
    pub use carident_detect::{classify, extract, preprocess_image, ExtractionConfig};

    // Explanations
    pub use carident_explain::{grad_cam, grad_cam_for_model, integrated_gradients};

    // Rendering
    pub use carident_render::{
        encode_png, explanation_report, heatmap_overlay, segmentation_overlay, ColorMap,
        OverlayConfig, ReportConfig,
    };

    // Pipeline
    pub use crate::pipeline::{CariesPipeline, Diagnosis, PipelineConfig};
}
