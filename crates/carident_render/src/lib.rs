//! # carident_render
//!
//! Visualization for carident: segmentation and saliency overlays, the
//! multi-panel explanation report, and PNG encoding at the process boundary.
//!
//! Rendering is deterministic and stateless; every buffer is transient and
//! dropped once its artifact is encoded.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod colormap;
mod encode;
mod error;
mod font;
mod overlay;
mod report;

pub use colormap::ColorMap;
pub use encode::encode_png;
pub use error::{RenderError, Result};
pub use overlay::{colorize_mask, heatmap_overlay, segmentation_overlay, OverlayConfig};
pub use report::{explanation_report, ReportConfig};
