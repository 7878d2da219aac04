//! # carident_explain
//!
//! Gradient-based attribution for carident: Grad-CAM over the last
//! convolutional layer, and integrated gradients along a baseline path.
//!
//! Both methods work against the [`carident_core::InspectableModel`]
//! boundary; they need layer names, feature maps and
//! gradient-of-output-wrt-layer access, nothing else.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod gradcam;
mod integrated;

pub use error::{ExplainError, Result};
pub use gradcam::{find_target_layer, grad_cam, grad_cam_for_model};
pub use integrated::{integrated_gradients, zero_baseline, IntegratedGradientsConfig};
