//! Raw prediction normalization.
//!
//! The model boundary hands back a [`TensorData`] of whatever shape the
//! network produces. [`normalize`] turns it into a tagged union exactly once;
//! every downstream stage matches on the union instead of re-inspecting
//! tensor ranks.

use burn::tensor::TensorData;
use serde::{Deserialize, Serialize};

use crate::mask::ProbabilityMask;

/// Which canonical form a raw prediction collapsed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionMode {
    /// Per-pixel probability mask.
    Segmentation,
    /// Per-class probability vector.
    Classification,
    /// Unrecognized tensor shape.
    Unknown,
}

/// Canonical representation of a raw model output.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedPrediction {
    /// 2-D per-pixel probability mask from a `(1, H, W, 1)` output.
    Segmentation(ProbabilityMask),
    /// Per-class probability vector from a `(1, K)` output, order preserved.
    Classification(Vec<f64>),
    /// Anything else; downstream stages degrade gracefully.
    Unknown {
        /// The shape that could not be interpreted.
        shape: Vec<usize>,
    },
}

impl NormalizedPrediction {
    /// The mode tag for this prediction.
    #[must_use]
    pub const fn mode(&self) -> PredictionMode {
        match self {
            Self::Segmentation(_) => PredictionMode::Segmentation,
            Self::Classification(_) => PredictionMode::Classification,
            Self::Unknown { .. } => PredictionMode::Unknown,
        }
    }
}

/// Collapse a raw prediction tensor to its canonical representation.
///
/// Shape is the sole discriminant:
/// - rank 4 `(B, H, W, C)`: batch 0, channel 0 are extracted into a 2-D
///   mask (channel 0 also covers multi-channel outputs);
/// - rank 2 `(B, K)`: row 0 becomes a class-probability vector;
/// - any other rank, or a payload that cannot be read as `f32`, yields
///   [`NormalizedPrediction::Unknown`].
///
/// Probability values are passed through untouched; the model's final
/// activation is trusted to produce `[0, 1]`. This function never fails:
/// the `Unknown` variant is the designated fallback.
#[must_use]
pub fn normalize(tensor: TensorData) -> NormalizedPrediction {
    let shape = tensor.shape.clone();
    let values = match tensor.convert::<f32>().to_vec::<f32>() {
        Ok(values) => values,
        Err(err) => {
            tracing::warn!(?shape, ?err, "prediction payload unreadable");
            return NormalizedPrediction::Unknown { shape };
        }
    };

    let recognized = match *shape.as_slice() {
        [b, h, w, c] if b >= 1 && c >= 1 => {
            let mut mask = Vec::with_capacity(h * w);
            for y in 0..h {
                for x in 0..w {
                    mask.push(values[(y * w + x) * c]);
                }
            }
            ProbabilityMask::new(h, w, mask)
                .ok()
                .map(NormalizedPrediction::Segmentation)
        }
        [b, k] if b >= 1 => {
            let probs = values[..k].iter().map(|&p| f64::from(p)).collect();
            Some(NormalizedPrediction::Classification(probs))
        }
        _ => None,
    };

    match recognized {
        Some(prediction) => prediction,
        None => {
            tracing::debug!(?shape, "unrecognized prediction shape");
            NormalizedPrediction::Unknown { shape }
        }
    }
}
