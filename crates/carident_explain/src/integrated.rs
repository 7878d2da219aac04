//! Integrated gradients attribution.
//!
//! Accumulates gradients along a straight path from a baseline to the
//! actual input. Present as a standalone capability; the default
//! explanation report does not wire it in.

use burn::prelude::*;

use crate::error::Result;

/// Configuration for integrated gradients.
#[derive(Debug, Clone, Copy)]
pub struct IntegratedGradientsConfig {
    /// Number of interpolation points between baseline and input.
    pub steps: usize,
}

impl Default for IntegratedGradientsConfig {
    fn default() -> Self {
        Self { steps: 50 }
    }
}

/// Create an all-zero baseline matching `dims`.
pub fn zero_baseline<B: Backend>(dims: [usize; 4], device: &B::Device) -> Tensor<B, 4> {
    Tensor::zeros(dims, device)
}

/// Compute integrated gradients for `input`.
///
/// # Arguments
///
/// * `input` - Model input, NHWC `(1, H, W, C)`
/// * `baseline` - Path start; defaults to zeros when `None`
/// * `gradients_fn` - Computes the gradient of the mean output activation
///   with respect to an interpolated input (the model boundary's
///   `input_gradients`)
/// * `config` - Step count
///
/// # Returns
///
/// Attribution of the same shape as the input:
/// `(input - baseline) * mean(gradients over the interpolation path)`.
/// `steps` points are spaced linearly from the baseline (inclusive) to the
/// input (inclusive).
///
/// # Errors
///
/// Propagates the first failure of `gradients_fn`.
pub fn integrated_gradients<B, F>(
    input: &Tensor<B, 4>,
    baseline: Option<Tensor<B, 4>>,
    gradients_fn: F,
    config: &IntegratedGradientsConfig,
) -> Result<Tensor<B, 4>>
where
    B: Backend,
    F: Fn(&Tensor<B, 4>) -> carident_core::Result<Tensor<B, 4>>,
{
    let device = input.device();
    let baseline = baseline.unwrap_or_else(|| Tensor::zeros(input.dims(), &device));
    let diff = input.clone() - baseline.clone();

    let steps = config.steps.max(1);
    let mut accumulated = Tensor::<B, 4>::zeros(input.dims(), &device);
    for step in 0..steps {
        let alpha = if steps > 1 {
            step as f32 / (steps - 1) as f32
        } else {
            0.0
        };
        let interpolated = baseline.clone() + diff.clone() * alpha;
        accumulated = accumulated + gradients_fn(&interpolated)?;
    }

    let average = accumulated / steps as f32;
    Ok(diff * average)
}
