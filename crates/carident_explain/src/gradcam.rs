//! Gradient-weighted Class Activation Mapping.

use burn::prelude::*;

use carident_core::{InspectableModel, ProbabilityMask};

use crate::error::{ExplainError, Result};

/// Pick the attribution target layer from a forward-ordered name list.
///
/// Scanning from the output side, the last layer whose name contains
/// `"conv"` (case-insensitive) wins; if no layer matches, the second-to-last
/// layer overall is used.
///
/// # Errors
///
/// Returns [`ExplainError::ModelUnavailable`] when the network has fewer
/// than two layers, leaving no usable fallback.
pub fn find_target_layer(names: &[String]) -> Result<String> {
    if let Some(name) = names
        .iter()
        .rev()
        .find(|name| name.to_lowercase().contains("conv"))
    {
        return Ok(name.clone());
    }
    if names.len() >= 2 {
        tracing::debug!(
            fallback = %names[names.len() - 2],
            "no convolutional layer found, using second-to-last layer"
        );
        return Ok(names[names.len() - 2].clone());
    }
    Err(ExplainError::ModelUnavailable(format!(
        "no attribution target: network has {} layer(s) and none named conv",
        names.len()
    )))
}

/// Compute a Grad-CAM heatmap from captured feature maps and gradients.
///
/// # Arguments
///
/// * `activations` - Feature maps of the target layer, NHWC `(1, H, W, C)`
/// * `gradients` - Gradients of the mean output activation with respect to
///   those feature maps, same shape
///
/// # Returns
///
/// An `H x W` heatmap with values in `[0, 1]`: the gradients are
/// channel-wise global-average-pooled into per-channel weights, the feature
/// maps are summed under those weights, negative contributions are zeroed
/// and the result is max-normalized. A zero maximum yields an all-zero
/// heatmap instead of dividing by zero.
pub fn grad_cam<B: Backend>(
    activations: Tensor<B, 4>,
    gradients: Tensor<B, 4>,
) -> Result<ProbabilityMask> {
    let dims = activations.dims();
    if gradients.dims() != dims {
        return Err(ExplainError::Tensor(format!(
            "activation shape {:?} != gradient shape {:?}",
            dims,
            gradients.dims()
        )));
    }
    let [batch, height, width, _channels] = dims;
    if batch != 1 {
        return Err(ExplainError::Tensor(format!(
            "expected a batch of 1, got {batch}"
        )));
    }

    // Global average pool over batch and both spatial dims: (1, 1, 1, C).
    let weights = gradients.mean_dim(1).mean_dim(2);

    // Weighted channel sum, then ReLU: (1, H, W, 1).
    let cam = (activations * weights).sum_dim(3).clamp_min(0.0);
    let cam: Tensor<B, 2> = cam.reshape([height, width]);

    let max: f32 = cam.clone().max().into_scalar().elem();
    let cam = if max > 0.0 {
        cam / max
    } else {
        Tensor::zeros([height, width], &cam.device())
    };

    let values = cam
        .into_data()
        .to_vec::<f32>()
        .map_err(|err| ExplainError::Tensor(format!("{err:?}")))?;
    Ok(ProbabilityMask::new(height, width, values)?)
}

/// Run Grad-CAM against a model, selecting the target layer automatically
/// when `layer` is not given.
///
/// # Errors
///
/// Layer lookup and gradient capture failures surface as
/// [`ExplainError::ModelUnavailable`]; report assembly is expected to catch
/// them per panel.
pub fn grad_cam_for_model<B, M>(
    model: &M,
    input: Tensor<B, 4>,
    layer: Option<&str>,
) -> Result<ProbabilityMask>
where
    B: Backend,
    M: InspectableModel<B>,
{
    let layer = match layer {
        Some(name) => name.to_string(),
        None => find_target_layer(&model.layer_names())?,
    };
    tracing::debug!(layer = %layer, "computing Grad-CAM");
    let (activations, gradients) = model.layer_gradients(input, &layer)?;
    grad_cam(activations, gradients)
}
