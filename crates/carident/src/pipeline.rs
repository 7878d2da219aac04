//! Synchronous per-request diagnosis pipeline.
//!
//! Stages run strictly in order within one request:
//! preprocess -> predict -> normalize -> classify -> extract. The shared
//! model is read-only; each request owns its tensors and masks, so
//! concurrent requests need no locking at this layer.

use std::marker::PhantomData;
use std::sync::Arc;

use burn::prelude::*;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use carident_core::{
    normalize, CariesModel, CariesPolicy, CoreError, DiagnosisStatus, InspectableModel, LesionBox,
    NormalizedPrediction, SeverityResult,
};
use carident_detect::{classify, extract, preprocess_for_model, ExtractionConfig};
use carident_explain::grad_cam_for_model;
use carident_render::{
    encode_png, explanation_report, heatmap_overlay, segmentation_overlay, ColorMap, OverlayConfig,
    RenderError, ReportConfig,
};

/// Errors that abort a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input image is unusable. Reported to the caller, no retry.
    #[error("Input error: {0}")]
    Input(String),

    /// Error from the model boundary or core types.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Error while rendering a requested artifact.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Configuration for a pipeline instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Lesion extraction settings.
    pub extraction: ExtractionConfig,
    /// Which "has caries" policy the caller persists. The three policies
    /// disagree on borderline masks by design; pick one and apply it
    /// consistently.
    pub policy: CariesPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            policy: CariesPolicy::default(),
        }
    }
}

/// Result of one pipeline run, safe to serialize: the transient mask has
/// already been stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Severity verdict with statistics.
    pub severity: SeverityResult,
    /// Extracted lesion bounding boxes, possibly empty.
    pub lesions: Vec<LesionBox>,
    /// Boolean verdict under the configured policy.
    pub has_caries: bool,
    /// Final processing status; `Completed` on every `Ok` return.
    pub status: DiagnosisStatus,
}

/// Synchronous diagnosis pipeline around a shared, read-only model.
pub struct CariesPipeline<B: Backend, M> {
    model: Arc<M>,
    device: B::Device,
    config: PipelineConfig,
    _backend: PhantomData<B>,
}

impl<B, M> CariesPipeline<B, M>
where
    B: Backend,
    M: CariesModel<B>,
{
    /// Create a pipeline. `model` usually comes out of a
    /// [`carident_core::ModelCache`].
    pub fn new(model: Arc<M>, device: B::Device, config: PipelineConfig) -> Self {
        Self {
            model,
            device,
            config,
            _backend: PhantomData,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full analysis for one radiograph.
    ///
    /// Classification and extraction degrade rather than fail: an
    /// unrecognized prediction shape yields an `Unknown` verdict with no
    /// lesions. Hard failures are limited to unusable input images and
    /// model errors.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Input`] for an empty image,
    /// [`PipelineError::Core`] for model failures.
    pub fn diagnose(&self, image: &RgbImage) -> Result<Diagnosis, PipelineError> {
        let mut status = DiagnosisStatus::Pending;

        status = status.advance_to(DiagnosisStatus::Preprocessing)?;
        if image.width() == 0 || image.height() == 0 {
            return Err(PipelineError::Input("image has zero pixels".to_string()));
        }
        let input = preprocess_for_model(self.model.as_ref(), image, &self.device);

        status = status.advance_to(DiagnosisStatus::Detecting)?;
        let raw = self.model.predict(input)?;
        let prediction = normalize(raw);

        status = status.advance_to(DiagnosisStatus::Classifying)?;
        let mut severity = classify(prediction);
        let lesions = severity
            .mask()
            .map(|mask| extract(mask, &self.config.extraction))
            .unwrap_or_default();
        let has_caries = self.config.policy.has_caries(&severity);

        // The mask is too large to leave the process; drop it before the
        // result can be serialized.
        severity.strip_mask();

        status = status.advance_to(DiagnosisStatus::Completed)?;
        tracing::info!(
            severity = %severity.severity,
            confidence = severity.confidence,
            lesions = lesions.len(),
            has_caries,
            "diagnosis completed"
        );

        Ok(Diagnosis {
            severity,
            lesions,
            has_caries,
            status,
        })
    }

    /// Render just the colored segmentation overlay for one radiograph and
    /// return it as PNG bytes. Faster than the full report; the detection
    /// gate still applies, so weak masks return the plain image.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CariesPipeline::diagnose`], plus encoding
    /// failures; a non-segmentation output is rejected as
    /// [`PipelineError::Input`].
    pub fn overlay(
        &self,
        image: &RgbImage,
        config: &OverlayConfig,
    ) -> Result<Vec<u8>, PipelineError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PipelineError::Input("image has zero pixels".to_string()));
        }
        let input = preprocess_for_model(self.model.as_ref(), image, &self.device);
        let raw = self.model.predict(input)?;

        let NormalizedPrediction::Segmentation(mask) = normalize(raw) else {
            return Err(PipelineError::Input(
                "overlay requires a segmentation output".to_string(),
            ));
        };
        let (overlaid, _) = segmentation_overlay(image, &mask, config);
        Ok(encode_png(&overlaid)?)
    }
}

impl<B, M> CariesPipeline<B, M>
where
    B: Backend,
    M: InspectableModel<B>,
{
    /// Produce the encoded multi-panel explanation report for one
    /// radiograph.
    ///
    /// Runs the same inference stages as [`CariesPipeline::diagnose`], then
    /// assembles and PNG-encodes the report. A failing Grad-CAM panel is
    /// replaced by a placeholder; only encoding and assembly failures
    /// surface as errors.
    ///
    /// # Errors
    ///
    /// In addition to the [`CariesPipeline::diagnose`] failure modes, a
    /// non-segmentation prediction cannot be explained visually and is
    /// rejected as [`PipelineError::Input`].
    pub fn explain(&self, image: &RgbImage, config: &ReportConfig) -> Result<Vec<u8>, PipelineError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PipelineError::Input("image has zero pixels".to_string()));
        }
        let input = preprocess_for_model(self.model.as_ref(), image, &self.device);
        let raw = self.model.predict(input.clone())?;

        let NormalizedPrediction::Segmentation(mask) = normalize(raw) else {
            return Err(PipelineError::Input(
                "explanation report requires a segmentation output".to_string(),
            ));
        };
        let severity = classify(NormalizedPrediction::Segmentation(mask.clone()));

        let report = explanation_report(
            self.model.as_ref(),
            image,
            &input,
            &mask,
            &severity,
            config,
        )?;
        Ok(encode_png(&report)?)
    }

    /// Render the Grad-CAM heatmap composited onto the radiograph as PNG
    /// bytes.
    ///
    /// # Errors
    ///
    /// Unlike the report, there is no placeholder here: layer lookup and
    /// gradient failures surface as errors for the caller to handle.
    pub fn gradcam_overlay(&self, image: &RgbImage) -> Result<Vec<u8>, PipelineError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PipelineError::Input("image has zero pixels".to_string()));
        }
        let input = preprocess_for_model(self.model.as_ref(), image, &self.device);
        let heatmap = grad_cam_for_model(self.model.as_ref(), input, None)
            .map_err(|err| CoreError::ModelUnavailable(err.to_string()))?;
        let overlaid = heatmap_overlay(&heatmap, image, 0.4, ColorMap::Jet);
        Ok(encode_png(&overlaid)?)
    }
}
