//! Multi-panel explanation report.
//!
//! Assembles the visual explanation a dentist reviews: the original
//! radiograph, the raw probability heatmap, the segmentation overlay, the
//! Grad-CAM overlay, the binary threshold view and a statistics panel, in a
//! 2x3 grid. Every panel is best-effort: a failing saliency computation is
//! replaced by a placeholder naming the failure, never aborting the report.

use burn::prelude::*;
use image::imageops::FilterType;
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use carident_core::{CariesPolicy, InspectableModel, ProbabilityMask, SeverityResult};
use carident_explain::grad_cam_for_model;

use crate::colormap::ColorMap;
use crate::error::Result;
use crate::font::{draw_text, draw_text_block, text_width, CHAR_ADVANCE, LINE_HEIGHT};
use crate::overlay::{colorize_mask, heatmap_overlay, segmentation_overlay, OverlayConfig};

const BACKGROUND: Rgb<u8> = Rgb([245, 245, 245]);
const INK: Rgb<u8> = Rgb([20, 20, 20]);
const PLACEHOLDER_BG: Rgb<u8> = Rgb([40, 40, 48]);
const PLACEHOLDER_INK: Rgb<u8> = Rgb([220, 220, 220]);

/// Configuration for report composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportConfig {
    /// Content width of each panel in pixels.
    pub panel_width: u32,
    /// Content height of each panel in pixels.
    pub panel_height: u32,
    /// Spacing between panels and around the figure.
    pub margin: u32,
    /// Threshold for the binary detection panel.
    pub threshold: f32,
    /// Settings for the embedded segmentation overlay panel.
    pub overlay: OverlayConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            panel_width: 360,
            panel_height: 270,
            margin: 12,
            threshold: 0.5,
            overlay: OverlayConfig::default(),
        }
    }
}

/// Assemble the explanation report for one diagnosis.
///
/// The caries judgment used for the overlay title and interpretation block
/// is [`CariesPolicy::ConservativeJoint`] (`affected_percentage > 0.5` and
/// `max_probability > 0.6`) - intentionally stricter than the severity
/// classifier's own Normal split, and kept that way.
///
/// # Errors
///
/// Only figure assembly itself can fail; a Grad-CAM failure is rendered as
/// a placeholder panel carrying the error message.
pub fn explanation_report<B, M>(
    model: &M,
    original: &RgbImage,
    preprocessed: &Tensor<B, 4>,
    mask: &ProbabilityMask,
    severity: &SeverityResult,
    config: &ReportConfig,
) -> Result<RgbImage>
where
    B: Backend,
    M: InspectableModel<B>,
{
    let has_caries = CariesPolicy::ConservativeJoint.has_caries(severity);

    let overlay_title = if has_caries {
        "CARIES DETECTION (RED = DETECTED)"
    } else {
        "NO CARIES DETECTED"
    };
    let binary_title = format!("BINARY DETECTION (> {:.0}%)", f64::from(config.threshold) * 100.0);

    let gradcam_panel = match grad_cam_for_model(model, preprocessed.clone(), None) {
        Ok(heatmap) => fit(&heatmap_overlay(&heatmap, original, 0.4, ColorMap::Jet), config),
        Err(err) => {
            tracing::warn!(%err, "Grad-CAM unavailable, rendering placeholder");
            placeholder_panel(&format!("GRAD-CAM UNAVAILABLE: {err}"), config)
        }
    };

    let panels = [
        ("ORIGINAL X-RAY", fit(original, config)),
        (
            "PROBABILITY HEATMAP",
            fit(&colorize_mask(mask, ColorMap::Hot), config),
        ),
        (
            overlay_title,
            fit(
                &segmentation_overlay(original, mask, &config.overlay).0,
                config,
            ),
        ),
        ("GRAD-CAM FOCUS AREAS", gradcam_panel),
        (binary_title.as_str(), binary_panel(mask, config)),
        (
            "DETECTION STATISTICS",
            stats_panel(severity, has_caries, config),
        ),
    ];

    Ok(compose(&panels, config))
}

fn fit(image: &RgbImage, config: &ReportConfig) -> RgbImage {
    if image.width() == config.panel_width && image.height() == config.panel_height {
        image.clone()
    } else {
        imageops::resize(
            image,
            config.panel_width,
            config.panel_height,
            FilterType::Triangle,
        )
    }
}

fn placeholder_panel(message: &str, config: &ReportConfig) -> RgbImage {
    let mut panel = RgbImage::from_pixel(config.panel_width, config.panel_height, PLACEHOLDER_BG);
    draw_filled_rect_mut(
        &mut panel,
        Rect::at(0, 0).of_size(config.panel_width, 2),
        Rgb([120, 120, 130]),
    );

    let chars_per_line = (config.panel_width.saturating_sub(2 * config.margin)
        / CHAR_ADVANCE)
        .max(1) as usize;
    let wrapped = wrap(message, chars_per_line);
    let lines: Vec<&str> = wrapped.iter().map(String::as_str).collect();
    draw_text_block(
        &mut panel,
        &lines,
        config.margin,
        config.panel_height / 3,
        1,
        PLACEHOLDER_INK,
    );
    panel
}

fn binary_panel(mask: &ProbabilityMask, config: &ReportConfig) -> RgbImage {
    let mut panel = RgbImage::new(mask.width() as u32, mask.height() as u32);
    let binary = mask.binarize(config.threshold);
    for (pixel, &value) in panel.pixels_mut().zip(binary.iter()) {
        *pixel = Rgb([value, value, value]);
    }
    fit(&panel, config)
}

fn stats_panel(severity: &SeverityResult, has_caries: bool, config: &ReportConfig) -> RgbImage {
    let mut panel = RgbImage::from_pixel(config.panel_width, config.panel_height, Rgb([255; 3]));

    let mut lines = vec![
        format!("SEVERITY: {}", severity.severity),
        format!("CONFIDENCE: {:.2}%", severity.confidence),
        String::new(),
        format!(
            "AFFECTED AREA: {:.2}%",
            severity.affected_percentage.unwrap_or(0.0)
        ),
        format!(
            "MEAN PROBABILITY: {:.4}",
            severity.mean_probability.unwrap_or(0.0)
        ),
        format!(
            "MAX PROBABILITY: {:.4}",
            severity.max_probability.unwrap_or(0.0)
        ),
        String::new(),
        "INTERPRETATION:".to_string(),
    ];
    if has_caries {
        lines.extend([
            "- RED AREAS: SUSPECTED CARIES".to_string(),
            "- BRIGHTER = HIGHER CONFIDENCE".to_string(),
            "- GREEN AREAS: HEALTHY TISSUE".to_string(),
            "- REVIEW RED REGIONS CLINICALLY".to_string(),
        ]);
    } else {
        lines.extend([
            "- NO CARIES DETECTED".to_string(),
            "- ALL REGIONS BELOW THRESHOLD".to_string(),
            "- IMAGE SHOWS HEALTHY TISSUE".to_string(),
            "- ROUTINE MONITORING RECOMMENDED".to_string(),
        ]);
    }

    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    draw_text_block(&mut panel, &line_refs, config.margin, config.margin, 1, INK);
    panel
}

fn compose(panels: &[(&str, RgbImage); 6], config: &ReportConfig) -> RgbImage {
    let title_height = LINE_HEIGHT + 4;
    let header_height = 2 * LINE_HEIGHT + config.margin;
    let cell_width = config.panel_width;
    let cell_height = title_height + config.panel_height;

    let total_width = config.margin + 3 * (cell_width + config.margin);
    let total_height = config.margin + header_height + 2 * (cell_height + config.margin);

    let mut figure = RgbImage::from_pixel(total_width, total_height, BACKGROUND);

    let suptitle = "EXPLAINABLE AI - DENTAL CARIES DETECTION";
    let suptitle_x = total_width.saturating_sub(text_width(suptitle, 2)) / 2;
    draw_text(&mut figure, suptitle, suptitle_x, config.margin, 2, INK);

    for (index, (title, panel)) in panels.iter().enumerate() {
        let row = index as u32 / 3;
        let col = index as u32 % 3;
        let x = config.margin + col * (cell_width + config.margin);
        let y = config.margin + header_height + row * (cell_height + config.margin);

        draw_text(&mut figure, title, x, y, 1, INK);
        imageops::replace(&mut figure, panel, i64::from(x), i64::from(y + title_height));
    }

    figure
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
