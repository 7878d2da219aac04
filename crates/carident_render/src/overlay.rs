//! Overlay compositing of masks and heatmaps onto radiographs.

use image::RgbImage;

use carident_core::ProbabilityMask;

use crate::colormap::ColorMap;

/// Configuration for segmentation overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    /// Pixels strictly above this probability are painted as lesion.
    pub threshold: f32,
    /// Detection gate: maximum mask probability must exceed this.
    pub gate_max: f32,
    /// Detection gate: mean mask probability must exceed this.
    pub gate_mean: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            gate_max: 0.6,
            gate_mean: 0.01,
        }
    }
}

fn blend(colored: u8, original: u8, colored_weight: f32) -> u8 {
    (colored_weight * f32::from(colored) + (1.0 - colored_weight) * f32::from(original))
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Composite a probability mask onto the original image as a colored
/// overlay.
///
/// The mask is bilinearly resampled to the image resolution first. A
/// detection gate then decides whether anything is rendered at all: unless
/// `max > gate_max` and `mean > gate_mean`, the original image is returned
/// untouched together with an all-zero mask image, so near-uniformly-low
/// masks never visually imply a detection.
///
/// When gated in, pixels above `threshold` get a red intensity proportional
/// to their probability; pixels in the warning band `(0.1, threshold]` get a
/// dimmer red+green tint; pixels at or below 0.1 stay unpainted. The final
/// composite is `0.4 * colored + 0.6 * original`, favoring the original.
///
/// # Returns
///
/// `(overlaid_image, colored_mask)` at the original image's resolution.
#[must_use]
pub fn segmentation_overlay(
    original: &RgbImage,
    mask: &ProbabilityMask,
    config: &OverlayConfig,
) -> (RgbImage, RgbImage) {
    let width = original.width();
    let height = original.height();
    let resampled = mask.resize_bilinear(width as usize, height as usize);

    let gated_in = resampled.max_value() > f64::from(config.gate_max)
        && resampled.mean() > f64::from(config.gate_mean);
    if !gated_in {
        tracing::debug!(
            max = resampled.max_value(),
            mean = resampled.mean(),
            "overlay gated out"
        );
        return (original.clone(), RgbImage::new(width, height));
    }

    let mut colored = RgbImage::new(width, height);
    for (x, y, pixel) in colored.enumerate_pixels_mut() {
        let p = resampled.get(x as usize, y as usize);
        if p > config.threshold {
            pixel[0] = (p * 255.0).clamp(0.0, 255.0) as u8;
        } else if p > 0.1 {
            let tint = (p * 200.0).clamp(0.0, 255.0) as u8;
            pixel[0] = tint;
            pixel[1] = tint;
        }
    }

    let mut overlaid = RgbImage::new(width, height);
    for (x, y, pixel) in overlaid.enumerate_pixels_mut() {
        let src = original.get_pixel(x, y);
        let tint = colored.get_pixel(x, y);
        for c in 0..3 {
            pixel[c] = blend(tint[c], src[c], 0.4);
        }
    }

    (overlaid, colored)
}

/// Composite a saliency heatmap onto the original image.
///
/// The heatmap is resampled to the image resolution, passed through
/// `colormap`, and blended as `(1 - alpha) * original + alpha * colored`.
#[must_use]
pub fn heatmap_overlay(
    heatmap: &ProbabilityMask,
    original: &RgbImage,
    alpha: f32,
    colormap: ColorMap,
) -> RgbImage {
    let width = original.width();
    let height = original.height();
    let resampled = heatmap.resize_bilinear(width as usize, height as usize);

    let mut overlaid = RgbImage::new(width, height);
    for (x, y, pixel) in overlaid.enumerate_pixels_mut() {
        let src = original.get_pixel(x, y);
        let color = colormap.map(resampled.get(x as usize, y as usize));
        for c in 0..3 {
            pixel[c] = blend(color[c], src[c], alpha);
        }
    }
    overlaid
}

/// Render a mask on its own through a color ramp, without the original
/// image. Used for the raw probability heatmap panel.
#[must_use]
pub fn colorize_mask(mask: &ProbabilityMask, colormap: ColorMap) -> RgbImage {
    let mut out = RgbImage::new(mask.width() as u32, mask.height() as u32);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let color = colormap.map(mask.get(x as usize, y as usize));
        *pixel = image::Rgb(color);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gray_image(width: u32, height: u32, level: u8) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([level, level, level]))
    }

    fn strong_mask() -> ProbabilityMask {
        // 16x16 mask, upper-left 8x8 quadrant at 0.9.
        let mut data = vec![0.0f32; 256];
        for y in 0..8 {
            for x in 0..8 {
                data[y * 16 + x] = 0.9;
            }
        }
        ProbabilityMask::new(16, 16, data).unwrap()
    }

    #[test]
    fn test_gate_blocks_weak_masks() {
        let original = gray_image(16, 16, 100);
        let weak = ProbabilityMask::new(16, 16, vec![0.4f32; 256]).unwrap();

        let (overlaid, colored) = segmentation_overlay(&original, &weak, &OverlayConfig::default());
        assert_eq!(overlaid, original);
        assert!(colored.pixels().all(|p| p[0] == 0 && p[1] == 0 && p[2] == 0));
    }

    #[test]
    fn test_gate_needs_both_conditions() {
        let original = gray_image(16, 16, 100);
        // One hot pixel: max passes, mean does not.
        let mut data = vec![0.0f32; 256];
        data[0] = 0.95;
        let spike = ProbabilityMask::new(16, 16, data).unwrap();
        let (overlaid, _) = segmentation_overlay(&original, &spike, &OverlayConfig::default());
        assert_eq!(overlaid, original);
    }

    #[test]
    fn test_lesion_pixels_painted_red() {
        let original = gray_image(16, 16, 100);
        let (_, colored) = segmentation_overlay(&original, &strong_mask(), &OverlayConfig::default());

        // Inside the quadrant: full red scale, no green.
        let lesion = colored.get_pixel(2, 2);
        assert_eq!(lesion[0], (0.9f32 * 255.0) as u8);
        assert_eq!(lesion[1], 0);
        assert_eq!(lesion[2], 0);

        // Far corner: untouched.
        let clean = colored.get_pixel(15, 15);
        assert_eq!(*clean, Rgb([0, 0, 0]));
    }

    #[test]
    fn test_warning_band_tinted_yellow() {
        let mut data = vec![0.0f32; 256];
        // Enough strong pixels to open the gate, plus a warning-band pixel.
        for item in data.iter_mut().take(64) {
            *item = 0.9;
        }
        data[255] = 0.3;
        let mask = ProbabilityMask::new(16, 16, data).unwrap();
        let original = gray_image(16, 16, 100);
        let (_, colored) = segmentation_overlay(&original, &mask, &OverlayConfig::default());

        let warning = colored.get_pixel(15, 15);
        assert_eq!(warning[0], (0.3f32 * 200.0) as u8);
        assert_eq!(warning[1], (0.3f32 * 200.0) as u8);
        assert_eq!(warning[2], 0);
    }

    #[test]
    fn test_blend_weights_favor_original() {
        let original = gray_image(8, 8, 200);
        let mask = ProbabilityMask::new(8, 8, vec![1.0f32; 64]).unwrap();
        let (overlaid, _) = segmentation_overlay(&original, &mask, &OverlayConfig::default());

        // 0.4 * 255 + 0.6 * 200 = 222; green/blue keep only the original term.
        let pixel = overlaid.get_pixel(4, 4);
        assert_eq!(pixel[0], 222);
        assert_eq!(pixel[1], 120);
        assert_eq!(pixel[2], 120);
    }

    #[test]
    fn test_heatmap_overlay_blend() {
        let original = gray_image(8, 8, 100);
        let heatmap = ProbabilityMask::new(8, 8, vec![1.0f32; 64]).unwrap();
        let overlaid = heatmap_overlay(&heatmap, &original, 0.4, ColorMap::Jet);

        // Jet at 1.0 is (128, 0, 0): 0.4 * 128 + 0.6 * 100 = 111.
        let pixel = overlaid.get_pixel(0, 0);
        assert_eq!(pixel[0], 111);
        assert_eq!(pixel[2], 60);
    }

    #[test]
    fn test_heatmap_overlay_resamples_to_original() {
        let original = gray_image(32, 24, 50);
        let heatmap = ProbabilityMask::new(4, 4, vec![0.5f32; 16]).unwrap();
        let overlaid = heatmap_overlay(&heatmap, &original, 0.4, ColorMap::Jet);
        assert_eq!((overlaid.width(), overlaid.height()), (32, 24));
    }

    #[test]
    fn test_colorize_mask_dimensions() {
        let mask = ProbabilityMask::zeros(6, 9);
        let colored = colorize_mask(&mask, ColorMap::Hot);
        assert_eq!((colored.width(), colored.height()), (9, 6));
        assert!(colored.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
