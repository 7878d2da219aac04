//! Lesion bounding-box extraction.

use std::collections::BTreeMap;

use image::GrayImage;
use imageproc::region_labelling::{connected_components, Connectivity};
use image::Luma;
use serde::{Deserialize, Serialize};

use carident_core::{LesionBox, ProbabilityMask};

/// Configuration for lesion extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Binarization threshold; pixels strictly above it are lesion.
    pub threshold: f32,
    /// Regions with pixel-count area at or below this are discarded.
    pub min_area: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            min_area: 100,
        }
    }
}

#[derive(Debug)]
struct RegionStats {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    count: u32,
}

/// Extract discrete lesion regions from a probability mask.
///
/// The mask is binarized at `config.threshold`, 8-connected regions are
/// labelled (label order follows the raster scan, so discovery order is
/// stable and deterministic for a fixed input), regions with pixel-count
/// area at or below `config.min_area` are dropped, and each survivor yields
/// an axis-aligned bounding box. Holes inside a region are background and
/// are never reported separately.
///
/// Box confidence is the mean of the original, non-binarized mask over the
/// bounding rectangle, scaled to a percentage and rounded to two decimals.
/// Ids run sequentially from 1 in discovery order.
///
/// A mask with no qualifying region returns an empty list; this is a value,
/// not an error.
#[must_use]
pub fn extract(mask: &ProbabilityMask, config: &ExtractionConfig) -> Vec<LesionBox> {
    if mask.is_empty() {
        return Vec::new();
    }

    let binary = mask.binarize(config.threshold);
    let Some(image) = GrayImage::from_raw(mask.width() as u32, mask.height() as u32, binary)
    else {
        return Vec::new();
    };

    let labelled = connected_components(&image, Connectivity::Eight, Luma([0u8]));

    // BTreeMap keeps regions in ascending label order, which is the order
    // the labelling pass first touched them.
    let mut regions: BTreeMap<u32, RegionStats> = BTreeMap::new();
    for (x, y, pixel) in labelled.enumerate_pixels() {
        let label = pixel[0];
        if label == 0 {
            continue;
        }
        regions
            .entry(label)
            .and_modify(|r| {
                r.min_x = r.min_x.min(x);
                r.min_y = r.min_y.min(y);
                r.max_x = r.max_x.max(x);
                r.max_y = r.max_y.max(y);
                r.count += 1;
            })
            .or_insert(RegionStats {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                count: 1,
            });
    }

    let mut lesions = Vec::new();
    for region in regions.values() {
        if region.count <= config.min_area {
            continue;
        }
        let width = region.max_x - region.min_x + 1;
        let height = region.max_y - region.min_y + 1;
        let confidence = mask.region_mean(
            region.min_x as usize,
            region.min_y as usize,
            width as usize,
            height as usize,
        ) * 100.0;

        lesions.push(LesionBox {
            id: lesions.len() as u32 + 1,
            x: region.min_x,
            y: region.min_y,
            width,
            height,
            confidence: (confidence * 100.0).round() / 100.0,
            area: region.count,
        });
    }

    tracing::debug!(
        regions = regions.len(),
        retained = lesions.len(),
        "extracted lesion boxes"
    );
    lesions
}
