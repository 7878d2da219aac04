//! Run the diagnosis pipeline against a stub segmentation model.
//!
//! ```sh
//! cargo run --example diagnose
//! ```

use std::sync::Arc;

use burn::prelude::*;
use burn::tensor::TensorData;
use image::{Rgb, RgbImage};

use carident::prelude::*;
use carident_core::backend::NdArray;

/// Stand-in for a real U-Net checkpoint: emits a fixed probability mask
/// with one synthetic lesion.
struct DemoModel;

impl CariesModel<NdArray> for DemoModel {
    fn input_size(&self) -> (usize, usize) {
        (128, 128)
    }

    fn predict(&self, _input: Tensor<NdArray, 4>) -> carident_core::Result<TensorData> {
        let mut values = vec![0.02f32; 128 * 128];
        for y in 40..70 {
            for x in 55..90 {
                values[y * 128 + x] = 0.85;
            }
        }
        Ok(TensorData::new(values, [1, 128, 128, 1]))
    }
}

fn main() {
    let radiograph = RgbImage::from_pixel(512, 384, Rgb([70, 70, 70]));

    static MODEL: ModelCache<DemoModel> = ModelCache::new();
    let model = MODEL.acquire(|| Ok(DemoModel)).expect("stub model loads");

    let pipeline = CariesPipeline::<NdArray, _>::new(
        model,
        Default::default(),
        PipelineConfig::default(),
    );

    let diagnosis = pipeline.diagnose(&radiograph).expect("pipeline runs");

    println!(
        "severity: {} ({:.2}% confidence)",
        diagnosis.severity.severity, diagnosis.severity.confidence
    );
    println!(
        "affected area: {:.2}%",
        diagnosis.severity.affected_percentage.unwrap_or(0.0)
    );
    println!("has caries: {}", diagnosis.has_caries);
    for lesion in &diagnosis.lesions {
        println!(
            "lesion {}: {}x{} at ({}, {}), area {} px, {:.2}%",
            lesion.id, lesion.width, lesion.height, lesion.x, lesion.y, lesion.area,
            lesion.confidence
        );
    }
}
