//! Preprocessing contract at the model boundary.
//!
//! Callers may preprocess images themselves, but the contract is fixed:
//! resize to the model's declared input size, scale pixel values by 1/255,
//! add the batch dimension. These helpers implement that contract.

use burn::prelude::*;
use burn::tensor::TensorData;
use image::imageops::FilterType;
use image::RgbImage;

use carident_core::CariesModel;

/// Resize an RGB image to `(height, width)`, scale to `[0, 1]` and add the
/// batch dimension, producing an NHWC `(1, height, width, 3)` tensor.
///
/// The normalization divisor is fixed at 255.
pub fn preprocess_image<B: Backend>(
    image: &RgbImage,
    target: (usize, usize),
    device: &B::Device,
) -> Tensor<B, 4> {
    let (height, width) = target;
    let resized = if image.width() as usize == width && image.height() as usize == height {
        image.clone()
    } else {
        image::imageops::resize(image, width as u32, height as u32, FilterType::Triangle)
    };

    let values: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| f32::from(v) / 255.0)
        .collect();

    let data = TensorData::new(values, [1, height, width, 3]);
    Tensor::from_data(data, device)
}

/// Preprocess for a specific model, using its declared input size.
pub fn preprocess_for_model<B: Backend, M: CariesModel<B>>(
    model: &M,
    image: &RgbImage,
    device: &B::Device,
) -> Tensor<B, 4> {
    preprocess_image(image, model.input_size(), device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use carident_core::backend::NdArray;
    use image::Rgb;

    #[test]
    fn test_preprocess_shape_and_scaling() {
        let mut image = RgbImage::new(4, 4);
        for pixel in image.pixels_mut() {
            *pixel = Rgb([255, 0, 51]);
        }

        let device = Default::default();
        let tensor = preprocess_image::<NdArray>(&image, (4, 4), &device);
        assert_eq!(tensor.dims(), [1, 4, 4, 3]);

        let values: Vec<f32> = tensor.into_data().to_vec().unwrap();
        assert!((values[0] - 1.0).abs() < 1e-6);
        assert!(values[1].abs() < 1e-6);
        assert!((values[2] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_resizes_to_target() {
        let image = RgbImage::from_pixel(10, 6, Rgb([128, 128, 128]));
        let device = Default::default();
        let tensor = preprocess_image::<NdArray>(&image, (32, 48), &device);
        assert_eq!(tensor.dims(), [1, 32, 48, 3]);
    }
}
