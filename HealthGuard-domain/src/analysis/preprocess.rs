use image::imageops::{self, FilterType};
use tracing::debug;

use super::error::AnalysisError;

/// Side length of the square model input
pub const INPUT_SIZE: u32 = 224;

/// Resampling filter used when scaling the upload to the model input size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resampling {
    Bilinear,
    Lanczos,
}

impl Resampling {
    fn filter(&self) -> FilterType {
        match self {
            Resampling::Bilinear => FilterType::Triangle,
            Resampling::Lanczos => FilterType::Lanczos3,
        }
    }
}

/// Normalized image tensor in NHWC layout, shape `[1, 224, 224, 3]`
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
}

impl InputTensor {
    pub const SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3];

    /// Wrap raw values; the length must match [`InputTensor::SHAPE`]
    pub fn from_vec(data: Vec<f32>) -> Result<Self, AnalysisError> {
        let expected: usize = Self::SHAPE.iter().product();
        if data.len() != expected {
            return Err(AnalysisError::Inference(format!(
                "input tensor has {} values, expected {}",
                data.len(),
                expected
            )));
        }
        Ok(Self { data })
    }

    pub fn shape(&self) -> [usize; 4] {
        Self::SHAPE
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Decode, resize and normalize an uploaded image for the models
pub fn preprocess_image(bytes: &[u8], resampling: Resampling) -> Result<InputTensor, AnalysisError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| AnalysisError::UnreadableImage(e.to_string()))?;

    debug!(
        "Decoded {}x{} image, resizing to {}x{} with {:?}",
        decoded.width(),
        decoded.height(),
        INPUT_SIZE,
        INPUT_SIZE,
        resampling
    );

    let rgb = decoded.to_rgb8();
    let resized = imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, resampling.filter());

    let data = resized
        .as_raw()
        .iter()
        .map(|&channel| channel as f32 / 255.0)
        .collect();

    InputTensor::from_vec(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode_png(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_output_shape_is_fixed() {
        for (w, h) in [(10, 10), (640, 480), (224, 224), (3, 500)] {
            let png = encode_png(&RgbImage::from_pixel(w, h, Rgb([10, 20, 30])));
            let tensor = preprocess_image(&png, Resampling::Bilinear).unwrap();
            assert_eq!(tensor.shape(), [1, 224, 224, 3]);
            assert_eq!(tensor.as_slice().len(), 224 * 224 * 3);
        }
    }

    #[test]
    fn test_values_are_scaled_to_unit_range() {
        let png = encode_png(&RgbImage::from_pixel(50, 50, Rgb([255, 0, 51])));
        let tensor = preprocess_image(&png, Resampling::Lanczos).unwrap();

        assert!(tensor.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));

        // Channels stay interleaved per pixel
        let first_pixel = &tensor.as_slice()[..3];
        assert!((first_pixel[0] - 1.0).abs() < 1e-3);
        assert!(first_pixel[1].abs() < 1e-3);
        assert!((first_pixel[2] - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_undecodable_bytes_are_rejected() {
        let result = preprocess_image(b"definitely not an image", Resampling::Bilinear);
        assert!(matches!(result, Err(AnalysisError::UnreadableImage(_))));

        let result = preprocess_image(&[], Resampling::Bilinear);
        assert!(matches!(result, Err(AnalysisError::UnreadableImage(_))));
    }

    #[test]
    fn test_tensor_length_is_checked() {
        assert!(InputTensor::from_vec(vec![0.0; 5]).is_err());
        assert!(InputTensor::from_vec(vec![0.0; 224 * 224 * 3]).is_ok());
    }
}
