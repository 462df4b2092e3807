//! Image Normalizer
//!
//! Turns arbitrary encoded image bytes into the fixed-size float tensor the
//! model expects. Every image goes through the same deterministic steps:
//! decode, convert to RGB (alpha and extra channels are dropped, not
//! composited), stretch to 224x224 ignoring aspect ratio, and scale
//! intensities from [0, 255] to [0.0, 1.0].

use image::{imageops::FilterType, DynamicImage};

use crate::utils::error::{ClassifierError, Result};
use crate::IMAGE_SIZE;

/// Number of color channels in a normalized tensor
pub const CHANNELS: usize = 3;

/// Batched image tensor in NHWC layout with values in [0.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Vec<f32>,
    shape: [usize; 4],
}

impl ImageTensor {
    /// An all-zero tensor of the standard input shape
    pub fn zeros() -> Self {
        let shape = [1, IMAGE_SIZE, IMAGE_SIZE, CHANNELS];
        Self {
            data: vec![0.0; shape.iter().product()],
            shape,
        }
    }

    /// Shape as (batch, height, width, channels)
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Value at (batch, y, x, channel)
    pub fn get(&self, b: usize, y: usize, x: usize, c: usize) -> Option<f32> {
        let [n, h, w, ch] = self.shape;
        if b >= n || y >= h || x >= w || c >= ch {
            return None;
        }
        self.data.get(((b * h + y) * w + x) * ch + c).copied()
    }

    /// Channel-planar copy of the data (NCHW), as convolutional backends expect
    pub fn to_nchw(&self) -> Vec<f32> {
        let [_, h, w, c] = self.shape;
        let plane = h * w;
        let mut out = vec![0.0f32; self.data.len()];

        // Pixel i belongs to batch i / plane at position i % plane
        for (i, pixel) in self.data.chunks_exact(c).enumerate() {
            let b = i / plane;
            let p = i % plane;
            for (ch, &value) in pixel.iter().enumerate() {
                out[(b * c + ch) * plane + p] = value;
            }
        }

        out
    }
}

/// Decode and normalize encoded image bytes
///
/// Any format the `image` crate can sniff is accepted. Bytes that are not a
/// parseable image yield [`ClassifierError::Decode`].
pub fn normalize(bytes: &[u8]) -> Result<ImageTensor> {
    if bytes.is_empty() {
        return Err(ClassifierError::Decode("image payload is empty".to_string()));
    }

    let image = image::load_from_memory(bytes)?;
    Ok(normalize_image(&image))
}

/// Normalize an already decoded image
pub fn normalize_image(image: &DynamicImage) -> ImageTensor {
    let rgb = image.to_rgb8();
    let resized = image::imageops::resize(
        &rgb,
        IMAGE_SIZE as u32,
        IMAGE_SIZE as u32,
        FilterType::Triangle,
    );

    // RgbImage raw storage is already row-major HWC
    let data = resized
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();

    ImageTensor {
        data,
        shape: [1, IMAGE_SIZE, IMAGE_SIZE, CHANNELS],
    }
}
