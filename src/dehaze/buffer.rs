//! Image buffer: decoded RGB pixels and their derived representations.

use std::path::Path;

use image::RgbImage;
use ndarray::{Array2, Array3, ArrayView3};

use crate::error::{DehazeError, Result};
use crate::filters::grayscale::{rgb_to_gray_u8, u8_to_f32};

/// (height, width, 3) float image in [0, 1].
pub type NormalizedImage = Array3<f32>;

/// (height, width) luma plane.
pub type GrayImage = Array2<u8>;

/// Decoded 8-bit RGB image, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pixels: Array3<u8>,
}

impl RawImage {
    /// Decode an image file. Any format with alpha or higher bit depth is
    /// converted to 8-bit RGB.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| DehazeError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_rgb8(decoded.into_rgb8())
    }

    pub fn from_rgb8(image: RgbImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::from_raw(width as usize, height as usize, image.into_raw())
    }

    /// Build from interleaved RGB bytes, row-major.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if data.len() != width * height * 3 {
            return Err(DehazeError::InvalidBuffer(format!(
                "expected {} bytes for {}x{} RGB, got {}",
                width * height * 3,
                width,
                height,
                data.len()
            )));
        }
        let pixels = Array3::from_shape_vec((height, width, 3), data)
            .map_err(|e| DehazeError::InvalidBuffer(e.to_string()))?;
        Self::from_array(pixels)
    }

    /// Build from a (height, width, 3) array.
    pub fn from_array(pixels: Array3<u8>) -> Result<Self> {
        let (height, width, channels) = pixels.dim();
        if channels != 3 {
            return Err(DehazeError::InvalidBuffer(format!(
                "expected 3 channels, got {}",
                channels
            )));
        }
        if height == 0 || width == 0 {
            return Err(DehazeError::EmptyImage);
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    pub fn pixels(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    /// Samples scaled by 1/255.
    pub fn to_normalized(&self) -> NormalizedImage {
        u8_to_f32(self.pixels.view())
    }

    /// BT.601 luma, rounded to nearest.
    pub fn to_gray(&self) -> GrayImage {
        rgb_to_gray_u8(self.pixels.view())
    }

    pub fn into_array(self) -> Array3<u8> {
        self.pixels
    }
}

/// Fail unless `image` is (height, width, 3).
pub(crate) fn ensure_rgb<T>(image: ArrayView3<T>) -> Result<()> {
    let channels = image.dim().2;
    if channels != 3 {
        return Err(DehazeError::InvalidBuffer(format!(
            "expected 3 channels, got {}",
            channels
        )));
    }
    Ok(())
}

/// Encode an RGB array; the format follows the file extension.
pub fn save_rgb<P: AsRef<Path>>(path: P, pixels: ArrayView3<u8>) -> Result<()> {
    let path = path.as_ref();
    let (height, width, _) = pixels.dim();
    let data: Vec<u8> = pixels.iter().copied().collect();
    let image = RgbImage::from_raw(width as u32, height as u32, data).ok_or_else(|| {
        DehazeError::InvalidBuffer(format!("cannot encode {}x{} RGB array", width, height))
    })?;
    image.save(path).map_err(|source| DehazeError::ImageEncode {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode a single-channel array; the format follows the file extension.
pub fn save_gray<P: AsRef<Path>>(path: P, plane: &Array2<u8>) -> Result<()> {
    let path = path.as_ref();
    let (height, width) = plane.dim();
    let data: Vec<u8> = plane.iter().copied().collect();
    let image = image::GrayImage::from_raw(width as u32, height as u32, data).ok_or_else(|| {
        DehazeError::InvalidBuffer(format!("cannot encode {}x{} gray array", width, height))
    })?;
    image.save(path).map_err(|source| DehazeError::ImageEncode {
        path: path.to_path_buf(),
        source,
    })
}
