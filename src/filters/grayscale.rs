//! Grayscale conversion and bit depth conversion.
//!
//! Uses ITU-R BT.601 luma coefficients, the same weights common image
//! libraries use for an RGB to gray conversion of 8-bit photographs.
//!
//! ## Bit Depth Support
//!
//! - **u8 (8-bit)**: Values 0-255, decoded and stored images
//! - **f32 (float)**: Values 0.0-1.0, all intermediate pipeline arrays
//!
//! Float to byte conversion clamps to [0, 1], scales by 255 and rounds half
//! away from zero. The rounding rule is fixed so that every pixel's last bit
//! is reproducible.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};
use rayon::prelude::*;

/// ITU-R BT.601 luma coefficients
pub const LUMA_R: f32 = 0.299;
pub const LUMA_G: f32 = 0.587;
pub const LUMA_B: f32 = 0.114;

/// Convert an RGB u8 image to a single-channel u8 luma plane.
///
/// # Arguments
/// * `input` - 3D array view of shape (height, width, 3) with RGB u8 values
///
/// # Returns
/// 2D array of shape (height, width), rounded luma values
pub fn rgb_to_gray_u8(input: ArrayView3<u8>) -> Array2<u8> {
    let (height, width, _) = input.dim();
    if height == 0 || width == 0 {
        return Array2::zeros((height, width));
    }

    let mut output_flat = vec![0u8; height * width];
    output_flat
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let r = input[[y, x, 0]] as f32;
                let g = input[[y, x, 1]] as f32;
                let b = input[[y, x, 2]] as f32;
                *out = (LUMA_R * r + LUMA_G * g + LUMA_B * b).round().min(255.0) as u8;
            }
        });

    Array2::from_shape_vec((height, width), output_flat).expect("Shape mismatch in rgb_to_gray_u8")
}

/// Convert u8 image (0-255) to f32 (0.0-1.0)
pub fn u8_to_f32(input: ArrayView3<u8>) -> Array3<f32> {
    input.mapv(|v| v as f32 / 255.0)
}

/// Quantize a single f32 sample (0.0-1.0) to u8, rounding to nearest.
///
/// NaN maps to 0.
#[inline]
pub fn quantize_sample(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Convert f32 image (0.0-1.0) to u8 (0-255)
pub fn f32_to_u8(input: ArrayView3<f32>) -> Array3<u8> {
    input.mapv(quantize_sample)
}

/// Convert a single-channel f32 map (0.0-1.0) to u8 (0-255)
pub fn map_to_u8(input: ArrayView2<f32>) -> Array2<u8> {
    input.mapv(quantize_sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_gray_red() {
        let mut img = Array3::<u8>::zeros((1, 1, 3));
        img[[0, 0, 0]] = 255;

        let result = rgb_to_gray_u8(img.view());

        // 0.299 * 255 = 76.245
        assert_eq!(result[[0, 0]], 76);
    }

    #[test]
    fn test_gray_green() {
        let mut img = Array3::<u8>::zeros((1, 1, 3));
        img[[0, 0, 1]] = 255;

        let result = rgb_to_gray_u8(img.view());

        // 0.587 * 255 = 149.685
        assert_eq!(result[[0, 0]], 150);
    }

    #[test]
    fn test_gray_white_and_equal_channels() {
        let mut img = Array3::<u8>::zeros((1, 2, 3));
        for c in 0..3 {
            img[[0, 0, c]] = 255;
            img[[0, 1, c]] = 123;
        }

        let result = rgb_to_gray_u8(img.view());

        assert_eq!(result[[0, 0]], 255);
        assert_eq!(result[[0, 1]], 123);
    }

    #[test]
    fn test_quantize_rounds_to_nearest() {
        assert_eq!(quantize_sample(0.0), 0);
        assert_eq!(quantize_sample(1.0), 255);
        // 0.5 * 255 = 127.5 rounds away from zero
        assert_eq!(quantize_sample(0.5), 128);
        // 26.64 rounds up, truncation would give 26
        assert_eq!(quantize_sample(26.64 / 255.0), 27);
    }

    #[test]
    fn test_quantize_clamps_out_of_range() {
        assert_eq!(quantize_sample(-3.0), 0);
        assert_eq!(quantize_sample(42.0), 255);
        assert_eq!(quantize_sample(f32::INFINITY), 255);
        assert_eq!(quantize_sample(f32::NEG_INFINITY), 0);
        assert_eq!(quantize_sample(f32::NAN), 0);
    }

    #[test]
    fn test_u8_f32_roundtrip() {
        let img = Array3::from_shape_fn((4, 64, 3), |(y, x, c)| ((y * 64 + x) * 3 + c) as u8);

        let back = f32_to_u8(u8_to_f32(img.view()).view());

        assert_eq!(back, img);
    }
}
