//! Scene radiance recovery.
//!
//! Inverts the haze model `I = J * t + A * (1 - t)` per pixel and channel:
//! `J = (I - A) / t + A`, with the refined transmission shared by all three
//! channels of a pixel.

use ndarray::{Array3, ArrayView2, ArrayView3};
use rayon::prelude::*;

use super::atmospheric::AtmosphericLight;
use super::buffer::ensure_rgb;
use crate::error::{DehazeError, Result};
use crate::filters::grayscale::f32_to_u8;

/// (height, width, 3) float image in [0, 1].
pub type RestoredImage = Array3<f32>;

/// Clamp to [0, 1]. Out-of-range values are truncated, not rescaled.
///
/// NaN (only reachable with a zero transmission floor) maps to 0.
#[inline]
fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Recover the haze-free image.
///
/// # Arguments
/// * `image` - (height, width, 3) normalized hazy image
/// * `light` - Atmospheric light
/// * `transmission` - Refined transmission map, (height, width)
///
/// # Returns
/// Restored image clamped to [0, 1]
pub fn recover_radiance(
    image: ArrayView3<f32>,
    light: AtmosphericLight,
    transmission: ArrayView2<f32>,
) -> Result<RestoredImage> {
    ensure_rgb(image)?;
    let (height, width, channels) = image.dim();
    if transmission.dim() != (height, width) {
        return Err(DehazeError::InvalidBuffer(format!(
            "transmission map is {:?}, image is {:?}",
            transmission.dim(),
            (height, width)
        )));
    }
    if height == 0 || width == 0 {
        return Ok(Array3::zeros((height, width, channels)));
    }

    let a = light.channels();
    let mut output_flat = vec![0.0f32; height * width * channels];
    output_flat
        .par_chunks_mut(width * channels)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let t = transmission[[y, x]];
                for (c, &a_c) in a.iter().enumerate().take(channels) {
                    let recovered = (image[[y, x, c]] - a_c) / t + a_c;
                    row[x * channels + c] = clamp_unit(recovered);
                }
            }
        });

    Ok(Array3::from_shape_vec((height, width, channels), output_flat)
        .expect("Shape mismatch in recover_radiance"))
}

/// Quantize a restored image to 8-bit: `round(clamp(v, 0, 1) * 255)`.
pub fn quantize(restored: ArrayView3<f32>) -> Array3<u8> {
    f32_to_u8(restored)
}
