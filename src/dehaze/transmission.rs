//! Transmission map estimation and morphological refinement.
//!
//! Transmission is the fraction of scene radiance that reaches the camera
//! without being scattered: 1 means no haze, 0 means only atmospheric light.
//!
//! 1. Initial map: `t1 = 1 - omega * erode(min_channel(I / A))`
//! 2. Closing fills small dark pinholes in `t1`
//! 3. Opening removes small bright blobs
//! 4. A hard floor `t_min` bounds the later division

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};
use rayon::prelude::*;

use super::atmospheric::AtmosphericLight;
use super::buffer::ensure_rgb;
use super::dark_channel::dark_channel;
use crate::error::{DehazeError, Result};
use crate::filters::morphology::{close, open, StructuringElement};

/// Single-channel float map, same height and width as the source image.
pub type TransmissionMap = Array2<f32>;

/// Divide every channel by the matching atmospheric light component.
fn normalize_by_light(image: ArrayView3<f32>, light: [f32; 3]) -> Array3<f32> {
    let (height, width, channels) = image.dim();
    if height == 0 || width == 0 {
        return Array3::zeros((height, width, channels));
    }

    let mut output_flat = vec![0.0f32; height * width * channels];
    output_flat
        .par_chunks_mut(width * channels)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                for (c, a) in light.iter().enumerate().take(channels) {
                    row[x * channels + c] = image[[y, x, c]] / a;
                }
            }
        });

    Array3::from_shape_vec((height, width, channels), output_flat)
        .expect("Shape mismatch in normalize_by_light")
}

/// Initial transmission estimate.
///
/// # Arguments
/// * `image` - (height, width, 3) normalized image
/// * `light` - Atmospheric light; every component must be non-zero
/// * `se` - Structuring element for the local minimum
/// * `omega` - Haze removal strength in (0, 1); closer to 1 removes more haze
///
/// # Errors
/// `DehazeError::DegenerateLight` when a light component is zero.
pub fn initial_transmission(
    image: ArrayView3<f32>,
    light: AtmosphericLight,
    se: StructuringElement,
    omega: f32,
) -> Result<TransmissionMap> {
    ensure_rgb(image)?;
    if light.is_degenerate() {
        return Err(DehazeError::DegenerateLight {
            light: light.channels(),
        });
    }

    let normalized = normalize_by_light(image, light.channels());
    let i_min = dark_channel(normalized.view(), se);
    Ok(i_min.mapv(|v| 1.0 - omega * v))
}

/// Refined transmission: `max(open(close(t1)), t_min)`.
pub fn refine_transmission(
    initial: ArrayView2<f32>,
    se: StructuringElement,
    t_min: f32,
) -> TransmissionMap {
    let closed = close(initial, se);
    let mut refined = open(closed.view(), se);
    refined.mapv_inplace(|v| v.max(t_min));
    refined
}
