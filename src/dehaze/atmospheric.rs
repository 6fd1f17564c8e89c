//! Atmospheric light estimation.
//!
//! The haziest pixels are the brightest ones in the dark channel. Among the top
//! 0.1% of them, the pixel with the largest channel sum in the source image is
//! taken as the color of the haze.

use std::cmp::Ordering;

use ndarray::{ArrayView2, ArrayView3};
use tracing::debug;

use super::buffer::ensure_rgb;
use crate::error::{DehazeError, Result};

/// Fraction of pixels considered as haze candidates.
pub const TOP_FRACTION: f64 = 0.001;

/// Per-channel (R, G, B) color of the ambient light scattered by haze.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphericLight([f32; 3]);

impl AtmosphericLight {
    pub fn new(rgb: [f32; 3]) -> Self {
        Self(rgb)
    }

    pub fn channels(&self) -> [f32; 3] {
        self.0
    }

    /// True when any component is exactly zero.
    pub fn is_degenerate(&self) -> bool {
        self.0.iter().any(|&c| c == 0.0)
    }
}

/// Number of candidates for `pixel_count` pixels: `max(floor(N * 0.001), 1)`.
pub fn candidate_count(pixel_count: usize) -> usize {
    ((pixel_count as f64 * TOP_FRACTION).floor() as usize).max(1)
}

/// Flat row-major indices of the `count` largest dark channel values.
///
/// Ordered by value descending, then index ascending, so equal values are
/// resolved the same way on every run. NaN ranks above every number.
fn top_indices(dark: &[f32], count: usize) -> Vec<usize> {
    let rank = |a: &usize, b: &usize| -> Ordering {
        dark[*b].total_cmp(&dark[*a]).then(a.cmp(b))
    };

    let mut indices: Vec<usize> = (0..dark.len()).collect();
    if count < indices.len() {
        indices.select_nth_unstable_by(count - 1, rank);
        indices.truncate(count);
    }
    indices.sort_unstable_by(rank);
    indices
}

/// Estimate the atmospheric light from a normalized image and its dark channel.
///
/// # Arguments
/// * `image` - (height, width, 3) normalized image
/// * `dark` - (height, width) dark channel of `image`
///
/// # Returns
/// The channels of the brightest candidate pixel. Ties in channel sum keep the
/// candidate with the higher dark channel rank.
pub fn estimate_atmospheric_light(
    image: ArrayView3<f32>,
    dark: ArrayView2<f32>,
) -> Result<AtmosphericLight> {
    ensure_rgb(image)?;
    let (height, width, _) = image.dim();
    if dark.dim() != (height, width) {
        return Err(DehazeError::InvalidBuffer(format!(
            "dark channel is {:?}, image is {:?}",
            dark.dim(),
            (height, width)
        )));
    }
    let pixel_count = height * width;
    if pixel_count == 0 {
        return Err(DehazeError::EmptyImage);
    }

    let dark_flat: Vec<f32> = dark.iter().copied().collect();
    let count = candidate_count(pixel_count);
    let candidates = top_indices(&dark_flat, count);

    let mut best: Option<([f32; 3], f32)> = None;
    for &flat_index in &candidates {
        let y = flat_index / width;
        let x = flat_index % width;
        let rgb = [image[[y, x, 0]], image[[y, x, 1]], image[[y, x, 2]]];
        let sum = rgb[0] + rgb[1] + rgb[2];

        match best {
            Some((_, best_sum)) if sum <= best_sum => {}
            _ => best = Some((rgb, sum)),
        }
    }

    // candidates is never empty: count >= 1 and pixel_count >= 1
    let (rgb, _) = best.ok_or(DehazeError::EmptyImage)?;
    debug!(candidates = count, light = ?rgb, "atmospheric light estimated");
    Ok(AtmosphericLight::new(rgb))
}
