//! Dark channel prior.
//!
//! In haze-free outdoor patches at least one color channel is close to zero.
//! The dark channel (per-pixel channel minimum, then a local minimum over the
//! structuring element) therefore approximates haze density.

use ndarray::{Array2, ArrayView3};
use rayon::prelude::*;

use crate::filters::morphology::{erode, StructuringElement};

/// Single-channel float map, same height and width as the source image.
pub type DarkChannelMap = Array2<f32>;

/// Per-pixel minimum across the three color channels.
pub fn min_channel(image: ArrayView3<f32>) -> Array2<f32> {
    let (height, width, channels) = image.dim();
    if height == 0 || width == 0 {
        return Array2::zeros((height, width));
    }

    let mut output_flat = vec![0.0f32; height * width];
    output_flat
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                *out = (0..channels)
                    .map(|c| image[[y, x, c]])
                    .fold(f32::INFINITY, f32::min);
            }
        });

    Array2::from_shape_vec((height, width), output_flat).expect("Shape mismatch in min_channel")
}

/// Dark channel: `erode(min_channel(image))`.
pub fn dark_channel(image: ArrayView3<f32>, se: StructuringElement) -> DarkChannelMap {
    let minimum = min_channel(image);
    erode(minimum.view(), se)
}
