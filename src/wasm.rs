//! WebAssembly exports for the dehaze pipeline.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Buffers are
//! the flat RGBA bytes of a canvas `ImageData`.

use ndarray::{s, Array3, Zip};
use wasm_bindgen::prelude::*;

use crate::dehaze::{dehaze_image, DehazeParams, RawImage};
use crate::filters::morphology;

// ============================================================================
// Dehaze - RGBA u8
// ============================================================================

/// Dehaze an RGBA u8 image.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `kernel_size` - Odd structuring element size
/// * `omega` - Haze removal strength, in (0, 1)
/// * `t_min` - Transmission floor, in [0, 1]
///
/// # Returns
/// Flat array of RGBA bytes. Alpha is passed through unchanged.
#[wasm_bindgen]
pub fn dehaze_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    kernel_size: usize,
    omega: f32,
    t_min: f32,
) -> Result<Vec<u8>, JsValue> {
    let rgba = Array3::from_shape_vec((height, width, 4), data.to_vec())
        .map_err(|e| JsValue::from_str(&format!("Invalid dimensions: {}", e)))?;

    let raw = RawImage::from_array(rgba.slice(s![.., .., 0..3]).to_owned())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let params = DehazeParams::new(kernel_size, omega, t_min);
    let result = dehaze_image(&raw, &params).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let mut output = rgba;
    Zip::from(output.slice_mut(s![.., .., 0..3]))
        .and(result.restored_color())
        .for_each(|dst, &src| *dst = src);
    Ok(output.into_raw_vec_and_offset().0)
}

/// Round a kernel size up to the next odd value.
#[wasm_bindgen]
pub fn coerce_kernel_size_wasm(kernel_size: usize) -> usize {
    morphology::coerce_kernel_size(kernel_size)
}
