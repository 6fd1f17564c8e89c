//! Filter modules shared by the dehaze pipeline.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | Gray8 | (H, W) | u8 | Single luminance channel, 0-255 |
//! | Map | (H, W) | f32 | Single float channel (dark channel, transmission) |
//! | RGB8 | (H, W, 3) | u8 | Red, green, blue, 0-255 |
//! | RGB float | (H, W, 3) | f32 | Red, green, blue, 0.0-1.0 |
//!
//! ## Filter Categories
//!
//! - **Grayscale**: BT.601 luma, u8/f32 conversion and quantization
//! - **Morphology**: erode, dilate, open, close (generic over u8/f32/f64)
//! - **Histogram**: 256-bin counts and densities

pub mod grayscale;
pub mod histogram;
pub mod morphology;
