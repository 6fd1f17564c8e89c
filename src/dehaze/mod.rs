//! Dark channel prior dehazing with morphological transmission refinement.
//!
//! ## Stages
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Image buffer | [`buffer`] | `RawImage`, normalized f32, BT.601 gray |
//! | Dark channel | [`dark_channel`] | `erode(min over channels)` |
//! | Atmospheric light | [`atmospheric`] | brightest of the top 0.1% dark pixels |
//! | Transmission | [`transmission`] | `1 - omega * dark(I / A)`, then close, open, floor |
//! | Radiance recovery | [`radiance`] | `(I - A) / t + A`, clamped and quantized |
//!
//! [`pipeline::dehaze`] runs all stages in order and returns every
//! intermediate array. Stages only ever consume the output of earlier stages.

pub mod atmospheric;
pub mod buffer;
pub mod dark_channel;
pub mod params;
pub mod pipeline;
pub mod radiance;
pub mod session;
pub mod transmission;

pub use atmospheric::AtmosphericLight;
pub use buffer::{GrayImage, NormalizedImage, RawImage};
pub use params::DehazeParams;
pub use pipeline::{
    dehaze, dehaze_image, estimate_haze, morphology_demo, DehazeResult, HazeEstimate,
    MorphologyDemo,
};
pub use session::DehazeSession;
