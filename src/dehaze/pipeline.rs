//! End-to-end dehaze pipeline.
//!
//! ```text
//! RawImage -> normalized -> dark channel -> atmospheric light
//!          -> initial transmission -> close -> open -> floor
//!          -> radiance recovery -> quantized RGB
//! ```
//!
//! Every run owns its arrays; nothing is cached or shared between runs.

use std::path::Path;
use std::time::Instant;

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};
use tracing::{debug, info, instrument};

use super::atmospheric::{estimate_atmospheric_light, AtmosphericLight};
use super::buffer::{ensure_rgb, GrayImage, RawImage};
use super::dark_channel::{dark_channel, DarkChannelMap};
use super::params::DehazeParams;
use super::radiance::{quantize, recover_radiance};
use super::transmission::{initial_transmission, refine_transmission, TransmissionMap};
use crate::error::Result;
use crate::filters::morphology::{close, dilate, erode, open, StructuringElement};

/// Intermediate maps of one run, before radiance recovery.
#[derive(Debug, Clone)]
pub struct HazeEstimate {
    pub dark_channel: DarkChannelMap,
    pub atmospheric_light: AtmosphericLight,
    pub transmission_initial: TransmissionMap,
    pub transmission_refined: TransmissionMap,
}

/// Dark channel, atmospheric light and both transmission maps of a
/// normalized image.
pub fn estimate_haze(image: ArrayView3<f32>, params: &DehazeParams) -> Result<HazeEstimate> {
    let se = params.structuring_element()?;
    estimate_with_element(image, params, se)
}

/// Stages of [`estimate_haze`] for parameters that were already validated.
fn estimate_with_element(
    image: ArrayView3<f32>,
    params: &DehazeParams,
    se: StructuringElement,
) -> Result<HazeEstimate> {
    ensure_rgb(image)?;

    let started = Instant::now();
    let dark = dark_channel(image, se);
    debug!(elapsed = ?started.elapsed(), "dark channel computed");

    let light = estimate_atmospheric_light(image, dark.view())?;

    let started = Instant::now();
    let t1 = initial_transmission(image, light, se, params.omega)?;
    debug!(elapsed = ?started.elapsed(), "initial transmission computed");

    let started = Instant::now();
    let refined = refine_transmission(t1.view(), se, params.t_min);
    debug!(elapsed = ?started.elapsed(), "transmission refined");

    Ok(HazeEstimate {
        dark_channel: dark,
        atmospheric_light: light,
        transmission_initial: t1,
        transmission_refined: refined,
    })
}

/// Everything one run produces. Read-only once returned.
#[derive(Debug, Clone)]
pub struct DehazeResult {
    params: DehazeParams,
    original_color: Array3<u8>,
    original_gray: GrayImage,
    dark_channel: DarkChannelMap,
    atmospheric_light: AtmosphericLight,
    transmission_initial: TransmissionMap,
    transmission_refined: TransmissionMap,
    restored_color: Array3<u8>,
}

impl DehazeResult {
    pub fn params(&self) -> &DehazeParams {
        &self.params
    }

    /// Input pixels, RGB order.
    pub fn original_color(&self) -> ArrayView3<'_, u8> {
        self.original_color.view()
    }

    pub fn original_gray(&self) -> ArrayView2<'_, u8> {
        self.original_gray.view()
    }

    pub fn dark_channel(&self) -> ArrayView2<'_, f32> {
        self.dark_channel.view()
    }

    pub fn atmospheric_light(&self) -> AtmosphericLight {
        self.atmospheric_light
    }

    pub fn transmission_initial(&self) -> ArrayView2<'_, f32> {
        self.transmission_initial.view()
    }

    pub fn transmission_refined(&self) -> ArrayView2<'_, f32> {
        self.transmission_refined.view()
    }

    /// Restored pixels, RGB order.
    pub fn restored_color(&self) -> ArrayView3<'_, u8> {
        self.restored_color.view()
    }
}

/// Dehaze an in-memory image.
pub fn dehaze_image(raw: &RawImage, params: &DehazeParams) -> Result<DehazeResult> {
    let se = params.structuring_element()?;
    dehaze_with_element(raw, params, se)
}

#[instrument(skip_all, fields(width = raw.width(), height = raw.height(), kernel_size = params.kernel_size, omega = params.omega, t_min = params.t_min))]
fn dehaze_with_element(
    raw: &RawImage,
    params: &DehazeParams,
    se: StructuringElement,
) -> Result<DehazeResult> {
    let started = Instant::now();

    let normalized = raw.to_normalized();
    let original_gray = raw.to_gray();

    let estimate = estimate_with_element(normalized.view(), params, se)?;

    let restored = recover_radiance(
        normalized.view(),
        estimate.atmospheric_light,
        estimate.transmission_refined.view(),
    )?;
    let restored_color = quantize(restored.view());

    info!(
        elapsed = ?started.elapsed(),
        light = ?estimate.atmospheric_light.channels(),
        "dehaze complete"
    );

    Ok(DehazeResult {
        params: *params,
        original_color: raw.pixels().to_owned(),
        original_gray,
        dark_channel: estimate.dark_channel,
        atmospheric_light: estimate.atmospheric_light,
        transmission_initial: estimate.transmission_initial,
        transmission_refined: estimate.transmission_refined,
        restored_color,
    })
}

/// Decode `image_path` and dehaze it.
///
/// # Errors
/// * `ImageDecode` - the path is missing or not a decodable image
/// * `InvalidParameter` - a parameter is outside its domain (even kernel sizes
///   are rejected, not corrected)
/// * `DegenerateLight` - the estimated atmospheric light has a zero component
pub fn dehaze<P: AsRef<Path>>(image_path: P, params: &DehazeParams) -> Result<DehazeResult> {
    let se = params.structuring_element()?;
    let raw = RawImage::load(image_path.as_ref())?;
    debug!(path = %image_path.as_ref().display(), "image decoded");
    dehaze_with_element(&raw, params, se)
}

// ============================================================================
// Morphology Demonstration
// ============================================================================

/// The four basic operations applied to a gray image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphologyDemo {
    pub eroded: Array2<u8>,
    pub dilated: Array2<u8>,
    pub opened: Array2<u8>,
    pub closed: Array2<u8>,
}

/// Erode, dilate, open and close a gray image with a square element.
pub fn morphology_demo(gray: ArrayView2<u8>, kernel_size: usize) -> Result<MorphologyDemo> {
    let se = StructuringElement::square(kernel_size)?;
    Ok(MorphologyDemo {
        eroded: erode(gray, se),
        dilated: dilate(gray, se),
        opened: open(gray, se),
        closed: close(gray, se),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DehazeError;
    use ndarray::{array, Array3};

    /// 2x2 gray image, values per pixel in row-major order.
    fn scenario_image() -> Array3<f32> {
        let values = [0.8f32, 0.9, 0.7, 1.0];
        Array3::from_shape_fn((2, 2, 3), |(y, x, _)| values[y * 2 + x])
    }

    #[test]
    fn test_two_by_two_scenario() {
        let img = scenario_image();
        let params = DehazeParams::new(1, 0.95, 0.0);

        let estimate = estimate_haze(img.view(), &params).unwrap();

        assert_eq!(estimate.atmospheric_light.channels(), [1.0, 1.0, 1.0]);

        let expected_t1 = [[0.24f32, 0.145], [0.335, 0.05]];
        for y in 0..2 {
            for x in 0..2 {
                assert!((estimate.transmission_initial[[y, x]] - expected_t1[y][x]).abs() < 1e-5);
            }
        }
        assert_eq!(estimate.transmission_refined, estimate.transmission_initial);

        let restored = recover_radiance(
            img.view(),
            estimate.atmospheric_light,
            estimate.transmission_refined.view(),
        )
        .unwrap();
        let bytes = quantize(restored.view());

        let expected = [[42i32, 79], [27, 255]];
        for y in 0..2 {
            for x in 0..2 {
                for c in 0..3 {
                    let got = bytes[[y, x, c]] as i32;
                    assert!((got - expected[y][x]).abs() <= 1, "({}, {}) = {}", y, x, got);
                }
            }
        }
    }

    #[test]
    fn test_uniform_image_is_unchanged() {
        let raw = RawImage::from_array(Array3::from_elem((6, 5, 3), 140u8)).unwrap();

        let result = dehaze_image(&raw, &DehazeParams::default()).unwrap();

        let a = 140.0f32 / 255.0;
        assert_eq!(result.atmospheric_light().channels(), [a, a, a]);
        assert_eq!(result.restored_color(), raw.pixels());
    }

    #[test]
    fn test_result_shapes() {
        let raw = RawImage::from_array(Array3::from_shape_fn((7, 9, 3), |(y, x, c)| {
            (y * 20 + x * 10 + c * 5) as u8
        }))
        .unwrap();

        let result = dehaze_image(&raw, &DehazeParams::new(3, 0.9, 0.6)).unwrap();

        assert_eq!(result.original_color().dim(), (7, 9, 3));
        assert_eq!(result.original_gray().dim(), (7, 9));
        assert_eq!(result.dark_channel().dim(), (7, 9));
        assert_eq!(result.transmission_initial().dim(), (7, 9));
        assert_eq!(result.transmission_refined().dim(), (7, 9));
        assert_eq!(result.restored_color().dim(), (7, 9, 3));
        assert!(result.transmission_refined().iter().all(|&t| t >= 0.6));
    }

    #[test]
    fn test_black_image_has_degenerate_light() {
        let raw = RawImage::from_array(Array3::zeros((4, 4, 3))).unwrap();

        let err = dehaze_image(&raw, &DehazeParams::default()).unwrap_err();

        assert!(matches!(err, DehazeError::DegenerateLight { .. }));
    }

    #[test]
    fn test_even_kernel_rejected() {
        let raw = RawImage::from_array(Array3::from_elem((4, 4, 3), 100u8)).unwrap();

        let err = dehaze_image(&raw, &DehazeParams::new(4, 0.95, 0.85)).unwrap_err();

        assert!(matches!(err, DehazeError::InvalidParameter { .. }));
    }

    #[test]
    fn test_estimate_rejects_non_rgb_input() {
        let params = DehazeParams::new(3, 0.9, 0.5);
        for channels in [1, 4] {
            let img = Array3::<f32>::from_elem((4, 4, channels), 0.5);
            let err = estimate_haze(img.view(), &params).unwrap_err();
            assert!(matches!(err, DehazeError::InvalidBuffer(_)), "channels={}", channels);
        }
    }

    #[test]
    fn test_huge_kernel_on_small_image() {
        let raw = RawImage::from_array(Array3::from_elem((4, 4, 3), 120u8)).unwrap();

        let params = DehazeParams::new((1usize << 31) + 1, 0.9, 0.5);

        let result = dehaze_image(&raw, &params).unwrap();

        assert_eq!(result.restored_color(), raw.pixels());
    }

    #[test]
    fn test_morphology_demo() {
        let gray = array![
            [10u8, 10, 10, 10, 10],
            [10, 10, 10, 10, 10],
            [10, 10, 250, 10, 10],
            [10, 10, 10, 10, 10],
            [10, 10, 10, 10, 10],
        ];

        let demo = morphology_demo(gray.view(), 3).unwrap();

        assert!(demo.eroded.iter().all(|&v| v == 10));
        assert_eq!(demo.dilated[[1, 1]], 250);
        assert_eq!(demo.dilated[[0, 0]], 10);
        assert!(demo.opened.iter().all(|&v| v == 10));
        assert_eq!(demo.closed, gray);
    }

    #[test]
    fn test_morphology_demo_rejects_even_kernel() {
        let gray = Array2::<u8>::zeros((3, 3));
        assert!(morphology_demo(gray.view(), 2).is_err());
    }
}
