//! Morphology filters: Erode, Dilate, Open, Close.
//!
//! All operations use a flat square structuring element of odd side length,
//! centred on each pixel, and work on any 2D array whose sample type implements
//! [`MorphSample`] (`u8`, `f32`, `f64`).
//!
//! ## Border Policy
//!
//! Window positions that fall outside the array never contribute. For erosion
//! this is the same as padding with `+inf` (`u8::MAX` for bytes), for dilation
//! the same as padding with `-inf` (`0` for bytes). Edge values are never
//! replicated, and the border is never treated as black.
//!
//! ## Performance
//!
//! A flat square is separable, so each operation is a horizontal pass followed
//! by a vertical pass. Windows of [`VHGW_MIN_WINDOW`] samples or more use the
//! van Herk/Gil-Werman running extremum (three comparisons per sample whatever
//! the window size); smaller windows are scanned directly. Both passes are
//! parallelized over lines with Rayon. Min and max are exact, so the output is
//! identical for every path. The radius is capped one below the longer image
//! side, so scratch memory follows the image size whatever the element size.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

use crate::error::{DehazeError, Result};

/// Smallest window for which the van Herk/Gil-Werman line filter is used.
pub const VHGW_MIN_WINDOW: usize = 9;

// ============================================================================
// Sample Types
// ============================================================================

/// Sample type that morphology can operate on.
pub trait MorphSample: Copy + PartialOrd + Send + Sync {
    /// Identity of `min`, used as erosion padding.
    const MIN_IDENTITY: Self;
    /// Identity of `max`, used as dilation padding.
    const MAX_IDENTITY: Self;

    fn min_of(self, other: Self) -> Self;
    fn max_of(self, other: Self) -> Self;
}

impl MorphSample for u8 {
    const MIN_IDENTITY: Self = u8::MAX;
    const MAX_IDENTITY: Self = u8::MIN;

    #[inline]
    fn min_of(self, other: Self) -> Self {
        self.min(other)
    }

    #[inline]
    fn max_of(self, other: Self) -> Self {
        self.max(other)
    }
}

impl MorphSample for f32 {
    const MIN_IDENTITY: Self = f32::INFINITY;
    const MAX_IDENTITY: Self = f32::NEG_INFINITY;

    #[inline]
    fn min_of(self, other: Self) -> Self {
        self.min(other)
    }

    #[inline]
    fn max_of(self, other: Self) -> Self {
        self.max(other)
    }
}

impl MorphSample for f64 {
    const MIN_IDENTITY: Self = f64::INFINITY;
    const MAX_IDENTITY: Self = f64::NEG_INFINITY;

    #[inline]
    fn min_of(self, other: Self) -> Self {
        self.min(other)
    }

    #[inline]
    fn max_of(self, other: Self) -> Self {
        self.max(other)
    }
}

// ============================================================================
// Structuring Element
// ============================================================================

/// Flat square structuring element with odd side length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuringElement {
    size: usize,
}

impl StructuringElement {
    /// Square element of side `size`.
    ///
    /// Even and zero sizes are rejected; use [`coerce_kernel_size`] first to
    /// round them up explicitly.
    pub fn square(size: usize) -> Result<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(DehazeError::invalid(
                "kernel_size",
                size as f64,
                "must be a positive odd integer",
            ));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Half-width of the window (`size / 2`).
    pub fn radius(&self) -> usize {
        self.size / 2
    }
}

/// Round a kernel size up to the next odd value (`0 -> 1`, `14 -> 15`).
///
/// Odd sizes are returned unchanged.
pub fn coerce_kernel_size(size: usize) -> usize {
    size | 1
}

// ============================================================================
// Line Filters
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

impl Extremum {
    #[inline]
    fn identity<T: MorphSample>(self) -> T {
        match self {
            Extremum::Min => T::MIN_IDENTITY,
            Extremum::Max => T::MAX_IDENTITY,
        }
    }

    #[inline]
    fn apply<T: MorphSample>(self, a: T, b: T) -> T {
        match self {
            Extremum::Min => a.min_of(b),
            Extremum::Max => a.max_of(b),
        }
    }
}

/// Per-thread buffers reused across lines.
struct LineScratch<T> {
    line: Vec<T>,
    padded: Vec<T>,
    prefix: Vec<T>,
    suffix: Vec<T>,
}

impl<T> LineScratch<T> {
    fn new() -> Self {
        Self {
            line: Vec::new(),
            padded: Vec::new(),
            prefix: Vec::new(),
            suffix: Vec::new(),
        }
    }
}

/// Extremum over `[x - radius, x + radius]` clipped to the line.
fn scan_line<T: MorphSample>(src: &[T], dst: &mut [T], radius: usize, op: Extremum) {
    let n = src.len();
    for (x, out) in dst.iter_mut().enumerate() {
        let start = x.saturating_sub(radius);
        let end = (x + radius + 1).min(n);
        *out = src[start..end]
            .iter()
            .fold(op.identity(), |acc, &v| op.apply(acc, v));
    }
}

/// van Herk/Gil-Werman running extremum.
///
/// The line is padded with the identity on both sides and split into blocks of
/// one window length. Every window then spans the tail of one block and the
/// head of the next, so it is the combination of one suffix and one prefix.
fn van_herk_line<T: MorphSample>(
    src: &[T],
    dst: &mut [T],
    radius: usize,
    op: Extremum,
    scratch: &mut LineScratch<T>,
) {
    let n = src.len();
    let window = 2 * radius + 1;
    let identity: T = op.identity();

    let padded = &mut scratch.padded;
    padded.clear();
    padded.resize(radius, identity);
    padded.extend_from_slice(src);
    padded.resize(n + 2 * radius, identity);
    let m = padded.len();

    let prefix = &mut scratch.prefix;
    let suffix = &mut scratch.suffix;
    prefix.clear();
    prefix.extend_from_slice(padded);
    suffix.clear();
    suffix.extend_from_slice(padded);

    for block_start in (0..m).step_by(window) {
        let block_end = (block_start + window).min(m);
        for i in block_start + 1..block_end {
            prefix[i] = op.apply(prefix[i - 1], padded[i]);
        }
        for i in (block_start..block_end - 1).rev() {
            suffix[i] = op.apply(suffix[i + 1], padded[i]);
        }
    }

    for (x, out) in dst.iter_mut().enumerate() {
        *out = op.apply(suffix[x], prefix[x + window - 1]);
    }
}

fn filter_line<T: MorphSample>(
    src: &[T],
    dst: &mut [T],
    radius: usize,
    op: Extremum,
    scratch: &mut LineScratch<T>,
) {
    if 2 * radius + 1 >= VHGW_MIN_WINDOW {
        van_herk_line(src, dst, radius, op, scratch);
    } else {
        scan_line(src, dst, radius, op);
    }
}

// ============================================================================
// 2D Separable Filter
// ============================================================================

fn separable_extremum<T: MorphSample>(
    input: ArrayView2<T>,
    se: StructuringElement,
    op: Extremum,
) -> Array2<T> {
    let (height, width) = input.dim();
    // A window reaching past both ends of every line is the whole-line extremum
    let radius = se.radius().min(height.max(width).saturating_sub(1));

    if radius == 0 || height == 0 || width == 0 {
        return input.to_owned();
    }

    // Pass 1: Horizontal, one output row per task
    let mut temp_flat: Vec<T> = vec![op.identity(); height * width];
    temp_flat
        .par_chunks_mut(width)
        .enumerate()
        .for_each_init(LineScratch::new, |scratch, (y, row)| {
            let mut line = std::mem::take(&mut scratch.line);
            line.clear();
            line.extend(input.row(y).iter().copied());
            filter_line(&line, row, radius, op, scratch);
            scratch.line = line;
        });

    // Pass 2: Vertical, one output column per task (column-major buffer)
    let mut cols_flat: Vec<T> = vec![op.identity(); height * width];
    cols_flat
        .par_chunks_mut(height)
        .enumerate()
        .for_each_init(LineScratch::new, |scratch, (x, col)| {
            let mut line = std::mem::take(&mut scratch.line);
            line.clear();
            line.extend((0..height).map(|y| temp_flat[y * width + x]));
            filter_line(&line, col, radius, op, scratch);
            scratch.line = line;
        });

    Array2::from_shape_vec((width, height), cols_flat)
        .expect("Shape mismatch in separable_extremum")
        .reversed_axes()
        .as_standard_layout()
        .into_owned()
}

// ============================================================================
// Public Operations
// ============================================================================

/// Erosion: minimum over the window.
///
/// Dark regions grow and bright regions shrink. Out-of-bounds positions act
/// as `+inf`.
pub fn erode<T: MorphSample>(input: ArrayView2<T>, se: StructuringElement) -> Array2<T> {
    separable_extremum(input, se, Extremum::Min)
}

/// Dilation: maximum over the window.
///
/// Bright regions grow and dark regions shrink. Out-of-bounds positions act
/// as `-inf`.
pub fn dilate<T: MorphSample>(input: ArrayView2<T>, se: StructuringElement) -> Array2<T> {
    separable_extremum(input, se, Extremum::Max)
}

/// Morphological opening (erode then dilate).
///
/// Removes bright features smaller than the structuring element.
pub fn open<T: MorphSample>(input: ArrayView2<T>, se: StructuringElement) -> Array2<T> {
    let eroded = erode(input, se);
    dilate(eroded.view(), se)
}

/// Morphological closing (dilate then erode).
///
/// Fills dark holes smaller than the structuring element.
pub fn close<T: MorphSample>(input: ArrayView2<T>, se: StructuringElement) -> Array2<T> {
    let dilated = dilate(input, se);
    erode(dilated.view(), se)
}
