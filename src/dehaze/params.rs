//! Pipeline parameters.

use std::ops::RangeInclusive;

use crate::error::{DehazeError, Result};
use crate::filters::morphology::{coerce_kernel_size, StructuringElement};

pub const DEFAULT_KERNEL_SIZE: usize = 15;
pub const DEFAULT_OMEGA: f32 = 0.95;
pub const DEFAULT_T_MIN: f32 = 0.85;

/// Kernel sizes offered by interactive front ends (odd values only).
pub const UI_KERNEL_SIZE_RANGE: RangeInclusive<usize> = 3..=51;
/// Transmission floors offered by interactive front ends.
pub const UI_T_MIN_RANGE: RangeInclusive<f32> = 0.5..=0.98;

/// The `(kernel_size, omega, t_min)` triple for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DehazeParams {
    /// Side of the square structuring element, positive and odd.
    pub kernel_size: usize,
    /// Haze removal strength, in (0, 1).
    pub omega: f32,
    /// Lower bound of the refined transmission, in [0, 1].
    pub t_min: f32,
}

impl Default for DehazeParams {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
            omega: DEFAULT_OMEGA,
            t_min: DEFAULT_T_MIN,
        }
    }
}

impl DehazeParams {
    pub fn new(kernel_size: usize, omega: f32, t_min: f32) -> Self {
        Self {
            kernel_size,
            omega,
            t_min,
        }
    }

    /// Same parameters with an even kernel size rounded up to the next odd one.
    pub fn with_coerced_kernel(self) -> Self {
        Self {
            kernel_size: coerce_kernel_size(self.kernel_size),
            ..self
        }
    }

    /// Check every parameter against its domain. Nothing is corrected here.
    pub fn validate(&self) -> Result<()> {
        StructuringElement::square(self.kernel_size)?;
        if !(self.omega > 0.0 && self.omega < 1.0) {
            return Err(DehazeError::invalid(
                "omega",
                self.omega as f64,
                "must lie in the open interval (0, 1)",
            ));
        }
        if !(0.0..=1.0).contains(&self.t_min) {
            return Err(DehazeError::invalid(
                "t_min",
                self.t_min as f64,
                "must lie in [0, 1]",
            ));
        }
        Ok(())
    }

    /// Validated structuring element for these parameters.
    pub fn structuring_element(&self) -> Result<StructuringElement> {
        self.validate()?;
        StructuringElement::square(self.kernel_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = DehazeParams::default();
        assert_eq!(params.kernel_size, 15);
        assert_eq!(params.omega, 0.95);
        assert_eq!(params.t_min, 0.85);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_even_kernel_rejected_until_coerced() {
        let params = DehazeParams::new(14, 0.95, 0.85);
        assert!(matches!(
            params.validate(),
            Err(DehazeError::InvalidParameter { name: "kernel_size", .. })
        ));

        let coerced = params.with_coerced_kernel();
        assert_eq!(coerced.kernel_size, 15);
        assert!(coerced.validate().is_ok());
    }

    #[test]
    fn test_zero_kernel_rejected() {
        assert!(DehazeParams::new(0, 0.95, 0.85).validate().is_err());
    }

    #[test]
    fn test_omega_bounds() {
        assert!(DehazeParams::new(3, 0.0, 0.5).validate().is_err());
        assert!(DehazeParams::new(3, 1.0, 0.5).validate().is_err());
        assert!(DehazeParams::new(3, f32::NAN, 0.5).validate().is_err());
        assert!(DehazeParams::new(3, 0.5, 0.5).validate().is_ok());
    }

    #[test]
    fn test_t_min_bounds() {
        assert!(DehazeParams::new(3, 0.9, 0.0).validate().is_ok());
        assert!(DehazeParams::new(3, 0.9, 1.0).validate().is_ok());
        assert!(DehazeParams::new(3, 0.9, -0.1).validate().is_err());
        assert!(DehazeParams::new(3, 0.9, 1.1).validate().is_err());
        assert!(DehazeParams::new(3, 0.9, f32::NAN).validate().is_err());
    }

    #[test]
    fn test_ui_ranges_accept_defaults() {
        assert!(UI_KERNEL_SIZE_RANGE.contains(&DEFAULT_KERNEL_SIZE));
        assert!(UI_T_MIN_RANGE.contains(&DEFAULT_T_MIN));
    }
}
