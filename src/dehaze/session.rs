//! Interactive session state.
//!
//! A front end keeps one [`DehazeSession`]: the image the user picked, the
//! current parameters and the result of the last run. Each run replaces the
//! previous result; a failed run leaves it untouched.

use std::path::{Path, PathBuf};

use tracing::warn;

use super::params::DehazeParams;
use super::pipeline::{dehaze, DehazeResult};
use crate::error::{DehazeError, Result};

#[derive(Debug, Default)]
pub struct DehazeSession {
    image_path: Option<PathBuf>,
    params: DehazeParams,
    last_result: Option<DehazeResult>,
}

impl DehazeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the image for the next run. Does not read the file.
    pub fn select_image<P: Into<PathBuf>>(&mut self, path: P) {
        self.image_path = Some(path.into());
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    /// Set parameters, rounding an even kernel size up to the next odd one.
    ///
    /// Returns the parameters that will actually be used.
    pub fn set_params(&mut self, params: DehazeParams) -> DehazeParams {
        let coerced = params.with_coerced_kernel();
        if coerced.kernel_size != params.kernel_size {
            warn!(
                requested = params.kernel_size,
                used = coerced.kernel_size,
                "kernel size must be odd, rounded up"
            );
        }
        self.params = coerced;
        coerced
    }

    pub fn params(&self) -> &DehazeParams {
        &self.params
    }

    /// Run the pipeline on the selected image with the current parameters.
    pub fn run(&mut self) -> Result<&DehazeResult> {
        let path = self
            .image_path
            .as_deref()
            .ok_or(DehazeError::NoImageSelected)?;
        let result = dehaze(path, &self.params)?;
        Ok(self.last_result.insert(result))
    }

    pub fn last_result(&self) -> Option<&DehazeResult> {
        self.last_result.as_ref()
    }
}
