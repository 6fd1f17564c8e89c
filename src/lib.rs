//! morph_dehaze
//!
//! Single-image haze removal using the dark channel prior, with the
//! transmission map refined by morphological closing and opening instead of
//! soft matting or a guided filter. Optional Python bindings via PyO3 and
//! WASM bindings for JavaScript.
//!
//! ## Image Format
//! - **RGB8**: (height, width, 3) `u8`, as decoded and as restored
//! - **RGB float**: (height, width, 3) `f32` in 0.0-1.0, for the pipeline math
//! - **Maps**: (height, width) `f32` for dark channel and transmission
//! - **Gray**: (height, width) `u8`, BT.601 luma
//!
//! ## Usage
//! ```no_run
//! use morph_dehaze::{dehaze, DehazeParams};
//!
//! let result = dehaze("hazy.jpg", &DehazeParams::default())?;
//! println!("A = {:?}", result.atmospheric_light().channels());
//! # Ok::<(), morph_dehaze::DehazeError>(())
//! ```

pub mod dehaze;
pub mod error;
pub mod filters;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use dehaze::{
    dehaze, dehaze_image, estimate_haze, morphology_demo, AtmosphericLight, DehazeParams,
    DehazeResult, DehazeSession, HazeEstimate, MorphologyDemo, RawImage,
};
pub use error::{DehazeError, Result};
pub use filters::histogram::{gray_histogram, Histogram};
pub use filters::morphology::{coerce_kernel_size, StructuringElement};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray1, PyReadonlyArray2};
    use pyo3::exceptions::{PyIOError, PyValueError};
    use pyo3::prelude::*;
    use pyo3::types::PyDict;

    use crate::dehaze::{pipeline, DehazeParams};
    use crate::error::DehazeError;
    use crate::filters::histogram;
    use crate::filters::morphology;

    fn to_py_err(err: DehazeError) -> PyErr {
        match err {
            DehazeError::ImageDecode { .. } | DehazeError::ImageEncode { .. } => {
                PyIOError::new_err(err.to_string())
            }
            _ => PyValueError::new_err(err.to_string()),
        }
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Dehaze the image at `image_path`.
    ///
    /// Returns a dict with `original_color`, `original_gray`, `dark_channel`,
    /// `transmission_initial`, `transmission_refined`, `restored_color` (numpy
    /// arrays) and `atmospheric_light` (list of 3 floats, RGB).
    ///
    /// Raises `ValueError` for an even kernel size; call
    /// `coerce_kernel_size` first to round it up.
    #[pyfunction]
    #[pyo3(signature = (image_path, kernel_size=15, omega=0.95, t_min=0.85))]
    pub fn dehaze<'py>(
        py: Python<'py>,
        image_path: &str,
        kernel_size: usize,
        omega: f32,
        t_min: f32,
    ) -> PyResult<Bound<'py, PyDict>> {
        let params = DehazeParams::new(kernel_size, omega, t_min);
        let result = py
            .allow_threads(|| pipeline::dehaze(image_path, &params))
            .map_err(to_py_err)?;

        let dict = PyDict::new(py);
        dict.set_item("original_color", result.original_color().to_owned().into_pyarray(py))?;
        dict.set_item("original_gray", result.original_gray().to_owned().into_pyarray(py))?;
        dict.set_item("dark_channel", result.dark_channel().to_owned().into_pyarray(py))?;
        dict.set_item(
            "transmission_initial",
            result.transmission_initial().to_owned().into_pyarray(py),
        )?;
        dict.set_item(
            "transmission_refined",
            result.transmission_refined().to_owned().into_pyarray(py),
        )?;
        dict.set_item("restored_color", result.restored_color().to_owned().into_pyarray(py))?;
        dict.set_item("atmospheric_light", result.atmospheric_light().channels().to_vec())?;
        Ok(dict)
    }

    /// Round a kernel size up to the next odd value.
    #[pyfunction]
    pub fn coerce_kernel_size(kernel_size: usize) -> usize {
        morphology::coerce_kernel_size(kernel_size)
    }

    // ========================================================================
    // Supplementary Data
    // ========================================================================

    /// Erosion, dilation, opening and closing of a gray u8 image.
    #[pyfunction]
    pub fn morphology_demo<'py>(
        py: Python<'py>,
        gray: PyReadonlyArray2<'py, u8>,
        kernel_size: usize,
    ) -> PyResult<Bound<'py, PyDict>> {
        let demo = pipeline::morphology_demo(gray.as_array(), kernel_size).map_err(to_py_err)?;

        let dict = PyDict::new(py);
        dict.set_item("eroded", demo.eroded.into_pyarray(py))?;
        dict.set_item("dilated", demo.dilated.into_pyarray(py))?;
        dict.set_item("opened", demo.opened.into_pyarray(py))?;
        dict.set_item("closed", demo.closed.into_pyarray(py))?;
        Ok(dict)
    }

    /// 256-bin gray level histogram (counts).
    #[pyfunction]
    pub fn gray_histogram<'py>(
        py: Python<'py>,
        gray: PyReadonlyArray2<'py, u8>,
    ) -> Bound<'py, PyArray1<u64>> {
        let hist = histogram::gray_histogram(gray.as_array());
        hist.bins().to_vec().into_pyarray(py)
    }

    /// morph_dehaze extension module
    #[pymodule]
    pub fn morph_dehaze(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(dehaze, m)?)?;
        m.add_function(wrap_pyfunction!(coerce_kernel_size, m)?)?;
        m.add_function(wrap_pyfunction!(morphology_demo, m)?)?;
        m.add_function(wrap_pyfunction!(gray_histogram, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::morph_dehaze;
