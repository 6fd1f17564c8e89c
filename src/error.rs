//! Error type shared by every stage of the dehaze pipeline.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DehazeError>;

#[derive(Debug, Error)]
pub enum DehazeError {
    /// The path did not resolve to a readable, decodable image. Missing files
    /// and corrupt files both land here.
    #[error("failed to decode image '{path}': {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode image '{path}': {source}")]
    ImageEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// A zero component in the atmospheric light makes `I / A` undefined.
    #[error("atmospheric light {light:?} has a zero component")]
    DegenerateLight { light: [f32; 3] },
    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),
    #[error("image has no pixels")]
    EmptyImage,
    #[error("no image selected")]
    NoImageSelected,
}

impl DehazeError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        DehazeError::InvalidParameter { name, value, reason }
    }
}
