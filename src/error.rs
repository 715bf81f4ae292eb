//! Error types for swatch sampling.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SwatchError>;

#[derive(Error, Debug)]
pub enum SwatchError {
    /// The input bytes are not a decodable image.
    #[error("Unable to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// A query was made before any raster was loaded.
    #[error("No raster loaded")]
    NoRaster,

    /// Resolution 0, or more samples per axis than the raster or config allows.
    #[error("Invalid grid resolution {0}")]
    InvalidResolution(u32),

    #[error("Sample size must be at least 1")]
    InvalidSampleSize,

    /// Vanishing points are radius percentages in `0..=100`.
    #[error("Vanishing point must be a finite percentage in 0..=100, got {0}")]
    InvalidVanishingPoint(f64),

    /// The clamped sample window left the raster. Only reachable through a
    /// clamping bug.
    #[error("Sample window {x}+{width} x {y}+{height} exceeds raster {raster_width}x{raster_height}")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        raster_width: u32,
        raster_height: u32,
    },

    #[error("Invalid raster: {width}x{height} with {len} bytes")]
    InvalidRaster { width: u32, height: u32, len: usize },

    #[error("Unsupported image type `{0}`")]
    UnsupportedMimeType(String),

    #[error("Expected {expected} gradient positions, got {actual}")]
    GeometryMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SwatchError {
    /// Errors caused by the caller's input rather than by crate state.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SwatchError::ImageDecode(_)
                | SwatchError::InvalidResolution(_)
                | SwatchError::InvalidSampleSize
                | SwatchError::InvalidVanishingPoint(_)
                | SwatchError::InvalidRaster { .. }
                | SwatchError::UnsupportedMimeType(_)
                | SwatchError::Config(_)
        )
    }
}

impl From<SwatchError> for wasm_bindgen::JsValue {
    fn from(err: SwatchError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
