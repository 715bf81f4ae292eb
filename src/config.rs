//! Swatch configuration.
//!
//! Everything that shapes a swatch pass is passed explicitly at call time
//! through [`SwatchConfig`]. Configs can be built in code or read from JSON;
//! missing JSON fields fall back to the defaults:
//!
//! ```
//! use image_swatches::SwatchConfig;
//!
//! let config = SwatchConfig::from_json_str(r#"{ "resolution": 5 }"#)?;
//! assert_eq!(config.resolution, 5);
//! assert_eq!(config.sample_size, 50);
//! # Ok::<(), image_swatches::SwatchError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::BlendSpace;
use crate::error::{Result, SwatchError};
use crate::sampler::{PixelSampler, CANONICAL_WIDTH};
use crate::swatch::SwatchMode;

pub const DEFAULT_RESOLUTION: u32 = 3;
pub const DEFAULT_SAMPLE_SIZE: u32 = 50;
pub const DEFAULT_VANISHING_POINT: f64 = 50.0;
/// Largest grid side a config may ask for.
pub const MAX_RESOLUTION: u32 = 256;

/// MIME types accepted from the file picker.
pub const SUPPORTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/pjpeg", "image/png"];

/// Reject anything outside [`SUPPORTED_MIME_TYPES`] before decoding.
pub fn validate_mime_type(mime: &str) -> Result<()> {
    let normalized = mime.trim().to_ascii_lowercase();
    if SUPPORTED_MIME_TYPES.contains(&normalized.as_str()) {
        Ok(())
    } else {
        Err(SwatchError::UnsupportedMimeType(mime.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwatchConfig {
    /// Grid side N; the grid holds N² swatches.
    pub resolution: u32,

    /// Requested sample window side in raster pixels. Clamped per image.
    pub sample_size: u32,

    /// Width decoded images are rescaled to; `None` keeps the native size.
    pub canonical_width: Option<u32>,

    pub blend: BlendSpace,

    pub mode: SwatchMode,
}

impl Default for SwatchConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            sample_size: DEFAULT_SAMPLE_SIZE,
            canonical_width: Some(CANONICAL_WIDTH),
            blend: BlendSpace::default(),
            mode: SwatchMode::default(),
        }
    }
}

impl SwatchConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the values a grid pass would reject anyway, so a bad config
    /// fails when it is loaded rather than on the first image.
    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 || self.resolution > MAX_RESOLUTION {
            return Err(SwatchError::InvalidResolution(self.resolution));
        }
        if self.sample_size == 0 {
            return Err(SwatchError::InvalidSampleSize);
        }
        self.mode.validate()
    }

    /// An empty sampler matching this config.
    pub fn sampler(&self) -> PixelSampler {
        PixelSampler::with_options(self.canonical_width, self.blend)
    }
}
