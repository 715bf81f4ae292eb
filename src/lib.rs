//! Image color swatches for the browser.
//!
//! An image is decoded into an owned RGBA raster ([`PixelSampler`]), an N×N
//! grid of region averages is sampled from it ([`SwatchGenerator`]), and the
//! grid is laid out as flat tiles, radial gradients or linear bands. The
//! [`ImageSwatches`] type is the `wasm-bindgen` surface used by the page;
//! [`swatches_from_bytes`] is the native one-shot equivalent.

use js_sys::{Array, Object, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod color;
pub mod config;
pub mod error;
pub mod sampler;
pub mod swatch;

pub use color::{BlendSpace, Color};
pub use config::{validate_mime_type, SwatchConfig};
pub use error::{Result, SwatchError};
pub use sampler::{PixelSampler, Raster};
pub use swatch::{SampleGrid, SwatchGenerator, SwatchMode, SwatchRender};

/// Everything the page needs to draw one image's swatches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwatchReport {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
    pub grid: SampleGrid,
    /// Average of all grid colors, for filling behind the swatches.
    pub background: Option<Color>,
    pub render: SwatchRender,
    pub css: Option<String>,
}

/// Sample and render the sampler's current raster with `config`.
pub fn build_report(sampler: &PixelSampler, config: &SwatchConfig) -> Result<SwatchReport> {
    let raster = sampler.raster().ok_or(SwatchError::NoRaster)?;
    let generator = SwatchGenerator::new(sampler);
    let grid = generator.compute_grid(config.resolution, config.sample_size)?;
    let render = generator.render(&grid, &config.mode)?;

    Ok(SwatchReport {
        width: raster.width(),
        height: raster.height(),
        aspect_ratio: raster.aspect_ratio(),
        background: generator.background(&grid),
        css: render.background_css(),
        grid,
        render,
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn swatches_from_bytes(input: &[u8], config: &SwatchConfig) -> Result<SwatchReport> {
    config.validate()?;
    let mut sampler = config.sampler();
    sampler.load_raster(input)?;
    build_report(&sampler, config)
}

// ------------------------------------------------------------
// Browser surface
// ------------------------------------------------------------

/// Stateful swatch widget core for the page: one sampler, one config.
///
/// The page awaits the file read, then calls `load` with the bytes and the
/// file's MIME type, then `swatches`. Config setters take effect on the next
/// `swatches` call; the sample size is re-clamped for every image.
#[wasm_bindgen]
pub struct ImageSwatches {
    sampler: PixelSampler,
    config: SwatchConfig,
}

#[wasm_bindgen]
impl ImageSwatches {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> std::result::Result<ImageSwatches, JsValue> {
        let config = match config_json {
            Some(json) => SwatchConfig::from_json_str(&json)?,
            None => SwatchConfig::default(),
        };
        Ok(Self::with_config(config))
    }

    /// Decode and install an image chosen in the file picker.
    pub fn load(&mut self, input: Vec<u8>, mime_type: &str) -> std::result::Result<(), JsValue> {
        self.load_bytes(&input, mime_type)?;
        Ok(())
    }

    /// Install pixels read back from a canvas `ImageData`.
    pub fn load_image_data(
        &mut self,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> std::result::Result<(), JsValue> {
        self.sampler.load_rgba(width, height, pixels)?;
        Ok(())
    }

    pub fn set_resolution(&mut self, resolution: u32) -> std::result::Result<(), JsValue> {
        self.update_config(|c| c.resolution = resolution)?;
        Ok(())
    }

    pub fn set_sample_size(&mut self, sample_size: u32) -> std::result::Result<(), JsValue> {
        self.update_config(|c| c.sample_size = sample_size)?;
        Ok(())
    }

    /// `mode` is one of `tiles`, `radial` or `bands`.
    pub fn set_mode(&mut self, mode: &str, vanishing_point: Option<f64>) -> std::result::Result<(), JsValue> {
        let vanishing_point = vanishing_point.unwrap_or(config::DEFAULT_VANISHING_POINT);
        let mode = SwatchMode::from_name(mode, vanishing_point)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown swatch mode: {mode}")))?;
        self.update_config(|c| c.mode = mode)?;
        Ok(())
    }

    pub fn aspect_ratio(&self) -> std::result::Result<f64, JsValue> {
        Ok(self.sampler.aspect_ratio()?)
    }

    /// Sample size that the next `swatches` call will actually use.
    pub fn effective_sample_size(&self) -> std::result::Result<u32, JsValue> {
        Ok(self.clamped_sample_size()?)
    }

    /// Sample the current image. Returns
    /// `{ colors, hex, background, resolution, sampleSize, aspectRatio, mode, items, css }`.
    pub fn swatches(&self) -> std::result::Result<Object, JsValue> {
        let report = self.report()?;

        let colors = Array::new();
        let hex = Array::new();
        for c in report.grid.colors() {
            colors.push(&JsValue::from_str(&c.to_css()));
            hex.push(&JsValue::from_str(&c.to_hex()));
        }

        let result = Object::new();
        set(&result, "colors", &colors)?;
        set(&result, "hex", &hex)?;
        set(&result, "background", &optional_str(report.background.map(|c| c.to_css())))?;
        set(&result, "resolution", &JsValue::from(report.grid.resolution()))?;
        set(&result, "sampleSize", &JsValue::from(report.grid.sample_size()))?;
        set(&result, "aspectRatio", &JsValue::from_f64(report.aspect_ratio))?;
        set(&result, "mode", &JsValue::from_str(self.config.mode.name()))?;
        let items = render_items(&report.render)?;
        set(&result, "items", &items)?;
        set(&result, "css", &optional_str(report.css))?;

        Ok(result)
    }

    /// Dominant colors of the current image as `RRGGBB` hex strings.
    pub fn palette(&self, n_colors: usize) -> std::result::Result<Array, JsValue> {
        let palette_js = Array::new();
        for c in self.sampler.dominant_palette(n_colors)? {
            palette_js.push(&JsValue::from_str(c.to_hex().trim_start_matches('#')));
        }
        Ok(palette_js)
    }
}

impl ImageSwatches {
    pub fn with_config(config: SwatchConfig) -> Self {
        Self {
            sampler: config.sampler(),
            config,
        }
    }

    pub fn config(&self) -> &SwatchConfig {
        &self.config
    }

    pub fn sampler(&self) -> &PixelSampler {
        &self.sampler
    }

    /// Validate the MIME type, then decode. Rejected types never reach the
    /// sampler.
    pub fn load_bytes(&mut self, input: &[u8], mime_type: &str) -> Result<&Raster> {
        validate_mime_type(mime_type)?;
        self.sampler.load_raster(input)
    }

    /// Apply `f` to a copy of the config and keep it only if it validates.
    /// Blend space and canonical width are handed on to the sampler; a new
    /// canonical width applies from the next load.
    pub fn update_config(&mut self, f: impl FnOnce(&mut SwatchConfig)) -> Result<()> {
        let mut next = self.config.clone();
        f(&mut next);
        next.validate()?;
        self.sampler.set_blend_space(next.blend);
        self.sampler.set_canonical_width(next.canonical_width);
        self.config = next;
        Ok(())
    }

    pub fn clamped_sample_size(&self) -> Result<u32> {
        let raster = self.sampler.raster().ok_or(SwatchError::NoRaster)?;
        Ok(swatch::effective_sample_size(
            raster.width(),
            raster.height(),
            self.config.resolution,
            self.config.sample_size,
        ))
    }

    pub fn report(&self) -> Result<SwatchReport> {
        build_report(&self.sampler, &self.config)
    }
}

fn set(target: &Object, key: &str, value: &JsValue) -> std::result::Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value)?;
    Ok(())
}

fn optional_str(value: Option<String>) -> JsValue {
    value.map_or(JsValue::NULL, |s| JsValue::from_str(&s))
}

fn render_items(render: &SwatchRender) -> std::result::Result<Array, JsValue> {
    let items = Array::new();
    match render {
        SwatchRender::Tiles(tiles) => {
            for tile in tiles {
                let item = Object::new();
                set(&item, "color", &JsValue::from_str(&tile.color.to_css()))?;
                set(&item, "flexBasis", &JsValue::from_str(&tile.flex_basis()))?;
                set(&item, "paddingBottom", &JsValue::from_str(&tile.padding_bottom()))?;
                items.push(&item);
            }
        }
        SwatchRender::RadialGradient(layers) => {
            for layer in layers {
                let item = Object::new();
                set(&item, "color", &JsValue::from_str(&layer.color.to_css()))?;
                set(&item, "x", &JsValue::from_f64(layer.position.x_percent))?;
                set(&item, "y", &JsValue::from_f64(layer.position.y_percent))?;
                set(&item, "css", &JsValue::from_str(&layer.to_css()))?;
                items.push(&item);
            }
        }
        SwatchRender::LinearBands(bands) => {
            for band in bands {
                let item = Object::new();
                set(&item, "row", &JsValue::from(band.row))?;
                set(&item, "css", &JsValue::from_str(&band.to_css()))?;
                items.push(&item);
            }
        }
    }
    Ok(items)
}
