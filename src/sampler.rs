//! Raster ownership and region averaging.

use image::{imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};
use kmeans_colors::get_kmeans;
use palette::{IntoColor, Lab, LinSrgb, Srgb};

use crate::color::{BlendSpace, Color, ColorAccumulator};
use crate::error::{Result, SwatchError};

/// Width every decoded image is normalized to before sampling.
pub const CANONICAL_WIDTH: u32 = 1000;

/// A decoded RGBA8 bitmap, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Wrap a raw RGBA buffer. Both dimensions must be non-zero and the
    /// buffer exactly `width * height * 4` bytes long.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let len = pixels.len();
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || len != expected {
            return Err(SwatchError::InvalidRaster { width, height, len });
        }
        RgbaImage::from_raw(width, height, pixels)
            .map(|image| Self { image })
            .ok_or(SwatchError::InvalidRaster { width, height, len })
    }

    fn from_image(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SwatchError::InvalidRaster { width, height, len: 0 });
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// `height / width`.
    pub fn aspect_ratio(&self) -> f64 {
        self.height() as f64 / self.width() as f64
    }
}

/// Owns the current raster and answers average-color queries against it.
///
/// Loading replaces the raster wholesale; queries borrow it immutably, so a
/// load can never interleave with a sampling pass.
#[derive(Debug, Clone)]
pub struct PixelSampler {
    raster: Option<Raster>,
    canonical_width: Option<u32>,
    blend: BlendSpace,
}

impl Default for PixelSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelSampler {
    pub fn new() -> Self {
        Self::with_options(Some(CANONICAL_WIDTH), BlendSpace::default())
    }

    /// `canonical_width: None` keeps decoded images at their native size.
    pub fn with_options(canonical_width: Option<u32>, blend: BlendSpace) -> Self {
        Self {
            raster: None,
            canonical_width: canonical_width.filter(|w| *w > 0),
            blend,
        }
    }

    pub fn blend_space(&self) -> BlendSpace {
        self.blend
    }

    pub fn set_blend_space(&mut self, blend: BlendSpace) {
        self.blend = blend;
    }

    pub fn canonical_width(&self) -> Option<u32> {
        self.canonical_width
    }

    /// Applies from the next decoded load; the current raster is kept as is.
    pub fn set_canonical_width(&mut self, canonical_width: Option<u32>) {
        self.canonical_width = canonical_width.filter(|w| *w > 0);
    }

    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    fn current(&self) -> Result<&Raster> {
        self.raster.as_ref().ok_or(SwatchError::NoRaster)
    }

    /// Decode `input`, normalize it to the canonical width and make it the
    /// current raster. On failure the previous raster is kept.
    pub fn load_raster(&mut self, input: &[u8]) -> Result<&Raster> {
        let img = image::load_from_memory(input)?;
        self.load_image(&img)
    }

    /// Same as [`load_raster`](Self::load_raster) for an already decoded image.
    pub fn load_image(&mut self, img: &DynamicImage) -> Result<&Raster> {
        let (orig_w, orig_h) = img.dimensions();
        let rgba = match self.canonical_width {
            Some(target_w) if target_w != orig_w && orig_w > 0 => {
                let target_h = ((target_w as f64 * orig_h as f64 / orig_w as f64).floor() as u32).max(1);
                image::imageops::resize(img, target_w, target_h, FilterType::Triangle)
            }
            _ => img.to_rgba8(),
        };
        let raster = Raster::from_image(rgba)?;
        Ok(&*self.raster.insert(raster))
    }

    /// Install a raw RGBA buffer as-is, without rescaling.
    pub fn load_rgba(&mut self, width: u32, height: u32, pixels: Vec<u8>) -> Result<&Raster> {
        let raster = Raster::from_rgba(width, height, pixels)?;
        Ok(&*self.raster.insert(raster))
    }

    /// Average color of the `size`×`size` window centered on `(x, y)`.
    ///
    /// The window is shifted, never shrunk, to stay inside the raster, so
    /// corner and edge centers still get a full window. A side larger than
    /// the raster is capped at the raster dimension.
    pub fn average_color(&self, x: u32, y: u32, size: u32) -> Result<Color> {
        let raster = self.current()?;
        if size == 0 {
            return Err(SwatchError::InvalidSampleSize);
        }
        let (rw, rh) = (raster.width(), raster.height());
        let (win_w, win_h) = (size.min(rw), size.min(rh));
        let x0 = x.saturating_sub(size / 2).min(rw - win_w);
        let y0 = y.saturating_sub(size / 2).min(rh - win_h);

        if x0 + win_w > rw || y0 + win_h > rh {
            debug_assert!(false, "sample window escaped raster bounds");
            return Err(SwatchError::OutOfBounds {
                x: x0,
                y: y0,
                width: win_w,
                height: win_h,
                raster_width: rw,
                raster_height: rh,
            });
        }

        let mut acc = ColorAccumulator::new(self.blend);
        for py in y0..y0 + win_h {
            for px in x0..x0 + win_w {
                acc.push_rgba8(raster.pixel(px, py));
            }
        }
        acc.mean().ok_or(SwatchError::InvalidSampleSize)
    }

    /// Mean of an arbitrary set of colors; `None` for an empty slice.
    pub fn average_of_colors(&self, colors: &[Color]) -> Option<Color> {
        let mut acc = ColorAccumulator::new(self.blend);
        colors.iter().for_each(|c| acc.push(*c));
        acc.mean()
    }

    pub fn aspect_ratio(&self) -> Result<f64> {
        Ok(self.current()?.aspect_ratio())
    }

    /// Cluster the non-transparent pixels of the raster into `k` colors with
    /// k-means in Lab space.
    pub fn dominant_palette(&self, k: usize) -> Result<Vec<Color>> {
        let raster = self.current()?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let lab_pixels: Vec<Lab> = raster
            .pixels()
            .chunks_exact(4)
            .filter(|chunk| chunk[3] != 0)
            .map(|chunk| -> Lab {
                let linear: LinSrgb = Srgb::<u8>::new(chunk[0], chunk[1], chunk[2]).into_linear();
                linear.into_color()
            })
            .collect();
        if lab_pixels.is_empty() {
            return Ok(Vec::new());
        }

        let kmeans = get_kmeans(k, 20, 1e-4, false, &lab_pixels, 0);
        Ok(kmeans
            .centroids
            .iter()
            .map(|&lab| {
                let linear: LinSrgb = lab.into_color();
                let rgb_f32: Srgb<f32> = Srgb::from_linear(linear);
                Color::from(rgb_f32.into_format::<u8>())
            })
            .collect())
    }
}
