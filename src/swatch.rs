//! Sample grids and the visual layouts derived from them.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::color::{css_number, Color};
use crate::error::{Result, SwatchError};
use crate::sampler::PixelSampler;

/// N×N colors sampled from one raster, row-major (row 0 left to right, then
/// row 1, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleGrid {
    resolution: u32,
    sample_size: u32,
    colors: Vec<Color>,
}

impl SampleGrid {
    /// Build a grid from already sampled colors; `colors` must hold exactly
    /// `resolution²` entries.
    pub fn from_colors(resolution: u32, sample_size: u32, colors: Vec<Color>) -> Result<Self> {
        if resolution == 0 {
            return Err(SwatchError::InvalidResolution(resolution));
        }
        let expected = (resolution as usize)
            .checked_mul(resolution as usize)
            .ok_or(SwatchError::InvalidResolution(resolution))?;
        if colors.len() != expected {
            return Err(SwatchError::GeometryMismatch {
                expected,
                actual: colors.len(),
            });
        }
        Ok(Self {
            resolution,
            sample_size,
            colors,
        })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Side of the sample window actually used, after clamping.
    pub fn sample_size(&self) -> u32 {
        self.sample_size
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at grid row `h`, column `w`.
    pub fn get(&self, h: u32, w: u32) -> Option<Color> {
        if h >= self.resolution || w >= self.resolution {
            return None;
        }
        self.colors.get((h * self.resolution + w) as usize).copied()
    }
}

/// Clamp `sample_size` so `resolution` windows fit side by side on both axes.
/// Never returns less than 1.
pub fn effective_sample_size(width: u32, height: u32, resolution: u32, sample_size: u32) -> u32 {
    let n = resolution.max(1);
    sample_size.min(width / n).min(height / n).max(1)
}

/// Sample centers spread evenly over a `width`×`height` raster, row-major.
/// With a single sample the center is the raster midpoint.
pub fn sample_points(width: u32, height: u32, resolution: u32) -> Vec<(u32, u32)> {
    if resolution <= 1 {
        return vec![(width / 2, height / 2)];
    }
    let span = (resolution - 1) as u64;
    let max_x = width.saturating_sub(1) as u64;
    let max_y = height.saturating_sub(1) as u64;
    (0..resolution as u64)
        .flat_map(|h| {
            (0..resolution as u64).map(move |w| ((max_x * w / span) as u32, (max_y * h / span) as u32))
        })
        .collect()
}

/// Center of a grid cell, as percentages of the element box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientPoint {
    pub x_percent: f64,
    pub y_percent: f64,
}

/// One radial gradient layer: the swatch color fading out around its cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialLayer {
    pub color: Color,
    pub position: GradientPoint,
    /// Radius percentage at which the color reaches zero alpha.
    pub vanishing_point: f64,
}

impl RadialLayer {
    pub fn to_css(&self) -> String {
        format!(
            "radial-gradient(circle at {}% {}%, {} 0%, {} {}%)",
            css_number(self.position.x_percent),
            css_number(self.position.y_percent),
            self.color.opaque().to_css(),
            self.color.transparent().to_css(),
            css_number(self.vanishing_point),
        )
    }
}

/// A flat rectangular tile. Fractions are relative to the container width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwatchTile {
    pub color: Color,
    pub width_fraction: f64,
    pub height_fraction: f64,
}

impl SwatchTile {
    pub fn flex_basis(&self) -> String {
        format!("{}%", css_number(self.width_fraction * 100.0))
    }

    /// Height expressed as bottom padding, which CSS resolves against the
    /// container width.
    pub fn padding_bottom(&self) -> String {
        format!("{}%", css_number(self.height_fraction * 100.0))
    }

    pub fn to_css(&self) -> String {
        format!(
            "background-color: {}; flex-basis: {}; padding-bottom: {}",
            self.color.to_css(),
            self.flex_basis(),
            self.padding_bottom()
        )
    }
}

/// A hard-edged color stop within a band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandStop {
    pub color: Color,
    pub start_percent: f64,
    pub end_percent: f64,
}

/// One grid row rendered as a horizontal linear gradient with hard stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearBand {
    pub row: u32,
    /// Background-position percentage that places the band at its row.
    pub position_percent: f64,
    pub height_percent: f64,
    pub stops: Vec<BandStop>,
}

impl LinearBand {
    pub fn gradient_css(&self) -> String {
        let stops: Vec<String> = self
            .stops
            .iter()
            .map(|s| {
                let color = s.color.to_css();
                format!(
                    "{color} {}%, {color} {}%",
                    css_number(s.start_percent),
                    css_number(s.end_percent)
                )
            })
            .collect();
        format!("linear-gradient(to right, {})", stops.join(", "))
    }

    /// Full `background` layer: gradient, position, size and repeat.
    pub fn to_css(&self) -> String {
        format!(
            "{} 0% {}% / 100% {}% no-repeat",
            self.gradient_css(),
            css_number(self.position_percent),
            css_number(self.height_percent)
        )
    }
}

/// How a grid should be presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwatchMode {
    #[default]
    Tiles,
    RadialGradient {
        #[serde(default = "default_vanishing_point")]
        vanishing_point: f64,
    },
    LinearBands,
}

fn default_vanishing_point() -> f64 {
    crate::config::DEFAULT_VANISHING_POINT
}

/// Reject vanishing points that would produce invalid CSS.
pub fn validate_vanishing_point(vanishing_point: f64) -> Result<()> {
    if vanishing_point.is_finite() && (0.0..=100.0).contains(&vanishing_point) {
        Ok(())
    } else {
        Err(SwatchError::InvalidVanishingPoint(vanishing_point))
    }
}

impl SwatchMode {
    /// Parse a mode name as used by the CLI and the JS shell.
    pub fn from_name(name: &str, vanishing_point: f64) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "tiles" | "flat" => Some(SwatchMode::Tiles),
            "radial" | "radial_gradient" => Some(SwatchMode::RadialGradient { vanishing_point }),
            "bands" | "linear" | "linear_bands" => Some(SwatchMode::LinearBands),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            SwatchMode::RadialGradient { vanishing_point } => validate_vanishing_point(vanishing_point),
            SwatchMode::Tiles | SwatchMode::LinearBands => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SwatchMode::Tiles => "tiles",
            SwatchMode::RadialGradient { .. } => "radial_gradient",
            SwatchMode::LinearBands => "linear_bands",
        }
    }
}

/// Renderable output for one [`SwatchMode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "items", rename_all = "snake_case")]
pub enum SwatchRender {
    Tiles(Vec<SwatchTile>),
    RadialGradient(Vec<RadialLayer>),
    LinearBands(Vec<LinearBand>),
}

impl SwatchRender {
    /// Combined `background` value for the gradient variants. Tiles are
    /// separate elements and have none.
    pub fn background_css(&self) -> Option<String> {
        match self {
            SwatchRender::Tiles(_) => None,
            SwatchRender::RadialGradient(layers) => Some(
                layers.iter().map(RadialLayer::to_css).collect::<Vec<_>>().join(", "),
            ),
            SwatchRender::LinearBands(bands) => Some(
                bands.iter().map(LinearBand::to_css).collect::<Vec<_>>().join(", "),
            ),
        }
    }
}

/// Paint order for `count` overlapping layers, front (top) first.
///
/// Layers within `floor(sqrt(count) / 2)` of the middle index are moved to
/// the front in iteration order, so the last central one ends up on top;
/// everything else keeps its order behind them.
pub fn paint_order(count: usize) -> Vec<usize> {
    let mid = count / 2;
    let range = ((count as f64).sqrt() / 2.0).floor() as usize;
    let mut order = VecDeque::with_capacity(count);
    for d in 0..count {
        if d.abs_diff(mid) < range {
            order.push_front(d);
        } else {
            order.push_back(d);
        }
    }
    order.into()
}

/// Turns the raster held by a [`PixelSampler`] into swatch grids and layouts.
#[derive(Debug, Clone, Copy)]
pub struct SwatchGenerator<'a> {
    sampler: &'a PixelSampler,
}

impl<'a> SwatchGenerator<'a> {
    pub fn new(sampler: &'a PixelSampler) -> Self {
        Self { sampler }
    }

    /// Sample a `resolution`×`resolution` grid with windows of side
    /// `sample_size`, clamped to what fits the current raster. `resolution`
    /// may not exceed the raster's shorter side.
    pub fn compute_grid(&self, resolution: u32, sample_size: u32) -> Result<SampleGrid> {
        if resolution < 1 {
            return Err(SwatchError::InvalidResolution(resolution));
        }
        if sample_size == 0 {
            return Err(SwatchError::InvalidSampleSize);
        }
        let raster = self.sampler.raster().ok_or(SwatchError::NoRaster)?;
        let (width, height) = (raster.width(), raster.height());
        // At most one sample center per pixel along the shorter side.
        if resolution > width.min(height) {
            return Err(SwatchError::InvalidResolution(resolution));
        }
        let size = effective_sample_size(width, height, resolution, sample_size);

        let colors = sample_points(width, height, resolution)
            .into_iter()
            .map(|(x, y)| self.sampler.average_color(x, y, size))
            .collect::<Result<Vec<_>>>()?;

        SampleGrid::from_colors(resolution, size, colors)
    }

    /// One gradient center per cell, at the visual middle of the cell.
    pub fn compute_gradient_geometry(grid: &SampleGrid) -> Vec<GradientPoint> {
        let n = grid.resolution() as f64;
        let step = 100.0 / n;
        (0..grid.len())
            .map(|i| {
                let col = (i as u32 % grid.resolution()) as f64;
                let row = (i as u32 / grid.resolution()) as f64;
                GradientPoint {
                    x_percent: col * step + step / 2.0,
                    y_percent: row * step + step / 2.0,
                }
            })
            .collect()
    }

    /// One radial layer per cell, in [`paint_order`].
    pub fn compose_radial_gradient_layers(
        grid: &SampleGrid,
        geometry: &[GradientPoint],
        vanishing_point: f64,
    ) -> Result<Vec<RadialLayer>> {
        validate_vanishing_point(vanishing_point)?;
        if geometry.len() != grid.len() {
            return Err(SwatchError::GeometryMismatch {
                expected: grid.len(),
                actual: geometry.len(),
            });
        }
        Ok(paint_order(grid.len())
            .into_iter()
            .map(|i| RadialLayer {
                color: grid.colors()[i],
                position: geometry[i],
                vanishing_point,
            })
            .collect())
    }

    /// Uniform tiles, `1/N` wide and `aspect_ratio/N` tall, in grid order.
    pub fn compose_flat_tiles(grid: &SampleGrid, aspect_ratio: f64) -> Vec<SwatchTile> {
        let fraction = 1.0 / grid.resolution() as f64;
        grid.colors()
            .iter()
            .map(|&color| SwatchTile {
                color,
                width_fraction: fraction,
                height_fraction: fraction * aspect_ratio,
            })
            .collect()
    }

    /// One hard-stop band per grid row.
    pub fn compose_linear_bands(grid: &SampleGrid) -> Vec<LinearBand> {
        let n = grid.resolution();
        let step = 100.0 / n as f64;
        grid.colors()
            .chunks(n as usize)
            .enumerate()
            .map(|(row, colors)| LinearBand {
                row: row as u32,
                position_percent: if n > 1 { row as f64 * 100.0 / (n - 1) as f64 } else { 0.0 },
                height_percent: step,
                stops: colors
                    .iter()
                    .enumerate()
                    .map(|(col, &color)| BandStop {
                        color,
                        start_percent: col as f64 * step,
                        end_percent: (col + 1) as f64 * step,
                    })
                    .collect(),
            })
            .collect()
    }

    /// Render `grid` in the requested mode.
    pub fn render(&self, grid: &SampleGrid, mode: &SwatchMode) -> Result<SwatchRender> {
        Ok(match *mode {
            SwatchMode::Tiles => {
                SwatchRender::Tiles(Self::compose_flat_tiles(grid, self.sampler.aspect_ratio()?))
            }
            SwatchMode::RadialGradient { vanishing_point } => {
                let geometry = Self::compute_gradient_geometry(grid);
                SwatchRender::RadialGradient(Self::compose_radial_gradient_layers(
                    grid,
                    &geometry,
                    vanishing_point,
                )?)
            }
            SwatchMode::LinearBands => SwatchRender::LinearBands(Self::compose_linear_bands(grid)),
        })
    }

    /// Single representative color for the whole grid, used as a fill
    /// behind the swatches.
    pub fn background(&self, grid: &SampleGrid) -> Option<Color> {
        self.sampler.average_of_colors(grid.colors())
    }
}
