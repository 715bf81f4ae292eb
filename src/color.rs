//! Color values and color averaging.
//!
//! Every average in the crate (sample windows and color-of-colors) goes
//! through [`ColorAccumulator`], so one [`BlendSpace`] governs both.

use std::fmt;

use palette::{LinSrgb, Srgb};
use serde::{Deserialize, Serialize};

/// An sRGB color with 8-bit channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `0.0..=1.0`.
    pub a: f32,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build from a raw RGBA8 pixel, mapping alpha `0..=255` to `0.0..=1.0`.
    pub fn from_rgba8(px: [u8; 4]) -> Self {
        Self::new(px[0], px[1], px[2], px[3] as f32 / 255.0)
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let a = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        [self.r, self.g, self.b, a]
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    pub fn opaque(self) -> Self {
        self.with_alpha(1.0)
    }

    /// Same channels, zero alpha. Used as the fade-out stop of gradients.
    pub fn transparent(self) -> Self {
        self.with_alpha(0.0)
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// CSS color string: `rgb(r,g,b)` when opaque, `rgba(r,g,b,a)` otherwise.
    pub fn to_css(&self) -> String {
        if self.is_opaque() {
            format!("rgb({},{},{})", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({},{},{},{})",
                self.r,
                self.g,
                self.b,
                css_number(self.a as f64)
            )
        }
    }

    /// Upper-case `#RRGGBB`, alpha dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl From<Srgb<u8>> for Color {
    fn from(c: Srgb<u8>) -> Self {
        Color::rgb(c.red, c.green, c.blue)
    }
}

impl From<Color> for Srgb<u8> {
    fn from(c: Color) -> Self {
        Srgb::new(c.r, c.g, c.b)
    }
}

/// Color space in which channel means are taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendSpace {
    /// Arithmetic mean of the gamma-encoded sRGB bytes.
    #[default]
    Rgb,
    /// Mean in linear light, re-encoded to sRGB afterwards.
    Linear,
}

/// Running sum of colors in a given [`BlendSpace`]. Alpha is always averaged
/// linearly and independently of the color channels.
#[derive(Debug, Clone)]
pub struct ColorAccumulator {
    space: BlendSpace,
    byte_sums: [u64; 3],
    linear_sums: [f64; 3],
    // Kept in 0..=255 units so uniform byte alphas divide back exactly.
    alpha_sum: f64,
    count: u64,
}

impl ColorAccumulator {
    pub fn new(space: BlendSpace) -> Self {
        Self {
            space,
            byte_sums: [0; 3],
            linear_sums: [0.0; 3],
            alpha_sum: 0.0,
            count: 0,
        }
    }

    #[inline]
    pub fn push_rgba8(&mut self, px: [u8; 4]) {
        self.push_channels(px[0], px[1], px[2]);
        self.alpha_sum += px[3] as f64;
        self.count += 1;
    }

    #[inline]
    pub fn push(&mut self, color: Color) {
        self.push_channels(color.r, color.g, color.b);
        self.alpha_sum += color.a.clamp(0.0, 1.0) as f64 * 255.0;
        self.count += 1;
    }

    #[inline]
    fn push_channels(&mut self, r: u8, g: u8, b: u8) {
        match self.space {
            BlendSpace::Rgb => {
                self.byte_sums[0] += r as u64;
                self.byte_sums[1] += g as u64;
                self.byte_sums[2] += b as u64;
            }
            BlendSpace::Linear => {
                let lin: LinSrgb = Srgb::<u8>::new(r, g, b).into_linear();
                self.linear_sums[0] += lin.red as f64;
                self.linear_sums[1] += lin.green as f64;
                self.linear_sums[2] += lin.blue as f64;
            }
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// The mean color, or `None` if nothing was pushed.
    pub fn mean(&self) -> Option<Color> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        let a = (self.alpha_sum / n) as f32 / 255.0;

        let (r, g, b) = match self.space {
            BlendSpace::Rgb => {
                let channel = |sum: u64| (sum as f64 / n).round().clamp(0.0, 255.0) as u8;
                (
                    channel(self.byte_sums[0]),
                    channel(self.byte_sums[1]),
                    channel(self.byte_sums[2]),
                )
            }
            BlendSpace::Linear => {
                let lin = LinSrgb::new(
                    (self.linear_sums[0] / n) as f32,
                    (self.linear_sums[1] / n) as f32,
                    (self.linear_sums[2] / n) as f32,
                );
                let rgb_f32: Srgb<f32> = Srgb::from_linear(lin);
                let c = rgb_f32.into_format::<u8>();
                (c.red, c.green, c.blue)
            }
        };

        Some(Color::new(r, g, b, a.clamp(0.0, 1.0)))
    }
}

/// Format a number for CSS output: at most four decimals, no trailing zeros.
pub(crate) fn css_number(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_output_switches_on_alpha() {
        assert_eq!(Color::rgb(255, 0, 0).to_css(), "rgb(255,0,0)");
        assert_eq!(Color::new(0, 128, 255, 0.5).to_css(), "rgba(0,128,255,0.5)");
        assert_eq!(Color::new(1, 2, 3, 0.0).to_css(), "rgba(1,2,3,0)");
    }

    #[test]
    fn hex_is_upper_case() {
        assert_eq!(Color::rgb(0x1a, 0x2b, 0x3c).to_hex(), "#1A2B3C");
    }

    #[test]
    fn rgba8_alpha_maps_to_fraction() {
        let c = Color::from_rgba8([10, 20, 30, 255]);
        assert_eq!(c.a, 1.0);
        assert_eq!(c.to_rgba8(), [10, 20, 30, 255]);
        assert_eq!(Color::from_rgba8([0, 0, 0, 0]).a, 0.0);
    }

    #[test]
    fn empty_accumulator_has_no_mean() {
        assert!(ColorAccumulator::new(BlendSpace::Rgb).mean().is_none());
        assert!(ColorAccumulator::new(BlendSpace::Linear).mean().is_none());
    }

    #[test]
    fn rgb_mean_is_arithmetic() {
        let mut acc = ColorAccumulator::new(BlendSpace::Rgb);
        acc.push(Color::rgb(0, 0, 0));
        acc.push(Color::new(255, 255, 255, 0.0));
        let mean = acc.mean().unwrap();
        assert_eq!((mean.r, mean.g, mean.b), (128, 128, 128));
        assert!((mean.a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn linear_mean_is_brighter_than_rgb_mean() {
        let mut lin = ColorAccumulator::new(BlendSpace::Linear);
        lin.push(Color::rgb(0, 0, 0));
        lin.push(Color::rgb(255, 255, 255));
        let mean = lin.mean().unwrap();
        // Half of linear light encodes to roughly 188 in sRGB.
        assert!(mean.r > 180 && mean.r < 195, "got {}", mean.r);
        assert_eq!(mean.a, 1.0);
    }

    #[test]
    fn uniform_bytes_average_exactly() {
        let mut acc = ColorAccumulator::new(BlendSpace::Rgb);
        for _ in 0..49 {
            acc.push_rgba8([12, 200, 99, 200]);
        }
        assert_eq!(acc.mean().unwrap(), Color::from_rgba8([12, 200, 99, 200]));
    }

    #[test]
    fn css_numbers_are_trimmed() {
        assert_eq!(css_number(50.0), "50");
        assert_eq!(css_number(100.0 / 3.0), "33.3333");
        assert_eq!(css_number(16.5), "16.5");
    }
}
