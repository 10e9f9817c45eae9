//! RGB color with channels in the `[0, 1]` range
use std::ops::{Add, Mul};

use crate::color_style::{parse_style, ColorStyle};
use crate::{MathError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Hue, saturation and lightness, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        let mut color = Self::BLACK;
        color.set_hex(hex);
        color
    }

    pub fn from_style(style: &str) -> Result<Self> {
        let mut color = Self::BLACK;
        color.set_style(style)?;
        Ok(color)
    }

    pub fn set_rgb(&mut self, r: f64, g: f64, b: f64) -> &mut Self {
        self.r = r;
        self.g = g;
        self.b = b;
        self
    }

    /// Set from a 24-bit `0xRRGGBB` integer.
    pub fn set_hex(&mut self, hex: u32) -> &mut Self {
        let hex = hex & 0xFF_FFFF;
        self.r = f64::from((hex >> 16) & 255) / 255.0;
        self.g = f64::from((hex >> 8) & 255) / 255.0;
        self.b = f64::from(hex & 255) / 255.0;
        self
    }

    /// Set from hue/saturation/lightness, each in `[0, 1]`.
    pub fn set_hsl(&mut self, h: f64, s: f64, l: f64) -> &mut Self {
        if s == 0.0 {
            return self.set_rgb(l, l, l);
        }

        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;

        self.r = hue_to_rgb(q, p, h + 1.0 / 3.0);
        self.g = hue_to_rgb(q, p, h);
        self.b = hue_to_rgb(q, p, h - 1.0 / 3.0);
        self
    }

    /// Set from a CSS style string: `rgb()`, `rgba()`, `hsl()`, `hsla()`,
    /// `#rrggbb`, `#rgb` or a color keyword.
    pub fn set_style(&mut self, style: &str) -> Result<&mut Self> {
        match parse_style(style) {
            Some(ColorStyle::Rgb(r, g, b)) => Ok(self.set_rgb(r, g, b)),
            Some(ColorStyle::Hsl(h, s, l)) => Ok(self.set_hsl(h, s, l)),
            Some(ColorStyle::Hex(hex)) => Ok(self.set_hex(hex)),
            None => Err(MathError::InvalidColorStyle(style.to_string())),
        }
    }

    /// 24-bit integer with each channel rounded from `c * 255`.
    pub fn hex(&self) -> u32 {
        (channel_byte(self.r) << 16) | (channel_byte(self.g) << 8) | channel_byte(self.b)
    }

    /// Six lowercase hex digits, no leading `#`.
    pub fn hex_string(&self) -> String {
        format!("{:06x}", self.hex())
    }

    /// `rgb(r,g,b)` with truncated 0..255 channels.
    pub fn style(&self) -> String {
        format!(
            "rgb({},{},{})",
            (self.r * 255.0) as i64,
            (self.g * 255.0) as i64,
            (self.b * 255.0) as i64
        )
    }

    pub fn hsl(&self) -> Hsl {
        let (r, g, b) = (self.r, self.g, self.b);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let lightness = (min + max) / 2.0;

        if min == max {
            return Hsl {
                h: 0.0,
                s: 0.0,
                l: lightness,
            };
        }

        let delta = max - min;
        let saturation = if lightness <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let hue = if max == r {
            (g - b) / delta + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };

        Hsl {
            h: hue / 6.0,
            s: saturation,
            l: lightness,
        }
    }

    pub fn offset_hsl(&mut self, h: f64, s: f64, l: f64) -> &mut Self {
        let hsl = self.hsl();
        self.set_hsl(hsl.h + h, hsl.s + s, hsl.l + l)
    }

    #[must_use]
    pub fn gamma_to_linear(self) -> Self {
        Self::new(self.r * self.r, self.g * self.g, self.b * self.b)
    }

    #[must_use]
    pub fn linear_to_gamma(self) -> Self {
        Self::new(self.r.sqrt(), self.g.sqrt(), self.b.sqrt())
    }

    #[must_use]
    pub fn add_scalar(self, s: f64) -> Self {
        Self::new(self.r + s, self.g + s, self.b + s)
    }

    #[must_use]
    pub fn multiply(self, c: Self) -> Self {
        Self::new(self.r * c.r, self.g * c.g, self.b * c.b)
    }

    #[must_use]
    pub fn multiply_scalar(self, s: f64) -> Self {
        Self::new(self.r * s, self.g * s, self.b * s)
    }

    #[must_use]
    pub fn lerp(self, target: Self, alpha: f64) -> Self {
        Self::new(
            self.r + (target.r - self.r) * alpha,
            self.g + (target.g - self.g) * alpha,
            self.b + (target.b - self.b) * alpha,
        )
    }

    pub fn from_array(array: &[f64], offset: usize) -> Self {
        Self::new(array[offset], array[offset + 1], array[offset + 2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl Add for Color {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl Mul<f64> for Color {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        self.multiply_scalar(s)
    }
}

fn channel_byte(c: f64) -> u32 {
    (c * 255.0).round().clamp(0.0, 255.0) as u32
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * 6.0 * (2.0 / 3.0 - t);
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_style_rgb() {
        let mut c = Color::BLACK;
        c.set_style("rgb(255,0,0)").unwrap();
        assert_eq!((c.r, c.g, c.b), (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_hex_round_trip() {
        let mut c = Color::from_hex(0xffffff);
        c.set_hex(0x87CEEB);
        assert_eq!(c.hex(), 8900331);
        assert_eq!(c.hex_string(), "87ceeb");
    }

    #[test]
    fn test_hex_uses_rounding() {
        let c = Color::new(0.999, 0.5, 0.001);
        assert_eq!(c.hex(), (255 << 16) | (128 << 8));
    }

    #[test]
    fn test_style_string() {
        let c = Color::from_hex(0xff0000);
        assert_eq!(c.style(), "rgb(255,0,0)");
        assert_eq!(Color::new(0.5, 0.5, 0.5).style(), "rgb(127,127,127)");
    }

    #[test]
    fn test_named_and_invalid_styles() {
        assert_eq!(Color::from_style("skyblue").unwrap().hex(), 0x87CEEB);
        assert_eq!(Color::from_style("#f00").unwrap(), Color::new(1.0, 0.0, 0.0));
        let err = Color::from_style("bogus").unwrap_err();
        assert_eq!(err, MathError::InvalidColorStyle("bogus".to_string()));
    }

    #[test]
    fn test_hsl_round_trip() {
        let mut c = Color::BLACK;
        c.set_hsl(0.75, 1.0, 0.25);
        let hsl = c.hsl();
        assert!((hsl.h - 0.75).abs() < 1e-9);
        assert!((hsl.s - 1.0).abs() < 1e-9);
        assert!((hsl.l - 0.25).abs() < 1e-9);

        let grey = Color::new(0.5, 0.5, 0.5).hsl();
        assert_eq!(grey, Hsl { h: 0.0, s: 0.0, l: 0.5 });
    }

    #[test]
    fn test_hsl_style() {
        let c = Color::from_style("hsl(0, 100%, 50%)").unwrap();
        assert_eq!(c, Color::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_offset_hsl() {
        let mut c = Color::new(1.0, 0.0, 0.0);
        c.offset_hsl(1.0 / 3.0, 0.0, 0.0);
        assert!((c.g - 1.0).abs() < 1e-9);
        assert!(c.r.abs() < 1e-9);
    }

    #[test]
    fn test_gamma_and_arithmetic() {
        let c = Color::new(0.5, 0.25, 1.0);
        assert_eq!(c.gamma_to_linear(), Color::new(0.25, 0.0625, 1.0));
        assert_eq!(c.gamma_to_linear().linear_to_gamma(), c);
        assert_eq!(c.lerp(Color::WHITE, 1.0), Color::WHITE);
        assert_eq!(c + Color::BLACK, c);
        assert_eq!(c * 2.0, Color::new(1.0, 0.5, 2.0));
    }
}
