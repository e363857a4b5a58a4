//! Pixel-level value types shared by every transform.
//!
//! - [`Color`]: a single RGBA8 value
//! - [`Region`]: a rectangle addressing part of a buffer
//! - [`RasterBuffer`]: the width/height-addressed pixel grid all transforms operate on
//! - [`Mirror`]: a reflection descriptor used when painting bleed

use crate::core::error::{BleedError, BleedResult};
use image::{imageops, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Rectangular sub-area of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// In-memory RGBA8 pixel grid.
///
/// Coordinates are `(x, y)` with `0 <= x < width` and `0 <= y < height`.
/// Reading or writing outside that range is a programming error and panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    image: RgbaImage,
}

/// One of the four sub-divisions used by corner reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    /// All quadrants in processing order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Whether this quadrant belongs to the bottom half of the image.
    pub fn is_bottom_half(&self) -> bool {
        matches!(self, Quadrant::BottomLeft | Quadrant::BottomRight)
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quadrant::TopLeft => "top-left",
            Quadrant::TopRight => "top-right",
            Quadrant::BottomLeft => "bottom-left",
            Quadrant::BottomRight => "bottom-right",
        };
        f.write_str(name)
    }
}

/// Reflection descriptor for [`RasterBuffer::paint_mirrored`].
///
/// Source pixel `(i, j)` lands on `(shift_x + scale_x * i, shift_y + scale_y * j)`,
/// so `shift` is where the source's origin pixel ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mirror {
    pub scale_x: i32,
    pub scale_y: i32,
    pub shift_x: i64,
    pub shift_y: i64,
}

// ============================================================================
// Color Implementation
// ============================================================================

impl Color {
    /// Create a new color from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from RGB components (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a hex color string.
    ///
    /// Supports formats: "#RGB", "#RGBA", "#RRGGBB", "#RRGGBBAA"
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(format!("Invalid hex color: non-ASCII characters in {:?}", hex));
        }
        let digit = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| e.to_string())
        };

        match hex.len() {
            3 => Ok(Self::rgb(digit(0..1)? * 17, digit(1..2)? * 17, digit(2..3)? * 17)),
            4 => Ok(Self::new(
                digit(0..1)? * 17,
                digit(1..2)? * 17,
                digit(2..3)? * 17,
                digit(3..4)? * 17,
            )),
            6 => Ok(Self::rgb(digit(0..2)?, digit(2..4)?, digit(4..6)?)),
            8 => Ok(Self::new(digit(0..2)?, digit(2..4)?, digit(4..6)?, digit(6..8)?)),
            _ => Err(format!(
                "Invalid hex color format: expected 3, 4, 6, or 8 characters, got {}",
                hex.len()
            )),
        }
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Convert to image crate's Rgba type.
    pub fn to_rgba(&self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    /// Create from image crate's Rgba type.
    pub fn from_rgba(rgba: Rgba<u8>) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    /// Channels as floats, in RGBA order.
    pub fn to_f64_array(&self) -> [f64; 4] {
        [self.r as f64, self.g as f64, self.b as f64, self.a as f64]
    }

    /// Build a color from fractional channels.
    ///
    /// Each channel is rounded half away from zero, then clamped to `0..=255`.
    pub fn from_f64_array(channels: [f64; 4]) -> Self {
        let quantize = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self::new(
            quantize(channels[0]),
            quantize(channels[1]),
            quantize(channels[2]),
            quantize(channels[3]),
        )
    }

    /// Whether the alpha channel is zero.
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Common colors
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

// ============================================================================
// Region Implementation
// ============================================================================

impl Region {
    /// Create a region from its origin and size.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// One past the right-most column.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// One past the bottom-most row.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `(x, y)` lies inside the region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && (x as u64) < self.right() && (y as u64) < self.bottom()
    }

    /// Whether the region lies entirely within a `width` x `height` buffer.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

// ============================================================================
// RasterBuffer Implementation
// ============================================================================

impl RasterBuffer {
    /// Allocate a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Allocate a buffer flood-filled with `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, color.to_rgba()),
        }
    }

    /// Wrap an existing image crate buffer.
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Build a buffer from a row-major list of pixels.
    ///
    /// Returns `None` when `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: &[Color]) -> Option<Self> {
        if pixels.len() as u64 != width as u64 * height as u64 {
            return None;
        }
        let raw = pixels
            .iter()
            .flat_map(|c| [c.r, c.g, c.b, c.a])
            .collect::<Vec<u8>>();
        RgbaImage::from_raw(width, height, raw).map(Self::from_rgba_image)
    }

    /// Borrow the image crate buffer.
    pub fn as_rgba_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// The region covering the whole buffer.
    pub fn bounds(&self) -> Region {
        Region::new(0, 0, self.width(), self.height())
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height()
    }

    /// Read a pixel. Panics when `(x, y)` is out of range.
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        Color::from_rgba(*self.image.get_pixel(x, y))
    }

    /// Write a pixel. Panics when `(x, y)` is out of range.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.image.put_pixel(x, y, color.to_rgba());
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba();
        for pixel in self.image.pixels_mut() {
            *pixel = rgba;
        }
    }

    /// Copy `source` verbatim with its origin at `(x, y)`, clipped to this buffer.
    pub fn paste(&mut self, source: &RasterBuffer, x: i64, y: i64) {
        imageops::replace(&mut self.image, &source.image, x, y);
    }

    /// Extract a copy of `region`.
    pub fn crop(&self, region: Region) -> BleedResult<RasterBuffer> {
        if !region.fits_within(self.width(), self.height()) {
            return Err(BleedError::RegionOutOfBounds {
                region,
                width: self.width(),
                height: self.height(),
            });
        }
        let view = imageops::crop_imm(&self.image, region.x, region.y, region.width, region.height);
        Ok(Self::from_rgba_image(view.to_image()))
    }

    /// Paint a reflected copy of `source` according to `mirror`, clipped to this buffer.
    pub fn paint_mirrored(&mut self, source: &RasterBuffer, mirror: Mirror) {
        let (width, height) = (self.width() as i64, self.height() as i64);
        for (i, j, pixel) in source.image.enumerate_pixels() {
            let x = mirror.shift_x + mirror.scale_x as i64 * i as i64;
            let y = mirror.shift_y + mirror.scale_y as i64 * j as i64;
            if (0..width).contains(&x) && (0..height).contains(&y) {
                self.image.put_pixel(x as u32, y as u32, *pixel);
            }
        }
    }

    /// Iterate over `(x, y, color)` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Color)> + '_ {
        self.image
            .enumerate_pixels()
            .map(|(x, y, p)| (x, y, Color::from_rgba(*p)))
    }
}

// ============================================================================
// Mirror Implementation
// ============================================================================

impl Mirror {
    pub const fn new(scale_x: i32, scale_y: i32, shift_x: i64, shift_y: i64) -> Self {
        Self {
            scale_x,
            scale_y,
            shift_x,
            shift_y,
        }
    }
}
