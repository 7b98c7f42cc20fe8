//! Pixel grid types shared by the sampler and the bit decoder.
//!
//! A [`PixelGrid`] stores one grayscale sample per cell in raster order
//! (`y * width + x`), exactly as read back from the render surface.

use crate::error::{GeometryError, VidlinkError};

// ── PixelFormat ──────────────────────────────────────────────────

/// Pixel layout of raw byte buffers handed to [`PixelGrid::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 4 bytes per pixel: Red, Green, Blue, Alpha.
    Rgba8,
    /// 4 bytes per pixel: Blue, Green, Red, Alpha.
    Bgra8,
    /// 3 bytes per pixel: Red, Green, Blue.
    Rgb8,
    /// 1 byte per pixel: luminance.
    Gray8,
}

impl PixelFormat {
    /// Bytes consumed by a single pixel in this format.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Gray8 => 1,
        }
    }

    fn color(self, px: &[u8]) -> Color {
        match self {
            PixelFormat::Rgba8 => Color::from_rgba8(px[0], px[1], px[2], px[3]),
            PixelFormat::Bgra8 => Color::from_rgba8(px[2], px[1], px[0], px[3]),
            PixelFormat::Rgb8 => Color::from_rgba8(px[0], px[1], px[2], u8::MAX),
            PixelFormat::Gray8 => Color::from_rgba8(px[0], px[0], px[0], u8::MAX),
        }
    }
}

// ── Color ────────────────────────────────────────────────────────

/// Linear color sample with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        const MAX: f32 = u8::MAX as f32;
        Self::new(r as f32 / MAX, g as f32 / MAX, b as f32 / MAX, a as f32 / MAX)
    }

    /// Perceptual luminance; alpha is ignored.
    pub fn grayscale(&self) -> f32 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }
}

// ── GridGeometry ─────────────────────────────────────────────────

/// Width and height of a render target, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridGeometry {
    pub width: u32,
    pub height: u32,
}

impl GridGeometry {
    /// Validated geometry: both sides non-zero multiples of 8.
    pub fn new(width: u32, height: u32) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::Empty { width, height });
        }
        if width % 8 != 0 {
            return Err(GeometryError::WidthNotByteAligned(width));
        }
        if height % 8 != 0 {
            return Err(GeometryError::HeightNotByteAligned(height));
        }
        Ok(Self { width, height })
    }

    /// Geometry without alignment checks. Decoding such a grid drops
    /// the trailing partial byte group of every row.
    pub const fn unchecked(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_byte_aligned(&self) -> bool {
        GridGeometry::new(self.width, self.height).is_ok()
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Length of a decoded frame: `(w * h) / 8`.
    pub fn payload_len(&self) -> usize {
        self.cell_count() / 8
    }
}

// ── PixelGrid ────────────────────────────────────────────────────

/// Rectangular, row-major grid of grayscale samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    cells: Vec<f32>,
}

impl PixelGrid {
    /// Build a grid from precomputed grayscale values.
    pub fn from_grayscale(width: u32, height: u32, cells: Vec<f32>) -> Result<Self, VidlinkError> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(VidlinkError::InvalidGrid {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self { width, height, cells })
    }

    /// Build a grid from color samples, converting each to grayscale.
    pub fn from_colors(width: u32, height: u32, colors: &[Color]) -> Result<Self, VidlinkError> {
        Self::from_grayscale(width, height, colors.iter().map(Color::grayscale).collect())
    }

    /// Build a grid from a tightly packed byte buffer.
    pub fn from_raw(
        width: u32,
        height: u32,
        data: &[u8],
        format: PixelFormat,
    ) -> Result<Self, VidlinkError> {
        let bpp = format.bytes_per_pixel();
        let expected = width as usize * height as usize;
        if data.len() != expected * bpp {
            return Err(VidlinkError::InvalidGrid {
                expected,
                actual: data.len() / bpp,
            });
        }
        let cells = data
            .chunks_exact(bpp)
            .map(|px| format.color(px).grayscale())
            .collect();
        Ok(Self { width, height, cells })
    }

    /// A grid with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::unchecked(self.width, self.height)
    }

    /// Grayscale sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn gray(&self, x: u32, y: u32) -> f32 {
        self.cells[self.index(x, y)]
    }

    pub fn set_gray(&mut self, x: u32, y: u32, value: f32) {
        let i = self.index(x, y);
        self.cells[i] = value;
    }

    /// All samples of row `y`.
    pub fn row(&self, y: u32) -> &[f32] {
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        y as usize * self.width as usize + x as usize
    }
}

// ── Tests ────────────────────────────────────────────────────────
