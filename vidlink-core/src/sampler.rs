//! Pixel sampler and render surfaces.
//!
//! A [`RenderSurface`] is whatever the video frame is drawn into. The
//! [`PixelSampler`] pins the expected geometry at setup so a mismatched
//! surface is rejected up front instead of silently truncating data.

use tokio::sync::watch;

use crate::error::VidlinkError;
use crate::grid::{GridGeometry, PixelGrid};

// ── RenderSurface ────────────────────────────────────────────────

/// A readable render target.
pub trait RenderSurface {
    /// Current `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Read back the whole surface.
    fn read_pixels(&mut self) -> Result<PixelGrid, VidlinkError>;
}

// ── PixelSampler ─────────────────────────────────────────────────

/// Reads grids of a fixed geometry from a surface.
pub struct PixelSampler<S> {
    surface: S,
    geometry: GridGeometry,
}

impl<S: RenderSurface> PixelSampler<S> {
    /// Bind `surface` to `geometry`, failing if the two disagree.
    pub fn new(surface: S, geometry: GridGeometry) -> Result<Self, VidlinkError> {
        check_dimensions(geometry, surface.dimensions())?;
        Ok(Self { surface, geometry })
    }

    /// Read one grid. The result always has the bound geometry.
    pub fn sample(&mut self) -> Result<PixelGrid, VidlinkError> {
        let grid = self.surface.read_pixels()?;
        check_dimensions(self.geometry, (grid.width(), grid.height()))?;
        Ok(grid)
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

fn check_dimensions(expected: GridGeometry, (width, height): (u32, u32)) -> Result<(), VidlinkError> {
    if expected.width != width || expected.height != height {
        return Err(VidlinkError::SurfaceMismatch {
            expected_width: expected.width,
            expected_height: expected.height,
            actual_width: width,
            actual_height: height,
        });
    }
    Ok(())
}

// ── FrameBuffer ──────────────────────────────────────────────────

/// In-memory surface holding the last presented frame.
///
/// Starts out black.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    frame: PixelGrid,
}

impl FrameBuffer {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            frame: PixelGrid::filled(geometry.width, geometry.height, 0.0),
        }
    }

    /// Replace the surface contents.
    pub fn present(&mut self, frame: PixelGrid) {
        self.frame = frame;
    }

    pub fn frame(&self) -> &PixelGrid {
        &self.frame
    }
}

impl RenderSurface for FrameBuffer {
    fn dimensions(&self) -> (u32, u32) {
        (self.frame.width(), self.frame.height())
    }

    fn read_pixels(&mut self) -> Result<PixelGrid, VidlinkError> {
        Ok(self.frame.clone())
    }
}

// ── WatchSurface ─────────────────────────────────────────────────

/// Publishing half of a [`WatchSurface`], held by the video component.
#[derive(Debug, Clone)]
pub struct FramePublisher {
    tx: watch::Sender<PixelGrid>,
}

impl FramePublisher {
    /// Replace the frame the surface will return on its next read.
    pub fn publish(&self, frame: PixelGrid) {
        self.tx.send_replace(frame);
    }
}

/// Surface fed by a video component running on another task.
///
/// The latest published frame wins; older ones are never read.
#[derive(Debug)]
pub struct WatchSurface {
    rx: watch::Receiver<PixelGrid>,
    geometry: GridGeometry,
}

impl WatchSurface {
    /// Create a black surface plus the publisher that drives it.
    pub fn new(geometry: GridGeometry) -> (FramePublisher, Self) {
        let blank = PixelGrid::filled(geometry.width, geometry.height, 0.0);
        let (tx, rx) = watch::channel(blank);
        (FramePublisher { tx }, Self { rx, geometry })
    }
}

impl RenderSurface for WatchSurface {
    fn dimensions(&self) -> (u32, u32) {
        (self.geometry.width, self.geometry.height)
    }

    fn read_pixels(&mut self) -> Result<PixelGrid, VidlinkError> {
        Ok(self.rx.borrow_and_update().clone())
    }
}

// ── Tests ────────────────────────────────────────────────────────
