//! Frame images on disk.
//!
//! Image files have their origin at the top-left, the sampled surface at
//! the bottom-left. Rows are flipped on the way in and out so the top row
//! of an image holds the first payload bytes.

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma, imageops};
use vidlink_core::{GridGeometry, PixelFormat, PixelGrid};

use crate::error::CliError;

/// Convert a decoded image into a surface-oriented grid.
pub fn grid_from_image(img: &DynamicImage) -> Result<PixelGrid, CliError> {
    let rgba = imageops::flip_vertical(&img.to_rgba8());
    let (width, height) = rgba.dimensions();
    Ok(PixelGrid::from_raw(width, height, rgba.as_raw(), PixelFormat::Rgba8)?)
}

/// Render a grid as a black/white image, top row first.
pub fn image_from_grid(grid: &PixelGrid) -> GrayImage {
    let (width, height) = (grid.width(), grid.height());
    GrayImage::from_fn(width, height, |x, y| {
        let gray = grid.gray(x, height - 1 - y).clamp(0.0, 1.0);
        Luma([(gray * 255.0).round() as u8])
    })
}

/// Load a frame, requiring it to match `expected` when given.
pub fn load_frame(path: &Path, expected: Option<GridGeometry>) -> Result<PixelGrid, CliError> {
    let img = image::open(path)?;
    if let Some(expected) = expected {
        if img.width() != expected.width || img.height() != expected.height {
            return Err(CliError::FrameSize {
                expected_width: expected.width,
                expected_height: expected.height,
                actual_width: img.width(),
                actual_height: img.height(),
            });
        }
    }
    grid_from_image(&img)
}

/// Write a frame; the format follows the file extension.
pub fn save_frame(grid: &PixelGrid, path: &Path) -> Result<(), CliError> {
    image_from_grid(grid).save(path)?;
    Ok(())
}
