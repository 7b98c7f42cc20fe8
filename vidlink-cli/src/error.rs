//! Errors for the command-line front end.

use thiserror::Error;
use vidlink_core::{DecodeFailure, VideoError, VidlinkError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] VidlinkError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A frame on disk does not match the configured surface.
    #[error("frame is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    FrameSize {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("load failed: {0}")]
    Load(#[from] DecodeFailure),

    #[error("invalid source {0:?}: expected a URL or an existing file path")]
    InvalidSource(String),
}

impl CliError {
    /// How a video component would report this failure.
    pub fn video_error(&self) -> VideoError {
        match self {
            CliError::Io(e) => io_video_error(e),
            CliError::Image(image::ImageError::IoError(e)) => io_video_error(e),
            CliError::Image(_) | CliError::FrameSize { .. } => VideoError::PlayerError,
            CliError::InvalidSource(_) => VideoError::InvalidUrl,
            CliError::Load(f) => f.video_error().unwrap_or(VideoError::Unknown),
            CliError::Core(_) => VideoError::Unknown,
        }
    }
}

fn io_video_error(e: &std::io::Error) -> VideoError {
    match e.kind() {
        std::io::ErrorKind::NotFound => VideoError::InvalidUrl,
        std::io::ErrorKind::PermissionDenied => VideoError::AccessDenied,
        _ => VideoError::Unknown,
    }
}
