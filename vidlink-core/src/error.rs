//! Domain-specific error types for vidlink.
//!
//! Setup and API misuse surface as [`VidlinkError`]. Failures that belong
//! to a single load (video errors, displacement, sampling) are delivered
//! to the request's callback as [`DecodeFailure`] instead.

use thiserror::Error;

use crate::video::VideoError;

/// The canonical error type for the vidlink core.
#[derive(Debug, Error)]
pub enum VidlinkError {
    // ── Configuration Errors ─────────────────────────────────────
    /// Grid width/height cannot carry whole bytes.
    #[error("invalid grid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    /// The render surface does not match the configured geometry.
    #[error("render surface is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    SurfaceMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// A pixel buffer did not hold `width * height` samples.
    #[error("invalid pixel grid: expected {expected} samples, got {actual}")]
    InvalidGrid { expected: usize, actual: usize },

    /// A payload does not fit into the frame it should be encoded into.
    #[error("payload too large: {size} bytes (frame holds {max})")]
    PayloadTooLarge { size: usize, max: usize },

    // ── Request Errors ───────────────────────────────────────────
    /// A load was issued while another one is in flight and the slot
    /// policy rejects overlapping requests.
    #[error("request slot busy with request {0}")]
    SlotBusy(u64),

    /// A state transition was requested from the wrong phase.
    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),

    /// The source locator could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Runtime Errors ───────────────────────────────────────────
    /// The decoder service (or one of its channels) has gone away.
    #[error("channel closed")]
    ChannelClosed,

    /// I/O failure while reading or writing frames.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

// ── GeometryError ─────────────────────────────────────────────────

/// Reasons a grid geometry is rejected at setup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("width and height must be non-zero (got {width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("width {0} is not a multiple of 8")]
    WidthNotByteAligned(u32),

    #[error("height {0} is not a multiple of 8")]
    HeightNotByteAligned(u32),
}

// ── DecodeFailure ─────────────────────────────────────────────────

/// Why a single load did not produce bytes.
///
/// Delivered through the request callback. `Video` carries the video
/// component's classification verbatim; the core never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFailure {
    #[error("video error: {0}")]
    Video(VideoError),

    /// A newer load replaced this request before it completed.
    #[error("request superseded by a newer load")]
    Superseded,

    /// The slot policy refused this load because another is in flight.
    #[error("request slot busy")]
    SlotBusy,

    /// Reading the render surface failed.
    #[error("sampling failed: {0}")]
    Sampling(String),

    /// The decoder refused to issue the load.
    #[error("load not issued: {0}")]
    Rejected(String),

    /// The decoder service stopped before the request completed.
    #[error("decoder shut down")]
    Shutdown,
}

impl DecodeFailure {
    /// The video component's classification, if this is a video error.
    pub fn video_error(&self) -> Option<VideoError> {
        match self {
            Self::Video(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<VidlinkError> for DecodeFailure {
    /// Classify an error returned while submitting a load.
    fn from(e: VidlinkError) -> Self {
        match e {
            VidlinkError::SlotBusy(_) => DecodeFailure::SlotBusy,
            VidlinkError::ChannelClosed => DecodeFailure::Shutdown,
            other => DecodeFailure::Rejected(other.to_string()),
        }
    }
}

impl From<VideoError> for DecodeFailure {
    fn from(e: VideoError) -> Self {
        DecodeFailure::Video(e)
    }
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for VidlinkError {
    fn from(s: String) -> Self {
        VidlinkError::Other(s)
    }
}

impl From<&str> for VidlinkError {
    fn from(s: &str) -> Self {
        VidlinkError::Other(s.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for VidlinkError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        VidlinkError::ChannelClosed
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for VidlinkError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        VidlinkError::ChannelClosed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = VidlinkError::SurfaceMismatch {
            expected_width: 64,
            expected_height: 32,
            actual_width: 60,
            actual_height: 32,
        };
        assert!(e.to_string().contains("60x32"));
        assert!(e.to_string().contains("64x32"));

        let e = VidlinkError::PayloadTooLarge { size: 300, max: 256 };
        assert!(e.to_string().contains("300"));
        assert!(e.to_string().contains("256"));
    }

    #[test]
    fn geometry_error_converts() {
        let e: VidlinkError = GeometryError::WidthNotByteAligned(12).into();
        assert!(matches!(
            e,
            VidlinkError::InvalidGeometry(GeometryError::WidthNotByteAligned(12))
        ));
        assert!(e.to_string().contains("12"));
    }

    #[test]
    fn from_string() {
        let e: VidlinkError = "something broke".into();
        assert!(matches!(e, VidlinkError::Other(_)));
    }

    #[test]
    fn from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let e: VidlinkError = err.into();
        assert!(matches!(e, VidlinkError::InvalidUrl(_)));
    }

    #[test]
    fn decode_failure_passes_video_error_through() {
        let f: DecodeFailure = VideoError::RateLimited.into();
        assert_eq!(f.video_error(), Some(VideoError::RateLimited));
        assert_eq!(DecodeFailure::Superseded.video_error(), None);
    }

    #[test]
    fn submit_errors_keep_their_classification() {
        assert_eq!(
            DecodeFailure::from(VidlinkError::SlotBusy(3)),
            DecodeFailure::SlotBusy
        );
        assert_eq!(
            DecodeFailure::from(VidlinkError::ChannelClosed),
            DecodeFailure::Shutdown
        );

        let f = DecodeFailure::from(VidlinkError::Other("request slot emptied during load".into()));
        assert_eq!(
            f,
            DecodeFailure::Rejected("request slot emptied during load".into())
        );
        assert_ne!(f, DecodeFailure::Shutdown);
    }
}
