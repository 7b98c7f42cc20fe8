//! Boundary to the video component.
//!
//! The core never fetches anything itself. A [`VideoPlayer`] is told to
//! start loading a source and later reports back with a [`VideoEvent`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use url::Url;

// ── VideoError ───────────────────────────────────────────────────

/// Failure classification raised by the video component.
///
/// Passed through to the request callback unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoError {
    Unknown,
    InvalidUrl,
    AccessDenied,
    PlayerError,
    /// The source throttled this request; retry after the platform's
    /// request cadence has elapsed.
    RateLimited,
}

impl VideoError {
    pub fn is_rate_limited(self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

impl fmt::Display for VideoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::InvalidUrl => write!(f, "InvalidURL"),
            Self::AccessDenied => write!(f, "AccessDenied"),
            Self::PlayerError => write!(f, "PlayerError"),
            Self::RateLimited => write!(f, "RateLimited"),
        }
    }
}

// ── RequestId ────────────────────────────────────────────────────

/// Identifies one issued load. Ids increase monotonically per decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestId(pub u64);

impl RequestId {
    pub fn next(self) -> Self {
        RequestId(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── VideoEvent ───────────────────────────────────────────────────

/// Asynchronous notifications from the video component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoEvent {
    /// Decodable video data for `id` is available.
    Ready { id: RequestId },
    /// Loading `id` failed.
    Error { id: RequestId, error: VideoError },
}

impl VideoEvent {
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Ready { id } | Self::Error { id, .. } => *id,
        }
    }
}

// ── VideoPlayer ──────────────────────────────────────────────────

/// The video component consumed by the decoder.
///
/// `load_url` must return promptly; the outcome is reported later as a
/// [`VideoEvent`] carrying the same `id`.
pub trait VideoPlayer {
    fn load_url(&mut self, id: RequestId, source: &Url);
}

/// Sender half players use to report [`VideoEvent`]s.
pub type VideoEventSender = mpsc::UnboundedSender<VideoEvent>;

/// Receiver half consumed by the decoder service.
pub type VideoEventReceiver = mpsc::UnboundedReceiver<VideoEvent>;

/// Create the channel a player reports through.
pub fn video_event_channel() -> (VideoEventSender, VideoEventReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_classification() {
        assert!(VideoError::RateLimited.is_rate_limited());
        assert!(!VideoError::PlayerError.is_rate_limited());
    }

    #[test]
    fn video_error_serde_names() {
        let json = serde_json::to_string(&VideoError::RateLimited).unwrap();
        assert_eq!(json, "\"rate_limited\"");
        let parsed: VideoError = serde_json::from_str("\"invalid_url\"").unwrap();
        assert_eq!(parsed, VideoError::InvalidUrl);
    }

    #[test]
    fn display_matches_host_names() {
        assert_eq!(VideoError::InvalidUrl.to_string(), "InvalidURL");
        assert_eq!(VideoError::RateLimited.to_string(), "RateLimited");
    }

    #[test]
    fn event_request_id() {
        let ev = VideoEvent::Error {
            id: RequestId(7),
            error: VideoError::Unknown,
        };
        assert_eq!(ev.request_id(), RequestId(7));
        assert_eq!(RequestId(7).next(), RequestId(8));
    }
}
