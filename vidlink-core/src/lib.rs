//! # vidlink-core
//!
//! Recovers arbitrary bytes from a single video frame in which every
//! pixel is a black or white bit.
//!
//! This crate contains:
//! - **Grid**: `PixelGrid`, `Color`, `GridGeometry`: sampled frame data
//! - **Bits**: the pixel → byte decoder (and its inverse encoder)
//! - **Sampler**: `RenderSurface` and the geometry-checked `PixelSampler`
//! - **Video**: the `VideoPlayer` boundary and its `VideoEvent`s
//! - **Request**: `DecodeRequest` with typed callbacks, `RequestSlot`
//! - **State**: `DecoderPhase`, the load → ready → render machine
//! - **Decoder**: `VideoDecoder`, which wires all of the above together
//! - **Service**: `DecoderService`, a single-owner tokio task host
//! - **Retry**: the caller-side rate-limit retry policy
//! - **Error**: `VidlinkError` / `DecodeFailure`, built on `thiserror`

pub mod bits;
pub mod decoder;
pub mod error;
pub mod grid;
pub mod request;
pub mod retry;
pub mod sampler;
pub mod service;
pub mod state;
pub mod text;
pub mod video;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use decoder::{DecodeStats, DecodeTimings, DecoderSettings, VideoDecoder};
pub use error::{DecodeFailure, GeometryError, VidlinkError};
pub use grid::{Color, GridGeometry, PixelFormat, PixelGrid};
pub use request::{DecodeOutcome, DecodeRequest, RequestSlot, SlotPolicy};
pub use retry::{RetryDecision, RetryPolicy, load_with_retry};
pub use sampler::{FrameBuffer, FramePublisher, PixelSampler, RenderSurface, WatchSurface};
pub use service::{DecoderHandle, DecoderService};
pub use state::DecoderPhase;
pub use text::{bytes_from_string, string_from_bytes};
pub use video::{
    RequestId, VideoError, VideoEvent, VideoEventReceiver, VideoEventSender, VideoPlayer,
    video_event_channel,
};
pub use url::Url;
