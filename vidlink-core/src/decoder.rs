//! Load/decode state machine.
//!
//! [`VideoDecoder`] ties the pieces together. It is driven entirely by
//! its caller: load requests, video events and render-completion ticks
//! each arrive as a method call, so it can be hosted by a frame loop or
//! by the async [`DecoderService`](crate::service::DecoderService).

use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, info, trace, warn};

use crate::bits;
use crate::error::{DecodeFailure, VidlinkError};
use crate::grid::GridGeometry;
use crate::request::{DecodeRequest, RequestSlot, SlotPolicy};
use crate::sampler::{PixelSampler, RenderSurface};
use crate::state::DecoderPhase;
use crate::video::{RequestId, VideoError, VideoEvent, VideoPlayer};

// ── DecoderSettings ──────────────────────────────────────────────

/// Configuration for [`VideoDecoder`].
#[derive(Debug, Clone)]
pub struct DecoderSettings {
    /// Render target size; both sides must be multiples of 8.
    pub geometry: GridGeometry,
    /// Behaviour when a load is issued while another is in flight.
    pub slot_policy: SlotPolicy,
    /// Render-completion ticks per second when hosted by the service.
    pub frame_rate: u32,
}

impl DecoderSettings {
    pub fn new(width: u32, height: u32) -> Result<Self, VidlinkError> {
        Ok(Self {
            geometry: GridGeometry::new(width, height)?,
            ..Self::default()
        })
    }

    /// Interval between render ticks.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.clamp(1, 240) as f64)
    }
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            geometry: GridGeometry::unchecked(128, 128),
            slot_policy: SlotPolicy::Replace,
            frame_rate: 60,
        }
    }
}

// ── DecodeStats ──────────────────────────────────────────────────

/// Timings of one completed decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeTimings {
    /// Load issued → `Ready`.
    pub load: Duration,
    /// `Ready` → render tick that sampled the frame.
    pub render_wait: Duration,
    /// Sampling plus bit decoding.
    pub decode: Duration,
}

/// Running counters for a decoder.
#[derive(Debug, Clone, Default)]
pub struct DecodeStats {
    pub decoded: u64,
    pub failed: u64,
    pub superseded: u64,
    pub ignored_events: u64,
    pub bytes: u64,
    pub last_timings: Option<DecodeTimings>,
}

// ── VideoDecoder ─────────────────────────────────────────────────

/// Single-slot load → ready → render → decode state machine.
pub struct VideoDecoder<P, S> {
    player: P,
    sampler: PixelSampler<S>,
    slot: RequestSlot,
    phase: DecoderPhase,
    settings: DecoderSettings,
    stats: DecodeStats,
    load_time: Duration,
}

impl<P: VideoPlayer, S: RenderSurface> VideoDecoder<P, S> {
    /// Bind a player and surface. Fails if the configured geometry is
    /// not byte aligned or the surface has a different size.
    pub fn new(player: P, surface: S, settings: DecoderSettings) -> Result<Self, VidlinkError> {
        let geometry = GridGeometry::new(settings.geometry.width, settings.geometry.height)?;
        let sampler = PixelSampler::new(surface, geometry)?;
        Ok(Self {
            player,
            sampler,
            slot: RequestSlot::new(),
            phase: DecoderPhase::Idle,
            settings,
            stats: DecodeStats::default(),
            load_time: Duration::ZERO,
        })
    }

    /// Store `request` and ask the player to load its source.
    ///
    /// Under [`SlotPolicy::Replace`] a request already in flight is
    /// completed with [`DecodeFailure::Superseded`]; under
    /// [`SlotPolicy::Reject`] this returns [`VidlinkError::SlotBusy`].
    pub fn load_url(&mut self, request: DecodeRequest) -> Result<RequestId, VidlinkError> {
        let (id, displaced) = self.slot.occupy(request, self.settings.slot_policy)?;

        if let Some(old) = displaced {
            info!(old = %old.id, new = %id, "request superseded");
            self.stats.superseded += 1;
            old.request.complete(Err(DecodeFailure::Superseded));
        }

        self.phase.begin_load(id);
        let source = match self.slot.current() {
            Some(active) => active.request.source().clone(),
            None => return Err(VidlinkError::Other("request slot emptied during load".into())),
        };
        debug!(id = %id, url = %source, "loading");
        self.player.load_url(id, &source);
        Ok(id)
    }

    /// The video component has data for `id`. Decoding waits for the
    /// next render tick. Returns `false` if the event was stale.
    pub fn on_video_ready(&mut self, id: RequestId) -> bool {
        match self.phase.mark_ready(id) {
            Ok(load_time) => {
                self.load_time = load_time;
                debug!(id = %id, load_ms = load_time.as_millis() as u64, "video ready");
                true
            }
            Err(e) => {
                self.stats.ignored_events += 1;
                trace!(id = %id, phase = %self.phase, "ignoring ready: {e}");
                false
            }
        }
    }

    /// The video component failed `id`. The request's callback gets the
    /// classification verbatim. Returns `false` if the event was stale.
    pub fn on_video_error(&mut self, id: RequestId, error: VideoError) -> bool {
        if self.phase.fail(id).is_err() {
            self.stats.ignored_events += 1;
            trace!(id = %id, %error, "ignoring error for stale request");
            return false;
        }
        self.stats.failed += 1;
        warn!(id = %id, %error, "load failed");
        if let Some(active) = self.slot.take(id) {
            active.request.complete(Err(DecodeFailure::Video(error)));
        }
        true
    }

    /// A render pass finished. If a `Ready` is pending, sample the
    /// surface, decode it and deliver the bytes.
    ///
    /// Returns the id of the request that was completed on this tick.
    pub fn on_post_render(&mut self) -> Option<RequestId> {
        let ready_at = match &self.phase {
            DecoderPhase::AwaitingRender { ready_at, .. } => *ready_at,
            _ => return None,
        };
        let id = self.phase.complete().ok()?;
        let active = self.slot.take(id)?;

        let start = Instant::now();
        let outcome = self
            .sampler
            .sample()
            .map(|grid| Bytes::from(bits::decode(&grid)))
            .map_err(|e| DecodeFailure::Sampling(e.to_string()));
        let timings = DecodeTimings {
            load: self.load_time,
            render_wait: start.duration_since(ready_at),
            decode: start.elapsed(),
        };

        match &outcome {
            Ok(bytes) => {
                self.stats.decoded += 1;
                self.stats.bytes += bytes.len() as u64;
                self.stats.last_timings = Some(timings);
                info!(
                    id = %id,
                    bytes = bytes.len(),
                    load_ms = timings.load.as_millis() as u64,
                    decode_us = timings.decode.as_micros() as u64,
                    "decoded frame"
                );
            }
            Err(e) => {
                self.stats.failed += 1;
                warn!(id = %id, "decode failed: {e}");
            }
        }

        active.request.complete(outcome);
        Some(id)
    }

    /// Route a video event to the matching handler.
    pub fn handle_event(&mut self, event: VideoEvent) -> bool {
        match event {
            VideoEvent::Ready { id } => self.on_video_ready(id),
            VideoEvent::Error { id, error } => self.on_video_error(id, error),
        }
    }

    /// Complete any in-flight request with `failure` and go idle.
    pub fn abort(&mut self, failure: DecodeFailure) -> Option<RequestId> {
        self.phase.reset();
        let active = self.slot.take_any()?;
        active.request.complete(Err(failure));
        Some(active.id)
    }

    pub fn phase(&self) -> &DecoderPhase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase.is_idle()
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    pub fn settings(&self) -> &DecoderSettings {
        &self.settings
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.sampler.surface_mut()
    }
}

// ── Tests ────────────────────────────────────────────────────────
