//! Load/decode phase machine.
//!
//! ```text
//!  Idle ──load──► Loading ──ready──► AwaitingRender ──render tick──► Idle
//!                    │                     │
//!                    └──────error──────────┴──────────────────────► Idle
//! ```
//!
//! Issuing a new load from `Loading` or `AwaitingRender` restarts the
//! machine at `Loading` for the new request id.

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::VidlinkError;
use crate::video::RequestId;

/// Where the decoder is in the load → ready → render cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DecoderPhase {
    /// No request in flight.
    #[default]
    Idle,

    /// Waiting for the video component to report `Ready` or `Error`.
    Loading { id: RequestId, since: Instant },

    /// `Ready` arrived; waiting for the next render-completion tick.
    AwaitingRender { id: RequestId, ready_at: Instant },
}

impl fmt::Display for DecoderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading { .. } => write!(f, "Loading"),
            Self::AwaitingRender { .. } => write!(f, "AwaitingRender"),
        }
    }
}

impl DecoderPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_awaiting_render(&self) -> bool {
        matches!(self, Self::AwaitingRender { .. })
    }

    /// The request the machine is working on, if any.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::Idle => None,
            Self::Loading { id, .. } | Self::AwaitingRender { id, .. } => Some(*id),
        }
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Transition to `Loading` for `id`.
    ///
    /// Valid from any phase; a busy machine is restarted for `id`.
    pub fn begin_load(&mut self, id: RequestId) {
        *self = Self::Loading {
            id,
            since: Instant::now(),
        };
    }

    /// Transition to `AwaitingRender`, returning the load latency.
    ///
    /// Valid from: `Loading { id }`.
    pub fn mark_ready(&mut self, id: RequestId) -> Result<Duration, VidlinkError> {
        match self {
            Self::Loading { id: current, since } if *current == id => {
                let load_time = since.elapsed();
                *self = Self::AwaitingRender {
                    id,
                    ready_at: Instant::now(),
                };
                Ok(load_time)
            }
            Self::Loading { .. } => Err(VidlinkError::InvalidTransition(
                "cannot mark ready: request id does not match",
            )),
            _ => Err(VidlinkError::InvalidTransition(
                "cannot mark ready: not in Loading state",
            )),
        }
    }

    /// Transition to `Idle` after a successful decode.
    ///
    /// Valid from: `AwaitingRender`.
    pub fn complete(&mut self) -> Result<RequestId, VidlinkError> {
        match self {
            Self::AwaitingRender { id, .. } => {
                let id = *id;
                *self = Self::Idle;
                Ok(id)
            }
            _ => Err(VidlinkError::InvalidTransition(
                "cannot complete: not in AwaitingRender state",
            )),
        }
    }

    /// Transition to `Idle` after a failure for `id`.
    ///
    /// Valid from: `Loading { id }`, `AwaitingRender { id }`.
    pub fn fail(&mut self, id: RequestId) -> Result<(), VidlinkError> {
        match self.request_id() {
            Some(current) if current == id => {
                *self = Self::Idle;
                Ok(())
            }
            Some(_) => Err(VidlinkError::InvalidTransition(
                "cannot fail: request id does not match",
            )),
            None => Err(VidlinkError::InvalidTransition(
                "cannot fail: no request in flight",
            )),
        }
    }

    /// Force-reset to `Idle` regardless of current state.
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}

// ── Tests ────────────────────────────────────────────────────────
