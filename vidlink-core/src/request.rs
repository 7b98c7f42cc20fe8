//! Decode requests and the single-slot request holder.
//!
//! Results are delivered through a typed callback that receives a
//! [`DecodeOutcome`] exactly once, whether the load succeeded, failed,
//! or was displaced by a newer load.

use std::fmt;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use url::Url;

use crate::error::{DecodeFailure, VidlinkError};
use crate::video::RequestId;

/// What a request's callback receives.
pub type DecodeOutcome = Result<Bytes, DecodeFailure>;

type DecodeCallback = Box<dyn FnOnce(DecodeOutcome) + Send + 'static>;

// ── DecodeRequest ────────────────────────────────────────────────

/// A source to load plus where its outcome goes.
pub struct DecodeRequest {
    source: Url,
    callback: DecodeCallback,
}

impl DecodeRequest {
    /// Create a request delivering its outcome to `callback`.
    pub fn new<F>(source: Url, callback: F) -> Self
    where
        F: FnOnce(DecodeOutcome) + Send + 'static,
    {
        Self {
            source,
            callback: Box::new(callback),
        }
    }

    /// Create a request whose outcome arrives on a oneshot channel.
    pub fn with_channel(source: Url) -> (Self, oneshot::Receiver<DecodeOutcome>) {
        let (tx, rx) = oneshot::channel();
        let request = Self::new(source, move |outcome| {
            let _ = tx.send(outcome);
        });
        (request, rx)
    }

    pub fn source(&self) -> &Url {
        &self.source
    }

    /// Consume the request, handing `outcome` to its callback.
    pub fn complete(self, outcome: DecodeOutcome) {
        (self.callback)(outcome)
    }
}

impl fmt::Debug for DecodeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeRequest")
            .field("source", &self.source.as_str())
            .finish_non_exhaustive()
    }
}

// ── SlotPolicy ───────────────────────────────────────────────────

/// What happens when a load is issued while another is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
    /// Cancel and replace: the in-flight request completes with
    /// [`DecodeFailure::Superseded`] and late events for it are ignored.
    #[default]
    Replace,
    /// Refuse the new load with [`VidlinkError::SlotBusy`].
    Reject,
}

// ── ActiveRequest ────────────────────────────────────────────────

/// The request currently held by the slot.
#[derive(Debug)]
pub struct ActiveRequest {
    pub id: RequestId,
    pub request: DecodeRequest,
    pub issued_at: Instant,
}

impl ActiveRequest {
    pub fn elapsed(&self) -> Duration {
        self.issued_at.elapsed()
    }
}

// ── RequestSlot ──────────────────────────────────────────────────

/// Holds at most one in-flight request and hands out request ids.
#[derive(Debug, Default)]
pub struct RequestSlot {
    active: Option<ActiveRequest>,
    last_id: RequestId,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `request` under a fresh id.
    ///
    /// Under [`SlotPolicy::Replace`] the previous occupant, if any, is
    /// returned so the caller can notify it. Under
    /// [`SlotPolicy::Reject`] an occupied slot is an error and the new
    /// request is dropped uncompleted.
    pub fn occupy(
        &mut self,
        request: DecodeRequest,
        policy: SlotPolicy,
    ) -> Result<(RequestId, Option<ActiveRequest>), VidlinkError> {
        if let (SlotPolicy::Reject, Some(active)) = (policy, &self.active) {
            return Err(VidlinkError::SlotBusy(active.id.0));
        }

        self.last_id = self.last_id.next();
        let id = self.last_id;
        let displaced = self.active.replace(ActiveRequest {
            id,
            request,
            issued_at: Instant::now(),
        });
        Ok((id, displaced))
    }

    /// Id of the in-flight request, if any.
    pub fn current_id(&self) -> Option<RequestId> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn current(&self) -> Option<&ActiveRequest> {
        self.active.as_ref()
    }

    /// Remove the in-flight request if it carries `id`.
    pub fn take(&mut self, id: RequestId) -> Option<ActiveRequest> {
        if self.current_id() == Some(id) {
            self.active.take()
        } else {
            None
        }
    }

    /// Remove whatever is in flight.
    pub fn take_any(&mut self) -> Option<ActiveRequest> {
        self.active.take()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }
}

// ── Tests ────────────────────────────────────────────────────────
