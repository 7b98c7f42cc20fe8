//! Async host for the decoder.
//!
//! [`DecoderService`] owns a [`VideoDecoder`] inside one tokio task.
//! Load commands, video events and render ticks are all handled on that
//! task, so the request slot, the pending-decode phase and the surface
//! are never touched concurrently.
//!
//! ```text
//! DecoderHandle ──Submit──►┐
//! VideoPlayer  ──VideoEvent─┼──► DecoderService task ──► VideoDecoder
//! interval     ──tick──────►┘
//! ```

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::decoder::{DecodeStats, DecoderSettings, VideoDecoder};
use crate::error::{DecodeFailure, VidlinkError};
use crate::request::DecodeRequest;
use crate::sampler::RenderSurface;
use crate::video::{RequestId, VideoEventReceiver, VideoPlayer};

const COMMAND_QUEUE: usize = 16;

enum ServiceCommand {
    Submit {
        request: DecodeRequest,
        reply: oneshot::Sender<Result<RequestId, VidlinkError>>,
    },
}

// ── DecoderHandle ────────────────────────────────────────────────

/// Cloneable front end for a running [`DecoderService`].
#[derive(Debug, Clone)]
pub struct DecoderHandle {
    tx: mpsc::Sender<ServiceCommand>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ServiceCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submit { request, .. } => f.debug_tuple("Submit").field(request).finish(),
        }
    }
}

impl DecoderHandle {
    /// Hand a request to the service. Resolves once the load has been
    /// issued; the outcome goes to the request's own callback.
    pub async fn submit(&self, request: DecodeRequest) -> Result<RequestId, VidlinkError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(ServiceCommand::Submit { request, reply }).await?;
        rx.await?
    }

    /// Load `source` and wait for its bytes.
    pub async fn load(&self, source: Url) -> Result<Bytes, DecodeFailure> {
        let (request, outcome) = DecodeRequest::with_channel(source);
        self.submit(request).await?;
        outcome.await.unwrap_or(Err(DecodeFailure::Shutdown))
    }

    /// Stop the service. In-flight requests complete with
    /// [`DecodeFailure::Shutdown`].
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }
}

// ── DecoderService ───────────────────────────────────────────────

/// Single-owner task around a [`VideoDecoder`].
pub struct DecoderService<P, S> {
    decoder: VideoDecoder<P, S>,
    commands: mpsc::Receiver<ServiceCommand>,
    events: VideoEventReceiver,
    cancel: CancellationToken,
}

impl<P, S> DecoderService<P, S>
where
    P: VideoPlayer + Send + 'static,
    S: RenderSurface + Send + 'static,
{
    /// Build the service and its handle.
    ///
    /// `events` must be the receiving half of the channel `player`
    /// reports through (see [`video_event_channel`](crate::video::video_event_channel)).
    pub fn new(
        player: P,
        surface: S,
        settings: DecoderSettings,
        events: VideoEventReceiver,
    ) -> Result<(Self, DecoderHandle), VidlinkError> {
        let decoder = VideoDecoder::new(player, surface, settings)?;
        let (tx, commands) = mpsc::channel(COMMAND_QUEUE);
        let cancel = CancellationToken::new();
        let handle = DecoderHandle {
            tx,
            cancel: cancel.clone(),
        };
        Ok((
            Self {
                decoder,
                commands,
                events,
                cancel,
            },
            handle,
        ))
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(self) -> JoinHandle<DecodeStats> {
        tokio::spawn(self.run())
    }

    /// Run until [`DecoderHandle::shutdown`] is called or every handle
    /// is dropped. Returns the final counters.
    pub async fn run(mut self) -> DecodeStats {
        let mut ticker = render_ticker(self.decoder.settings());
        info!(
            width = self.decoder.settings().geometry.width,
            height = self.decoder.settings().geometry.height,
            fps = self.decoder.settings().frame_rate,
            "decoder service started"
        );

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                cmd = self.commands.recv() => match cmd {
                    Some(ServiceCommand::Submit { request, reply }) => {
                        let _ = reply.send(self.decoder.load_url(request));
                    }
                    None => break,
                },

                Some(event) = self.events.recv() => {
                    if self.decoder.handle_event(event) && self.decoder.phase().is_awaiting_render() {
                        // Sample on the next full frame, not a tick that
                        // was already due before the video was ready.
                        ticker.reset();
                    }
                }

                _ = ticker.tick(), if self.decoder.phase().is_awaiting_render() => {
                    self.decoder.on_post_render();
                }
            }
        }

        if let Some(id) = self.decoder.abort(DecodeFailure::Shutdown) {
            debug!(id = %id, "aborted in-flight request");
        }
        let stats = self.decoder.stats().clone();
        info!(
            decoded = stats.decoded,
            failed = stats.failed,
            superseded = stats.superseded,
            "decoder service stopped"
        );
        stats
    }
}

fn render_ticker(settings: &DecoderSettings) -> Interval {
    let mut ticker = tokio::time::interval(settings.frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
