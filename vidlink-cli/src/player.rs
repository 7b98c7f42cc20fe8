//! File-backed video player.
//!
//! Stands in for the host's video component: `file://` URLs name frame
//! images on disk. Loading happens on a blocking task; the frame is
//! published to the render surface and a `Ready` event follows. Loads
//! issued faster than the configured cadence fail with `RateLimited`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, warn};
use vidlink_core::{
    FramePublisher, GridGeometry, RequestId, Url, VideoError, VideoEvent, VideoEventSender,
    VideoPlayer,
};

use crate::frame;

pub struct FilePlayer {
    events: VideoEventSender,
    publisher: FramePublisher,
    geometry: GridGeometry,
    min_interval: Duration,
    last_request: Option<Instant>,
    /// Latest issued id; frames of older loads are never published.
    current: Arc<Mutex<RequestId>>,
    runtime: Handle,
}

impl FilePlayer {
    /// Must be called from within a tokio runtime.
    pub fn new(
        events: VideoEventSender,
        publisher: FramePublisher,
        geometry: GridGeometry,
        min_interval: Duration,
    ) -> Self {
        Self {
            events,
            publisher,
            geometry,
            min_interval,
            last_request: None,
            current: Arc::new(Mutex::new(RequestId::default())),
            runtime: Handle::current(),
        }
    }

    fn fail(&self, id: RequestId, error: VideoError) {
        let _ = self.events.send(VideoEvent::Error { id, error });
    }

    fn rate_limited(&self, now: Instant) -> bool {
        self.last_request
            .is_some_and(|last| now.duration_since(last) < self.min_interval)
    }
}

impl VideoPlayer for FilePlayer {
    fn load_url(&mut self, id: RequestId, source: &Url) {
        let now = Instant::now();
        if self.rate_limited(now) {
            debug!(id = %id, "request cadence exceeded");
            self.fail(id, VideoError::RateLimited);
            return;
        }
        self.last_request = Some(now);

        let path = match file_path(source) {
            Some(path) => path,
            None => {
                warn!(id = %id, url = %source, "unsupported source");
                self.fail(id, VideoError::InvalidUrl);
                return;
            }
        };

        if let Ok(mut current) = self.current.lock() {
            *current = id;
        }

        let events = self.events.clone();
        let publisher = self.publisher.clone();
        let current = Arc::clone(&self.current);
        let geometry = self.geometry;
        self.runtime.spawn_blocking(move || {
            let event = match frame::load_frame(&path, Some(geometry)) {
                Ok(grid) => {
                    // Hold the lock so a newer load cannot publish in between.
                    let Ok(current) = current.lock() else {
                        warn!(id = %id, "load state poisoned; frame not published");
                        let _ = events.send(VideoEvent::Error {
                            id,
                            error: VideoError::PlayerError,
                        });
                        return;
                    };
                    if *current != id {
                        debug!(id = %id, "dropping frame of superseded load");
                        return;
                    }
                    publisher.publish(grid);
                    VideoEvent::Ready { id }
                }
                Err(e) => {
                    warn!(id = %id, path = %path.display(), "frame load failed: {e}");
                    VideoEvent::Error {
                        id,
                        error: e.video_error(),
                    }
                }
            };
            let _ = events.send(event);
        });
    }
}

fn file_path(source: &Url) -> Option<PathBuf> {
    if source.scheme() != "file" {
        return None;
    }
    source.to_file_path().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidlink_core::{PixelGrid, WatchSurface, video_event_channel};

    fn geometry() -> GridGeometry {
        GridGeometry::new(16, 8).unwrap()
    }

    #[tokio::test]
    async fn missing_file_is_invalid_url() {
        let (tx, mut rx) = video_event_channel();
        let (publisher, _surface) = WatchSurface::new(geometry());
        let mut player = FilePlayer::new(tx, publisher, geometry(), Duration::ZERO);

        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("missing.png")).unwrap();
        player.load_url(RequestId(1), &url);

        assert_eq!(
            rx.recv().await,
            Some(VideoEvent::Error {
                id: RequestId(1),
                error: VideoError::InvalidUrl
            })
        );
    }

    #[tokio::test]
    async fn non_file_scheme_is_invalid_url() {
        let (tx, mut rx) = video_event_channel();
        let (publisher, _surface) = WatchSurface::new(geometry());
        let mut player = FilePlayer::new(tx, publisher, geometry(), Duration::ZERO);

        player.load_url(RequestId(1), &Url::parse("https://example.com/a.mp4").unwrap());
        assert!(matches!(
            rx.recv().await,
            Some(VideoEvent::Error {
                error: VideoError::InvalidUrl,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn existing_frame_is_published_then_ready() {
        let (tx, mut rx) = video_event_channel();
        let (publisher, mut surface) = WatchSurface::new(geometry());
        let mut player = FilePlayer::new(tx, publisher, geometry(), Duration::ZERO);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        frame::save_frame(&PixelGrid::filled(16, 8, 1.0), &path).unwrap();

        player.load_url(RequestId(4), &Url::from_file_path(&path).unwrap());
        assert_eq!(rx.recv().await, Some(VideoEvent::Ready { id: RequestId(4) }));

        use vidlink_core::RenderSurface;
        let grid = surface.read_pixels().unwrap();
        assert!(grid.cells().iter().all(|&v| v > 0.5));
    }

    #[tokio::test]
    async fn poisoned_load_state_reports_player_error() {
        let (tx, mut rx) = video_event_channel();
        let (publisher, _surface) = WatchSurface::new(geometry());
        let mut player = FilePlayer::new(tx, publisher, geometry(), Duration::ZERO);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        frame::save_frame(&PixelGrid::filled(16, 8, 1.0), &path).unwrap();

        let current = Arc::clone(&player.current);
        let _ = std::thread::spawn(move || {
            let _guard = current.lock().unwrap();
            panic!("poison");
        })
        .join();
        assert!(player.current.is_poisoned());

        player.load_url(RequestId(1), &Url::from_file_path(&path).unwrap());
        let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("no event for poisoned load");
        assert_eq!(
            event,
            Some(VideoEvent::Error {
                id: RequestId(1),
                error: VideoError::PlayerError
            })
        );
    }

    #[tokio::test]
    async fn rapid_second_load_is_rate_limited() {
        let (tx, mut rx) = video_event_channel();
        let (publisher, _surface) = WatchSurface::new(geometry());
        let mut player = FilePlayer::new(tx, publisher, geometry(), Duration::from_secs(5));

        let url = Url::parse("https://example.com/a.mp4").unwrap();
        player.load_url(RequestId(1), &url);
        player.load_url(RequestId(2), &url);

        let mut errors = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        errors.sort_by_key(|e| e.request_id());
        assert_eq!(
            errors[1],
            VideoEvent::Error {
                id: RequestId(2),
                error: VideoError::RateLimited
            }
        );
    }
}
