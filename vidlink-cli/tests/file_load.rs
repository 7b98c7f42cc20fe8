//! End-to-end loads through `DecoderService` and `FilePlayer` using
//! frame images written to a temporary directory.

use std::path::Path;
use std::time::{Duration, Instant};

use vidlink_cli::config::CliConfig;
use vidlink_cli::frame;
use vidlink_cli::player::FilePlayer;
use vidlink_core::{
    DecodeFailure, DecoderHandle, DecoderService, GridGeometry, RetryPolicy, Url, VideoError,
    WatchSurface, bits, load_with_retry, video_event_channel,
};

// ── Helpers ──────────────────────────────────────────────────────

fn config(min_interval_ms: u64) -> CliConfig {
    let mut cfg = CliConfig::default();
    cfg.surface.width = 64;
    cfg.surface.height = 16;
    cfg.player.min_request_interval_ms = min_interval_ms;
    cfg
}

fn start(cfg: &CliConfig) -> DecoderHandle {
    let settings = cfg.to_settings().unwrap();
    let (events_tx, events_rx) = video_event_channel();
    let (publisher, surface) = WatchSurface::new(settings.geometry);
    let player = FilePlayer::new(
        events_tx,
        publisher,
        settings.geometry,
        cfg.min_request_interval(),
    );
    let (service, handle) = DecoderService::new(player, surface, settings, events_rx).unwrap();
    service.spawn();
    handle
}

fn write_frame(dir: &Path, name: &str, payload: &[u8]) -> Url {
    let path = dir.join(name);
    let grid = bits::encode(payload, GridGeometry::new(64, 16).unwrap()).unwrap();
    frame::save_frame(&grid, &path).unwrap();
    Url::from_file_path(&path).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_load_frame_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let url = write_frame(dir.path(), "frame.png", b"<data><hex_value>#aabbcc</hex_value></data>");
    let handle = start(&config(0));

    let bytes = tokio::time::timeout(Duration::from_secs(10), handle.load(url))
        .await
        .expect("timeout")
        .expect("load failed");

    assert_eq!(bytes.len(), 128);
    assert!(bytes.starts_with(b"<data><hex_value>#aabbcc</hex_value></data>"));
}

#[tokio::test]
async fn test_wrong_size_frame_is_player_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.png");
    let grid = bits::encode(b"x", GridGeometry::new(8, 8).unwrap()).unwrap();
    frame::save_frame(&grid, &path).unwrap();

    let handle = start(&config(0));
    let result = handle.load(Url::from_file_path(&path).unwrap()).await;
    assert_eq!(result, Err(DecodeFailure::Video(VideoError::PlayerError)));
}

#[tokio::test]
async fn test_rate_limited_load_is_retried() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_frame(dir.path(), "a.png", b"first");
    let second = write_frame(dir.path(), "b.png", b"second");

    let handle = start(&config(1_000));
    let policy = RetryPolicy {
        rate_limit_delay: Duration::from_millis(1_100),
        max_attempts: 5,
    };

    let bytes = load_with_retry(&handle, first, &policy).await.unwrap();
    assert!(bytes.starts_with(b"first"));

    let started = Instant::now();
    let bytes = load_with_retry(&handle, second.clone(), &policy).await.unwrap();
    assert!(bytes.starts_with(b"second"));
    assert!(started.elapsed() >= Duration::from_millis(1_000));

    // Without retries the cadence limit surfaces to the caller.
    let result = handle.load(second).await;
    assert_eq!(result, Err(DecodeFailure::Video(VideoError::RateLimited)));
}
