//! One `load` run: service, file player and retry policy wired together.

use tokio::task::JoinHandle;
use tracing::{info, warn};
use vidlink_core::{
    DecodeStats, DecoderService, RetryPolicy, Url, WatchSurface, load_with_retry,
    video_event_channel,
};

use crate::config::CliConfig;
use crate::error::CliError;
use crate::player::FilePlayer;

/// Load `url` through a fresh decoder service and stop it afterwards.
pub async fn run_load(config: &CliConfig, url: Url, no_retry: bool) -> Result<Vec<u8>, CliError> {
    let settings = config.to_settings()?;
    let policy = if no_retry {
        RetryPolicy::none()
    } else {
        config.to_retry_policy()
    };

    let (events_tx, events_rx) = video_event_channel();
    let (publisher, surface) = WatchSurface::new(settings.geometry);
    let player = FilePlayer::new(
        events_tx,
        publisher,
        settings.geometry,
        config.min_request_interval(),
    );

    let (service, handle) = DecoderService::new(player, surface, settings, events_rx)?;
    let task = service.spawn();

    let result = load_with_retry(&handle, url, &policy).await;
    handle.shutdown();
    join_service(task).await;

    Ok(result?.to_vec())
}

/// Wait for the service task. A panicked or cancelled task is logged
/// and yields `None`.
pub async fn join_service(task: JoinHandle<DecodeStats>) -> Option<DecodeStats> {
    match task.await {
        Ok(stats) => {
            info!(decoded = stats.decoded, failed = stats.failed, "service finished");
            Some(stats)
        }
        Err(e) => {
            warn!("decoder service task failed: {e}");
            None
        }
    }
}
