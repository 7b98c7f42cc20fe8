//! Caller-side retry policy.
//!
//! The decoder never retries on its own. Callers that want the usual
//! behaviour (wait out a rate limit, give up on anything else) can use
//! [`load_with_retry`].

use std::time::Duration;

use bytes::Bytes;
use tracing::{info, warn};
use url::Url;

use crate::error::DecodeFailure;
use crate::service::DecoderHandle;

/// Per-URL request cadence enforced by the host platform.
pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(5);

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// Resubmit on rate limiting, give up on everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Minimum wait before reissuing a rate-limited load.
    pub rate_limit_delay: Duration,
    /// Total attempts including the first; `0` means unlimited.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
            max_attempts: 0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
            max_attempts: 1,
        }
    }

    /// Decide what follows failed attempt number `attempt` (1-based).
    pub fn decide(&self, failure: &DecodeFailure, attempt: u32) -> RetryDecision {
        if self.max_attempts != 0 && attempt >= self.max_attempts {
            return RetryDecision::GiveUp;
        }
        match failure.video_error() {
            Some(e) if e.is_rate_limited() => RetryDecision::RetryAfter(self.rate_limit_delay),
            _ => RetryDecision::GiveUp,
        }
    }
}

/// Load `source`, reissuing the identical request while the policy says
/// to retry.
pub async fn load_with_retry(
    handle: &DecoderHandle,
    source: Url,
    policy: &RetryPolicy,
) -> Result<Bytes, DecodeFailure> {
    let mut attempt = 1;
    loop {
        let failure = match handle.load(source.clone()).await {
            Ok(bytes) => return Ok(bytes),
            Err(failure) => failure,
        };

        match policy.decide(&failure, attempt) {
            RetryDecision::RetryAfter(delay) => {
                info!(attempt, delay_ms = delay.as_millis() as u64, "rate limited, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            RetryDecision::GiveUp => {
                warn!(attempt, "giving up: {failure}");
                return Err(failure);
            }
        }
    }
}
