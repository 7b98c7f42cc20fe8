//! Configuration for the vidlink CLI.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vidlink_core::{DecoderSettings, RetryPolicy, SlotPolicy, VidlinkError};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Render target size.
    pub surface: SurfaceConfig,
    /// Decoder behaviour.
    pub decoder: DecoderConfig,
    /// Caller retry policy for `load`.
    pub retry: RetryConfig,
    /// File-backed video player.
    pub player: PlayerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Render target size; both sides must be multiples of 8.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
}

/// Decoder behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// `"replace"` cancels an in-flight load, `"reject"` refuses the new one.
    pub slot_policy: SlotPolicy,
    /// Render ticks per second.
    pub frame_rate: u32,
}

/// Retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retry rate-limited loads at all.
    pub enabled: bool,
    /// Wait before reissuing a rate-limited load, in milliseconds.
    pub rate_limit_delay_ms: u64,
    /// Total attempts including the first; 0 = unlimited.
    pub max_attempts: u32,
}

/// File-backed player settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Loads issued closer together than this are rate limited.
    pub min_request_interval_ms: u64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            slot_policy: SlotPolicy::Replace,
            frame_rate: 60,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate_limit_delay_ms: 5_000,
            max_attempts: 0,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            min_request_interval_ms: 5_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl CliConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::debug!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the default configuration to a file (for bootstrapping).
    pub fn write_default(path: &Path) -> std::io::Result<()> {
        let text = toml::to_string_pretty(&Self::default()).map_err(std::io::Error::other)?;
        std::fs::write(path, text)
    }

    /// Decoder settings; fails if the surface is not byte aligned.
    pub fn to_settings(&self) -> Result<DecoderSettings, VidlinkError> {
        let mut settings = DecoderSettings::new(self.surface.width, self.surface.height)?;
        settings.slot_policy = self.decoder.slot_policy;
        settings.frame_rate = self.decoder.frame_rate.clamp(1, 240);
        Ok(settings)
    }

    pub fn to_retry_policy(&self) -> RetryPolicy {
        if !self.retry.enabled {
            return RetryPolicy::none();
        }
        RetryPolicy {
            rate_limit_delay: Duration::from_millis(self.retry.rate_limit_delay_ms),
            max_attempts: self.retry.max_attempts,
        }
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.player.min_request_interval_ms)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let text = toml::to_string_pretty(&CliConfig::default()).unwrap();
        assert!(text.contains("slot_policy = \"replace\""));
        assert!(text.contains("rate_limit_delay_ms"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: CliConfig = toml::from_str("[surface]\nwidth = 64\n").unwrap();
        assert_eq!(cfg.surface.width, 64);
        assert_eq!(cfg.surface.height, 128);
        assert_eq!(cfg.decoder.frame_rate, 60);
    }

    #[test]
    fn unaligned_surface_is_rejected() {
        let mut cfg = CliConfig::default();
        cfg.surface.width = 100;
        assert!(matches!(
            cfg.to_settings(),
            Err(VidlinkError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn to_settings_clamps_frame_rate() {
        let mut cfg = CliConfig::default();
        cfg.decoder.frame_rate = 0;
        cfg.decoder.slot_policy = SlotPolicy::Reject;
        let settings = cfg.to_settings().unwrap();
        assert_eq!(settings.frame_rate, 1);
        assert_eq!(settings.slot_policy, SlotPolicy::Reject);
    }

    #[test]
    fn disabled_retry_never_retries() {
        let mut cfg = CliConfig::default();
        cfg.retry.enabled = false;
        assert_eq!(cfg.to_retry_policy().max_attempts, 1);
        cfg.retry.enabled = true;
        assert_eq!(
            cfg.to_retry_policy().rate_limit_delay,
            Duration::from_secs(5)
        );
    }
}
