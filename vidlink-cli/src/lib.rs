//! # vidlink-cli: command-line front end
//!
//! Decodes byte payloads out of frame images, encodes payloads into
//! frame images, and drives the full load → ready → render → decode
//! cycle against a file-backed video player.
//!
//! ## Modules
//!
//! - **config**: TOML configuration with per-section defaults.
//! - **frame**: image file <-> pixel grid conversion.
//! - **player**: `FilePlayer`, a `VideoPlayer` over `file://` URLs.
//! - **output**: hex / text / JSON / raw payload printing.
//! - **session**: one `load` run against a fresh decoder service.

pub mod config;
pub mod error;
pub mod frame;
pub mod output;
pub mod player;
pub mod session;

pub use error::CliError;
