//! Tracing subscriber setup for binaries and demos
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the embedding program.

use tracing_subscriber::EnvFilter;

use crate::{Error, Result};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// # Errors
///
/// Returns error if a global subscriber is already installed
pub fn try_init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Other(format!("Failed to install tracing subscriber: {e}")))
}

/// Install a global `fmt` subscriber, ignoring an already installed one.
pub fn init_tracing() {
    if try_init_tracing().is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
