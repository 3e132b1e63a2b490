//! Opt-in subscriber setup for drivers.
//!
//! The library only emits `tracing` events. A binary that wants them on
//! stderr calls [`init`] once at startup.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber filtered by `RUST_LOG`, with
/// `default_level` added as a global directive.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init(default_level: Level) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .try_init()
}
