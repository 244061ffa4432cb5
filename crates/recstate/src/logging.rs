//! JSON log output for hosts that do not install their own subscriber.

use tracing_subscriber::EnvFilter;

/// Install a global JSON subscriber filtered by `RUST_LOG`
/// (default `recstate=info`).
///
/// Returns `false` if a global subscriber was already set.
pub fn init() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("recstate=info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
