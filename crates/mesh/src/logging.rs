//! Logging setup for processes embedding the mesh engine.
//!
//! The engine only emits `tracing` events; nothing is printed until the host
//! installs a subscriber, either its own or one of these.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a human-readable subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns false if a global subscriber was already installed.
///
/// # Example
/// ```no_run
/// use ultrarf_mesh::logging;
///
/// logging::init();
/// tracing::info!("station up");
/// ```
pub fn init() -> bool {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .try_init()
        .is_ok()
}

/// Install a JSON subscriber for log aggregation.
///
/// Returns false if a global subscriber was already installed.
pub fn init_json() -> bool {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().json().with_target(true).with_thread_ids(true))
        .try_init()
        .is_ok()
}
