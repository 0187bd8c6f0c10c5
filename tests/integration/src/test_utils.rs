//! Test utilities for mesh integration tests

use tracing_subscriber::EnvFilter;
use ultrarf_mesh::{MeshConfig, MeshEngine, RouteAnnouncement, RouteUpdateResult};

/// Install a test-writer subscriber once per process
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Millisecond-scale configuration for real-time scheduler tests
///
/// Maintenance runs every 10 ms, routes expire after 90 ms and nodes after
/// 120 ms.
pub fn fast_config() -> MeshConfig {
    MeshConfig {
        route_update_interval_ms: 30,
        node_timeout_ms: 120,
        stop_timeout_ms: 1_000,
        maintenance_backoff_ms: 10,
        ..MeshConfig::default()
    }
}

/// Engine with a fixed node ID and default configuration
pub fn station(callsign: &str, node_id: &str) -> MeshEngine {
    MeshEngine::with_node_id(callsign, node_id, MeshConfig::default())
        .expect("default config is valid")
}

/// Register a bidirectional radio link between two stations
pub fn link(a: &MeshEngine, b: &MeshEngine, signal_strength: f64) {
    a.add_or_refresh_neighbor(&b.local_node().callsign, b.node_id(), signal_strength);
    b.add_or_refresh_neighbor(&a.local_node().callsign, a.node_id(), signal_strength);
}

/// Deliver `from`'s outbound announcements to `to`
pub fn relay(from: &MeshEngine, to: &MeshEngine) -> Vec<RouteUpdateResult> {
    let announcements: Vec<RouteAnnouncement> = from
        .get_route_announcements()
        .into_iter()
        .map(RouteAnnouncement::from)
        .collect();
    to.process_route_announcement(from.node_id(), &announcements)
}

/// A line of stations `N0 - N1 - ... - N(n-1)`, each linked to the next
pub fn chain(len: usize, signal_strength: f64) -> Vec<MeshEngine> {
    let stations: Vec<MeshEngine> = (0..len)
        .map(|i| station(&format!("CALL-{}", i), &format!("N{}", i)))
        .collect();

    for pair in stations.windows(2) {
        link(&pair[0], &pair[1], signal_strength);
    }
    stations
}

/// One exchange of announcements along every link of a chain, both ways
pub fn gossip_round(stations: &[MeshEngine]) {
    for pair in stations.windows(2) {
        relay(&pair[0], &pair[1]);
        relay(&pair[1], &pair[0]);
    }
}
