//! Concurrent access with maintenance running

use crate::test_utils::*;
use std::sync::Arc;
use std::thread;
use ultrarf_mesh::{MeshEngine, RouteAnnouncement};

const WRITERS: usize = 4;
const ROUNDS: usize = 200;

fn check_invariants(engine: &MeshEngine) {
    let status = engine.get_mesh_status();
    let stats = &status.network_stats;

    assert_eq!(stats.route_count, stats.route_metrics.values().sum::<usize>());
    assert!(stats.neighbor_count <= stats.total_nodes);
    assert!(stats.active_nodes <= stats.total_nodes);

    for route in engine.routes() {
        assert_ne!(route.destination, engine.node_id());
        assert!(route.hop_count >= 1);
        assert!(route.hop_count <= engine.config().max_hop_count);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_writers_and_readers_with_scheduler() {
    init_tracing();
    let engine = Arc::new(
        MeshEngine::with_node_id("LOCAL", "local", fast_config()).unwrap(),
    );
    engine.start().unwrap();

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for round in 0..ROUNDS {
                    let neighbor = format!("W{}-{}", writer, round % 8);
                    engine.add_or_refresh_neighbor("RELAY", &neighbor, 0.5 + (round % 5) as f64 / 10.0);
                    engine.process_route_announcement(
                        &neighbor,
                        &[
                            RouteAnnouncement::new(format!("far-{}", round % 16), (round % 7) as u32, 0.9),
                            RouteAnnouncement::new("local", 0, 1.0),
                        ],
                    );
                    if round % 50 == 49 {
                        engine.remove_neighbor(&neighbor);
                    }
                }
            });
        }

        for _ in 0..2 {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for _ in 0..ROUNDS {
                    check_invariants(&engine);
                    let _ = engine.get_route_announcements();
                    let _ = engine.get_next_hop("far-3");
                }
            });
        }
    });

    check_invariants(&engine);
    assert!(engine.is_running());
    assert!(engine.stop().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_maintenance_drains_abandoned_state() {
    let engine = Arc::new(
        MeshEngine::with_node_id("LOCAL", "local", fast_config()).unwrap(),
    );
    engine.start().unwrap();

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let engine = Arc::clone(&engine);
            scope.spawn(move || {
                for i in 0..20 {
                    engine.add_or_refresh_neighbor("RELAY", &format!("D{}-{}", writer, i), 0.9);
                }
            });
        }
    });
    assert_eq!(engine.neighbors().len(), WRITERS * 20);

    // Nodes expire after 120 ms; maintenance runs every 10 ms
    tokio::time::sleep(std::time::Duration::from_millis(400)).await;

    let status = engine.get_mesh_status();
    assert_eq!(status.network_stats.total_nodes, 0);
    assert_eq!(status.network_stats.route_count, 0);
    assert!(engine.stop().await);
}
