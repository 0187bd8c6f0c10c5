//! Engine lifecycle against the real clock

use crate::test_utils::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use ultrarf_mesh::{
    Maintenance, MaintenanceReport, MaintenanceScheduler, MeshEngine, MeshResult, Timestamp,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scheduler_evicts_silent_neighbor() {
    init_tracing();
    let engine = MeshEngine::with_node_id("LOCAL", "local", fast_config()).unwrap();
    engine.start().unwrap();

    engine.add_or_refresh_neighbor("QUIET", "node-quiet", 0.9);
    assert!(engine.find_route("node-quiet").is_some());

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(engine.get_node("node-quiet").is_none());
    assert!(engine.find_route("node-quiet").is_none());
    assert!(engine.neighbors().is_empty());
    assert!(engine.stop().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_refreshed_neighbor_survives() {
    let engine = MeshEngine::with_node_id("LOCAL", "local", fast_config()).unwrap();
    engine.start().unwrap();

    for _ in 0..15 {
        engine.add_or_refresh_neighbor("CHATTY", "node-chatty", 0.9);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert!(engine.get_node("node-chatty").is_some());
    assert_eq!(engine.get_next_hop("node-chatty").as_deref(), Some("node-chatty"));
    assert!(engine.stop().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_clears_running_flag() {
    let engine = MeshEngine::with_node_id("LOCAL", "local", fast_config()).unwrap();
    engine.start().unwrap();
    assert!(engine.get_mesh_status().running);

    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(engine.stop().await);
    assert!(!engine.is_running());
    assert!(!engine.get_mesh_status().running);

    // State stays queryable after stop
    engine.add_or_refresh_neighbor("LATE", "node-late", 0.6);
    assert!(engine.find_route("node-late").is_some());
}

#[derive(Default)]
struct SlowPass {
    entered: AtomicBool,
    passes: AtomicUsize,
}

impl Maintenance for SlowPass {
    fn run_maintenance(&self, _now: Timestamp) -> MeshResult<MaintenanceReport> {
        self.entered.store(true, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(500));
        self.passes.fetch_add(1, Ordering::SeqCst);
        Ok(MaintenanceReport::default())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_times_out_on_stuck_pass() {
    let target = Arc::new(SlowPass::default());
    let scheduler = MaintenanceScheduler::new(Duration::from_millis(10), Duration::from_millis(10));
    let handle = scheduler.spawn(Arc::clone(&target)).unwrap();

    while !target.entered.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert!(!handle.stop(Duration::from_millis(50)).await);

    // The detached pass still finishes on its own
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(target.passes.load(Ordering::SeqCst), 1);
}
