//! Mesh routing engine - high-level coordinator
//!
//! Ties the state store to its maintenance scheduler and exposes the
//! operations the surrounding protocol stack calls. Every query returns an
//! independent copy; nothing inside the store is reachable by reference.

use crate::config::MeshConfig;
use crate::error::MeshResult;
use crate::maintenance::{Maintenance, MaintenanceReport, MaintenanceScheduler, SchedulerHandle};
use crate::metric::LinkSample;
use crate::node::{MeshNode, NodeId};
use crate::route::{AnnouncementRecord, RouteAnnouncement, RouteEntry, RouteUpdateResult};
use crate::status::{LocalNode, MeshStatus};
use crate::store::MeshStore;
use crate::time::{current_timestamp, Timestamp};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Mesh routing engine for one local station
#[derive(Debug)]
pub struct MeshEngine {
    store: Arc<MeshStore>,
    scheduler: MaintenanceScheduler,
    maintenance: Mutex<Option<SchedulerHandle>>,
}

impl MeshEngine {
    /// Create an engine with a generated node ID
    ///
    /// The ID is `<callsign>-<unix seconds>-<random suffix>`.
    pub fn new(callsign: impl Into<String>, config: MeshConfig) -> MeshResult<Self> {
        let callsign = callsign.into();
        let node_id = generate_node_id(&callsign);
        Self::with_node_id(callsign, node_id, config)
    }

    /// Create an engine with an explicit node ID
    pub fn with_node_id(
        callsign: impl Into<String>,
        node_id: impl Into<NodeId>,
        config: MeshConfig,
    ) -> MeshResult<Self> {
        config.validate()?;

        let identity = LocalNode {
            callsign: callsign.into(),
            node_id: node_id.into(),
        };
        info!(
            callsign = %identity.callsign,
            node_id = %identity.node_id,
            "mesh network initialized"
        );

        Ok(Self {
            scheduler: MaintenanceScheduler::from_config(&config),
            store: Arc::new(MeshStore::new(identity, config)),
            maintenance: Mutex::new(None),
        })
    }

    /// Local identity
    pub fn local_node(&self) -> &LocalNode {
        self.store.identity()
    }

    /// Local node ID
    pub fn node_id(&self) -> &str {
        &self.store.identity().node_id
    }

    /// Active configuration
    pub fn config(&self) -> &MeshConfig {
        self.store.config()
    }

    fn maintenance_slot(&self) -> MutexGuard<'_, Option<SchedulerHandle>> {
        self.maintenance.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start background maintenance; a no-op if already running
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> MeshResult<()> {
        let mut slot = self.maintenance_slot();
        if slot.as_ref().is_some_and(SchedulerHandle::is_running) {
            return Ok(());
        }

        *slot = Some(self.scheduler.spawn(Arc::clone(&self.store))?);
        info!("mesh network started");
        Ok(())
    }

    /// Stop background maintenance
    ///
    /// Waits up to the configured stop timeout for the scheduler to exit.
    /// Returns false if it was still running at the deadline.
    pub async fn stop(&self) -> bool {
        let handle = self.maintenance_slot().take();

        let stopped = match handle {
            Some(handle) => handle.stop(self.config().stop_timeout()).await,
            None => true,
        };
        info!("mesh network stopped");
        stopped
    }

    /// Whether background maintenance is running
    pub fn is_running(&self) -> bool {
        self.maintenance_slot()
            .as_ref()
            .is_some_and(SchedulerHandle::is_running)
    }

    /// Add or update a neighbor node
    pub fn add_or_refresh_neighbor(&self, callsign: &str, node_id: &str, signal_strength: f64) {
        self.add_or_refresh_neighbor_at(callsign, node_id, signal_strength, current_timestamp());
    }

    /// Add or update a neighbor node as of `now`
    pub fn add_or_refresh_neighbor_at(
        &self,
        callsign: &str,
        node_id: &str,
        signal_strength: f64,
        now: Timestamp,
    ) {
        self.store
            .add_or_refresh_neighbor(callsign, node_id, signal_strength, now);
    }

    /// Refresh a neighbor from a raw link measurement
    pub fn observe_link(&self, callsign: &str, node_id: &str, sample: &LinkSample) {
        self.add_or_refresh_neighbor(callsign, node_id, sample.signal_strength());
    }

    /// Record advisory battery and gateway data for a known node
    pub fn update_node_advisory(
        &self,
        node_id: &str,
        battery_level: Option<f64>,
        is_gateway: bool,
    ) -> bool {
        self.store
            .update_node_advisory(node_id, battery_level, is_gateway)
    }

    /// Remove a neighbor (link failed); returns the number of routes dropped
    pub fn remove_neighbor(&self, node_id: &str) -> usize {
        self.store.remove_neighbor(node_id)
    }

    /// Process route announcements from another node
    pub fn process_route_announcement(
        &self,
        from_node: &str,
        announcements: &[RouteAnnouncement],
    ) -> Vec<RouteUpdateResult> {
        self.process_route_announcement_at(from_node, announcements, current_timestamp())
    }

    /// Process route announcements as of `now`
    pub fn process_route_announcement_at(
        &self,
        from_node: &str,
        announcements: &[RouteAnnouncement],
        now: Timestamp,
    ) -> Vec<RouteUpdateResult> {
        self.store.process_announcements(from_node, announcements, now)
    }

    /// Process undecoded announcements; malformed entries are rejected
    pub fn process_raw_announcements(&self, from_node: &str, raw: &[Value]) -> Vec<RouteUpdateResult> {
        self.store
            .process_raw_announcements(from_node, raw, current_timestamp())
    }

    /// Find the best route to a destination
    pub fn find_route(&self, destination: &str) -> Option<RouteEntry> {
        self.store.lookup_route(destination)
    }

    /// Get the next hop for a destination
    pub fn get_next_hop(&self, destination: &str) -> Option<NodeId> {
        self.find_route(destination).map(|route| route.next_hop)
    }

    /// Get routes to announce to neighbors
    pub fn get_route_announcements(&self) -> Vec<AnnouncementRecord> {
        self.get_route_announcements_at(current_timestamp())
    }

    /// Routes to announce as of `now`
    pub fn get_route_announcements_at(&self, now: Timestamp) -> Vec<AnnouncementRecord> {
        self.store.snapshot_announcements(now)
    }

    /// Get current mesh network status
    pub fn get_mesh_status(&self) -> MeshStatus {
        self.get_mesh_status_at(current_timestamp())
    }

    /// Mesh status as of `now`
    pub fn get_mesh_status_at(&self, now: Timestamp) -> MeshStatus {
        let running = self.is_running();
        self.store.status_snapshot(now, running)
    }

    /// Known node by ID
    pub fn get_node(&self, node_id: &str) -> Option<MeshNode> {
        self.store.node(node_id)
    }

    /// Direct neighbor IDs, sorted
    pub fn neighbors(&self) -> Vec<NodeId> {
        self.store.neighbors()
    }

    /// Every route, sorted by destination
    pub fn routes(&self) -> Vec<RouteEntry> {
        self.store.routes()
    }

    /// Run one maintenance pass now
    pub fn run_maintenance(&self) -> MeshResult<MaintenanceReport> {
        self.run_maintenance_at(current_timestamp())
    }

    /// Run one maintenance pass as of `now`
    pub fn run_maintenance_at(&self, now: Timestamp) -> MeshResult<MaintenanceReport> {
        self.store.run_maintenance(now)
    }
}

fn generate_node_id(callsign: &str) -> NodeId {
    let secs = current_timestamp() / 1000;
    format!("{}-{}-{:04x}", callsign, secs, rand::random::<u16>())
}
