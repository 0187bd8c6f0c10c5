//! Mesh state store
//!
//! Owns the routing table behind a single mutex. Every public operation
//! holds the lock for its whole duration and hands back copies, so no caller
//! ever sees a node update without its matching route update.

use crate::announce::{decode_announcements, AnnouncementProcessor};
use crate::config::MeshConfig;
use crate::error::MeshResult;
use crate::maintenance::{Maintenance, MaintenanceReport};
use crate::node::{MeshNode, NodeId};
use crate::route::{AnnouncementRecord, RouteAnnouncement, RouteEntry, RouteUpdateResult};
use crate::routing::RoutingTable;
use crate::status::{LocalNode, MeshStatus};
use crate::time::{to_secs_f64, Timestamp};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Thread-safe owner of all mesh state
#[derive(Debug)]
pub struct MeshStore {
    identity: LocalNode,
    config: MeshConfig,
    processor: AnnouncementProcessor,
    table: Mutex<RoutingTable>,
}

impl MeshStore {
    /// Create an empty store for the given local identity
    pub fn new(identity: LocalNode, config: MeshConfig) -> Self {
        let table = RoutingTable::new(identity.node_id.clone(), config.max_hop_count);
        Self {
            processor: AnnouncementProcessor::new(config.signal_policy),
            identity,
            config,
            table: Mutex::new(table),
        }
    }

    /// Local identity
    pub fn identity(&self) -> &LocalNode {
        &self.identity
    }

    /// Active configuration
    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, RoutingTable> {
        self.table.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("routing table lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Add or refresh a direct neighbor
    pub fn add_or_refresh_neighbor(
        &self,
        callsign: &str,
        node_id: &str,
        signal_strength: f64,
        now: Timestamp,
    ) -> Option<RouteEntry> {
        let signal_strength = self.config.signal_policy.apply(signal_strength);
        let route = self.lock().upsert_neighbor(
            callsign.to_string(),
            node_id.to_string(),
            signal_strength,
            now,
        );

        if route.is_some() {
            info!(
                callsign = %callsign,
                node_id = %node_id,
                signal = signal_strength,
                "added neighbor"
            );
        }
        route
    }

    /// Record advisory battery and gateway data; false if the node is unknown
    pub fn update_node_advisory(
        &self,
        node_id: &str,
        battery_level: Option<f64>,
        is_gateway: bool,
    ) -> bool {
        self.lock().update_advisory(node_id, battery_level, is_gateway)
    }

    /// Drop a neighbor and every route relayed through it
    pub fn remove_neighbor(&self, node_id: &str) -> usize {
        let removed = self.lock().remove_neighbor(node_id);
        info!(node_id = %node_id, routes_removed = removed, "removed neighbor");
        removed
    }

    /// Merge typed announcements from `from_node`
    pub fn process_announcements(
        &self,
        from_node: &str,
        announcements: &[RouteAnnouncement],
        now: Timestamp,
    ) -> Vec<RouteUpdateResult> {
        let mut table = self.lock();
        self.processor.process(&mut table, from_node, announcements, now)
    }

    /// Merge untyped announcements, rejecting the ones that fail to decode
    pub fn process_raw_announcements(
        &self,
        from_node: &str,
        raw: &[Value],
        now: Timestamp,
    ) -> Vec<RouteUpdateResult> {
        let decoded = decode_announcements(raw);

        let mut table = self.lock();
        decoded
            .into_iter()
            .map(|item| match item {
                Ok(announcement) => self.processor.apply(&mut table, from_node, &announcement, now),
                Err(reason) => RouteUpdateResult::Rejected(reason),
            })
            .collect()
    }

    /// Point lookup of the best route
    pub fn lookup_route(&self, destination: &str) -> Option<RouteEntry> {
        self.lock().get_route(destination).cloned()
    }

    /// Known node by ID
    pub fn node(&self, node_id: &str) -> Option<MeshNode> {
        self.lock().get_node(node_id).cloned()
    }

    /// Current neighbor IDs, sorted
    pub fn neighbors(&self) -> Vec<NodeId> {
        let mut neighbors: Vec<NodeId> = self.lock().neighbors().cloned().collect();
        neighbors.sort();
        neighbors
    }

    /// Copy of every route, sorted by destination
    pub fn routes(&self) -> Vec<RouteEntry> {
        let mut routes: Vec<RouteEntry> = self.lock().routes().cloned().collect();
        routes.sort_by(|a, b| a.destination.cmp(&b.destination));
        routes
    }

    /// Routes fresh enough to advertise
    pub fn snapshot_announcements(&self, now: Timestamp) -> Vec<AnnouncementRecord> {
        self.lock().announcements(now, self.config.announce_max_age_ms())
    }

    /// Counts, identity and run state in one consistent read
    pub fn status_snapshot(&self, now: Timestamp, running: bool) -> MeshStatus {
        let network_stats = self.lock().network_stats(now, self.config.node_timeout_ms);

        MeshStatus {
            local_node: self.identity.clone(),
            network_stats,
            running,
            timestamp: to_secs_f64(now),
        }
    }

    /// One eviction pass over routes and nodes
    pub fn evict_stale(&self, now: Timestamp) -> MaintenanceReport {
        let mut table = self.lock();
        let routes_evicted = table.evict_stale_routes(now, self.config.route_max_age_ms());
        let nodes_evicted = table.evict_stale_nodes(now, self.config.node_timeout_ms);

        MaintenanceReport {
            routes_evicted,
            nodes_evicted,
        }
    }
}

impl Maintenance for MeshStore {
    fn run_maintenance(&self, now: Timestamp) -> MeshResult<MaintenanceReport> {
        let report = self.evict_stale(now);
        if report.routes_evicted > 0 || report.nodes_evicted > 0 {
            debug!(
                routes = report.routes_evicted,
                nodes = report.nodes_evicted,
                "maintenance pass evicted stale state"
            );
        }
        Ok(report)
    }
}
