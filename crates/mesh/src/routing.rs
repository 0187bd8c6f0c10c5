//! Routing table - nodes, best routes and the neighbor index
//!
//! This is the unsynchronized state behind [`crate::store::MeshStore`]. The
//! three maps only make sense together: a direct route implies a node record
//! and a neighbor index entry, so callers mutate them through one `&mut`.

use crate::metric::{classify, RouteMetric};
use crate::node::{MeshNode, NodeId};
use crate::route::{AnnouncementRecord, RouteEntry};
use crate::status::NetworkStats;
use crate::time::Timestamp;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Routing table with multi-hop capability
#[derive(Debug)]
pub struct RoutingTable {
    /// Local node ID
    local_node_id: NodeId,
    /// Routes longer than this are never installed
    max_hop_count: u32,
    /// Known nodes indexed by node ID
    nodes: HashMap<NodeId, MeshNode>,
    /// Routes: destination -> RouteEntry
    routes: HashMap<NodeId, RouteEntry>,
    /// Nodes reached in exactly one hop
    neighbors: HashSet<NodeId>,
}

impl RoutingTable {
    /// Create an empty routing table
    pub fn new(local_node_id: NodeId, max_hop_count: u32) -> Self {
        Self {
            local_node_id,
            max_hop_count,
            nodes: HashMap::new(),
            routes: HashMap::new(),
            neighbors: HashSet::new(),
        }
    }

    /// Local node ID
    pub fn local_node_id(&self) -> &str {
        &self.local_node_id
    }

    /// Configured hop limit
    pub fn max_hop_count(&self) -> u32 {
        self.max_hop_count
    }

    /// Add or refresh a direct neighbor and overwrite its direct route
    ///
    /// Returns the installed route, or `None` if `node_id` is the local node.
    pub fn upsert_neighbor(
        &mut self,
        callsign: String,
        node_id: NodeId,
        signal_strength: f64,
        now: Timestamp,
    ) -> Option<RouteEntry> {
        if node_id == self.local_node_id {
            debug!(node_id = %node_id, "ignoring neighbor report for local node");
            return None;
        }

        let assessment = classify(signal_strength, 1);
        let mut node = MeshNode::neighbor(callsign, node_id.clone(), signal_strength, now);
        if let Some(previous) = self.nodes.get(&node_id) {
            node.battery_level = previous.battery_level;
            node.is_gateway = previous.is_gateway;
        }

        let route = RouteEntry {
            destination: node_id.clone(),
            next_hop: node_id.clone(),
            hop_count: 1,
            metric: assessment.metric,
            last_updated: now,
            bandwidth_estimate: assessment.bandwidth_estimate,
        };

        self.nodes.insert(node_id.clone(), node);
        self.neighbors.insert(node_id.clone());
        self.routes.insert(node_id, route.clone());

        Some(route)
    }

    /// Record advisory battery and gateway data for a known node
    pub fn update_advisory(
        &mut self,
        node_id: &str,
        battery_level: Option<f64>,
        is_gateway: bool,
    ) -> bool {
        match self.nodes.get_mut(node_id) {
            Some(node) => {
                node.battery_level = battery_level;
                node.is_gateway = is_gateway;
                true
            }
            None => false,
        }
    }

    /// Remove a neighbor (link failed)
    ///
    /// Drops the node, its direct route and every route relayed through it.
    /// Returns the number of routes removed.
    pub fn remove_neighbor(&mut self, node_id: &str) -> usize {
        self.nodes.remove(node_id);
        self.neighbors.remove(node_id);

        let before = self.routes.len();
        self.routes
            .retain(|destination, route| destination != node_id && route.next_hop != node_id);
        before - self.routes.len()
    }

    /// Install a route unconditionally
    ///
    /// Callers are responsible for the hop limit, self-route and better-route
    /// checks. Returns true if the destination had no entry before.
    pub(crate) fn install_route(&mut self, route: RouteEntry) -> bool {
        self.routes.insert(route.destination.clone(), route).is_none()
    }

    /// Best known route to a destination
    pub fn get_route(&self, destination: &str) -> Option<&RouteEntry> {
        self.routes.get(destination)
    }

    /// All routes, in no particular order
    pub fn routes(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.values()
    }

    /// Known node by ID
    pub fn get_node(&self, node_id: &str) -> Option<&MeshNode> {
        self.nodes.get(node_id)
    }

    /// Check if a node is a direct neighbor
    pub fn is_neighbor(&self, node_id: &str) -> bool {
        self.neighbors.contains(node_id)
    }

    /// Direct neighbor IDs
    pub fn neighbors(&self) -> impl Iterator<Item = &NodeId> {
        self.neighbors.iter()
    }

    /// Number of known nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of routes
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Routes fresh enough to re-advertise
    pub fn announcements(&self, now: Timestamp, max_age_ms: u64) -> Vec<AnnouncementRecord> {
        self.routes
            .values()
            .filter(|route| route.age_ms(now) <= max_age_ms)
            .map(RouteEntry::to_announcement)
            .collect()
    }

    /// Prune routes older than `max_age_ms`
    pub fn evict_stale_routes(&mut self, now: Timestamp, max_age_ms: u64) -> usize {
        let initial_count = self.routes.len();

        self.routes.retain(|destination, route| {
            let keep = route.age_ms(now) <= max_age_ms;
            if !keep {
                debug!(destination = %destination, "removed stale route");
            }
            keep
        });

        initial_count - self.routes.len()
    }

    /// Prune nodes silent for longer than `timeout_ms`
    pub fn evict_stale_nodes(&mut self, now: Timestamp, timeout_ms: u64) -> usize {
        let stale: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.is_stale(now, timeout_ms))
            .map(|node| node.node_id.clone())
            .collect();

        for node_id in &stale {
            self.nodes.remove(node_id);
            self.neighbors.remove(node_id);
            info!(node_id = %node_id, "removed stale node");
        }

        stale.len()
    }

    /// Aggregate counts for status reporting
    pub fn network_stats(&self, now: Timestamp, node_timeout_ms: u64) -> NetworkStats {
        let active_nodes = self
            .nodes
            .values()
            .filter(|node| node.is_active(now, node_timeout_ms))
            .count();

        let mut route_metrics: BTreeMap<RouteMetric, usize> = BTreeMap::new();
        for route in self.routes.values() {
            *route_metrics.entry(route.metric).or_default() += 1;
        }

        NetworkStats {
            total_nodes: self.nodes.len(),
            active_nodes,
            neighbor_count: self.neighbors.len(),
            route_count: self.routes.len(),
            route_metrics,
        }
    }
}
