//! Mesh status snapshot

use crate::metric::RouteMetric;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Local station identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalNode {
    /// Station callsign
    pub callsign: String,
    /// Node identifier for this engine instance
    pub node_id: NodeId,
}

/// Routing table counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStats {
    /// Known nodes
    pub total_nodes: usize,
    /// Nodes heard within the node timeout
    pub active_nodes: usize,
    /// Direct neighbors
    pub neighbor_count: usize,
    /// Routing table size
    pub route_count: usize,
    /// Route count per quality class; empty classes are omitted
    pub route_metrics: BTreeMap<RouteMetric, usize>,
}

/// Mesh operational status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshStatus {
    /// Local identity
    pub local_node: LocalNode,
    /// Routing table counters
    pub network_stats: NetworkStats,
    /// Whether the maintenance scheduler is running
    pub running: bool,
    /// Snapshot time (seconds since the Unix epoch)
    pub timestamp: f64,
}
