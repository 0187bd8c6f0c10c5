//! Mesh participants
//!
//! Nodes are created or refreshed whenever a neighbor is observed and are
//! evicted by the maintenance pass once they go silent.

use crate::time::{age_ms, Timestamp};
use serde::{Deserialize, Serialize};

/// Unique identifier for a node in the mesh
pub type NodeId = String;

/// Known mesh participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    /// Station callsign (not guaranteed unique)
    pub callsign: String,
    /// Unique node identifier
    pub node_id: NodeId,
    /// Last direct or indirect contact (Unix epoch milliseconds)
    pub last_seen: Timestamp,
    /// Distance in hops as last observed
    pub hop_count: u32,
    /// Link quality sample; meaningful for direct neighbors only
    pub signal_strength: f64,
    /// Advisory battery level
    pub battery_level: Option<f64>,
    /// Advisory gateway flag
    pub is_gateway: bool,
}

impl MeshNode {
    /// Node record for a directly observed neighbor
    pub fn neighbor(callsign: String, node_id: NodeId, signal_strength: f64, now: Timestamp) -> Self {
        Self {
            callsign,
            node_id,
            last_seen: now,
            hop_count: 1,
            signal_strength,
            battery_level: None,
            is_gateway: false,
        }
    }

    /// Whether the node has been heard within `timeout_ms`
    pub fn is_active(&self, now: Timestamp, timeout_ms: u64) -> bool {
        age_ms(now, self.last_seen) < timeout_ms
    }

    /// Whether the node has been silent longer than `timeout_ms`
    pub fn is_stale(&self, now: Timestamp, timeout_ms: u64) -> bool {
        age_ms(now, self.last_seen) > timeout_ms
    }
}
