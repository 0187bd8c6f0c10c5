//! Routing table rows and announcement records
//!
//! The table keeps exactly one entry per destination: the best route seen
//! so far under [`is_better_route`].

use crate::metric::RouteMetric;
use crate::node::NodeId;
use crate::time::{age_ms, to_secs_f64, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Route entry in the routing table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Destination node ID
    pub destination: NodeId,
    /// Next hop node ID (the destination itself for neighbors)
    pub next_hop: NodeId,
    /// Number of hops to destination
    pub hop_count: u32,
    /// Quality class (lower is better)
    pub metric: RouteMetric,
    /// Last confirmed or replaced (Unix epoch milliseconds)
    pub last_updated: Timestamp,
    /// Advisory capacity estimate (Mbps)
    pub bandwidth_estimate: f64,
}

impl RouteEntry {
    /// Milliseconds since this entry was last confirmed
    pub fn age_ms(&self, now: Timestamp) -> u64 {
        age_ms(now, self.last_updated)
    }

    /// Whether the entry is a direct (one hop) route
    pub fn is_direct(&self) -> bool {
        self.hop_count == 1 && self.next_hop == self.destination
    }

    /// Outbound form of this entry
    pub fn to_announcement(&self) -> AnnouncementRecord {
        AnnouncementRecord {
            destination: self.destination.clone(),
            hop_count: self.hop_count,
            metric: self.metric.value(),
            signal_strength: self.bandwidth_estimate,
            timestamp: to_secs_f64(self.last_updated),
        }
    }
}

/// Inbound route advertisement from a neighbor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAnnouncement {
    /// Target of the route
    pub destination: NodeId,
    /// Hops already traversed when sent
    pub hop_count: u32,
    /// Signal quality reported by the sender
    #[serde(default)]
    pub signal_strength: f64,
}

impl RouteAnnouncement {
    /// Build an announcement
    pub fn new(destination: impl Into<NodeId>, hop_count: u32, signal_strength: f64) -> Self {
        Self {
            destination: destination.into(),
            hop_count,
            signal_strength,
        }
    }
}

/// Outbound route advertisement
///
/// `signal_strength` carries the stored bandwidth estimate, and `timestamp`
/// is the entry's last update in float seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementRecord {
    /// Target of the route
    pub destination: NodeId,
    /// Stored hop count
    pub hop_count: u32,
    /// Quality class value, 1 to 5
    pub metric: u8,
    /// Bandwidth estimate in the signal slot
    pub signal_strength: f64,
    /// Last update (seconds since the Unix epoch)
    pub timestamp: f64,
}

impl From<AnnouncementRecord> for RouteAnnouncement {
    /// Receive a relayed record; its signal slot is taken as the signal strength
    fn from(record: AnnouncementRecord) -> Self {
        Self {
            destination: record.destination,
            hop_count: record.hop_count,
            signal_strength: record.signal_strength,
        }
    }
}

/// Better-route rule
///
/// A strictly better class wins; at an equal class strictly fewer hops wins.
/// Anything else keeps the existing entry.
pub fn is_better_route(metric: RouteMetric, hop_count: u32, existing: &RouteEntry) -> bool {
    if metric.is_better_than(existing.metric) {
        return true;
    }
    metric == existing.metric && hop_count < existing.hop_count
}

/// Outcome of considering one announcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteUpdateResult {
    /// New route added
    NewRoute,
    /// Existing route replaced by a better one
    UpdatedRoute,
    /// Route ignored (not better than existing)
    Ignored,
    /// Route rejected (invalid)
    Rejected(RejectReason),
}

impl RouteUpdateResult {
    /// Whether the announcement changed the table
    pub fn is_installed(&self) -> bool {
        matches!(self, RouteUpdateResult::NewRoute | RouteUpdateResult::UpdatedRoute)
    }
}

/// Why an announcement was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Relayed hop count would exceed the configured limit
    HopLimitExceeded {
        /// Hop count after adding the relay
        hop_count: u32,
        /// Configured limit
        max_hop_count: u32,
    },
    /// Destination is the local node
    RouteToSelf,
    /// Announcement could not be decoded
    Malformed(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::HopLimitExceeded {
                hop_count,
                max_hop_count,
            } => write!(f, "{} hops exceeds limit of {}", hop_count, max_hop_count),
            RejectReason::RouteToSelf => f.write_str("route to self"),
            RejectReason::Malformed(reason) => write!(f, "malformed announcement: {}", reason),
        }
    }
}
