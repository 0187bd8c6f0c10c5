//! Announcement processing
//!
//! Merges route advertisements received from a neighbor into the routing
//! table. Each announcement is decided on its own: one bad entry never
//! spoils the rest of the batch.

use crate::config::SignalPolicy;
use crate::metric::classify;
use crate::route::{is_better_route, RejectReason, RouteAnnouncement, RouteEntry, RouteUpdateResult};
use crate::routing::RoutingTable;
use crate::time::Timestamp;
use serde_json::Value;
use tracing::debug;

/// Applies inbound announcements to a routing table
#[derive(Debug, Clone, Copy)]
pub struct AnnouncementProcessor {
    signal_policy: SignalPolicy,
}

impl AnnouncementProcessor {
    /// Create a processor using the given signal policy
    pub fn new(signal_policy: SignalPolicy) -> Self {
        Self { signal_policy }
    }

    /// Process a batch from `from_node`, in list order
    pub fn process(
        &self,
        table: &mut RoutingTable,
        from_node: &str,
        announcements: &[RouteAnnouncement],
        now: Timestamp,
    ) -> Vec<RouteUpdateResult> {
        announcements
            .iter()
            .map(|announcement| self.apply(table, from_node, announcement, now))
            .collect()
    }

    /// Decide a single announcement
    pub fn apply(
        &self,
        table: &mut RoutingTable,
        from_node: &str,
        announcement: &RouteAnnouncement,
        now: Timestamp,
    ) -> RouteUpdateResult {
        let destination = &announcement.destination;
        let hop_count = announcement.hop_count.saturating_add(1);

        if hop_count > table.max_hop_count() {
            debug!(
                destination = %destination,
                from = %from_node,
                hop_count,
                "announcement exceeds hop limit"
            );
            return RouteUpdateResult::Rejected(RejectReason::HopLimitExceeded {
                hop_count,
                max_hop_count: table.max_hop_count(),
            });
        }

        if destination == table.local_node_id() {
            return RouteUpdateResult::Rejected(RejectReason::RouteToSelf);
        }

        let signal_strength = self.signal_policy.apply(announcement.signal_strength);
        let assessment = classify(signal_strength, hop_count);

        if let Some(existing) = table.get_route(destination) {
            if !is_better_route(assessment.metric, hop_count, existing) {
                return RouteUpdateResult::Ignored;
            }
        }

        let is_new = table.install_route(RouteEntry {
            destination: destination.clone(),
            next_hop: from_node.to_string(),
            hop_count,
            metric: assessment.metric,
            last_updated: now,
            bandwidth_estimate: assessment.bandwidth_estimate,
        });

        debug!(
            destination = %destination,
            via = %from_node,
            hop_count,
            metric = %assessment.metric,
            "updated route"
        );

        if is_new {
            RouteUpdateResult::NewRoute
        } else {
            RouteUpdateResult::UpdatedRoute
        }
    }
}

/// Decode untyped announcements, keeping malformed ones as rejections
///
/// `signal_strength` may be omitted; `destination` and `hop_count` may not.
pub fn decode_announcements(raw: &[Value]) -> Vec<Result<RouteAnnouncement, RejectReason>> {
    raw.iter()
        .map(|value| {
            serde_json::from_value::<RouteAnnouncement>(value.clone()).map_err(|e| {
                debug!(error = %e, "skipping malformed announcement");
                RejectReason::Malformed(e.to_string())
            })
        })
        .collect()
}
