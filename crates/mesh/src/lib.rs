//! UltraRF Mesh - Routing engine for emergency radio meshes
//!
//! Discovers neighboring stations, merges relayed route announcements and
//! keeps a single best next hop per destination, with stale state evicted
//! by a background maintenance task.
//!
//! # Core Components
//!
//! - **Metric Model**: decay-weighted signal classes and bandwidth estimates
//! - **State Store**: nodes, routes and the neighbor index behind one lock
//! - **Announcement Processor**: better-route merging of relayed routes
//! - **Maintenance Scheduler**: periodic eviction of stale routes and nodes
//! - **Engine**: lifecycle plus the query and export operations
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ultrarf_mesh::{MeshConfig, MeshEngine, RouteAnnouncement};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = MeshEngine::new("TEST-CALL", MeshConfig::default())?;
//! engine.start()?;
//!
//! engine.add_or_refresh_neighbor("STATION-1", "node-001", 0.85);
//! engine.process_route_announcement(
//!     "node-001",
//!     &[RouteAnnouncement::new("node-007", 1, 0.9)],
//! );
//!
//! assert_eq!(engine.get_next_hop("node-007").as_deref(), Some("node-001"));
//! println!("{}", serde_json::to_string_pretty(&engine.get_mesh_status())?);
//!
//! engine.stop().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod announce;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod maintenance;
pub mod metric;
pub mod node;
pub mod route;
pub mod routing;
pub mod status;
pub mod store;
pub mod time;

// Re-export main types
pub use announce::{decode_announcements, AnnouncementProcessor};
pub use config::{MeshConfig, SignalPolicy};
pub use engine::MeshEngine;
pub use error::{MeshError, MeshResult};
pub use maintenance::{Maintenance, MaintenanceReport, MaintenanceScheduler, SchedulerHandle};
pub use metric::{classify, LinkAssessment, LinkSample, RouteMetric};
pub use node::{MeshNode, NodeId};
pub use route::{
    is_better_route, AnnouncementRecord, RejectReason, RouteAnnouncement, RouteEntry,
    RouteUpdateResult,
};
pub use routing::RoutingTable;
pub use status::{LocalNode, MeshStatus, NetworkStats};
pub use store::MeshStore;
pub use time::{current_timestamp, Timestamp};
