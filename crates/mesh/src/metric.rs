//! Route quality model
//!
//! Turns a signal sample and a hop distance into an ordered quality class
//! and a bandwidth estimate. Every hop past the first discounts the signal
//! by 20%. Pure functions only; no input is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-hop signal retention factor
pub const HOP_DECAY: f64 = 0.8;

/// Mbps per unit of signal strength
const BANDWIDTH_SCALE_MBPS: f64 = 50.0;

/// Lower bound on any bandwidth estimate
pub const MIN_BANDWIDTH_MBPS: f64 = 0.1;

/// Route quality class, ordered best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteMetric {
    /// Adjusted signal above 0.8
    Excellent = 1,
    /// Adjusted signal above 0.6
    Good = 2,
    /// Adjusted signal above 0.4
    Fair = 3,
    /// Adjusted signal above 0.2
    Poor = 4,
    /// Anything else
    Unreachable = 5,
}

impl RouteMetric {
    /// All classes, best first
    pub const ALL: [RouteMetric; 5] = [
        RouteMetric::Excellent,
        RouteMetric::Good,
        RouteMetric::Fair,
        RouteMetric::Poor,
        RouteMetric::Unreachable,
    ];

    /// Wire value (1 = best, 5 = worst)
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Inverse of [`RouteMetric::value`]
    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.value() == value)
    }

    /// Upper-case class name used in status reports
    pub fn name(self) -> &'static str {
        match self {
            RouteMetric::Excellent => "EXCELLENT",
            RouteMetric::Good => "GOOD",
            RouteMetric::Fair => "FAIR",
            RouteMetric::Poor => "POOR",
            RouteMetric::Unreachable => "UNREACHABLE",
        }
    }

    /// True if `self` is strictly better than `other`
    pub fn is_better_than(self, other: RouteMetric) -> bool {
        self < other
    }
}

impl fmt::Display for RouteMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification result for one candidate route
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkAssessment {
    /// Quality class
    pub metric: RouteMetric,
    /// Advisory capacity estimate (Mbps)
    pub bandwidth_estimate: f64,
}

/// Signal strength after the per-hop discount
///
/// A hop count of zero is treated as one.
pub fn adjusted_strength(signal_strength: f64, hop_count: u32) -> f64 {
    let extra_hops = hop_count.saturating_sub(1).min(i32::MAX as u32) as i32;
    signal_strength * HOP_DECAY.powi(extra_hops)
}

/// Quality class for a signal seen over `hop_count` hops
pub fn calculate_metric(signal_strength: f64, hop_count: u32) -> RouteMetric {
    let adjusted = adjusted_strength(signal_strength, hop_count);

    if adjusted > 0.8 {
        RouteMetric::Excellent
    } else if adjusted > 0.6 {
        RouteMetric::Good
    } else if adjusted > 0.4 {
        RouteMetric::Fair
    } else if adjusted > 0.2 {
        RouteMetric::Poor
    } else {
        RouteMetric::Unreachable
    }
}

/// Linear bandwidth estimate, floored at 0.1 Mbps
pub fn estimate_bandwidth(signal_strength: f64) -> f64 {
    (signal_strength * BANDWIDTH_SCALE_MBPS).max(MIN_BANDWIDTH_MBPS)
}

/// Classify a candidate route
pub fn classify(signal_strength: f64, hop_count: u32) -> LinkAssessment {
    LinkAssessment {
        metric: calculate_metric(signal_strength, hop_count),
        bandwidth_estimate: estimate_bandwidth(signal_strength),
    }
}

/// Raw link measurement from the radio layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkSample {
    /// Signal-to-Noise Ratio (dB)
    pub snr_db: f64,
    /// Packet loss ratio (0.0 to 1.0)
    pub packet_loss: f64,
    /// Round-trip latency in milliseconds
    pub latency_ms: f64,
}

impl LinkSample {
    /// Normalize the measurement into a [0.0, 1.0] signal strength
    ///
    /// SNR saturates at 30 dB; latency penalizes linearly down to a 0.1 floor
    /// at 90 ms and beyond.
    pub fn signal_strength(&self) -> f64 {
        let delivery = 1.0 - self.packet_loss;
        let snr_factor = (self.snr_db / 30.0).min(1.0);
        let latency_factor = (1.0 - self.latency_ms / 100.0).max(0.1);

        (delivery * snr_factor * latency_factor).clamp(0.0, 1.0)
    }
}
