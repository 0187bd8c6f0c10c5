//! Wall-clock helpers shared by the routing engine.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Get current timestamp in milliseconds
pub fn current_timestamp() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Elapsed milliseconds between `then` and `now`; zero if the clock stepped back.
pub fn age_ms(now: Timestamp, then: Timestamp) -> u64 {
    now.saturating_sub(then)
}

/// Render a timestamp as float seconds, the wire representation.
pub fn to_secs_f64(ts: Timestamp) -> f64 {
    ts as f64 / 1000.0
}
