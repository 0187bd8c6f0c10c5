//! Mesh engine configuration
//!
//! All intervals are stored in milliseconds. The maintenance cadence, the
//! route eviction age and the announcement freshness window are all derived
//! from the single route update interval.

use crate::error::{MeshError, MeshResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const ENV_PREFIX: &str = "ULTRARF_MESH_";

/// How signal samples outside [0.0, 1.0] are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalPolicy {
    /// Use the sample as given; the metric model extrapolates
    #[default]
    Extrapolate,
    /// Clamp the sample into [0.0, 1.0] before classification
    Clamp,
}

impl SignalPolicy {
    /// Apply the policy to a raw signal sample
    pub fn apply(self, signal_strength: f64) -> f64 {
        match self {
            SignalPolicy::Extrapolate => signal_strength,
            SignalPolicy::Clamp => signal_strength.clamp(0.0, 1.0),
        }
    }
}

impl FromStr for SignalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "extrapolate" => Ok(SignalPolicy::Extrapolate),
            "clamp" => Ok(SignalPolicy::Clamp),
            other => Err(format!("unknown signal policy '{}'", other)),
        }
    }
}

/// Routing engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Base interval between route announcements (milliseconds)
    #[serde(default = "default_route_update_interval")]
    pub route_update_interval_ms: u64,
    /// Node silence before eviction (milliseconds)
    #[serde(default = "default_node_timeout")]
    pub node_timeout_ms: u64,
    /// Routes longer than this are never installed
    #[serde(default = "default_max_hop_count")]
    pub max_hop_count: u32,
    /// Upper bound on how long stop waits for the scheduler (milliseconds)
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_ms: u64,
    /// Pause after a failed maintenance tick (milliseconds)
    #[serde(default = "default_maintenance_backoff")]
    pub maintenance_backoff_ms: u64,
    /// Out-of-range signal handling
    #[serde(default)]
    pub signal_policy: SignalPolicy,
}

fn default_route_update_interval() -> u64 {
    30_000
}

fn default_node_timeout() -> u64 {
    180_000
}

fn default_max_hop_count() -> u32 {
    5
}

fn default_stop_timeout() -> u64 {
    5_000
}

fn default_maintenance_backoff() -> u64 {
    5_000
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            route_update_interval_ms: default_route_update_interval(),
            node_timeout_ms: default_node_timeout(),
            max_hop_count: default_max_hop_count(),
            stop_timeout_ms: default_stop_timeout(),
            maintenance_backoff_ms: default_maintenance_backoff(),
            signal_policy: SignalPolicy::default(),
        }
    }
}

impl MeshConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(raw: &str) -> MeshResult<Self> {
        let config: MeshConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> MeshResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Apply `ULTRARF_MESH_*` environment overrides on top of this config
    pub fn with_env_overrides(self) -> MeshResult<Self> {
        self.with_overrides(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> MeshResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_field(&lookup, "ROUTE_UPDATE_INTERVAL_MS", &mut self.route_update_interval_ms)?;
        override_field(&lookup, "NODE_TIMEOUT_MS", &mut self.node_timeout_ms)?;
        override_field(&lookup, "MAX_HOP_COUNT", &mut self.max_hop_count)?;
        override_field(&lookup, "STOP_TIMEOUT_MS", &mut self.stop_timeout_ms)?;
        override_field(&lookup, "MAINTENANCE_BACKOFF_MS", &mut self.maintenance_backoff_ms)?;
        override_field(&lookup, "SIGNAL_POLICY", &mut self.signal_policy)?;
        self.validate()?;
        Ok(self)
    }

    /// Reject values that would stall or disable the engine
    pub fn validate(&self) -> MeshResult<()> {
        if self.route_update_interval_ms < 3 {
            return Err(MeshError::InvalidConfig(
                "route_update_interval_ms must be at least 3".to_string(),
            ));
        }
        if self.node_timeout_ms == 0 {
            return Err(MeshError::InvalidConfig(
                "node_timeout_ms must be positive".to_string(),
            ));
        }
        if self.max_hop_count == 0 {
            return Err(MeshError::InvalidConfig(
                "max_hop_count must be at least 1".to_string(),
            ));
        }
        if self.stop_timeout_ms == 0 {
            return Err(MeshError::InvalidConfig(
                "stop_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Base announcement interval
    pub fn route_update_interval(&self) -> Duration {
        Duration::from_millis(self.route_update_interval_ms)
    }

    /// Maintenance tick period (a third of the update interval)
    pub fn maintenance_period(&self) -> Duration {
        Duration::from_millis(self.route_update_interval_ms / 3)
    }

    /// Routes older than this are evicted
    pub fn route_max_age_ms(&self) -> u64 {
        self.route_update_interval_ms.saturating_mul(3)
    }

    /// Routes older than this are withheld from announcements
    pub fn announce_max_age_ms(&self) -> u64 {
        self.route_update_interval_ms.saturating_mul(2)
    }

    /// Node silence before eviction
    pub fn node_timeout(&self) -> Duration {
        Duration::from_millis(self.node_timeout_ms)
    }

    /// Bounded wait used by stop
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    /// Pause after a failed tick
    pub fn maintenance_backoff(&self) -> Duration {
        Duration::from_millis(self.maintenance_backoff_ms)
    }
}

fn override_field<T, F>(lookup: &F, key: &str, slot: &mut T) -> MeshResult<()>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(key) {
        *slot = value.trim().parse().map_err(|_| MeshError::EnvOverride {
            var: format!("{}{}", ENV_PREFIX, key),
            value,
        })?;
    }
    Ok(())
}
