//! Error types for UltraRF mesh operations.
//!
//! Routing decisions never surface as errors: an unknown destination is an
//! `Option::None` and a bad announcement is a rejected `RouteUpdateResult`.
//! What remains is configuration, lifecycle and maintenance failures.

use thiserror::Error;

/// Errors that can occur in mesh operations.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Environment override could not be parsed
    #[error("Invalid value for {var}: {value}")]
    EnvOverride {
        /// Full environment variable name
        var: String,
        /// Rejected raw value
        value: String,
    },

    /// Configuration file I/O errors
    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Scheduler started outside a tokio runtime
    #[error("No tokio runtime available: {0}")]
    Runtime(String),

    /// A maintenance pass failed
    #[error("Maintenance error: {0}")]
    Maintenance(String),
}

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
