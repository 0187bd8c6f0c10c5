//! Integration tests for the UltraRF mesh routing engine
//!
//! This test suite validates:
//! - Routing behavior through the public engine API
//! - Route propagation across chains of stations
//! - Consistency under concurrent writers, readers and maintenance
//! - Scheduler lifecycle against real time

pub mod test_utils;


#[cfg(test)]
mod propagation_tests;

#[cfg(test)]
mod concurrency_tests;

#[cfg(test)]
mod lifecycle_tests;
