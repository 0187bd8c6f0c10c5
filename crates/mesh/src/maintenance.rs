//! Maintenance scheduler
//!
//! A background tokio task that evicts stale routes and nodes on a fixed
//! cadence. A failed pass is logged and followed by a fixed backoff; it never
//! ends the loop. The loop only exits when its run flag is cleared or the
//! owning handle is dropped.

use crate::config::MeshConfig;
use crate::error::{MeshError, MeshResult};
use crate::time::{current_timestamp, Timestamp};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

/// Outcome of one eviction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// Routes removed for age
    pub routes_evicted: usize,
    /// Nodes removed for silence
    pub nodes_evicted: usize,
}

/// Something the scheduler can run a pass against
pub trait Maintenance: Send + Sync + 'static {
    /// Run one pass as of `now`
    fn run_maintenance(&self, now: Timestamp) -> MeshResult<MaintenanceReport>;
}

/// Periodic maintenance driver
#[derive(Debug, Clone)]
pub struct MaintenanceScheduler {
    period: Duration,
    backoff: Duration,
}

impl MaintenanceScheduler {
    /// Create a scheduler with an explicit cadence and failure backoff
    pub fn new(period: Duration, backoff: Duration) -> Self {
        Self { period, backoff }
    }

    /// Cadence and backoff from configuration
    pub fn from_config(config: &MeshConfig) -> Self {
        Self::new(config.maintenance_period(), config.maintenance_backoff())
    }

    /// Tick period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Spawn the loop on the current tokio runtime
    pub fn spawn<M: Maintenance>(&self, target: Arc<M>) -> MeshResult<SchedulerHandle> {
        let runtime = Handle::try_current().map_err(|e| MeshError::Runtime(e.to_string()))?;
        let (running, run_flag) = watch::channel(true);
        let task = runtime.spawn(self.clone().run(target, run_flag));

        Ok(SchedulerHandle { running, task })
    }

    /// Drive maintenance until the run flag clears
    pub async fn run<M: Maintenance>(self, target: Arc<M>, mut run_flag: watch::Receiver<bool>) {
        info!(period_ms = self.period.as_millis() as u64, "maintenance scheduler started");

        loop {
            if !*run_flag.borrow() {
                break;
            }

            let pause = match run_tick(target.as_ref(), current_timestamp()) {
                Ok(report) => {
                    trace!(
                        routes = report.routes_evicted,
                        nodes = report.nodes_evicted,
                        "maintenance tick"
                    );
                    self.period
                }
                Err(e) => {
                    error!(error = %e, "mesh maintenance error");
                    self.backoff
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = stop_requested(&mut run_flag) => break,
            }
        }

        info!("maintenance scheduler stopped");
    }
}

/// Run one pass, turning a panic into an error
fn run_tick<M: Maintenance>(target: &M, now: Timestamp) -> MeshResult<MaintenanceReport> {
    panic::catch_unwind(AssertUnwindSafe(|| target.run_maintenance(now)))
        .map_err(|payload| MeshError::Maintenance(panic_message(payload.as_ref())))?
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "maintenance pass panicked".to_string()
    }
}

/// Resolves once the flag is cleared or its sender is gone
async fn stop_requested(run_flag: &mut watch::Receiver<bool>) {
    let _ = run_flag.wait_for(|running| !*running).await;
}

/// Running scheduler: its run flag and task
#[derive(Debug)]
pub struct SchedulerHandle {
    running: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Whether the loop is still expected to be running
    pub fn is_running(&self) -> bool {
        *self.running.borrow() && !self.task.is_finished()
    }

    /// Clear the run flag and wait up to `timeout` for the loop to exit
    ///
    /// Returns false if the task was still running at the deadline; it is
    /// left to finish on its own rather than aborted.
    pub async fn stop(self, timeout: Duration) -> bool {
        self.running.send_replace(false);

        match tokio::time::timeout(timeout, self.task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "maintenance task ended abnormally");
                true
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "maintenance task did not stop in time"
                );
                false
            }
        }
    }
}
