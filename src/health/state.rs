//! Engine readiness state machine.
//!
//! # States
//! - Starting: engine not yet confirmed reachable; `/health` answers 503
//! - Ready: last probe succeeded; `/health` answers 200
//!
//! # State Transitions
//! ```text
//! Starting → Ready:    probe succeeds
//! Ready → Starting:    consecutive probe failures >= unhealthy_threshold,
//!                      or the supervised engine process exits
//! ```
//!
//! The engine version is captured by the first successful probe and never
//! changes afterwards.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

use crate::observability::metrics;

const STARTING: u8 = 0;
const READY: u8 = 1;

/// Readiness as reported on `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Starting,
    Ready,
}

/// Process-wide health: readiness, start time, pinned engine version.
#[derive(Debug)]
pub struct HealthState {
    status: AtomicU8,
    started_at: Instant,
    engine_version: OnceCell<String>,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            status: AtomicU8::new(STARTING),
            started_at: Instant::now(),
            engine_version: OnceCell::new(),
        }
    }

    pub fn status(&self) -> HealthStatus {
        match self.status.load(Ordering::Acquire) {
            READY => HealthStatus::Ready,
            _ => HealthStatus::Starting,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status() == HealthStatus::Ready
    }

    /// Returns true if this call performed the transition.
    pub fn mark_ready(&self) -> bool {
        let changed = self.status.swap(READY, Ordering::AcqRel) != READY;
        if changed {
            tracing::info!("Engine is ready");
            metrics::record_engine_ready(true);
        }
        changed
    }

    /// Returns true if this call performed the transition.
    pub fn mark_starting(&self) -> bool {
        let changed = self.status.swap(STARTING, Ordering::AcqRel) != STARTING;
        if changed {
            tracing::warn!("Engine is no longer ready");
            metrics::record_engine_ready(false);
        }
        changed
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// The pinned engine version, if a probe has succeeded.
    pub fn engine_version(&self) -> Option<&str> {
        self.engine_version.get().map(String::as_str)
    }

    /// Pin the engine version. Later calls keep the first value.
    pub fn pin_engine_version(&self, version: String) -> &str {
        if self.engine_version.set(version).is_ok() {
            tracing::info!(version = ?self.engine_version.get(), "Engine version pinned");
        }
        self.engine_version.get().map(String::as_str).unwrap_or_default()
    }

    /// Return the pinned version, fetching it with `fetch` on first use.
    pub async fn engine_version_or_init<F, Fut, E>(&self, fetch: F) -> Result<&str, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<String, E>>,
    {
        self.engine_version
            .get_or_try_init(fetch)
            .await
            .map(String::as_str)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}
