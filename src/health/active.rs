//! Active readiness probing.
//!
//! # Responsibilities
//! - Probe the engine until it answers, with backoff, while STARTING
//! - Keep probing on a fixed interval once READY
//! - Pin the engine version on the first successful probe

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::engine::Engine;
use crate::health::state::HealthState;
use crate::resilience::backoff::calculate_backoff;

pub struct ReadinessMonitor {
    engine: Arc<dyn Engine>,
    health: Arc<HealthState>,
    config: HealthCheckConfig,
}

impl ReadinessMonitor {
    pub fn new(engine: Arc<dyn Engine>, health: Arc<HealthState>, config: HealthCheckConfig) -> Self {
        Self {
            engine,
            health,
            config,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = self.config.interval_secs,
            startup_timeout = self.config.startup_timeout_secs,
            "Readiness monitor starting"
        );

        let started = Instant::now();
        let startup_deadline = Duration::from_secs(self.config.startup_timeout_secs);
        let mut startup_attempts: u32 = 0;
        let mut consecutive_failures: u32 = 0;
        let mut deadline_reported = false;

        loop {
            let healthy = self.probe().await;

            let delay = if healthy {
                consecutive_failures = 0;
                startup_attempts = 0;
                deadline_reported = false;
                self.health.mark_ready();
                Duration::from_secs(self.config.interval_secs)
            } else if self.health.is_ready() {
                consecutive_failures += 1;
                if consecutive_failures >= self.config.unhealthy_threshold {
                    self.health.mark_starting();
                    consecutive_failures = 0;
                    self.config_backoff(1)
                } else {
                    Duration::from_secs(self.config.interval_secs)
                }
            } else {
                startup_attempts = startup_attempts.saturating_add(1);
                tracing::info!(attempt = startup_attempts, "Waiting for engine");

                if !deadline_reported && started.elapsed() >= startup_deadline {
                    tracing::error!(
                        timeout_secs = self.config.startup_timeout_secs,
                        "Engine did not become ready within the startup timeout; still probing"
                    );
                    deadline_reported = true;
                }
                self.config_backoff(startup_attempts)
            };

            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Readiness monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one probe against the engine. Returns true on success.
    pub async fn probe(&self) -> bool {
        let timeout = Duration::from_secs(self.config.timeout_secs);

        match time::timeout(timeout, self.engine.version()).await {
            Ok(Ok(version)) => {
                self.health.pin_engine_version(version);
                true
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Readiness probe failed");
                false
            }
            Err(_) => {
                tracing::debug!("Readiness probe failed: timeout");
                false
            }
        }
    }

    fn config_backoff(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt,
            self.config.startup_base_delay_ms,
            self.config.startup_max_delay_ms,
        )
    }
}
