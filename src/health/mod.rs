//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! Active probes (active.rs):
//!     Timer / backoff
//!     → engine.version()
//!     → Update state.rs
//!
//! Engine process exit (engine/process.rs):
//!     → state.rs back to Starting
//!
//! Readers:
//!     /health, /version, protected handlers (readiness gate)
//! ```
//!
//! # Design Decisions
//! - A single atomic status value, read-mostly
//! - The engine version is write-once for the life of the process

pub mod active;
pub mod state;

pub use active::ReadinessMonitor;
pub use state::{HealthState, HealthStatus};
