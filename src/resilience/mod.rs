//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to engine:
//!     → timeouts.rs (deadline on every engine call → 504 on expiry)
//!
//! Readiness probe while starting:
//!     → backoff.rs (exponential delay with jitter between probes)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Caller requests are never retried; retry is the caller's decision

pub mod backoff;
pub mod timeouts;

pub use timeouts::with_deadline;
