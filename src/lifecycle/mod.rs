//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Spawn engine (optional) → Start readiness
//!     monitor → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → server drains, monitor and engine
//!     supervisor exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - The listener binds even while the engine is starting; `/health`
//!   reports 503 until the engine answers
//! - Failing to bind is the only fatal runtime error

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
