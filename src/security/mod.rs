//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (body size cap)
//!     → auth.rs (X-API-Key on protected routes)
//!     → handler
//! ```
//!
//! # Design Decisions
//! - Fail closed: missing or wrong key is 401 before any engine work
//! - `/`, `/health`, and `/version` are public

pub mod auth;
pub mod limits;

pub use auth::{require_api_key, ApiKey, API_KEY_HEADER};
