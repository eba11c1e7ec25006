//! Authenticating HTTP gateway in front of an Apache Tika parsing engine.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │                 TIKA GATEWAY                   │
//!     Client Request     │  ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//!     ───────────────────┼─▶│ security │──▶│ handlers │──▶│  engine   │──┼──▶ Tika server
//!                        │  │ api key  │   │ + limits │   │ (trait)   │  │    (HTTP)
//!                        │  └──────────┘   └────┬─────┘   └───────────┘  │
//!     Client Response    │                      │                         │
//!     ◀──────────────────┼──────────── JSON ────┘                         │
//!                        │                                                │
//!                        │  ┌──────────────────────────────────────────┐ │
//!                        │  │          Cross-Cutting Concerns          │ │
//!                        │  │  config │ health │ observability │ lifecycle│
//!                        │  └──────────────────────────────────────────┘ │
//!                        └───────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod engine;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::GatewayConfig;
pub use engine::{Engine, TikaEngine};
pub use http::{create_router, AppState, GatewayServer};
pub use lifecycle::Shutdown;
