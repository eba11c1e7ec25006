//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, span)
//!     → security (body limit, API key on protected routes)
//!     → handlers.rs (readiness gate, engine call under deadline)
//!     → response.rs (public JSON shapes) / error.rs (JSON errors)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use request::X_REQUEST_ID;
pub use server::{create_router, AppState, GatewayServer};
