//! Parsing engine subsystem.
//!
//! # Data Flow
//! ```text
//! handler (http/handlers.rs)
//!     → Engine trait (this module)
//!     → tika.rs (HTTP call to the Tika server)
//!     → engine response reshaped by the handler
//!
//! Optional child process (process.rs):
//!     startup → spawn engine → forward output to logs
//!     exit    → mark health STARTING
//!     shutdown → kill child
//! ```
//!
//! # Design Decisions
//! - The gateway never parses documents itself
//! - Every call opens its own request; the client is reentrant
//! - The trait lets handlers run against a stub engine in tests

pub mod process;
pub mod tika;
pub mod types;

use async_trait::async_trait;

pub use process::EngineProcess;
pub use tika::TikaEngine;
pub use types::{Document, EngineError, EngineResult, Markup, Metadata, OutputFormat};

/// Operations the gateway needs from a document-parsing engine.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Extract the document's content as plain text or HTML.
    async fn extract(&self, doc: &Document, markup: Markup) -> EngineResult<String>;

    /// Extract the document's metadata fields.
    async fn metadata(&self, doc: &Document) -> EngineResult<Metadata>;

    /// Detect the document's MIME type.
    async fn detect(&self, doc: &Document) -> EngineResult<String>;

    /// Identify the language of the document's text.
    async fn language(&self, doc: &Document) -> EngineResult<String>;

    /// List the MIME types the engine can handle.
    async fn supported_types(&self) -> EngineResult<Vec<String>>;

    /// The engine's own version string. Doubles as the reachability probe.
    async fn version(&self) -> EngineResult<String>;
}
