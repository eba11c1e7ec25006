//! Timeout enforcement.
//!
//! Every engine call made on behalf of a request runs under a deadline, so a
//! slow parse surfaces as an error instead of holding the caller forever. The
//! HTTP client has its own timeout too; this one also covers engines that are
//! not HTTP-backed.

use std::future::Future;
use std::time::Duration;

use crate::engine::{EngineError, EngineResult};

/// Run an engine call with a deadline.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> EngineResult<T>
where
    F: Future<Output = EngineResult<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::Timeout(deadline)),
    }
}
