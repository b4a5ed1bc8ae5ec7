//! Backend capability traits

use super::question::{BackendKind, Question};
use crate::error::BenchResult;
use async_trait::async_trait;
use std::sync::Arc;

/// A model that turns a question into an answer string.
///
/// Implementations are shared by every worker of a run and must tolerate
/// concurrent calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable backend name (provider/model)
    fn name(&self) -> String;

    /// Capability this backend was built for
    fn kind(&self) -> BackendKind;

    /// Generate an answer; errors are retried by the caller
    async fn invoke(&self, question: &Question) -> BenchResult<String>;
}

/// Builds backends on demand
#[async_trait]
pub trait BackendFactory: Send + Sync {
    /// Construct a backend for `kind`
    async fn construct(&self, kind: BackendKind) -> BenchResult<Arc<dyn Backend>>;
}
