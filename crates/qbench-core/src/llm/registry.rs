//! Lazily constructed, per-kind backend cache

use super::backend::{Backend, BackendFactory};
use super::question::BackendKind;
use crate::error::BenchResult;
use std::sync::Arc;
use tokio::sync::Mutex;

type Slot = Mutex<Option<Arc<dyn Backend>>>;

/// Hands out one backend instance per kind for the lifetime of a run.
///
/// Each kind has its own construction lock: concurrent first requests for the
/// same kind produce exactly one `construct` call, and the waiters share its
/// result. The lock is held only while looking up or building, never while a
/// backend is in use. A failed construction is not cached, so the next
/// request tries again.
pub struct BackendRegistry {
    factory: Arc<dyn BackendFactory>,
    text: Slot,
    multimodal: Slot,
}

impl BackendRegistry {
    /// Create an empty registry over a factory
    pub fn new(factory: Arc<dyn BackendFactory>) -> Self {
        Self {
            factory,
            text: Mutex::new(None),
            multimodal: Mutex::new(None),
        }
    }

    fn slot(&self, kind: BackendKind) -> &Slot {
        match kind {
            BackendKind::Text => &self.text,
            BackendKind::Multimodal => &self.multimodal,
        }
    }

    /// Get the backend for `kind`, constructing it on first use
    pub async fn get(&self, kind: BackendKind) -> BenchResult<Arc<dyn Backend>> {
        let mut slot = self.slot(kind).lock().await;
        if let Some(backend) = slot.as_ref() {
            return Ok(Arc::clone(backend));
        }

        tracing::info!(kind = %kind, "Loading model backend");
        let backend = self.factory.construct(kind).await?;
        tracing::debug!(kind = %kind, backend = %backend.name(), "Model backend ready");
        *slot = Some(Arc::clone(&backend));
        Ok(backend)
    }

    /// Whether a backend for `kind` has been constructed
    pub async fn is_loaded(&self, kind: BackendKind) -> bool {
        self.slot(kind).lock().await.is_some()
    }
}
