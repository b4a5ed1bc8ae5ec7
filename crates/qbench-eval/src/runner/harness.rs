//! Run entry point

use super::pool::WorkPool;
use super::progress::{ProgressCallback, RunProgress};
use super::worker::PartitionWorker;
use crate::adapter::Adapter;
use crate::dataset::{DatasetCatalog, DatasetProvider, PartitionLoader};
use crate::report::{ResultSink, RunSummary};
use crate::sampling::{QuestionIdGenerator, Sampler};
use qbench_core::{
    AnswerInvoker, BackendFactory, BackendRegistry, BenchConfig, BenchError, BenchResult,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// What a finished run left behind
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Persisted artifact
    pub artifact_path: PathBuf,
    pub summary: RunSummary,
    /// Records in the artifact
    pub results_len: usize,
}

/// Runs datasets against a model and persists the answers
pub struct BenchRunner {
    config: BenchConfig,
    provider: Arc<dyn DatasetProvider>,
    factory: Arc<dyn BackendFactory>,
    progress: Option<ProgressCallback>,
}

impl BenchRunner {
    /// Create a runner; the configuration is validated here
    pub fn new(
        config: BenchConfig,
        provider: Arc<dyn DatasetProvider>,
        factory: Arc<dyn BackendFactory>,
    ) -> BenchResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider,
            factory,
            progress: None,
        })
    }

    /// Set progress callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(RunProgress) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Run `dataset` and persist the artifact for `model_id`.
    ///
    /// `sample_size` and `concurrency` fall back to the configuration.
    pub async fn run(
        &self,
        dataset: &str,
        model_id: &str,
        sample_size: Option<usize>,
        concurrency: Option<usize>,
        adapter: Arc<dyn Adapter>,
    ) -> BenchResult<RunReport> {
        self.run_with_cancel(
            dataset,
            model_id,
            sample_size,
            concurrency,
            adapter,
            CancellationToken::new(),
        )
        .await
    }

    /// Like [`BenchRunner::run`]; once `cancel` fires, in-flight items finish,
    /// nothing new is scheduled, and what was collected is persisted.
    pub async fn run_with_cancel(
        &self,
        dataset: &str,
        model_id: &str,
        sample_size: Option<usize>,
        concurrency: Option<usize>,
        adapter: Arc<dyn Adapter>,
        cancel: CancellationToken,
    ) -> BenchResult<RunReport> {
        if concurrency == Some(0) {
            return Err(BenchError::config("concurrency must be at least 1"));
        }
        let started = Instant::now();
        let sample_size = sample_size.or(self.config.sample_size);
        let concurrency = concurrency.unwrap_or_else(|| self.config.effective_concurrency());

        tracing::info!(
            dataset,
            model = model_id,
            sample_size = ?sample_size,
            concurrency,
            seed = ?self.config.seed,
            "starting benchmark run"
        );

        // Backends are cached per run.
        let registry = Arc::new(BackendRegistry::new(Arc::clone(&self.factory)));
        let worker = PartitionWorker::new(
            PartitionLoader::new(Arc::clone(&self.provider)),
            adapter,
            AnswerInvoker::from_config(registry, &self.config),
            QuestionIdGenerator::from_config(&self.config),
            Sampler::new(self.config.seed),
        )
        .with_inputs(self.config.include_inputs)
        .with_item_concurrency(self.config.item_concurrency)
        .with_cancel(cancel.clone());

        let pool = WorkPool::new(
            DatasetCatalog::new(Arc::clone(&self.provider)),
            Arc::new(worker),
            concurrency,
        )
        .with_cancel(cancel)
        .with_progress(self.progress.clone());

        let outcome = pool.run(dataset, sample_size).await?;
        let summary = RunSummary::from_outcome(&outcome, started.elapsed());
        let results = ResultSink::aggregate(outcome.partitions);

        let sink = ResultSink::new(&self.config.results_dir);
        let artifact_path = sink.persist(dataset, model_id, &results).await?;

        summary.log(dataset, model_id);
        Ok(RunReport {
            artifact_path,
            summary,
            results_len: results.len(),
        })
    }
}
