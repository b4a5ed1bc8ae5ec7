//! Bounded partition scheduling

use super::progress::{ProgressCallback, RunProgress};
use super::worker::{PartitionOutcome, PartitionWorker};
use crate::dataset::{DatasetCatalog, PartitionId};
use qbench_core::{BenchError, BenchResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;

/// What a pool run produced
#[derive(Debug, Default)]
pub struct PoolOutcome {
    /// Partitions that loaded, in completion order
    pub partitions: Vec<PartitionOutcome>,
    /// Partitions that failed to load, or whose task died
    pub skipped: Vec<(PartitionId, BenchError)>,
    /// Partitions handed to a worker
    pub attempted: usize,
    /// Partitions in the catalog
    pub total: usize,
    /// Whether cancellation stopped scheduling or cut partitions short
    pub cancelled: bool,
}

/// Runs one worker task per partition with at most `concurrency` in flight
pub struct WorkPool {
    catalog: DatasetCatalog,
    worker: Arc<PartitionWorker>,
    concurrency: usize,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
}

impl WorkPool {
    /// Create a pool
    pub fn new(catalog: DatasetCatalog, worker: Arc<PartitionWorker>, concurrency: usize) -> Self {
        Self {
            catalog,
            worker,
            concurrency: concurrency.max(1),
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Stop scheduling partitions once `cancel` fires
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Report partition progress
    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Process every partition of `dataset`.
    ///
    /// Catalog failures are returned as errors. Load failures and panicked
    /// partition tasks are logged and recorded in [`PoolOutcome::skipped`]
    /// under their partition.
    pub async fn run(&self, dataset: &str, sample_size: Option<usize>) -> BenchResult<PoolOutcome> {
        let partitions = self.catalog.partitions(dataset).await?;
        self.worker.ids().check_partitions(&partitions)?;

        let total = partitions.len();
        tracing::info!(dataset, partitions = total, concurrency = self.concurrency, "scheduling partitions");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut running: HashMap<task::Id, PartitionId> = HashMap::new();
        let mut outcome = PoolOutcome {
            total,
            ..PoolOutcome::default()
        };

        for (position, partition) in partitions.into_iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => {
                    permit.map_err(|_| BenchError::Cancelled)?
                }
            };

            outcome.attempted += 1;
            let worker = Arc::clone(&self.worker);
            let progress = self.progress.clone();
            let spawned = partition.clone();

            let handle = tasks.spawn(async move {
                let _permit = permit;
                emit(&progress, RunProgress::PartitionStarted {
                    partition: partition.clone(),
                    position,
                    total,
                });

                let result = worker.run(partition.clone(), sample_size).await;
                match &result {
                    Ok(done) => emit(&progress, RunProgress::PartitionFinished {
                        partition,
                        items: done.results.len(),
                        failed: done.failed(),
                    }),
                    Err(error) => emit(&progress, RunProgress::PartitionSkipped {
                        partition,
                        reason: error.to_string(),
                    }),
                }
                result
            });
            running.insert(handle.id(), spawned);
        }

        if outcome.attempted < total {
            tracing::info!(
                scheduled = outcome.attempted,
                total,
                "cancelled; remaining partitions not scheduled"
            );
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            let task_id = match &joined {
                Ok((id, _)) => *id,
                Err(join_error) => join_error.id(),
            };
            let Some(partition) = running.remove(&task_id) else {
                continue;
            };

            match joined {
                Ok((_, Ok(done))) => {
                    outcome.cancelled |= done.cancelled;
                    outcome.partitions.push(done);
                }
                Ok((_, Err(error))) => {
                    tracing::warn!(partition = %partition, error = %error, "skipping partition");
                    outcome.skipped.push((partition, error));
                }
                Err(join_error) => {
                    tracing::error!(partition = %partition, error = %join_error, "partition task failed");
                    let error = BenchError::load(partition.to_string(), join_error.to_string());
                    emit(&self.progress, RunProgress::PartitionSkipped {
                        partition: partition.clone(),
                        reason: error.to_string(),
                    });
                    outcome.skipped.push((partition, error));
                }
            }
        }

        outcome.cancelled |= self.cancel.is_cancelled();
        Ok(outcome)
    }
}

fn emit(progress: &Option<ProgressCallback>, event: RunProgress) {
    if let Some(callback) = progress {
        callback(event);
    }
}
