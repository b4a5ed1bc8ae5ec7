//! Per-partition processing

use crate::adapter::Adapter;
use crate::dataset::{PartitionData, PartitionId, PartitionLoader};
use crate::results::AnswerResult;
use crate::sampling::{QuestionIdGenerator, Sampler};
use futures::{StreamExt, future, stream};
use qbench_core::{Answer, AnswerInvoker, BenchResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Results of one partition
#[derive(Debug, Clone)]
pub struct PartitionOutcome {
    pub partition: PartitionId,
    /// Results in sampled-index order
    pub results: Vec<AnswerResult>,
    /// Number of indices the sampler selected
    pub sampled: usize,
    /// Whether cancellation cut the partition short
    pub cancelled: bool,
}

impl PartitionOutcome {
    /// Results carrying the error sentinel
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }
}

/// Loads a partition, samples it, and answers every sampled item.
///
/// Item failures never escape: adapter and backend errors become sentinel
/// results. Only a load failure makes [`PartitionWorker::run`] return `Err`.
pub struct PartitionWorker {
    loader: PartitionLoader,
    adapter: Arc<dyn Adapter>,
    invoker: AnswerInvoker,
    ids: QuestionIdGenerator,
    sampler: Sampler,
    include_inputs: bool,
    item_concurrency: usize,
    cancel: CancellationToken,
}

impl PartitionWorker {
    /// Create a worker that processes items sequentially
    pub fn new(
        loader: PartitionLoader,
        adapter: Arc<dyn Adapter>,
        invoker: AnswerInvoker,
        ids: QuestionIdGenerator,
        sampler: Sampler,
    ) -> Self {
        Self {
            loader,
            adapter,
            invoker,
            ids,
            sampler,
            include_inputs: false,
            item_concurrency: 1,
            cancel: CancellationToken::new(),
        }
    }

    /// Keep question text and choices in results
    pub fn with_inputs(mut self, include_inputs: bool) -> Self {
        self.include_inputs = include_inputs;
        self
    }

    /// Answer up to `n` items of a partition at once; output order is kept
    pub fn with_item_concurrency(mut self, n: usize) -> Self {
        self.item_concurrency = n.max(1);
        self
    }

    /// Stop picking up new items once `cancel` fires
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Identifier generator in use
    pub fn ids(&self) -> &QuestionIdGenerator {
        &self.ids
    }

    /// Process one partition
    pub async fn run(
        self: Arc<Self>,
        partition: PartitionId,
        sample_size: Option<usize>,
    ) -> BenchResult<PartitionOutcome> {
        let data = Arc::new(self.loader.load(&partition).await?);
        let indices = self.sampler.sample(&partition, data.len(), sample_size);
        let sampled = indices.len();

        tracing::info!(
            partition = %partition,
            records = data.len(),
            sampled,
            "processing partition"
        );

        let cancel = self.cancel.clone();
        let results: Vec<AnswerResult> = stream::iter(indices.into_vec())
            .take_while(move |_| future::ready(!cancel.is_cancelled()))
            .map(|index| {
                let worker = Arc::clone(&self);
                let data = Arc::clone(&data);
                async move { worker.process_item(&data, index).await }
            })
            .buffered(self.item_concurrency)
            .collect()
            .await;

        let cancelled = results.len() < sampled;
        if cancelled {
            tracing::info!(
                partition = %partition,
                done = results.len(),
                sampled,
                "partition stopped by cancellation"
            );
        }

        Ok(PartitionOutcome {
            partition,
            results,
            sampled,
            cancelled,
        })
    }

    async fn process_item(&self, data: &PartitionData, index: usize) -> AnswerResult {
        let partition = data.id();
        let id = self.ids.generate(partition.subject(), &partition.split, index);

        let Some(record) = data.get(index) else {
            return AnswerResult::new(id, Answer::failed(format!("index {} out of range", index)));
        };

        let question = match self.adapter.adapt(record) {
            Ok(question) => question,
            Err(error) => {
                tracing::warn!(id = %id, error = %error, "could not adapt record");
                return AnswerResult::new(id, Answer::failed(error.to_string()));
            }
        };

        let answer = self.invoker.answer(&question).await;
        if let Some(reason) = answer.failure_reason() {
            tracing::warn!(id = %id, reason, "no answer for item");
        } else {
            tracing::debug!(id = %id, "item answered");
        }

        let result = AnswerResult::new(id, answer);
        if self.include_inputs {
            result.with_inputs(&question)
        } else {
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::FieldAdapter;
    use crate::dataset::{MemoryDatasetProvider, Record};
    use async_trait::async_trait;
    use qbench_core::{
        Backend, BackendFactory, BackendKind, BackendRegistry, BenchError, Question, RetryPolicy,
    };
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Answers with the question text upper-cased; fails on "boom"
    struct EchoBackend {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Backend for EchoBackend {
        fn name(&self) -> String {
            "echo".to_string()
        }

        fn kind(&self) -> BackendKind {
            BackendKind::Text
        }

        async fn invoke(&self, question: &Question) -> BenchResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if question.text == "boom" {
                return Err(BenchError::connection("refused"));
            }
            Ok(question.text.to_uppercase())
        }
    }

    struct EchoFactory {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BackendFactory for EchoFactory {
        async fn construct(&self, _kind: BackendKind) -> BenchResult<Arc<dyn Backend>> {
            Ok(Arc::new(EchoBackend {
                calls: Arc::clone(&self.calls),
            }))
        }
    }

    fn records(texts: &[&str]) -> Vec<Record> {
        texts
            .iter()
            .map(|t| Record::from_value(json!({ "question": t })).unwrap())
            .collect()
    }

    fn worker(provider: MemoryDatasetProvider, calls: Arc<AtomicUsize>) -> PartitionWorker {
        let registry = Arc::new(BackendRegistry::new(Arc::new(EchoFactory { calls })));
        let invoker = AnswerInvoker::new(registry, RetryPolicy::immediate(2), Duration::from_secs(5));
        PartitionWorker::new(
            PartitionLoader::new(Arc::new(provider)),
            Arc::new(FieldAdapter::new("question")),
            invoker,
            QuestionIdGenerator::new(),
            Sampler::new(Some(7)),
        )
    }

    #[tokio::test]
    async fn test_full_partition_in_index_order() {
        let provider = MemoryDatasetProvider::new()
            .with_partition("Q", Some("S1"), "train", records(&["a", "b", "c"]));
        let worker = Arc::new(worker(provider, Arc::default()));

        let outcome = worker
            .run(PartitionId::new("Q", Some("S1"), "train"), None)
            .await
            .unwrap();

        let ids: Vec<&str> = outcome.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["S1_train_0", "S1_train_1", "S1_train_2"]);
        assert_eq!(outcome.results[1].answer.as_deref(), Some("B"));
        assert!(!outcome.cancelled);
    }

    #[tokio::test]
    async fn test_item_failures_become_sentinels() {
        let mut rows = records(&["ok", "boom"]);
        rows.push(Record::from_value(json!({ "prompt": "no question field" })).unwrap());
        let provider = MemoryDatasetProvider::new().with_partition("Q", None, "test", rows);
        let calls = Arc::new(AtomicUsize::new(0));
        let worker = Arc::new(worker(provider, Arc::clone(&calls)));

        let outcome = worker
            .run(PartitionId::new("Q", None, "test"), None)
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.failed(), 2);
        assert_eq!(outcome.results[0].answer.as_deref(), Some("OK"));
        assert!(outcome.results[1].error.as_deref().unwrap().contains("refused"));
        assert!(outcome.results[2].error.as_deref().unwrap().contains("Adapter"));
        // one call for "ok", two attempts for "boom", none for the bad record
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_sampled_subset_with_item_concurrency() {
        let texts: Vec<String> = (0..20).map(|i| format!("q{}", i)).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let provider =
            MemoryDatasetProvider::new().with_partition("Q", Some("S1"), "train", records(&refs));
        let sequential = Arc::new(worker(provider.clone(), Arc::default()));
        let parallel = Arc::new(worker(provider, Arc::default()).with_item_concurrency(4));
        let partition = PartitionId::new("Q", Some("S1"), "train");

        let a = sequential.run(partition.clone(), Some(5)).await.unwrap();
        let b = parallel.run(partition, Some(5)).await.unwrap();

        assert_eq!(a.results.len(), 5);
        let unique: HashSet<_> = a.results.iter().map(|r| r.id.clone()).collect();
        assert_eq!(unique.len(), 5);
        // same seed, same order regardless of item concurrency
        assert_eq!(a.results, b.results);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_yields_nothing() {
        let provider =
            MemoryDatasetProvider::new().with_partition("Q", None, "test", records(&["a", "b"]));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let worker = Arc::new(worker(provider, Arc::default()).with_cancel(cancel));

        let outcome = worker
            .run(PartitionId::new("Q", None, "test"), None)
            .await
            .unwrap();
        assert!(outcome.results.is_empty());
        assert!(outcome.cancelled);
    }

    #[tokio::test]
    async fn test_inputs_kept_when_requested() {
        let provider =
            MemoryDatasetProvider::new().with_partition("Q", None, "test", records(&["a"]));
        let worker = Arc::new(worker(provider, Arc::default()).with_inputs(true));

        let outcome = worker
            .run(PartitionId::new("Q", None, "test"), None)
            .await
            .unwrap();
        assert_eq!(outcome.results[0].question.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_missing_partition_is_error() {
        let worker = Arc::new(worker(MemoryDatasetProvider::new(), Arc::default()));
        let err = worker
            .run(PartitionId::new("Q", None, "test"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BenchError::Load { .. }));
    }
}
