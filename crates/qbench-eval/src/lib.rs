//! qbench evaluation harness
//!
//! Runs a question dataset against a model backend: every (subject, split)
//! partition is loaded, sampled, and answered in a bounded pool of workers,
//! and the answers are saved as one JSON artifact per (dataset, model).
//!
//! # Example
//!
//! ```rust,ignore
//! use qbench_eval::{BenchRunner, FieldAdapter, HubDatasetProvider};
//! use qbench_core::{BenchConfig, HttpBackendFactory};
//!
//! let config = BenchConfig::default().with_sample_size(10);
//! let factory = HttpBackendFactory::new(config.clone())?;
//! let runner = BenchRunner::new(config, Arc::new(HubDatasetProvider::new()?), Arc::new(factory))?;
//! let report = runner
//!     .run("cais/mmlu", "llama3.2", None, None, Arc::new(FieldAdapter::multiple_choice()))
//!     .await?;
//! ```

pub mod adapter;
pub mod dataset;
pub mod report;
pub mod results;
pub mod runner;
pub mod sampling;

// Re-exports for convenience
pub use adapter::{Adapter, FieldAdapter};
pub use dataset::{
    DatasetCatalog, DatasetProvider, HubDatasetProvider, LocalDatasetProvider,
    MemoryDatasetProvider, PartitionData, PartitionId, PartitionLoader, Record,
};
pub use report::{ResultSink, RunSummary};
pub use results::AnswerResult;
pub use runner::{
    BenchRunner, PartitionOutcome, PartitionWorker, PoolOutcome, ProgressCallback, RunProgress,
    RunReport, WorkPool,
};
pub use sampling::{QuestionId, QuestionIdGenerator, SampleIndexSet, Sampler};
