//! qbench - ask benchmark datasets to language models
//!
//! Re-exports the core and evaluation crates so embedders need a single
//! dependency.
//!
//! ```rust,ignore
//! use qbench::{BenchConfig, BenchRunner, FieldAdapter, HttpBackendFactory, LocalDatasetProvider};
//!
//! qbench::init_tracing();
//! let config = BenchConfig::default().with_sample_size(5).with_seed(7);
//! let factory = Arc::new(HttpBackendFactory::new(config.clone())?);
//! let provider = Arc::new(LocalDatasetProvider::new("data"));
//! let report = BenchRunner::new(config, provider, factory)?
//!     .run("cais/mmlu", "llama3.2", None, None, Arc::new(FieldAdapter::multiple_choice()))
//!     .await?;
//! println!("{}", report.artifact_path.display());
//! ```

pub use qbench_core::{
    Answer, AnswerInvoker, Backend, BackendFactory, BackendKind, BackendRegistry, BenchConfig,
    BenchError, BenchResult, ConfigLoader, HttpBackendFactory, ImageRef, ProviderKind, Question,
    RetryConfig, RetryPolicy,
};
pub use qbench_eval::{
    Adapter, AnswerResult, BenchRunner, DatasetCatalog, DatasetProvider, FieldAdapter,
    HubDatasetProvider, LocalDatasetProvider, MemoryDatasetProvider, PartitionId, ProgressCallback,
    QuestionId, QuestionIdGenerator, Record, ResultSink, RunProgress, RunReport, RunSummary,
    Sampler,
};

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
