//! qbench core library
//!
//! Errors, configuration, retry policy, and the model backends that turn
//! benchmark questions into answers.

pub mod config;
pub mod error;
pub mod llm;
pub mod recovery;
pub mod types;

// Re-export commonly used types
pub use config::{BenchConfig, ConfigLoader, ProviderKind, RetryConfig};
pub use error::{BenchError, BenchResult};
pub use llm::{
    AnswerInvoker, Backend, BackendFactory, BackendKind, BackendRegistry, HttpBackendFactory,
    ImageRef, MAX_CHOICES, Question,
};
pub use recovery::RetryPolicy;
pub use types::Answer;
