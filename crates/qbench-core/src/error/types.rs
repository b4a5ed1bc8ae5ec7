//! Core error type for qbench

use thiserror::Error;

/// Result type alias for qbench operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Main error type for qbench
#[derive(Error, Debug, Clone)]
pub enum BenchError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Dataset catalog could not be enumerated (unknown name, provider down)
    #[error("Catalog error for dataset '{dataset}': {message}")]
    Catalog { dataset: String, message: String },

    /// One partition could not be loaded
    #[error("Load error for partition {partition}: {message}")]
    Load { partition: String, message: String },

    /// A record could not be adapted into a question
    #[error("Adapter error: {message}")]
    Adapter {
        message: String,
        field: Option<String>,
    },

    /// Backend could not be reached
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        provider: Option<String>,
    },

    /// Backend call exceeded its deadline
    #[error("Timeout after {seconds}s: {message}")]
    Timeout { seconds: u64, message: String },

    /// Backend answered but the answer was unusable, or construction failed
    #[error("Backend error: {message}")]
    Backend {
        message: String,
        provider: Option<String>,
    },

    /// HTTP level failure with an optional status
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        url: Option<String>,
        status_code: Option<u16>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },

    /// Run was cancelled
    #[error("Run was cancelled")]
    Cancelled,
}

impl BenchError {
    /// Short stable code for logs and persisted error fields
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Catalog { .. } => "catalog",
            Self::Load { .. } => "load",
            Self::Adapter { .. } => "adapter",
            Self::Connection { .. } => "connection",
            Self::Timeout { .. } => "timeout",
            Self::Backend { .. } => "backend",
            Self::Http { .. } => "http",
            Self::Io { .. } => "io",
            Self::Json { .. } => "json",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the failure is likely to go away on its own.
    ///
    /// The invoker retries every backend failure regardless; this only decides
    /// how loudly an attempt is logged.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection { .. } | Self::Timeout { .. } => true,
            Self::Http { status_code, .. } => {
                matches!(status_code, Some(429) | Some(502) | Some(503) | Some(504))
            }
            _ => false,
        }
    }

    /// Whether this error aborts a whole dataset run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Catalog { .. } | Self::Config { .. })
    }
}
