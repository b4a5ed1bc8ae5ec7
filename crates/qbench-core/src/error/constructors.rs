//! Constructor methods for BenchError

use super::types::BenchError;

impl BenchError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a catalog error for a dataset
    pub fn catalog(dataset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Catalog {
            dataset: dataset.into(),
            message: message.into(),
        }
    }

    /// Create a partition load error
    pub fn load(partition: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            partition: partition.into(),
            message: message.into(),
        }
    }

    /// Create an adapter error
    pub fn adapter(message: impl Into<String>) -> Self {
        Self::Adapter {
            message: message.into(),
            field: None,
        }
    }

    /// Create an adapter error naming the offending field
    pub fn adapter_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Adapter {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            provider: None,
        }
    }

    /// Create a timeout error
    pub fn timeout(seconds: u64, message: impl Into<String>) -> Self {
        Self::Timeout {
            seconds,
            message: message.into(),
        }
    }

    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            provider: None,
        }
    }

    /// Create a backend error with provider
    pub fn backend_with_provider(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            provider: Some(provider.into()),
        }
    }

    /// Create an HTTP error
    pub fn http(message: impl Into<String>, url: Option<String>, status_code: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            url,
            status_code,
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
        }
    }

    /// Create an IO error with the path involved
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create a JSON error
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
        }
    }
}
