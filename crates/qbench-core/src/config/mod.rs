//! Configuration for benchmark runs
//!
//! Settings are layered: built-in defaults, then an optional JSON/YAML/TOML
//! file, then `QBENCH_*` environment variables.

mod loader;
mod model;
pub mod timeouts;

pub use loader::{ConfigLoader, ConfigSource, ENV_PREFIX};
pub use model::{BenchConfig, ProviderKind, RetryConfig};
