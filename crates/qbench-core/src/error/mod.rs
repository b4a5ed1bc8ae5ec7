//! Error types for qbench
//!
//! One error enum covers every failure the harness can observe. The variants
//! line up with where a failure is contained:
//! - `Catalog`: fatal for the whole dataset run
//! - `Load`: scoped to one partition, which is skipped
//! - `Adapter`: scoped to one item, which gets an error answer
//! - `Connection` / `Timeout` / `Backend` / `Http`: backend invocation failures,
//!   retried by the invoker and never propagated past it

mod constructors;
mod conversions;
mod types;

pub use types::{BenchError, BenchResult};
