//! Run execution
//!
//! [`BenchRunner`] wires the pieces for one (dataset, model) run: a
//! [`WorkPool`] schedules one [`PartitionWorker`] task per partition and the
//! collected results go to the result sink.

mod harness;
mod pool;
mod progress;
mod worker;

pub use harness::{BenchRunner, RunReport};
pub use pool::{PoolOutcome, WorkPool};
pub use progress::{ProgressCallback, RunProgress};
pub use worker::{PartitionOutcome, PartitionWorker};
