//! Persistence and run summaries

mod sink;
mod summary;

pub use sink::ResultSink;
pub use summary::RunSummary;
