//! Progress reporting

use crate::dataset::PartitionId;
use std::sync::Arc;

/// Callback for progress updates during a run; invoked from worker tasks
pub type ProgressCallback = Arc<dyn Fn(RunProgress) + Send + Sync>;

/// Progress update during a run
#[derive(Debug, Clone)]
pub enum RunProgress {
    /// A partition task was scheduled
    PartitionStarted {
        partition: PartitionId,
        /// Position in catalog order (0-based)
        position: usize,
        /// Number of partitions in the dataset
        total: usize,
    },
    /// A partition finished, possibly early on cancellation
    PartitionFinished {
        partition: PartitionId,
        items: usize,
        failed: usize,
    },
    /// A partition could not be loaded and was skipped
    PartitionSkipped {
        partition: PartitionId,
        reason: String,
    },
}

impl RunProgress {
    /// Partition the event is about
    pub fn partition(&self) -> &PartitionId {
        match self {
            Self::PartitionStarted { partition, .. }
            | Self::PartitionFinished { partition, .. }
            | Self::PartitionSkipped { partition, .. } => partition,
        }
    }
}
