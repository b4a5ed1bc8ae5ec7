//! Run summary

use crate::runner::PoolOutcome;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters reported at the end of each run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub partitions_attempted: usize,
    pub partitions_skipped: usize,
    /// Results collected, successful or not
    pub items_processed: usize,
    /// Results carrying the error sentinel
    pub items_failed: usize,
    pub elapsed_secs: f64,
    pub cancelled: bool,
}

impl RunSummary {
    /// Summarize a pool run
    pub fn from_outcome(outcome: &PoolOutcome, elapsed: Duration) -> Self {
        Self {
            partitions_attempted: outcome.attempted,
            partitions_skipped: outcome.skipped.len(),
            items_processed: outcome.partitions.iter().map(|p| p.results.len()).sum(),
            items_failed: outcome.partitions.iter().map(|p| p.failed()).sum(),
            elapsed_secs: elapsed.as_secs_f64(),
            cancelled: outcome.cancelled,
        }
    }

    /// Fraction of processed items that got an answer
    pub fn answer_rate(&self) -> f64 {
        if self.items_processed == 0 {
            0.0
        } else {
            (self.items_processed - self.items_failed) as f64 / self.items_processed as f64
        }
    }

    /// Log the summary
    pub fn log(&self, dataset: &str, model: &str) {
        tracing::info!(
            dataset,
            model,
            partitions_attempted = self.partitions_attempted,
            partitions_skipped = self.partitions_skipped,
            items_processed = self.items_processed,
            items_failed = self.items_failed,
            elapsed_secs = self.elapsed_secs,
            cancelled = self.cancelled,
            "benchmark run finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::PartitionId;
    use crate::results::AnswerResult;
    use crate::runner::PartitionOutcome;
    use crate::sampling::QuestionIdGenerator;
    use qbench_core::{Answer, BenchError};

    #[test]
    fn test_counts() {
        let ids = QuestionIdGenerator::new();
        let partition = PartitionId::new("d", None, "test");
        let outcome = PoolOutcome {
            partitions: vec![PartitionOutcome {
                partition: partition.clone(),
                results: vec![
                    AnswerResult::new(ids.generate(None, "test", 0), Answer::Text("A".into())),
                    AnswerResult::new(ids.generate(None, "test", 1), Answer::failed("x")),
                ],
                sampled: 2,
                cancelled: false,
            }],
            skipped: vec![(partition, BenchError::load("test", "gone"))],
            attempted: 2,
            total: 2,
            cancelled: false,
        };

        let summary = RunSummary::from_outcome(&outcome, Duration::from_millis(1500));
        assert_eq!(summary.partitions_attempted, 2);
        assert_eq!(summary.partitions_skipped, 1);
        assert_eq!(summary.items_processed, 2);
        assert_eq!(summary.items_failed, 1);
        assert_eq!(summary.elapsed_secs, 1.5);
        assert_eq!(summary.answer_rate(), 0.5);
    }
}
