//! Partition loading

use super::DatasetProvider;
use super::record::{PartitionData, PartitionId};
use qbench_core::{BenchError, BenchResult};
use std::sync::Arc;

/// Loads one partition; failures are `Load` errors scoped to that partition
#[derive(Clone)]
pub struct PartitionLoader {
    provider: Arc<dyn DatasetProvider>,
}

impl PartitionLoader {
    /// Create a loader over a provider
    pub fn new(provider: Arc<dyn DatasetProvider>) -> Self {
        Self { provider }
    }

    /// Load all records of `partition`
    pub async fn load(&self, partition: &PartitionId) -> BenchResult<PartitionData> {
        let records = self
            .provider
            .load_partition(&partition.dataset, partition.subject(), &partition.split)
            .await
            .map_err(|e| match e {
                BenchError::Load { .. } => e,
                other => BenchError::load(partition.to_string(), other.to_string()),
            })?;

        tracing::debug!(partition = %partition, records = records.len(), "partition loaded");
        Ok(PartitionData::new(partition.clone(), records))
    }
}
