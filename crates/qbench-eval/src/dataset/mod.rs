//! Dataset access
//!
//! A dataset is split into partitions, one per (subject, split). Providers
//! enumerate and load partitions; [`DatasetCatalog`] and [`PartitionLoader`]
//! put the harness's error scoping on top of them.

mod catalog;
mod hub;
mod loader;
mod local;
mod memory;
mod record;

pub use catalog::DatasetCatalog;
pub use hub::HubDatasetProvider;
pub use loader::PartitionLoader;
pub use local::LocalDatasetProvider;
pub use memory::MemoryDatasetProvider;
pub use record::{PartitionData, PartitionId, Record};

use async_trait::async_trait;
use qbench_core::BenchResult;

/// Source of question collections
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    /// Subject (configuration) names; empty when the dataset has none
    async fn list_subjects(&self, dataset: &str) -> BenchResult<Vec<String>>;

    /// Split names for one subject (`None` for datasets without subjects)
    async fn list_splits(&self, dataset: &str, subject: Option<&str>) -> BenchResult<Vec<String>>;

    /// All records of one partition, in order
    async fn load_partition(
        &self,
        dataset: &str,
        subject: Option<&str>,
        split: &str,
    ) -> BenchResult<Vec<Record>>;
}
