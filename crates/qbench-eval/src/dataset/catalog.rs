//! Partition enumeration

use super::DatasetProvider;
use super::record::PartitionId;
use qbench_core::{BenchError, BenchResult};
use std::sync::Arc;

/// Enumerates the (subject, split) partitions of a dataset.
///
/// Every failure is a `Catalog` error and ends the dataset run.
#[derive(Clone)]
pub struct DatasetCatalog {
    provider: Arc<dyn DatasetProvider>,
}

impl DatasetCatalog {
    /// Create a catalog over a provider
    pub fn new(provider: Arc<dyn DatasetProvider>) -> Self {
        Self { provider }
    }

    /// Subjects, or a single `None` placeholder for datasets without any
    pub async fn subjects(&self, dataset: &str) -> BenchResult<Vec<Option<String>>> {
        let subjects = self
            .provider
            .list_subjects(dataset)
            .await
            .map_err(|e| as_catalog_error(dataset, e))?;

        if subjects.is_empty() {
            Ok(vec![None])
        } else {
            Ok(subjects.into_iter().map(Some).collect())
        }
    }

    /// Splits of one subject
    pub async fn splits(&self, dataset: &str, subject: Option<&str>) -> BenchResult<Vec<String>> {
        self.provider
            .list_splits(dataset, subject)
            .await
            .map_err(|e| as_catalog_error(dataset, e))
    }

    /// Every partition of the dataset, subject-major
    pub async fn partitions(&self, dataset: &str) -> BenchResult<Vec<PartitionId>> {
        let mut partitions = Vec::new();
        for subject in self.subjects(dataset).await? {
            let splits = self.splits(dataset, subject.as_deref()).await?;
            if splits.is_empty() {
                tracing::warn!(dataset, subject = ?subject, "subject has no splits");
            }
            for split in splits {
                partitions.push(PartitionId::new(dataset, subject.as_deref(), split));
            }
        }
        Ok(partitions)
    }
}

fn as_catalog_error(dataset: &str, error: BenchError) -> BenchError {
    match error {
        BenchError::Catalog { .. } => error,
        other => BenchError::catalog(dataset, other.to_string()),
    }
}
