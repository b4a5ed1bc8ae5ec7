//! In-process dataset provider

use super::DatasetProvider;
use super::record::Record;
use async_trait::async_trait;
use qbench_core::{BenchError, BenchResult};
use std::collections::BTreeMap;

type Splits = BTreeMap<String, Vec<Record>>;

/// Datasets held in memory; useful for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryDatasetProvider {
    datasets: BTreeMap<String, BTreeMap<Option<String>, Splits>>,
}

impl MemoryDatasetProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) one partition
    pub fn with_partition(
        mut self,
        dataset: &str,
        subject: Option<&str>,
        split: &str,
        records: Vec<Record>,
    ) -> Self {
        self.datasets
            .entry(dataset.to_string())
            .or_default()
            .entry(subject.map(str::to_string))
            .or_default()
            .insert(split.to_string(), records);
        self
    }

    fn subjects(&self, dataset: &str) -> BenchResult<&BTreeMap<Option<String>, Splits>> {
        self.datasets
            .get(dataset)
            .ok_or_else(|| BenchError::catalog(dataset, "dataset not found"))
    }
}

#[async_trait]
impl DatasetProvider for MemoryDatasetProvider {
    async fn list_subjects(&self, dataset: &str) -> BenchResult<Vec<String>> {
        Ok(self.subjects(dataset)?.keys().flatten().cloned().collect())
    }

    async fn list_splits(&self, dataset: &str, subject: Option<&str>) -> BenchResult<Vec<String>> {
        let subjects = self.subjects(dataset)?;
        let splits = subjects
            .get(&subject.map(str::to_string))
            .ok_or_else(|| BenchError::catalog(dataset, format!("subject {:?} not found", subject)))?;
        Ok(splits.keys().cloned().collect())
    }

    async fn load_partition(
        &self,
        dataset: &str,
        subject: Option<&str>,
        split: &str,
    ) -> BenchResult<Vec<Record>> {
        let partition = || match subject {
            Some(subject) => format!("{}:{}", subject, split),
            None => split.to_string(),
        };
        self.datasets
            .get(dataset)
            .and_then(|subjects| subjects.get(&subject.map(str::to_string)))
            .and_then(|splits| splits.get(split))
            .cloned()
            .ok_or_else(|| BenchError::load(partition(), "split not found"))
    }
}
