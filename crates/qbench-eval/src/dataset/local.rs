//! Datasets stored as JSON Lines / JSON files on disk
//!
//! Layout: `<root>/<dataset>/<subject>/<split>.jsonl` (or `.json`). A dataset
//! directory holding split files directly has no subjects.

use super::DatasetProvider;
use super::record::Record;
use async_trait::async_trait;
use qbench_core::{BenchError, BenchResult};
use std::path::{Path, PathBuf};
use tokio::fs;

const SPLIT_EXTENSIONS: [&str; 2] = ["jsonl", "json"];

/// Provider reading datasets from a directory tree
#[derive(Debug, Clone)]
pub struct LocalDatasetProvider {
    root: PathBuf,
}

impl LocalDatasetProvider {
    /// Create a provider rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dataset_dir(&self, dataset: &str) -> PathBuf {
        self.root.join(dataset)
    }

    fn partition_dir(&self, dataset: &str, subject: Option<&str>) -> PathBuf {
        match subject {
            Some(subject) => self.dataset_dir(dataset).join(subject),
            None => self.dataset_dir(dataset),
        }
    }
}

fn split_name(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !SPLIT_EXTENSIONS.contains(&ext) {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_string)
}

async fn split_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut splits = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            if let Some(name) = split_name(&entry.path()) {
                splits.push(name);
            }
        }
    }
    splits.sort();
    splits.dedup();
    Ok(splits)
}

fn parse_records(path: &Path, content: &str) -> BenchResult<Vec<Record>> {
    let is_lines = path.extension().and_then(|e| e.to_str()) == Some("jsonl");
    if is_lines {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                let value = serde_json::from_str(line).map_err(|e| {
                    BenchError::json(format!("{}:{}: {}", path.display(), n + 1, e))
                })?;
                Record::from_value(value)
            })
            .collect()
    } else {
        let values: Vec<serde_json::Value> = serde_json::from_str(content)
            .map_err(|e| BenchError::json(format!("{}: {}", path.display(), e)))?;
        values.into_iter().map(Record::from_value).collect()
    }
}

#[async_trait]
impl DatasetProvider for LocalDatasetProvider {
    async fn list_subjects(&self, dataset: &str) -> BenchResult<Vec<String>> {
        let dir = self.dataset_dir(dataset);
        let mut entries = fs::read_dir(&dir).await.map_err(|e| {
            BenchError::catalog(dataset, format!("cannot read {}: {}", dir.display(), e))
        })?;

        let mut subjects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            // Nested dataset names (org/name) share the tree; only directories
            // holding split files count as subjects.
            if split_files(&entry.path()).await?.is_empty() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                subjects.push(name.to_string());
            }
        }
        subjects.sort();
        Ok(subjects)
    }

    async fn list_splits(&self, dataset: &str, subject: Option<&str>) -> BenchResult<Vec<String>> {
        let dir = self.partition_dir(dataset, subject);
        split_files(&dir).await.map_err(|e| {
            BenchError::catalog(dataset, format!("cannot read {}: {}", dir.display(), e))
        })
    }

    async fn load_partition(
        &self,
        dataset: &str,
        subject: Option<&str>,
        split: &str,
    ) -> BenchResult<Vec<Record>> {
        let dir = self.partition_dir(dataset, subject);
        for ext in SPLIT_EXTENSIONS {
            let path = dir.join(format!("{}.{}", split, ext));
            match fs::read_to_string(&path).await {
                Ok(content) => return parse_records(&path, &content),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(BenchError::io_with_path(e.to_string(), path.display().to_string()));
                }
            }
        }
        Err(BenchError::io_with_path(
            format!("split '{}' not found", split),
            dir.display().to_string(),
        ))
    }
}
