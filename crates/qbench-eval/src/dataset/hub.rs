//! Hugging Face datasets-server provider

use super::DatasetProvider;
use super::record::Record;
use async_trait::async_trait;
use dashmap::DashMap;
use qbench_core::config::timeouts;
use qbench_core::{BenchError, BenchResult};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Public datasets-server endpoint
pub const DEFAULT_ENDPOINT: &str = "https://datasets-server.huggingface.co";

/// Rows requested per `/rows` page; the server's maximum
const PAGE_SIZE: usize = 100;

/// Configuration name the hub uses for datasets without subjects
const DEFAULT_CONFIG: &str = "default";

#[derive(Debug, Clone, Deserialize)]
struct SplitEntry {
    config: String,
    split: String,
}

#[derive(Debug, Deserialize)]
struct SplitsResponse {
    splits: Vec<SplitEntry>,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: Value,
}

#[derive(Debug, Deserialize)]
struct RowsResponse {
    rows: Vec<RowEntry>,
    num_rows_total: usize,
}

/// Provider backed by the datasets-server HTTP API
pub struct HubDatasetProvider {
    endpoint: String,
    token: Option<String>,
    http_client: Client,
    splits_cache: DashMap<String, Arc<Vec<SplitEntry>>>,
}

impl HubDatasetProvider {
    /// Create a provider against the public endpoint
    pub fn new() -> BenchResult<Self> {
        let http_client = Client::builder()
            .timeout(timeouts::hub::request_timeout())
            .build()
            .map_err(|e| BenchError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(DEFAULT_ENDPOINT, http_client))
    }

    /// Create a provider with an explicit endpoint and client
    pub fn with_client(endpoint: impl Into<String>, http_client: Client) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token: None,
            http_client,
            splits_cache: DashMap::new(),
        }
    }

    /// Access token for gated datasets
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> BenchResult<T> {
        let url = format!("{}{}", self.endpoint, path);
        let mut request = self.http_client.get(&url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BenchError::http(
                format!("datasets-server returned {}: {}", status, body),
                Some(url),
                Some(status.as_u16()),
            ));
        }
        Ok(response.json().await?)
    }

    async fn splits(&self, dataset: &str) -> BenchResult<Arc<Vec<SplitEntry>>> {
        if let Some(cached) = self.splits_cache.get(dataset) {
            return Ok(Arc::clone(cached.value()));
        }

        let response: SplitsResponse = self
            .get_json("/splits", &[("dataset", dataset.to_string())])
            .await
            .map_err(|e| BenchError::catalog(dataset, e.to_string()))?;
        let entries = Arc::new(response.splits);
        self.splits_cache
            .insert(dataset.to_string(), Arc::clone(&entries));
        Ok(entries)
    }
}

/// Subjects in first-seen order; a lone "default" config means no subjects
fn subjects_of(entries: &[SplitEntry]) -> Vec<String> {
    let mut subjects: Vec<String> = Vec::new();
    for entry in entries {
        if !subjects.contains(&entry.config) {
            subjects.push(entry.config.clone());
        }
    }
    if subjects.len() == 1 && subjects[0] == DEFAULT_CONFIG {
        subjects.clear();
    }
    subjects
}

fn splits_of(entries: &[SplitEntry], subject: Option<&str>) -> Vec<String> {
    let config = subject.unwrap_or(DEFAULT_CONFIG);
    entries
        .iter()
        .filter(|entry| entry.config == config)
        .map(|entry| entry.split.clone())
        .collect()
}

#[async_trait]
impl DatasetProvider for HubDatasetProvider {
    async fn list_subjects(&self, dataset: &str) -> BenchResult<Vec<String>> {
        Ok(subjects_of(&self.splits(dataset).await?))
    }

    async fn list_splits(&self, dataset: &str, subject: Option<&str>) -> BenchResult<Vec<String>> {
        Ok(splits_of(&self.splits(dataset).await?, subject))
    }

    async fn load_partition(
        &self,
        dataset: &str,
        subject: Option<&str>,
        split: &str,
    ) -> BenchResult<Vec<Record>> {
        let config = subject.unwrap_or(DEFAULT_CONFIG);
        let mut records = Vec::new();
        let mut offset = 0;

        loop {
            let page: RowsResponse = self
                .get_json(
                    "/rows",
                    &[
                        ("dataset", dataset.to_string()),
                        ("config", config.to_string()),
                        ("split", split.to_string()),
                        ("offset", offset.to_string()),
                        ("length", PAGE_SIZE.to_string()),
                    ],
                )
                .await?;

            let fetched = page.rows.len();
            for entry in page.rows {
                records.push(Record::from_value(entry.row)?);
            }
            offset += fetched;

            tracing::trace!(dataset, config, split, offset, total = page.num_rows_total, "fetched rows");
            if fetched == 0 || offset >= page.num_rows_total {
                break;
            }
        }

        Ok(records)
    }
}
