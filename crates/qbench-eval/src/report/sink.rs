//! Result artifacts

use crate::results::AnswerResult;
use crate::runner::PartitionOutcome;
use qbench_core::{BenchError, BenchResult};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes one JSON artifact per (dataset, model), replacing any previous one
#[derive(Debug, Clone)]
pub struct ResultSink {
    results_dir: PathBuf,
}

impl ResultSink {
    /// Sink writing under `results_dir`
    pub fn new(results_dir: impl AsRef<Path>) -> Self {
        Self {
            results_dir: results_dir.as_ref().to_path_buf(),
        }
    }

    /// Concatenate partition results; order is kept within a partition
    pub fn aggregate(partitions: Vec<PartitionOutcome>) -> Vec<AnswerResult> {
        partitions.into_iter().flat_map(|p| p.results).collect()
    }

    /// Where the artifact for (dataset, model) lives
    pub fn artifact_path(&self, dataset: &str, model: &str) -> PathBuf {
        self.results_dir.join(format!(
            "{}_result_{}.json",
            sanitize(dataset),
            sanitize(model)
        ))
    }

    /// Write `results` as the artifact for (dataset, model).
    ///
    /// The file is written next to the target and renamed over it, so readers
    /// see either the old artifact or the new one. Results with a repeated
    /// question id are rejected before anything is written.
    pub async fn persist(
        &self,
        dataset: &str,
        model: &str,
        results: &[AnswerResult],
    ) -> BenchResult<PathBuf> {
        let mut ids = HashSet::with_capacity(results.len());
        if let Some(duplicate) = results.iter().find(|r| !ids.insert(&r.id)) {
            return Err(BenchError::catalog(
                dataset,
                format!("duplicate question id in results: {}", duplicate.id),
            ));
        }

        let body = serde_json::to_vec_pretty(results)?;
        let dir = self.results_dir.clone();
        let path = self.artifact_path(dataset, model);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| BenchError::io_with_path(e.to_string(), dir.display().to_string()))?;

        let target = path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &target, &body))
            .await
            .map_err(|e| BenchError::io(format!("writer task failed: {}", e)))??;

        tracing::info!(path = %path.display(), records = results.len(), "results saved");
        Ok(path)
    }

    /// Read an artifact back
    pub async fn load(path: impl AsRef<Path>) -> BenchResult<Vec<AnswerResult>> {
        let path = path.as_ref();
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| BenchError::io_with_path(e.to_string(), path.display().to_string()))?;
        Ok(serde_json::from_slice(&content)?)
    }
}

fn write_atomic(dir: &Path, target: &Path, body: &[u8]) -> BenchResult<()> {
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(body)?;
    file.as_file().sync_all()?;
    file.persist(target)
        .map_err(|e| BenchError::io_with_path(e.error.to_string(), target.display().to_string()))?;
    Ok(())
}

fn sanitize(name: &str) -> String {
    name.replace(['/', '\\', ':'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::QuestionIdGenerator;
    use qbench_core::Answer;
    use tempfile::TempDir;

    fn results(n: usize) -> Vec<AnswerResult> {
        let ids = QuestionIdGenerator::new();
        (0..n)
            .map(|i| AnswerResult::new(ids.generate(Some("S1"), "train", i), Answer::Text("A".into())))
            .collect()
    }

    #[test]
    fn test_artifact_path_is_flat() {
        let sink = ResultSink::new("results");
        assert_eq!(
            sink.artifact_path("MMMU/MMMU", "llava:13b"),
            PathBuf::from("results/MMMU_MMMU_result_llava_13b.json")
        );
    }

    #[tokio::test]
    async fn test_persist_overwrites() {
        let tmp = TempDir::new().unwrap();
        let sink = ResultSink::new(tmp.path().join("out"));

        let path = sink.persist("cais/mmlu", "llama3.2", &results(5)).await.unwrap();
        assert_eq!(ResultSink::load(&path).await.unwrap().len(), 5);

        let again = sink.persist("cais/mmlu", "llama3.2", &results(2)).await.unwrap();
        assert_eq!(again, path);
        assert_eq!(ResultSink::load(&path).await.unwrap(), results(2));

        // no temp files left behind
        let entries = std::fs::read_dir(tmp.path().join("out")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_artifact_is_pretty_json_array() {
        let tmp = TempDir::new().unwrap();
        let sink = ResultSink::new(tmp.path());
        let mut rows = results(1);
        rows.push(AnswerResult::new(
            QuestionIdGenerator::new().generate(None, "test", 0),
            Answer::failed("Connection error: refused"),
        ));

        let path = sink.persist("d", "m", &rows).await.unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("[\n"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[1]["answer"], serde_json::Value::Null);
        assert_eq!(value[1]["error"], "Connection error: refused");
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_not_written() {
        let tmp = TempDir::new().unwrap();
        let sink = ResultSink::new(tmp.path().join("out"));
        let mut rows = results(2);
        rows.push(rows[0].clone());

        let err = sink.persist("d", "m", &rows).await.unwrap_err();
        assert!(matches!(err, BenchError::Catalog { .. }));
        assert!(err.to_string().contains("S1_train_0"));
        assert!(!sink.artifact_path("d", "m").exists());
    }

    #[test]
    fn test_aggregate_keeps_partition_order() {
        let outcome = PartitionOutcome {
            partition: crate::dataset::PartitionId::new("d", Some("S1"), "train"),
            results: results(3),
            sampled: 3,
            cancelled: false,
        };
        let all = ResultSink::aggregate(vec![outcome.clone(), outcome]);
        assert_eq!(all.len(), 6);
        assert_eq!(all[2].id.as_str(), "S1_train_2");
    }
}
