//! Stable question identifiers

use crate::dataset::PartitionId;
use qbench_core::{BenchConfig, BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Identifier of one (subject, split, index) item within a dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Identifier as `&str`
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<QuestionId> for String {
    fn from(id: QuestionId) -> Self {
        id.0
    }
}

/// Builds `{subject}_{split}_{index}` (or `{split}_{index}`) identifiers,
/// optionally replacing split names with configured short codes.
#[derive(Debug, Clone, Default)]
pub struct QuestionIdGenerator {
    split_aliases: BTreeMap<String, String>,
}

impl QuestionIdGenerator {
    /// Generator that uses split names verbatim
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator with split short codes
    pub fn with_aliases(split_aliases: BTreeMap<String, String>) -> Self {
        Self { split_aliases }
    }

    /// Generator using the aliases configured in `config`
    pub fn from_config(config: &BenchConfig) -> Self {
        Self::with_aliases(config.split_aliases.clone())
    }

    fn split_code<'a>(&'a self, split: &'a str) -> &'a str {
        self.split_aliases
            .get(split)
            .map(String::as_str)
            .unwrap_or(split)
    }

    /// Everything before the index; identifiers of two partitions can only
    /// coincide when their prefixes do, since the index has no `_`.
    fn prefix(&self, subject: Option<&str>, split: &str) -> String {
        let split = self.split_code(split);
        match subject {
            Some(subject) => format!("{}_{}", subject, split),
            None => split.to_string(),
        }
    }

    /// Identifier for one item
    pub fn generate(&self, subject: Option<&str>, split: &str, index: usize) -> QuestionId {
        QuestionId(format!("{}_{}", self.prefix(subject, split), index))
    }

    /// Reject partition sets whose identifiers would collide
    pub fn check_partitions(&self, partitions: &[PartitionId]) -> BenchResult<()> {
        let mut seen: HashMap<String, &PartitionId> = HashMap::new();
        for partition in partitions {
            let prefix = self.prefix(partition.subject(), &partition.split);
            if let Some(other) = seen.insert(prefix.clone(), partition) {
                return Err(BenchError::catalog(
                    partition.dataset.clone(),
                    format!(
                        "partitions {} and {} would share question ids with prefix '{}'",
                        other, partition, prefix
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_formats() {
        let ids = QuestionIdGenerator::new();
        assert_eq!(ids.generate(Some("S1"), "train", 4).as_str(), "S1_train_4");
        assert_eq!(ids.generate(None, "test", 0).as_str(), "test_0");
    }

    #[test]
    fn test_short_codes() {
        let ids = QuestionIdGenerator::with_aliases(BenchConfig::short_split_aliases());
        assert_eq!(
            ids.generate(Some("anatomy"), "validation", 12).as_str(),
            "anatomy_val_12"
        );
        assert_eq!(ids.generate(None, "dev", 1).as_str(), "dev_1");
    }

    #[test]
    fn test_injective_over_partitions() {
        let ids = QuestionIdGenerator::new();
        let mut seen = HashSet::new();
        for subject in [Some("high_school_biology"), Some("anatomy"), None] {
            for split in ["train", "test"] {
                for index in 0..20 {
                    assert!(seen.insert(ids.generate(subject, split, index)));
                }
            }
        }
    }

    #[test]
    fn test_colliding_partitions_are_rejected() {
        let ids = QuestionIdGenerator::new();
        let partitions = vec![
            PartitionId::new("d", Some("a_b"), "c"),
            PartitionId::new("d", Some("a"), "b_c"),
        ];
        let err = ids.check_partitions(&partitions).unwrap_err();
        assert!(err.is_fatal());

        let fine = vec![
            PartitionId::new("d", Some("a"), "train"),
            PartitionId::new("d", Some("b"), "train"),
        ];
        assert!(ids.check_partitions(&fine).is_ok());
    }
}
