//! Records and partitions

use qbench_core::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One raw dataset row: field name to value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create a record from a JSON object
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Create a record from any JSON value; only objects are accepted
    pub fn from_value(value: Value) -> BenchResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(BenchError::json(format!(
                "record must be a JSON object, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Field value, treating JSON null as absent
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// String field value
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// All fields
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Identifies one (dataset, subject, split) partition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId {
    pub dataset: String,
    pub subject: Option<String>,
    pub split: String,
}

impl PartitionId {
    /// Create a partition id
    pub fn new(dataset: impl Into<String>, subject: Option<&str>, split: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            subject: subject.map(str::to_string),
            split: split.into(),
        }
    }

    /// Subject as `&str`
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "{}:{}", subject, self.split),
            None => write!(f, "{}", self.split),
        }
    }
}

/// A loaded partition: ordered, length-known, indexable
#[derive(Debug, Clone)]
pub struct PartitionData {
    id: PartitionId,
    records: Vec<Record>,
}

impl PartitionData {
    /// Wrap loaded records
    pub fn new(id: PartitionId, records: Vec<Record>) -> Self {
        Self { id, records }
    }

    /// Partition identity
    pub fn id(&self) -> &PartitionId {
        &self.id
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the partition has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_null_is_absent() {
        let record = Record::from_value(json!({"question": "q", "image": null})).unwrap();
        assert_eq!(record.get_str("question"), Some("q"));
        assert!(record.get("image").is_none());
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn test_record_rejects_non_objects() {
        let err = Record::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_partition_display() {
        assert_eq!(PartitionId::new("d", Some("S1"), "train").to_string(), "S1:train");
        assert_eq!(PartitionId::new("d", None, "test").to_string(), "test");
    }

    #[test]
    fn test_partition_data_indexing() {
        let records = vec![Record::default(), Record::from_value(json!({"a": 1})).unwrap()];
        let data = PartitionData::new(PartitionId::new("d", None, "test"), records);
        assert_eq!(data.len(), 2);
        assert!(data.get(1).unwrap().get("a").is_some());
        assert!(data.get(2).is_none());
    }
}
