use std::collections::HashSet;
use std::fmt::Debug;
use std::fs::File;
use std::hash::Hash;
use std::io::BufReader;

use serde::{
    Deserialize,
    Serialize
};
use serde::de::DeserializeOwned;

use crate::equalizationerror::{
    EqualizationError,
    Result
};

pub const NUM_FIELDS: usize = 2;

/// One observation: an opaque key and the two indicator values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow<K> {
    key: K,
    values: [f64; NUM_FIELDS],
}

impl<K> ObservationRow<K> {
    pub fn new(key: K, values: [f64; NUM_FIELDS]) -> ObservationRow<K> {
        ObservationRow { key, values }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn values(&self) -> &[f64; NUM_FIELDS] {
        &self.values
    }

    pub fn value(&self, field: usize) -> f64 {
        self.values[field]
    }
}

#[derive(Deserialize)]
struct SampleJsonProp<K> {
    #[serde(default = "default_labels")]
    labels: [String; NUM_FIELDS],
    rows: Vec<ObservationRow<K>>,
}

fn default_labels() -> [String; NUM_FIELDS] {
    ["field 0".to_owned(), "field 1".to_owned()]
}

/// Read-only two-field input data. Row positions act as the row identifiers
/// throughout the pipeline; `key` is carried along for the output side.
#[derive(Debug, Clone)]
pub struct Sample<K> {
    labels: [String; NUM_FIELDS],
    rows: Vec<ObservationRow<K>>,
}

impl<K> Sample<K>
where
    K: Clone + Eq + Hash + Debug,
{
    pub fn new(rows: Vec<ObservationRow<K>>) -> Result<Sample<K>> {
        Self::with_labels(default_labels(), rows)
    }

    pub fn with_labels(labels: [String; NUM_FIELDS], rows: Vec<ObservationRow<K>>) -> Result<Sample<K>> {
        let mut seen = HashSet::with_capacity(rows.len());
        for (row, observation) in rows.iter().enumerate() {
            if !seen.insert(observation.key()) {
                return Err(EqualizationError::DuplicateRowKey(format!("{:?}", observation.key())));
            }
            for (field, value) in observation.values().iter().enumerate() {
                if !value.is_finite() {
                    return Err(EqualizationError::NonFiniteValue { row, field, value: *value });
                }
            }
        }
        Ok(Sample { labels, rows })
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (K, f64, f64)>) -> Result<Sample<K>> {
        let rows = pairs
            .into_iter()
            .map(|(key, v0, v1)| ObservationRow::new(key, [v0, v1]))
            .collect();
        Self::new(rows)
    }
}

impl<K> Sample<K>
where
    K: Clone + Eq + Hash + Debug + DeserializeOwned,
{
    /// Loads `{"labels": [..], "rows": [{"key": .., "values": [a, b]}, ..]}`.
    pub fn from_reader(file_path: &str) -> Result<Sample<K>> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let json_prop: SampleJsonProp<K> = serde_json::from_reader(reader)?;
        Self::with_labels(json_prop.labels, json_prop.rows)
    }
}

impl<K> Sample<K> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ObservationRow<K>] {
        &self.rows
    }

    pub fn labels(&self) -> &[String; NUM_FIELDS] {
        &self.labels
    }

    pub fn label(&self, field: usize) -> &str {
        &self.labels[field]
    }

    /// Raw values of one field in original row order.
    pub fn column(&self, field: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row.value(field)).collect()
    }
}
