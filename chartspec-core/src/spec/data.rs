use crate::spec::transform::TransformSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSpec {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<TransformSpec>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl DataSpec {
    /// A dataset derived from `source` with an empty pipeline
    pub fn derived<N: Into<String>, S: Into<String>>(name: N, source: S) -> Self {
        Self {
            name: name.into(),
            source: Some(source.into()),
            values: None,
            transform: Vec::new(),
            extra: Default::default(),
        }
    }

    /// Every field produced by this dataset's own pipeline, in pipeline order
    pub fn output_fields(&self) -> Vec<String> {
        self.transform
            .iter()
            .flat_map(|tx| tx.output_fields())
            .collect()
    }

    /// Append `tx` unless an equal transform is already present
    pub fn push_transform_once(&mut self, tx: TransformSpec) -> bool {
        if self.transform.contains(&tx) {
            false
        } else {
            self.transform.push(tx);
            true
        }
    }

    pub fn has_transform_output(&self, field: &str) -> bool {
        self.transform
            .iter()
            .any(|tx| tx.output_fields().iter().any(|f| f == field))
    }
}
