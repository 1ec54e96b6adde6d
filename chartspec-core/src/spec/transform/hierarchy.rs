use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::{CompareSpec, Field, NumberOrSignalSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Builds a tree from flat rows using a key and a parent key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratifyTransformSpec {
    pub key: Field,

    #[serde(rename = "parentKey")]
    pub parent_key: Field,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl TransformSpecTrait for StratifyTransformSpec {}

/// Adjacency (sunburst/icicle) layout of a stratified tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionTransformSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<CompareSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<[NumberOrSignalSpec; 2]>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl TransformSpecTrait for PartitionTransformSpec {
    fn output_fields(&self) -> Vec<String> {
        self.as_.clone().unwrap_or_else(|| {
            ["x0", "y0", "x1", "y1", "depth", "children"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapTransformSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<CompareSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<TreemapMethodSpec>,

    #[serde(rename = "paddingInner", skip_serializing_if = "Option::is_none")]
    pub padding_inner: Option<f64>,

    #[serde(rename = "paddingTop", skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<[NumberOrSignalSpec; 2]>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreemapMethodSpec {
    Squarify,
    Resquarify,
    Binary,
    Dice,
    Slice,
    SliceDice,
}

impl TransformSpecTrait for TreemapTransformSpec {
    fn output_fields(&self) -> Vec<String> {
        self.as_.clone().unwrap_or_else(|| {
            ["x0", "y0", "x1", "y1", "depth", "children"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }
}
