use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::NumberOrSignalSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Automatic label placement that avoids overlapping other marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTransformSpec {
    pub size: [NumberOrSignalSpec; 2],

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchor: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offset: Vec<f64>,

    #[serde(rename = "avoidMarks", default, skip_serializing_if = "Vec::is_empty")]
    pub avoid_marks: Vec<String>,

    #[serde(rename = "avoidBaseMark", skip_serializing_if = "Option::is_none")]
    pub avoid_base_mark: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl TransformSpecTrait for LabelTransformSpec {
    fn output_fields(&self) -> Vec<String> {
        ["x", "y", "opacity", "align", "baseline"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
