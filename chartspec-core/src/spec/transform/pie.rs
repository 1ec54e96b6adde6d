use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::{Field, NumberOrSignalSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieTransformSpec {
    pub field: Field,

    #[serde(rename = "startAngle", skip_serializing_if = "Option::is_none")]
    pub start_angle: Option<NumberOrSignalSpec>,

    #[serde(rename = "endAngle", skip_serializing_if = "Option::is_none")]
    pub end_angle: Option<NumberOrSignalSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<bool>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<[String; 2]>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl PieTransformSpec {
    pub fn as_(&self) -> Vec<String> {
        match &self.as_ {
            Some(as_) => as_.to_vec(),
            None => vec!["startAngle".to_string(), "endAngle".to_string()],
        }
    }
}

impl TransformSpecTrait for PieTransformSpec {
    fn output_fields(&self) -> Vec<String> {
        self.as_()
    }
}
