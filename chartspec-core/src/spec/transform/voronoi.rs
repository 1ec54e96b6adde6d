use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::{Field, NumberOrSignalSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Tessellates point positions into hit-target polygons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoronoiTransformSpec {
    pub x: Field,

    pub y: Field,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<[NumberOrSignalSpec; 2]>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl TransformSpecTrait for VoronoiTransformSpec {
    fn output_fields(&self) -> Vec<String> {
        vec![self.as_.clone().unwrap_or_else(|| "path".to_string())]
    }
}
