use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::{Field, NumberOrSignalSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTransformSpec {
    pub x: Field,

    pub y: Field,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub groupby: Option<Vec<Field>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<RegressionMethodSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<[NumberOrSignalSpec; 2]>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<[String; 2]>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegressionMethodSpec {
    Linear,
    Log,
    Exp,
    Pow,
    Quad,
    Poly,
}

impl TransformSpecTrait for RegressionTransformSpec {
    fn output_fields(&self) -> Vec<String> {
        match &self.as_ {
            Some(as_) => as_.to_vec(),
            None => vec![self.x.field(), self.y.field()],
        }
    }
}
