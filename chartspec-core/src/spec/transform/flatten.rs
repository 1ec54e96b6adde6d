use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::Field;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlattenTransformSpec {
    pub fields: Vec<Field>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl TransformSpecTrait for FlattenTransformSpec {
    fn output_fields(&self) -> Vec<String> {
        match &self.as_ {
            Some(as_) => as_.clone(),
            None => self.fields.iter().map(|f| f.field()).collect(),
        }
    }
}
