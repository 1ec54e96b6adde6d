use crate::spec::transform::aggregate::AggregateOpSpec;
use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::Field;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinAggregateTransformSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groupby: Option<Vec<Field>>,

    pub fields: Vec<Option<Field>>,

    pub ops: Vec<AggregateOpSpec>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<Vec<Option<String>>>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl TransformSpecTrait for JoinAggregateTransformSpec {
    fn output_fields(&self) -> Vec<String> {
        let as_ = self.as_.clone().unwrap_or_default();
        self.ops
            .iter()
            .enumerate()
            .map(|(i, op)| match as_.get(i).cloned().flatten() {
                Some(name) => name,
                None => match self.fields.get(i).cloned().flatten() {
                    Some(field) => format!("{}_{}", op.name(), field.field()),
                    None => op.name().to_string(),
                },
            })
            .collect()
    }
}
