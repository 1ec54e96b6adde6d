use crate::spec::transform::TransformSpecTrait;
use crate::spec::values::Field;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateTransformSpec {
    pub groupby: Vec<Field>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Option<Field>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ops: Option<Vec<AggregateOpSpec>>,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<Vec<Option<String>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop: Option<bool>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOpSpec {
    Count,
    Valid,
    Missing,
    Distinct,
    Sum,
    Mean,
    Average,
    Median,
    Min,
    Max,
    Argmin,
    Argmax,
    Values,
}

impl AggregateOpSpec {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateOpSpec::Count => "count",
            AggregateOpSpec::Valid => "valid",
            AggregateOpSpec::Missing => "missing",
            AggregateOpSpec::Distinct => "distinct",
            AggregateOpSpec::Sum => "sum",
            AggregateOpSpec::Mean => "mean",
            AggregateOpSpec::Average => "average",
            AggregateOpSpec::Median => "median",
            AggregateOpSpec::Min => "min",
            AggregateOpSpec::Max => "max",
            AggregateOpSpec::Argmin => "argmin",
            AggregateOpSpec::Argmax => "argmax",
            AggregateOpSpec::Values => "values",
        }
    }
}

impl TransformSpecTrait for AggregateTransformSpec {
    fn output_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self.groupby.iter().map(|f| f.field()).collect();
        let ops = self.ops.clone().unwrap_or_else(|| vec![AggregateOpSpec::Count]);
        let as_ = self.as_.clone().unwrap_or_default();
        let input_fields = self.fields.clone().unwrap_or_default();
        for (i, op) in ops.iter().enumerate() {
            match as_.get(i).cloned().flatten() {
                Some(name) => fields.push(name),
                None => match input_fields.get(i).cloned().flatten() {
                    Some(field) => fields.push(format!("{}_{}", op.name(), field.field())),
                    None => fields.push(op.name().to_string()),
                },
            }
        }
        fields
    }
}
