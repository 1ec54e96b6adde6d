use crate::spec::values::SignalExpressionSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleSpec {
    pub name: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<ScaleTypeSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<ScaleDomainSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<ScaleRangeSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,

    #[serde(rename = "paddingInner", skip_serializing_if = "Option::is_none")]
    pub padding_inner: Option<f64>,

    #[serde(rename = "paddingOuter", skip_serializing_if = "Option::is_none")]
    pub padding_outer: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nice: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero: Option<bool>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ScaleSpec {
    pub fn new<S: Into<String>>(name: S, type_: ScaleTypeSpec) -> Self {
        Self {
            name: name.into(),
            type_: Some(type_),
            domain: None,
            range: None,
            padding: None,
            padding_inner: None,
            padding_outer: None,
            nice: None,
            zero: None,
            extra: Default::default(),
        }
    }

    /// Field names referenced by a `fields` domain, empty for any other domain kind
    pub fn domain_fields(&self) -> Vec<String> {
        match &self.domain {
            Some(ScaleDomainSpec::FieldsReference(refs)) => {
                refs.fields.iter().map(|r| r.field.clone()).collect()
            }
            Some(ScaleDomainSpec::FieldReference(r)) => vec![r.field.clone()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleTypeSpec {
    Linear,
    Log,
    Pow,
    Sqrt,
    Symlog,
    Time,
    Utc,
    Sequential,
    Ordinal,
    Band,
    Point,
    Quantile,
    Quantize,
    Threshold,
    #[serde(rename = "bin-ordinal")]
    BinOrdinal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleDomainSpec {
    FieldsReference(ScaleDataReferencesSpec),
    FieldReference(ScaleDataReferenceSpec),
    Signal(SignalExpressionSpec),
    Array(Vec<ScaleArrayElementSpec>),
    Value(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleDataReferencesSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    pub fields: Vec<ScaleDataReferenceSpec>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleDataReferenceSpec {
    pub data: String,
    pub field: String,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ScaleDataReferenceSpec {
    pub fn new<D: Into<String>, F: Into<String>>(data: D, field: F) -> Self {
        Self {
            data: data.into(),
            field: field.into(),
            extra: Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleArrayElementSpec {
    Signal(SignalExpressionSpec),
    Value(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleRangeSpec {
    Reference(ScaleDataReferenceSpec),
    Signal(SignalExpressionSpec),
    Array(Vec<ScaleArrayElementSpec>),
    Value(Value),
}
