use crate::spec::transform::TransformSpecTrait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Struct that serializes to the grammar's filter transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterTransformSpec {
    pub expr: String,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl FilterTransformSpec {
    pub fn new<S: Into<String>>(expr: S) -> Self {
        Self {
            expr: expr.into(),
            extra: Default::default(),
        }
    }
}

impl TransformSpecTrait for FilterTransformSpec {}
