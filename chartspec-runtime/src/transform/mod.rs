//! Synchronous evaluation of a subset of the grammar's transforms over JSON rows.
pub mod identifier;
pub mod pipeline;
pub mod stack;

use chartspec_common::error::{ChartSpecError, Result};
use chartspec_core::spec::transform::TransformSpec;
use serde_json::{Map, Value};

pub type Row = Map<String, Value>;

pub trait TransformTrait {
    fn eval(&self, rows: Vec<Row>) -> Result<Vec<Row>>;
}

pub fn to_transform_trait(tx: &TransformSpec) -> Result<&dyn TransformTrait> {
    match tx {
        TransformSpec::Identifier(tx) => Ok(tx),
        TransformSpec::Stack(tx) => Ok(tx),
        other => Err(ChartSpecError::specification(format!(
            "Transform '{}' cannot be evaluated outside the renderer",
            other.type_name()
        ))),
    }
}

/// Rows of an inline `values` array; every entry must be an object
pub fn rows_from_values(values: &[Value]) -> Result<Vec<Row>> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::Object(row) => Ok(row.clone()),
            other => Err(ChartSpecError::specification(format!(
                "Row {i} is not an object: {other}"
            ))),
        })
        .collect()
}
