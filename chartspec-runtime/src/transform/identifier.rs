use crate::transform::{Row, TransformTrait};
use chartspec_common::error::Result;
use chartspec_core::spec::transform::identifier::IdentifierTransformSpec;
use serde_json::json;

impl TransformTrait for IdentifierTransformSpec {
    /// Ids start at 1 and follow the input order
    fn eval(&self, mut rows: Vec<Row>) -> Result<Vec<Row>> {
        for (i, row) in rows.iter_mut().enumerate() {
            row.insert(self.as_.clone(), json!(i + 1));
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::transform::{rows_from_values, TransformTrait};
    use chartspec_core::spec::transform::identifier::IdentifierTransformSpec;
    use serde_json::json;

    #[test]
    fn test_ids_follow_row_order() {
        let tx = IdentifierTransformSpec {
            as_: "rscMarkId".to_string(),
            extra: Default::default(),
        };
        let rows = rows_from_values(&[json!({"a": "x"}), json!({"a": "y", "rscMarkId": 9})]).unwrap();
        let rows = tx.eval(rows).unwrap();
        assert_eq!(rows[0]["rscMarkId"], json!(1));
        assert_eq!(rows[1]["rscMarkId"], json!(2));
    }
}
