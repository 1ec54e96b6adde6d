use crate::transform::{to_transform_trait, Row};
use chartspec_common::error::{Result, ResultWithContext};
use chartspec_core::spec::data::DataSpec;
use chartspec_core::spec::transform::TransformSpec;
use log::debug;

pub trait TransformPipelineUtils {
    fn eval_rows(&self, rows: Vec<Row>) -> Result<Vec<Row>>;
}

impl TransformPipelineUtils for [TransformSpec] {
    fn eval_rows(&self, rows: Vec<Row>) -> Result<Vec<Row>> {
        let mut rows = rows;
        for (i, tx) in self.iter().enumerate() {
            rows = to_transform_trait(tx)?
                .eval(rows)
                .with_context(|| format!("while evaluating transform {i}"))?;
        }
        Ok(rows)
    }
}

impl TransformPipelineUtils for DataSpec {
    fn eval_rows(&self, rows: Vec<Row>) -> Result<Vec<Row>> {
        debug!(
            "Evaluating {} transforms of {}",
            self.transform.len(),
            self.name
        );
        self.transform
            .as_slice()
            .eval_rows(rows)
            .with_context(|| format!("in data source {}", self.name))
    }
}

#[cfg(test)]
mod tests {
    use crate::transform::pipeline::TransformPipelineUtils;
    use crate::transform::rows_from_values;
    use chartspec_common::error::ChartSpecError;
    use chartspec_core::builder::data::{add_stack_transform, base_data};
    use chartspec_core::spec::transform::filter::FilterTransformSpec;
    use chartspec_core::spec::transform::TransformSpec;
    use serde_json::json;

    #[test]
    fn test_table_pipeline() {
        let mut data = base_data(vec![]);
        add_stack_transform(&mut data[0], &["browser".to_string()], "downloads", None);
        let rows = rows_from_values(&[
            json!({"browser": "Chrome", "downloads": 27000}),
            json!({"browser": "Chrome", "downloads": 15000}),
        ])
        .unwrap();
        let rows = data[0].eval_rows(rows).unwrap();
        assert_eq!(rows[1]["rscMarkId"], json!(2));
        assert_eq!(rows[1]["downloads0"], json!(27000.0));
        assert_eq!(rows[1]["downloads1"], json!(42000.0));
    }

    #[test]
    fn test_unsupported_transform() {
        let pipeline = vec![TransformSpec::Filter(FilterTransformSpec::new(
            "datum.a > 1".to_string(),
        ))];
        let err = pipeline.as_slice().eval_rows(vec![]).unwrap_err();
        assert!(matches!(err, ChartSpecError::SpecificationError(..)));
        assert!(err.to_string().contains("'filter'"));
    }
}
