use crate::transform::{Row, TransformTrait};
use chartspec_common::error::{ChartSpecError, Result};
use chartspec_core::spec::transform::stack::{StackOffsetSpec, StackTransformSpec};
use chartspec_core::spec::values::{CompareSpec, SortOrderSpec};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde_json::{json, Value};
use std::cmp::Ordering;

/// Present values compare by type then value; numbers sort before strings
fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let a = OrderedFloat(a.as_f64().unwrap_or(f64::NAN));
            a.cmp(&OrderedFloat(b.as_f64().unwrap_or(f64::NAN)))
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(_), _) => Ordering::Less,
        (_, Value::Number(_)) => Ordering::Greater,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Missing and null values sort last whatever the order
fn compare_field(a: Option<&Value>, b: Option<&Value>, order: &SortOrderSpec) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match order {
            SortOrderSpec::Ascending => compare_present(a, b),
            SortOrderSpec::Descending => compare_present(b, a),
        },
    }
}

fn compare_rows(a: &Row, b: &Row, sort: &CompareSpec) -> Ordering {
    let orders = sort.order.as_ref().map(|o| o.to_vec()).unwrap_or_default();
    sort.field
        .to_vec()
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let order = orders.get(i).cloned().unwrap_or(SortOrderSpec::Ascending);
            compare_field(a.get(field), b.get(field), &order)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn numeric(row: &Row, field: &str) -> f64 {
    match row.get(field) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

impl TransformTrait for StackTransformSpec {
    fn eval(&self, mut rows: Vec<Row>) -> Result<Vec<Row>> {
        let as_ = self.as_();
        let [start_field, stop_field] = as_.as_slice() else {
            return Err(ChartSpecError::specification(format!(
                "Stack transform expects two output fields, received {as_:?}"
            )));
        };
        let field = self.field.field();
        let groupby: Vec<String> = self
            .groupby
            .iter()
            .flatten()
            .map(|f| f.field())
            .collect();
        let offset = self.offset();

        let groups = (0..rows.len()).into_group_map_by(|&i| {
            groupby
                .iter()
                .map(|g| rows[i].get(g).cloned().unwrap_or(Value::Null).to_string())
                .join("|")
        });
        let max_sum = groups
            .values()
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| numeric(&rows[i], &field).abs())
                    .sum::<f64>()
            })
            .fold(0.0, f64::max);

        for mut indices in groups.into_values() {
            // Stable sort keeps input order on ties
            if let Some(sort) = &self.sort {
                indices.sort_by(|&a, &b| compare_rows(&rows[a], &rows[b], sort));
            }
            let values: Vec<f64> = indices.iter().map(|&i| numeric(&rows[i], &field)).collect();
            let sum: f64 = values.iter().map(|v| v.abs()).sum();

            let mut positive = match offset {
                StackOffsetSpec::Center => (max_sum - sum) / 2.0,
                _ => 0.0,
            };
            let mut negative = 0.0;
            let scale = match offset {
                StackOffsetSpec::Normalize if sum > 0.0 => 1.0 / sum,
                StackOffsetSpec::Normalize => 0.0,
                _ => 1.0,
            };
            for (&i, &value) in indices.iter().zip(&values) {
                let (start, stop) = match offset {
                    StackOffsetSpec::Zero if value < 0.0 => {
                        let start = negative;
                        negative += value;
                        (start, negative)
                    }
                    StackOffsetSpec::Zero => {
                        let start = positive;
                        positive += value;
                        (start, positive)
                    }
                    _ => {
                        let start = positive;
                        positive += value.abs();
                        (start * scale, positive * scale)
                    }
                };
                rows[i].insert(start_field.clone(), json!(start));
                rows[i].insert(stop_field.clone(), json!(stop));
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::transform::{rows_from_values, Row, TransformTrait};
    use chartspec_core::spec::transform::stack::{StackOffsetSpec, StackTransformSpec};
    use chartspec_core::spec::values::{CompareSpec, Field};
    use rstest::rstest;
    use serde_json::{json, Value};

    fn stack(order: Option<&str>, offset: Option<StackOffsetSpec>) -> StackTransformSpec {
        StackTransformSpec {
            field: Field::from("metric"),
            groupby: Some(vec![Field::from("dim")]),
            sort: order.map(CompareSpec::ascending),
            as_: Some(vec!["metric0".to_string(), "metric1".to_string()]),
            offset,
            extra: Default::default(),
        }
    }

    fn bounds(rows: &[Row]) -> Vec<(Value, Value)> {
        rows.iter()
            .map(|r| (r["metric0"].clone(), r["metric1"].clone()))
            .collect()
    }

    #[test]
    fn test_stack_follows_order() {
        let rows = rows_from_values(&[
            json!({"dim": "a", "metric": 5, "order": 1}),
            json!({"dim": "a", "metric": 3, "order": 0}),
        ])
        .unwrap();
        let rows = stack(Some("order"), None).eval(rows).unwrap();
        assert_eq!(
            bounds(&rows),
            vec![(json!(3.0), json!(8.0)), (json!(0.0), json!(3.0))]
        );
    }

    #[test]
    fn test_missing_order_goes_last() {
        let rows = rows_from_values(&[
            json!({"dim": "a", "metric": 1}),
            json!({"dim": "a", "metric": 2, "order": 5}),
            json!({"dim": "a", "metric": 4, "order": null}),
            json!({"dim": "b", "metric": 7}),
        ])
        .unwrap();
        let rows = stack(Some("order"), None).eval(rows).unwrap();
        assert_eq!(
            bounds(&rows),
            vec![
                (json!(2.0), json!(3.0)),
                (json!(0.0), json!(2.0)),
                (json!(3.0), json!(7.0)),
                (json!(0.0), json!(7.0)),
            ]
        );
    }

    #[test]
    fn test_negative_values_stack_below_zero() {
        let rows = rows_from_values(&[
            json!({"dim": "a", "metric": 2}),
            json!({"dim": "a", "metric": -3}),
            json!({"dim": "a", "metric": -1}),
        ])
        .unwrap();
        let rows = stack(None, None).eval(rows).unwrap();
        assert_eq!(
            bounds(&rows),
            vec![
                (json!(0.0), json!(2.0)),
                (json!(0.0), json!(-3.0)),
                (json!(-3.0), json!(-4.0)),
            ]
        );
    }

    #[rstest]
    #[case(StackOffsetSpec::Normalize, vec![(0.0, 0.25), (0.25, 1.0), (0.0, 1.0)])]
    #[case(StackOffsetSpec::Center, vec![(2.0, 3.0), (3.0, 6.0), (0.0, 8.0)])]
    fn test_offsets(#[case] offset: StackOffsetSpec, #[case] expected: Vec<(f64, f64)>) {
        let rows = rows_from_values(&[
            json!({"dim": "a", "metric": 1}),
            json!({"dim": "a", "metric": 3}),
            json!({"dim": "b", "metric": 8}),
        ])
        .unwrap();
        let rows = stack(None, Some(offset)).eval(rows).unwrap();
        let expected: Vec<_> = expected
            .into_iter()
            .map(|(a, b)| (json!(a), json!(b)))
            .collect();
        assert_eq!(bounds(&rows), expected);
    }
}
