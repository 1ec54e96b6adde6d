use chartspec_core::builder::data::add_stack_transform;
use chartspec_core::spec::data::DataSpec;
use chartspec_runtime::transform::pipeline::TransformPipelineUtils;
use chartspec_runtime::transform::rows_from_values;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Some("order"), vec![(3.0, 8.0), (0.0, 3.0)])]
#[case(None, vec![(0.0, 5.0), (5.0, 8.0)])]
fn test_stack_by_dimension(#[case] order: Option<&str>, #[case] expected: Vec<(f64, f64)>) {
    let mut data = DataSpec::derived("filteredTable", "table");
    add_stack_transform(&mut data, &["dim".to_string()], "metric", order);
    let rows = rows_from_values(&[
        json!({"dim": "a", "metric": 5, "order": 1}),
        json!({"dim": "a", "metric": 3, "order": 0}),
    ])
    .unwrap();
    let rows = data.eval_rows(rows).unwrap();
    let bounds: Vec<(f64, f64)> = rows
        .iter()
        .map(|r| {
            (
                r["metric0"].as_f64().unwrap(),
                r["metric1"].as_f64().unwrap(),
            )
        })
        .collect();
    assert_eq!(bounds, expected);
}
