//! Axes read the scales registered by the marks, so they are added after every mark
use crate::builder::data::get_or_add_derived_data;
use crate::builder::scale::{facet_encoding, FacetScale};
use crate::constants::{
    AXIS_ANNOTATION_ID, FILTERED_TABLE, X_BAND, X_LINEAR, X_POINT, X_TIME, Y_BAND, Y_LINEAR,
};
use crate::naming;
use crate::options::{
    AxisAnnotationOptions, AxisOptions, AxisThumbnailOptions, Granularity, ReferenceLineOptions,
};
use crate::options::axis::{LabelFormat, Position};
use crate::spec::axis::{AxisFormatTypeSpec, AxisOrientSpec, AxisSpec};
use crate::spec::chart::ChartSpec;
use crate::spec::legend::GuideEncodeSpec;
use crate::spec::mark::{MarkEncodeSpec, MarkEncodingSpec, MarkSpec};
use crate::spec::scale::{ScaleSpec, ScaleTypeSpec};
use crate::spec::transform::aggregate::{AggregateOpSpec, AggregateTransformSpec};
use crate::spec::transform::flatten::FlattenTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::Field;
use chartspec_common::error::Result;
use indexmap::IndexMap;
use log::warn;
use serde_json::json;

const THUMBNAIL_SIZE: f64 = 32.0;
const ANNOTATION_HEIGHT: f64 = 4.0;

fn orient(position: Position) -> AxisOrientSpec {
    match position {
        Position::Left => AxisOrientSpec::Left,
        Position::Right => AxisOrientSpec::Right,
        Position::Top => AxisOrientSpec::Top,
        Position::Bottom => AxisOrientSpec::Bottom,
    }
}

/// Scale an axis at `position` is drawn for, preferring dimension scales
fn axis_scale<'a>(spec: &'a ChartSpec, position: Position) -> Option<&'a ScaleSpec> {
    let candidates: &[&str] = if position.is_horizontal() {
        &[X_BAND, X_POINT, X_TIME, X_LINEAR]
    } else {
        &[Y_BAND, Y_LINEAR]
    };
    candidates.iter().find_map(|name| spec.get_scale(name))
}

fn is_band(scale: &ScaleSpec) -> bool {
    matches!(scale.type_, Some(ScaleTypeSpec::Band) | Some(ScaleTypeSpec::Point))
}

fn time_format(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Minute => "%-I:%M %p",
        Granularity::Hour => "%-I %p",
        Granularity::Day | Granularity::Week => "%b %-d",
        Granularity::Month | Granularity::Quarter => "%b %Y",
        Granularity::Year => "%Y",
    }
}

/// Seconds rendered as `hh:mm:ss`
const DURATION_LABEL: &str = "format(floor(datum.value / 3600), '02d') + ':' + format(floor(datum.value % 3600 / 60), '02d') + ':' + format(floor(datum.value % 60), '02d')";

pub fn add_axis(spec: &mut ChartSpec, axis: &AxisOptions) -> Result<()> {
    let Some(scale) = axis_scale(spec, axis.position).cloned() else {
        warn!(
            "{}: no scale is registered for a {:?} axis, skipping it",
            axis.name, axis.position
        );
        return Ok(());
    };

    let mut axis_spec = AxisSpec {
        scale: scale.name.clone(),
        orient: orient(axis.position),
        title: axis.title.clone(),
        grid: Some(axis.grid),
        ticks: Some(axis.ticks),
        domain: Some(axis.base_line),
        labels: Some(!axis.hide_labels),
        tick_min_step: axis.tick_min_step,
        label_angle: axis.vertical_labels.then_some(-90.0),
        ..Default::default()
    };
    if scale.type_ == Some(ScaleTypeSpec::Time) {
        axis_spec.format = Some(json!(time_format(axis.granularity)));
        axis_spec.format_type = Some(AxisFormatTypeSpec::Time);
    } else {
        match (axis.label_format, &axis.number_format) {
            (Some(LabelFormat::Percentage), _) => {
                axis_spec.format = Some(json!(".0%"));
                axis_spec.format_type = Some(AxisFormatTypeSpec::Number);
            }
            (Some(LabelFormat::Duration), _) => {
                let mut labels = GuideEncodeSpec::default();
                labels
                    .encode
                    .set("update", "text", MarkEncodingSpec::signal(DURATION_LABEL));
                axis_spec.encode = Some(IndexMap::from([("labels".to_string(), labels)]));
            }
            (_, Some(format)) => {
                axis_spec.format = Some(json!(format));
                axis_spec.format_type = Some(AxisFormatTypeSpec::Number);
            }
            _ => {}
        }
    }
    spec.axes.push(axis_spec);

    for line in &axis.reference_lines {
        spec.marks
            .extend(reference_line_marks(&scale, axis.position, line));
    }
    for annotation in &axis.annotations {
        add_axis_annotation(spec, &scale, axis.position, annotation);
    }
    for thumbnail in &axis.thumbnails {
        add_axis_thumbnail(spec, &scale, axis.position, thumbnail);
    }
    Ok(())
}

/// Full-length rule at `value`, with an optional label at its end
fn reference_line_marks(
    scale: &ScaleSpec,
    position: Position,
    line: &ReferenceLineOptions,
) -> Vec<MarkSpec> {
    let mut at = MarkEncodingSpec::scale_value(scale.name.as_str(), line.value.clone());
    if is_band(scale) {
        at = at.with_band(line.position.band());
    }
    let (along, across, across_end, extent) = if position.is_horizontal() {
        ("x", "y", "y2", "height")
    } else {
        ("y", "x", "x2", "width")
    };

    let mut marks = vec![MarkSpec::new("rule", line.name.as_str())
        .interactive(false)
        .with_encode(
            MarkEncodeSpec::default()
                .enter("stroke", MarkEncodingSpec::value(line.color.as_str()))
                .enter(
                    "strokeDash",
                    facet_encoding(FacetScale::LineType, &line.line_type),
                )
                .enter(
                    "strokeWidth",
                    facet_encoding(FacetScale::LineWidth, &line.line_width),
                )
                .update(along, at.clone())
                .update(across, MarkEncodingSpec::value(0))
                .update(across_end, MarkEncodingSpec::signal(extent)),
        )];

    if let Some(label) = &line.label {
        let (align, baseline, across_position) = if position.is_horizontal() {
            ("center", "bottom", MarkEncodingSpec::value(0).with_offset(-4))
        } else {
            ("right", "bottom", MarkEncodingSpec::signal("width"))
        };
        marks.push(
            MarkSpec::new("text", naming::label(&line.name))
                .interactive(false)
                .with_encode(
                    MarkEncodeSpec::default()
                        .enter("text", MarkEncodingSpec::value(label.as_str()))
                        .enter("fill", MarkEncodingSpec::value(line.color.as_str()))
                        .enter("align", MarkEncodingSpec::value(align))
                        .enter("baseline", MarkEncodingSpec::value(baseline))
                        .update(along, at)
                        .update(across, across_position),
                ),
        );
    }
    marks
}

/// Span of every annotation id listed on the rows, drawn outside the plot along the axis
fn add_axis_annotation(
    spec: &mut ChartSpec,
    scale: &ScaleSpec,
    position: Position,
    annotation: &AxisAnnotationOptions,
) {
    let Some(field) = scale.domain_fields().into_iter().next() else {
        warn!(
            "{}: scale '{}' has no field domain to place annotations on",
            annotation.name, scale.name
        );
        return;
    };
    let start = format!("{field}Min");
    let end = format!("{field}Max");
    let data_name = naming::data(&annotation.name);
    let data = get_or_add_derived_data(&mut spec.data, &data_name, FILTERED_TABLE);
    data.push_transform_once(TransformSpec::Flatten(FlattenTransformSpec {
        fields: vec![Field::from(annotation.data_key.as_str())],
        as_: Some(vec![AXIS_ANNOTATION_ID.to_string()]),
        extra: Default::default(),
    }));
    data.push_transform_once(TransformSpec::Aggregate(AggregateTransformSpec {
        groupby: vec![Field::from(AXIS_ANNOTATION_ID)],
        fields: Some(vec![
            Some(Field::from(field.as_str())),
            Some(Field::from(field.as_str())),
        ]),
        ops: Some(vec![AggregateOpSpec::Min, AggregateOpSpec::Max]),
        as_: Some(vec![Some(start.clone()), Some(end.clone())]),
        cross: None,
        drop: None,
        extra: Default::default(),
    }));

    let mut fill: Vec<MarkEncodingSpec> = annotation
        .colors
        .iter()
        .map(|(id, color)| {
            MarkEncodingSpec::value(color.as_str()).with_test(format!(
                "datum.{AXIS_ANNOTATION_ID} === '{}'",
                id.replace('\'', "\\'")
            ))
        })
        .collect();
    fill.push(MarkEncodingSpec::value(annotation.color.as_str()));

    let span_start = MarkEncodingSpec::scale_field(scale.name.as_str(), start.as_str());
    let mut span_end = MarkEncodingSpec::scale_field(scale.name.as_str(), end.as_str());
    if is_band(scale) {
        span_end = span_end.with_band(1.0);
    }
    let (along, along_end, across, across_end, extent) = if position.is_horizontal() {
        ("x", "x2", "y", "y2", "height")
    } else {
        ("y", "y2", "x", "x2", "width")
    };
    let offset = match position {
        Position::Top | Position::Left => format!("-{}", annotation.offset),
        Position::Bottom | Position::Right => format!("{extent} + {}", annotation.offset),
    };

    spec.marks.push(
        MarkSpec::new("rect", annotation.name.as_str())
            .from_data(data_name)
            .interactive(false)
            .with_encode(
                MarkEncodeSpec::default()
                    .enter("fill", fill)
                    .enter("cornerRadius", MarkEncodingSpec::value(ANNOTATION_HEIGHT / 2.0))
                    .update(along, span_start)
                    .update(along_end, span_end)
                    .update(across, MarkEncodingSpec::signal(offset.as_str()))
                    .update(
                        across_end,
                        MarkEncodingSpec::signal(format!("{offset} + {ANNOTATION_HEIGHT}")),
                    ),
            ),
    );
}

/// Image per band value, fetched from `url_key`
fn add_axis_thumbnail(
    spec: &mut ChartSpec,
    scale: &ScaleSpec,
    position: Position,
    thumbnail: &AxisThumbnailOptions,
) {
    let field = match scale.domain_fields().into_iter().next() {
        Some(field) if scale.type_ == Some(ScaleTypeSpec::Band) => field,
        _ => {
            warn!(
                "{}: thumbnails need a band scale, '{}' is not one",
                thumbnail.name, scale.name
            );
            return;
        }
    };
    let data_name = naming::data(&thumbnail.name);
    get_or_add_derived_data(&mut spec.data, &data_name, FILTERED_TABLE).push_transform_once(
        TransformSpec::Aggregate(AggregateTransformSpec {
            groupby: vec![
                Field::from(field.as_str()),
                Field::from(thumbnail.url_key.as_str()),
            ],
            fields: None,
            ops: None,
            as_: None,
            cross: None,
            drop: None,
            extra: Default::default(),
        }),
    );

    let size = format!("min(bandwidth('{}'), {THUMBNAIL_SIZE})", scale.name);
    let (along, across, across_position) = match position {
        Position::Bottom => ("x", "y", "height + 8".to_string()),
        Position::Top => ("x", "y", format!("-8 - {size}")),
        Position::Left => ("y", "x", format!("-8 - {size}")),
        Position::Right => ("y", "x", "width + 8".to_string()),
    };
    spec.marks.push(
        MarkSpec::new("image", thumbnail.name.as_str())
            .from_data(data_name)
            .interactive(false)
            .with_encode(
                MarkEncodeSpec::default()
                    .enter("url", MarkEncodingSpec::field(thumbnail.url_key.as_str()))
                    .enter("align", MarkEncodingSpec::value("center"))
                    .enter("baseline", MarkEncodingSpec::value("middle"))
                    .update(
                        along,
                        MarkEncodingSpec::scale_field(scale.name.as_str(), field.as_str())
                            .with_band(0.5),
                    )
                    .update(across, MarkEncodingSpec::signal(across_position))
                    .update("width", MarkEncodingSpec::signal(size.as_str()))
                    .update("height", MarkEncodingSpec::signal(size.as_str())),
            ),
    );
}

#[cfg(test)]
mod tests {
    use crate::config::BuilderConfig;
    use crate::marks::axis::add_axis;
    use crate::options::{AxisProps, Normalize, NormalizeContext};
    use crate::spec::chart::ChartSpec;
    use crate::spec::scale::{ScaleDataReferenceSpec, ScaleDomainSpec, ScaleSpec, ScaleTypeSpec};
    use serde_json::json;

    fn band_chart() -> ChartSpec {
        let mut spec = ChartSpec::new();
        let mut x = ScaleSpec::new("xBand", ScaleTypeSpec::Band);
        x.domain = Some(ScaleDomainSpec::FieldReference(ScaleDataReferenceSpec::new(
            "filteredTable",
            "browser",
        )));
        spec.scales.push(x);
        spec.scales.push(ScaleSpec::new("yLinear", ScaleTypeSpec::Linear));
        spec
    }

    fn axis(props: serde_json::Value, spec: &mut ChartSpec) {
        let config = BuilderConfig::default();
        let props: AxisProps = serde_json::from_value(props).unwrap();
        let axis = props.normalize(0, &NormalizeContext::new(&config));
        add_axis(spec, &axis).unwrap();
    }

    #[test]
    fn test_axis_without_scale_is_skipped() {
        let mut spec = ChartSpec::new();
        axis(json!({"position": "left"}), &mut spec);
        assert!(spec.axes.is_empty());
    }

    #[test]
    fn test_metric_axis() {
        let mut spec = band_chart();
        axis(
            json!({"position": "left", "grid": true, "labelFormat": "percentage"}),
            &mut spec,
        );
        let axis = serde_json::to_value(&spec.axes[0]).unwrap();
        assert_eq!(axis["scale"], json!("yLinear"));
        assert_eq!(axis["orient"], json!("left"));
        assert_eq!(axis["grid"], json!(true));
        assert_eq!(axis["domain"], json!(false));
        assert_eq!(axis["format"], json!(".0%"));
    }

    #[test]
    fn test_reference_line() {
        let mut spec = band_chart();
        axis(
            json!({"referenceLines": [{"value": "Chrome", "label": "Most used", "position": "after"}]}),
            &mut spec,
        );
        let rule = serde_json::to_value(spec.find_mark("axis0ReferenceLine0").unwrap()).unwrap();
        assert_eq!(
            rule["encode"]["update"]["x"],
            json!({"scale": "xBand", "value": "Chrome", "band": 1.0})
        );
        assert_eq!(rule["encode"]["update"]["y2"], json!({"signal": "height"}));
        assert!(spec.find_mark("axis0ReferenceLine0_label").is_some());
    }

    #[test]
    fn test_annotation_and_thumbnail() {
        let mut spec = band_chart();
        axis(
            json!({
                "axisAnnotations": [{"dataKey": "events", "options": [{"id": "launch", "color": "red"}]}],
                "axisThumbnails": [{"urlKey": "logo"}]
            }),
            &mut spec,
        );
        let data = spec.get_data("axis0Annotation0_data").unwrap();
        assert!(data.has_transform_output("browserMin"));
        assert!(data.has_transform_output("rscAnnotationId"));
        let span = serde_json::to_value(spec.find_mark("axis0Annotation0").unwrap()).unwrap();
        assert_eq!(span["encode"]["enter"]["fill"].as_array().unwrap().len(), 2);
        assert_eq!(span["encode"]["update"]["x2"]["band"], json!(1.0));

        let image = spec.find_mark("axis0Thumbnail0").unwrap();
        assert_eq!(image.source_data(), Some("axis0Thumbnail0_data"));
    }
}
