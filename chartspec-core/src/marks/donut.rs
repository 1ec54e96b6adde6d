use crate::builder::data::{add_series_id, get_or_add_derived_data};
use crate::builder::encoding::{opacity_rules, selection_stroke_rules};
use crate::builder::scale::{add_field_to_facet_scale_domain, FacetScale};
use crate::builder::signal::HoverTarget;
use crate::config::BuilderConfig;
use crate::constants::{COLOR_SCALE, FILTERED_TABLE};
use crate::marks::add_tooltip_signals;
use crate::naming;
use crate::options::{DonutOptions, DonutSummaryOptions, FacetRef, SegmentLabelOptions};
use crate::spec::chart::ChartSpec;
use crate::spec::mark::{MarkEncodeSpec, MarkEncodingSpec, MarkSpec};
use crate::spec::signal::SignalSpec;
use crate::spec::transform::aggregate::{AggregateOpSpec, AggregateTransformSpec};
use crate::spec::transform::pie::PieTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::{Field, NumberOrSignalSpec};
use chartspec_common::error::Result;
use chartspec_common::escape::datum_field;
use log::warn;

pub const RADIUS_SIGNAL: &str = "radius";
const SUMMARY_FIELD: &str = "sum";

pub fn add_donut(spec: &mut ChartSpec, donut: &DonutOptions, config: &BuilderConfig) -> Result<()> {
    add_series_id(&mut spec.data, &[donut.color.clone()])?;
    add_field_to_facet_scale_domain(
        &mut spec.scales,
        FacetScale::Color,
        &FacetRef::field(donut.color.as_str()),
    );
    if spec.get_signal(RADIUS_SIGNAL).is_none() {
        spec.signals
            .push(SignalSpec::with_update(RADIUS_SIGNAL, "min(width, height) / 2"));
    }

    let pie_data = naming::data(&donut.name);
    get_or_add_derived_data(&mut spec.data, &pie_data, FILTERED_TABLE).push_transform_once(
        TransformSpec::Pie(PieTransformSpec {
            field: Field::from(donut.metric.as_str()),
            start_angle: Some(NumberOrSignalSpec::Number(donut.start_angle)),
            end_angle: Some(NumberOrSignalSpec::signal(format!(
                "{} + 2 * PI",
                donut.start_angle
            ))),
            sort: None,
            as_: None,
            extra: Default::default(),
        }),
    );

    spec.marks.push(arc_mark(donut, &pie_data, config));
    add_tooltip_signals(
        &mut spec.signals,
        &donut.name,
        &donut.name,
        &donut.interactions,
        HoverTarget::Datum,
    );

    if let Some(summary) = donut.summaries.first() {
        if donut.hole_ratio <= 0.0 {
            warn!(
                "{}: a donut summary needs a hole, ignoring it for a hole ratio of {}",
                donut.name, donut.hole_ratio
            );
        } else {
            add_summary(spec, donut, summary);
        }
    }
    if let Some(label) = donut.segment_labels.first() {
        spec.marks.push(segment_label_mark(donut, label, &pie_data));
    }
    Ok(())
}

fn arc_mark(donut: &DonutOptions, pie_data: &str, config: &BuilderConfig) -> MarkSpec {
    let fill = MarkEncodingSpec::scale_field(COLOR_SCALE, donut.color.as_str());
    let has_popover = donut.interactions.has_popover();
    let mut encode = MarkEncodeSpec::default()
        .enter("x", MarkEncodingSpec::signal("width / 2"))
        .enter("y", MarkEncodingSpec::signal("height / 2"))
        .enter("fill", fill.clone())
        .enter("padAngle", MarkEncodingSpec::value(0.01))
        .update("startAngle", MarkEncodingSpec::field("startAngle"))
        .update("endAngle", MarkEncodingSpec::field("endAngle"))
        .update("outerRadius", MarkEncodingSpec::signal(RADIUS_SIGNAL))
        .update(
            "innerRadius",
            MarkEncodingSpec::signal(format!("{RADIUS_SIGNAL} * {}", donut.hole_ratio)),
        );
    if donut.interactions.is_interactive() {
        encode.set(
            "update",
            "fillOpacity",
            opacity_rules(MarkEncodingSpec::value(1), has_popover, config),
        );
    }
    if has_popover {
        encode.set("update", "stroke", selection_stroke_rules(fill, config));
        encode.set("update", "cursor", MarkEncodingSpec::value("pointer"));
    }
    MarkSpec::new("arc", donut.name.as_str())
        .from_data(pie_data)
        .interactive(donut.interactions.is_interactive())
        .with_encode(encode)
}

/// Total of the metric in the donut hole, with an optional label underneath
fn add_summary(spec: &mut ChartSpec, donut: &DonutOptions, summary: &DonutSummaryOptions) {
    let data_name = naming::summary_data(&donut.name);
    get_or_add_derived_data(&mut spec.data, &data_name, FILTERED_TABLE).push_transform_once(
        TransformSpec::Aggregate(AggregateTransformSpec {
            groupby: vec![],
            fields: Some(vec![Some(Field::from(donut.metric.as_str()))]),
            ops: Some(vec![AggregateOpSpec::Sum]),
            as_: Some(vec![Some(SUMMARY_FIELD.to_string())]),
            cross: None,
            drop: None,
            extra: Default::default(),
        }),
    );

    let inner_radius = format!("{RADIUS_SIGNAL} * {}", donut.hole_ratio);
    let baseline = if summary.label.is_some() {
        "alphabetic"
    } else {
        "middle"
    };
    spec.marks.push(
        MarkSpec::new("text", naming::summary_value(&donut.name))
            .from_data(data_name.as_str())
            .interactive(false)
            .with_encode(
                MarkEncodeSpec::default()
                    .enter("align", MarkEncodingSpec::value("center"))
                    .enter("baseline", MarkEncodingSpec::value(baseline))
                    .enter("fontWeight", MarkEncodingSpec::value("bold"))
                    .update("x", MarkEncodingSpec::signal("width / 2"))
                    .update("y", MarkEncodingSpec::signal("height / 2"))
                    .update(
                        "fontSize",
                        MarkEncodingSpec::signal(format!("{inner_radius} * 0.35")),
                    )
                    .update(
                        "text",
                        MarkEncodingSpec::signal(format!(
                            "format(datum.{SUMMARY_FIELD}, '{}')",
                            summary.number_format
                        )),
                    ),
            ),
    );
    if let Some(label) = &summary.label {
        spec.marks.push(
            MarkSpec::new("text", naming::summary_label(&donut.name))
                .from_data(data_name)
                .interactive(false)
                .with_encode(
                    MarkEncodeSpec::default()
                        .enter("align", MarkEncodingSpec::value("center"))
                        .enter("baseline", MarkEncodingSpec::value("top"))
                        .enter("text", MarkEncodingSpec::value(label.as_str()))
                        .update("x", MarkEncodingSpec::signal("width / 2"))
                        .update("y", MarkEncodingSpec::signal("height / 2 + 4"))
                        .update(
                            "fontSize",
                            MarkEncodingSpec::signal(format!("{inner_radius} * 0.15")),
                        ),
                ),
        );
    }
}

/// Label outside each segment, with optional value and percent lines
fn segment_label_mark(
    donut: &DonutOptions,
    label: &SegmentLabelOptions,
    pie_data: &str,
) -> MarkSpec {
    let key = label.label_key.as_deref().unwrap_or(&donut.color);
    let mut lines = vec![datum_field(key)];
    if label.value {
        lines.push(format!(
            "format({}, '{}')",
            datum_field(&donut.metric),
            label.value_format
        ));
    }
    if label.percent {
        // The pie splits the full turn in proportion to the metric
        lines.push("format((datum.endAngle - datum.startAngle) / (2 * PI), '.0%')".to_string());
    }
    let text = if lines.len() == 1 {
        lines.remove(0)
    } else {
        format!("[{}]", lines.join(", "))
    };
    let theta = "(datum.startAngle + datum.endAngle) / 2";

    MarkSpec::new("text", naming::segment_label(&donut.name))
        .from_data(pie_data)
        .interactive(false)
        .with_encode(
            MarkEncodeSpec::default()
                .enter("text", MarkEncodingSpec::signal(text))
                .enter("fontWeight", MarkEncodingSpec::value("bold"))
                .update("x", MarkEncodingSpec::signal("width / 2"))
                .update("y", MarkEncodingSpec::signal("height / 2"))
                .update("theta", MarkEncodingSpec::signal(theta))
                .update(
                    "radius",
                    MarkEncodingSpec::signal(format!("{RADIUS_SIGNAL} + 6")),
                )
                .update(
                    "align",
                    MarkEncodingSpec::signal(format!(
                        "{theta} % (2 * PI) > PI ? 'right' : 'left'"
                    )),
                )
                .update("baseline", MarkEncodingSpec::value("middle")),
        )
}

#[cfg(test)]
mod tests {
    use crate::builder::data::base_data;
    use crate::builder::signal::default_signals;
    use crate::config::BuilderConfig;
    use crate::marks::donut::add_donut;
    use crate::options::{DonutProps, Normalize, NormalizeContext};
    use crate::spec::chart::ChartSpec;
    use serde_json::json;

    fn build(props: serde_json::Value) -> ChartSpec {
        let config = BuilderConfig::default();
        let props: DonutProps = serde_json::from_value(props).unwrap();
        let donut = props.normalize(0, &NormalizeContext::new(&config));
        let mut spec = ChartSpec::new();
        spec.data = base_data(vec![]);
        spec.signals = default_signals(&[], None, None);
        add_donut(&mut spec, &donut, &config).unwrap();
        spec
    }

    #[test]
    fn test_donut_arcs() {
        let spec = build(json!({"metric": "count", "color": "browser"}));
        let pie = serde_json::to_value(spec.get_data("donut0_data").unwrap()).unwrap();
        assert_eq!(pie["transform"][0]["type"], json!("pie"));
        assert_eq!(pie["transform"][0]["field"], json!("count"));
        let arc = serde_json::to_value(spec.find_mark("donut0").unwrap()).unwrap();
        assert_eq!(
            arc["encode"]["update"]["innerRadius"],
            json!({"signal": "radius * 0.85"})
        );
        assert_eq!(
            spec.get_scale("color").unwrap().domain_fields(),
            vec!["browser"]
        );
        assert!(spec.get_signal("radius").is_some());
        assert!(spec.dangling_references().unwrap().is_empty());
    }

    #[test]
    fn test_summary_and_segment_labels() {
        let spec = build(json!({
            "donutSummaries": [{"label": "Visitors"}],
            "segmentLabels": [{"value": true, "percent": true}]
        }));
        let summary = spec.get_data("donut0_summaryData").unwrap();
        assert!(summary.has_transform_output("sum"));
        assert!(spec.find_mark("donut0_summaryValue").is_some());
        assert!(spec.find_mark("donut0_summaryLabel").is_some());
        let label = serde_json::to_value(spec.find_mark("donut0_segmentLabel").unwrap()).unwrap();
        assert_eq!(
            label["encode"]["enter"]["text"]["signal"],
            json!("[datum.series, format(datum.value, ','), format((datum.endAngle - datum.startAngle) / (2 * PI), '.0%')]")
        );
    }

    #[test]
    fn test_summary_needs_a_hole() {
        let spec = build(json!({"holeRatio": 0, "donutSummaries": [{}]}));
        assert!(spec.get_data("donut0_summaryData").is_none());
        assert!(spec.find_mark("donut0_summaryValue").is_none());
    }
}
