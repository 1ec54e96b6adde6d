use crate::builder::data::{
    add_highlighted_data, add_selected_data, add_series_id, add_time_transform,
    get_or_add_derived_data, get_table_data, HighlightContext,
};
use crate::builder::encoding::{
    point_highlight_mark, points_for_voronoi_mark, selection_ring_mark, voronoi_mark,
};
use crate::builder::scale::{
    add_dimension_scale, add_field_to_facet_scale_domain, add_metric_scale, facet_encoding,
    facet_expression, FacetScale,
};
use crate::builder::signal::{add_highlighted_series_bindings, HoverTarget};
use crate::config::BuilderConfig;
use crate::constants::{
    FILTERED_TABLE, HIGHLIGHTED_SERIES, HIGHLIGHT_POINT_SIZE, SERIES_ID, Y_LINEAR,
};
use crate::marks::trendline::{add_trendline, TrendlineParent};
use crate::marks::{add_highlight_group_bindings, add_tooltip_signals, facet_fields};
use crate::naming;
use crate::options::{DimensionScaleType, FacetRef, LineOptions, MetricRangeOptions};
use crate::spec::chart::ChartSpec;
use crate::spec::mark::{
    MarkEncodeSpec, MarkEncodingOrList, MarkEncodingSpec, MarkFacetSpec, MarkSpec,
};
use crate::spec::transform::filter::FilterTransformSpec;
use crate::spec::transform::TransformSpec;
use chartspec_common::error::Result;
use chartspec_common::escape::datum_field;

/// Field plotted along x. Time dimensions are bucketed into `${dimension}0` first.
fn dimension_field(line: &LineOptions) -> String {
    match line.scale_type {
        DimensionScaleType::Time => format!("{}0", line.dimension),
        _ => line.dimension.clone(),
    }
}

/// Rule dimming every other series while one is hovered
fn series_fade_test() -> String {
    format!("isValid({HIGHLIGHTED_SERIES}) && {HIGHLIGHTED_SERIES} !== datum.{SERIES_ID}")
}

pub fn add_line(spec: &mut ChartSpec, line: &LineOptions, config: &BuilderConfig) -> Result<()> {
    let series = facet_fields(&[&line.color, &line.line_type, &line.opacity]);
    add_series_id(&mut spec.data, &series)?;
    if line.scale_type == DimensionScaleType::Time {
        add_time_transform(
            get_table_data(&mut spec.data)?,
            &line.dimension,
            line.granularity,
        );
    }

    let dimension = dimension_field(line);
    let x_scale = add_dimension_scale(
        &mut spec.scales,
        "x",
        line.scale_type,
        &dimension,
        line.padding,
    );
    let mut metrics = vec![line.metric.clone()];
    for range in &line.metric_ranges {
        metrics.push(range.metric_start.clone());
        metrics.push(range.metric_end.clone());
    }
    add_metric_scale(&mut spec.scales, Y_LINEAR, &metrics);
    add_field_to_facet_scale_domain(&mut spec.scales, FacetScale::Color, &line.color);
    add_field_to_facet_scale_domain(&mut spec.scales, FacetScale::LineType, &line.line_type);
    add_field_to_facet_scale_domain(&mut spec.scales, FacetScale::LineWidth, &line.line_width);
    add_field_to_facet_scale_domain(&mut spec.scales, FacetScale::Opacity, &line.opacity);

    let x = MarkEncodingSpec::scale_field(x_scale.as_str(), dimension.as_str());
    let y = MarkEncodingSpec::scale_field(Y_LINEAR, line.metric.as_str());

    spec.marks.push(line_group(line, &x, config));

    if let Some(key) = &line.static_point {
        let data_name = naming::static_point_data(&line.name);
        get_or_add_derived_data(&mut spec.data, &data_name, FILTERED_TABLE).push_transform_once(
            TransformSpec::Filter(FilterTransformSpec::new(format!(
                "{} === true",
                datum_field(key)
            ))),
        );
        spec.marks.push(static_points_mark(line, &data_name, &x, &y, config));
    }

    if line.is_interactive() {
        add_hover_marks(spec, line, &x, &y, config)?;
    }

    let parent = TrendlineParent {
        name: &line.name,
        color: &line.color,
        dimension,
        metric: line.metric.clone(),
        dimension_scale: x_scale,
        dimension_scale_type: line.scale_type,
        metric_scale: Y_LINEAR.to_string(),
        is_horizontal: false,
    };
    for trendline in &line.trendlines {
        add_trendline(spec, &parent, trendline, config)?;
    }
    Ok(())
}

/// One group per series holding the gradient, the metric ranges and the line itself
fn line_group(line: &LineOptions, x: &MarkEncodingSpec, config: &BuilderConfig) -> MarkSpec {
    let mut groupby = line.color.fields();
    if groupby.is_empty() {
        groupby.push(SERIES_ID.to_string());
    }
    let facet = naming::facet(&line.name);
    let mut group = MarkSpec::new("group", naming::group(&line.name)).from_facet(
        MarkFacetSpec::new(facet.as_str(), FILTERED_TABLE, groupby),
    );

    // Drawn first so it sits underneath the line
    if line.gradient {
        group.marks.push(gradient_mark(line, &facet, x));
    }
    for range in &line.metric_ranges {
        group.marks.extend(metric_range_marks(line, range, &facet, x));
    }

    let stroke_opacity = facet_encoding(FacetScale::Opacity, &line.opacity);
    let stroke_opacity: MarkEncodingOrList = if line.is_interactive() {
        vec![
            MarkEncodingSpec::value(config.highlight_contrast_ratio).with_test(series_fade_test()),
            stroke_opacity,
        ]
        .into()
    } else {
        stroke_opacity.into()
    };
    let mut encode = MarkEncodeSpec::default()
        .enter("stroke", facet_encoding(FacetScale::Color, &line.color))
        .enter(
            "strokeDash",
            facet_encoding(FacetScale::LineType, &line.line_type),
        )
        .enter(
            "strokeWidth",
            facet_encoding(FacetScale::LineWidth, &line.line_width),
        )
        .enter("y", MarkEncodingSpec::scale_field(Y_LINEAR, line.metric.as_str()))
        .update("x", x.clone());
    encode.set("update", "strokeOpacity", stroke_opacity);

    group.marks.push(
        MarkSpec::new("line", line.name.as_str())
            .from_data(facet)
            .interactive(false)
            .with_encode(encode),
    );
    group
}

fn gradient_mark(line: &LineOptions, facet: &str, x: &MarkEncodingSpec) -> MarkSpec {
    let color = facet_expression(FacetScale::Color, &line.color);
    let fill = format!(
        "{{gradient: 'linear', x1: 1, y1: 1, x2: 1, y2: 0, stops: [{{offset: 0, color: 'transparent'}}, {{offset: 1, color: {color}}}]}}"
    );
    MarkSpec::new("area", naming::gradient(&line.name))
        .from_data(facet)
        .interactive(false)
        .with_encode(
            MarkEncodeSpec::default()
                .enter("fill", MarkEncodingSpec::signal(fill))
                .enter("fillOpacity", MarkEncodingSpec::value(0.2))
                .enter("y", MarkEncodingSpec::scale_field(Y_LINEAR, line.metric.as_str()))
                .enter("y2", MarkEncodingSpec::scale_value(Y_LINEAR, 0))
                .update("x", x.clone()),
        )
}

/// Translucent band between the range bounds plus an optional center line
fn metric_range_marks(
    line: &LineOptions,
    range: &MetricRangeOptions,
    facet: &str,
    x: &MarkEncodingSpec,
) -> Vec<MarkSpec> {
    let hover_gated = |opacity: f64| -> Vec<MarkEncodingSpec> {
        if range.display_on_hover {
            vec![
                MarkEncodingSpec::value(opacity).with_test(format!(
                    "{HIGHLIGHTED_SERIES} === datum.{SERIES_ID}"
                )),
                MarkEncodingSpec::value(0),
            ]
        } else {
            vec![MarkEncodingSpec::value(opacity)]
        }
    };

    let mut marks = vec![MarkSpec::new("area", range.name.as_str())
        .from_data(facet)
        .interactive(false)
        .with_encode(
            MarkEncodeSpec::default()
                .enter("fill", facet_encoding(FacetScale::Color, &line.color))
                .enter(
                    "y",
                    MarkEncodingSpec::scale_field(Y_LINEAR, range.metric_end.as_str()),
                )
                .enter(
                    "y2",
                    MarkEncodingSpec::scale_field(Y_LINEAR, range.metric_start.as_str()),
                )
                .update("x", x.clone())
                .update("fillOpacity", hover_gated(range.rect_opacity)),
        )];

    if let Some(metric) = &range.metric {
        marks.push(
            MarkSpec::new("line", naming::line(&range.name))
                .from_data(facet)
                .interactive(false)
                .with_encode(
                    MarkEncodeSpec::default()
                        .enter("stroke", facet_encoding(FacetScale::Color, &line.color))
                        .enter(
                            "strokeDash",
                            facet_encoding(FacetScale::LineType, &range.line_type),
                        )
                        .enter(
                            "strokeWidth",
                            facet_encoding(FacetScale::LineWidth, &range.line_width),
                        )
                        .enter("y", MarkEncodingSpec::scale_field(Y_LINEAR, metric.as_str()))
                        .update("x", x.clone())
                        .update("strokeOpacity", hover_gated(1.0)),
                ),
        );
    }
    marks
}

fn static_points_mark(
    line: &LineOptions,
    data_name: &str,
    x: &MarkEncodingSpec,
    y: &MarkEncodingSpec,
    config: &BuilderConfig,
) -> MarkSpec {
    MarkSpec::new("symbol", naming::static_points(&line.name))
        .from_data(data_name)
        .interactive(false)
        .with_encode(
            MarkEncodeSpec::default()
                .enter("size", MarkEncodingSpec::value(HIGHLIGHT_POINT_SIZE))
                .enter("fill", facet_encoding(FacetScale::Color, &line.color))
                .enter("stroke", MarkEncodingSpec::value(config.background_color.as_str()))
                .enter("strokeWidth", MarkEncodingSpec::value(2))
                .update("x", x.clone())
                .update("y", y.clone()),
        )
}

/// Highlight point, selection ring and the voronoi cells that drive them
fn add_hover_marks(
    spec: &mut ChartSpec,
    line: &LineOptions,
    x: &MarkEncodingSpec,
    y: &MarkEncodingSpec,
    config: &BuilderConfig,
) -> Result<()> {
    let dimension = dimension_field(line);
    let highlight_by = line.interactions.highlight_by();
    let highlight = HighlightContext {
        name: &line.name,
        dimension: &dimension,
        highlight_by: &highlight_by,
        has_tooltip: line.interactions.has_tooltip(),
        has_popover: line.interactions.has_popover(),
    };
    add_highlighted_data(&mut spec.data, &highlight)?;
    let fill = facet_encoding(FacetScale::Color, &line.color);
    spec.marks.push(point_highlight_mark(
        &line.name,
        x.clone(),
        y.clone(),
        fill,
        config,
    ));

    if line.interactions.has_popover() {
        add_selected_data(&mut spec.data, &line.name);
        spec.marks.push(selection_ring_mark(
            &line.name,
            x.clone(),
            y.clone(),
            &FacetRef::value(HIGHLIGHT_POINT_SIZE),
            config,
        ));
    }

    let points = naming::points_for_voronoi(&line.name);
    let voronoi = naming::voronoi(&line.name);
    spec.marks.push(points_for_voronoi_mark(
        &line.name,
        FILTERED_TABLE,
        x.clone(),
        y.clone(),
    ));
    spec.marks.push(voronoi_mark(&line.name, &points));

    add_tooltip_signals(
        &mut spec.signals,
        &line.name,
        &voronoi,
        &line.interactions,
        HoverTarget::Voronoi,
    );
    add_highlight_group_bindings(&mut spec.signals, &highlight, &voronoi, HoverTarget::Voronoi);
    add_highlighted_series_bindings(&mut spec.signals, &voronoi, HoverTarget::Voronoi);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::builder::data::base_data;
    use crate::builder::signal::default_signals;
    use crate::config::BuilderConfig;
    use crate::marks::line::add_line;
    use crate::options::{LineOptions, LineProps, Normalize, NormalizeContext};
    use crate::spec::chart::ChartSpec;
    use serde_json::json;

    fn line(props: serde_json::Value) -> LineOptions {
        let config = BuilderConfig::default();
        let props: LineProps = serde_json::from_value(props).unwrap();
        props.normalize(0, &NormalizeContext::new(&config))
    }

    fn build(props: serde_json::Value) -> ChartSpec {
        let config = BuilderConfig::default();
        let mut spec = ChartSpec::new();
        spec.data = base_data(vec![]);
        spec.signals = default_signals(&[], None, None);
        add_line(&mut spec, &line(props), &config).unwrap();
        spec
    }

    #[test]
    fn test_time_line() {
        let spec = build(json!({}));
        let table = spec.get_data("table").unwrap();
        assert!(table.has_transform_output("datetime0"));
        assert_eq!(
            spec.get_scale("xTime").unwrap().domain_fields(),
            vec!["datetime0".to_string()]
        );
        let group = spec.find_mark("line0_group").unwrap();
        assert_eq!(group.marks.len(), 1);
        assert!(spec.find_mark("line0_voronoi").is_none());
        assert!(spec.dangling_references().unwrap().is_empty());
    }

    #[test]
    fn test_point_line_skips_time_transform() {
        let spec = build(json!({"scaleType": "point", "dimension": "month"}));
        assert!(!spec.get_data("table").unwrap().has_transform_output("month0"));
        assert!(spec.get_scale("xPoint").is_some());
    }

    #[test]
    fn test_gradient_renders_under_line() {
        let spec = build(json!({"gradient": true}));
        let group = spec.find_mark("line0_group").unwrap();
        let names: Vec<_> = group.marks.iter().map(|m| m.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["line0_gradient", "line0"]);
    }

    #[test]
    fn test_metric_range() {
        let spec = build(json!({
            "metricRanges": [{"metricStart": "low", "metricEnd": "high", "metric": "mid", "displayOnHover": true}]
        }));
        let fields = spec.get_scale("yLinear").unwrap().domain_fields();
        assert_eq!(fields, vec!["value", "low", "high"]);
        let range = serde_json::to_value(spec.find_mark("line0MetricRange0").unwrap()).unwrap();
        assert_eq!(range["encode"]["update"]["fillOpacity"][1], json!({"value": 0}));
        assert!(spec.find_mark("line0MetricRange0_line").is_some());
        // Hovering has to be wired for the range to ever show up
        assert!(spec.find_mark("line0_voronoi").is_some());
    }

    #[test]
    fn test_interactive_line() {
        let spec = build(json!({"chartTooltips": [{}], "chartPopovers": [{}], "staticPoint": "isLast"}));
        assert!(spec.get_data("line0_highlightedData").is_some());
        assert!(spec.get_data("line0_selectedData").is_some());
        assert!(spec.get_data("line0_staticPointData").is_some());
        assert!(spec.find_mark("line0_selectionRing").is_some());
        assert!(spec.find_mark("line0_staticPoints").is_some());
        let voronoi = spec.find_mark("line0_voronoi").unwrap();
        assert_eq!(voronoi.source_data(), Some("line0_pointsForVoronoi"));

        let highlighted = serde_json::to_value(spec.get_signal("highlightedItem").unwrap()).unwrap();
        assert_eq!(
            highlighted["on"][0],
            json!({"events": "@line0_voronoi:mouseover", "update": "datum.datum.rscMarkId"})
        );
        assert!(spec.get_signal("line0_hoveredId").is_some());
        assert!(spec.dangling_references().unwrap().is_empty());
    }
}
