use crate::builder::data::{add_series_id, add_stack_transform, get_filtered_table_data};
use crate::builder::encoding::{opacity_encoding, opacity_rules, selection_stroke_rules};
use crate::builder::scale::{
    add_field_to_facet_scale_domain, add_fields_to_scale, add_metric_scale, facet_encoding,
    FacetScale,
};
use crate::builder::signal::HoverTarget;
use crate::config::BuilderConfig;
use crate::constants::{
    ANNOTATION_PADDING, FILTERED_TABLE, SERIES_ID, X_BAND, X_LINEAR, Y_BAND, Y_LINEAR,
};
use crate::marks::trendline::{add_trendline, TrendlineParent};
use crate::marks::{add_tooltip_signals, facet_fields};
use crate::naming;
use crate::options::{BarAnnotationOptions, BarOptions, DimensionScaleType, FacetRef, Orientation};
use crate::spec::chart::ChartSpec;
use crate::spec::mark::{MarkEncodeSpec, MarkEncodingSpec, MarkFacetSpec, MarkSpec};
use crate::spec::scale::{
    ScaleDataReferenceSpec, ScaleDomainSpec, ScaleRangeSpec, ScaleSpec, ScaleTypeSpec,
};
use crate::spec::values::SignalExpressionSpec;
use chartspec_common::error::Result;
use chartspec_common::escape::datum_field;
use serde_json::json;

/// Scales and channels of a bar, depending on its orientation
#[derive(Debug, Clone, Copy)]
struct BarLayout {
    dimension_scale: &'static str,
    metric_scale: &'static str,
    /// Position and size channels along the dimension
    dimension_channels: (&'static str, &'static str),
    /// Channels of the metric start and end
    metric_channels: (&'static str, &'static str),
    /// Size of the chart along the metric
    metric_extent: &'static str,
}

impl BarLayout {
    fn new(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Vertical => Self {
                dimension_scale: X_BAND,
                metric_scale: Y_LINEAR,
                dimension_channels: ("x", "width"),
                metric_channels: ("y2", "y"),
                metric_extent: "height",
            },
            Orientation::Horizontal => Self {
                dimension_scale: Y_BAND,
                metric_scale: X_LINEAR,
                dimension_channels: ("y", "height"),
                metric_channels: ("x", "x2"),
                metric_extent: "width",
            },
        }
    }

    fn dimension_extent(&self) -> &'static str {
        self.dimension_channels.1
    }
}

/// Field that tells apart the bars sharing a dimension value
fn dodge_key(bar: &BarOptions) -> String {
    match &bar.color {
        FacetRef::Field(field) => field.clone(),
        _ => SERIES_ID.to_string(),
    }
}

fn metric_fields(bar: &BarOptions) -> (String, String) {
    if bar.is_stacked() {
        (format!("{}0", bar.metric), format!("{}1", bar.metric))
    } else {
        (bar.metric.clone(), bar.metric.clone())
    }
}

pub fn add_bar(spec: &mut ChartSpec, bar: &BarOptions, config: &BuilderConfig) -> Result<()> {
    let layout = BarLayout::new(bar.orientation);
    let series = facet_fields(&[&bar.color, &bar.line_type, &bar.opacity]);
    add_series_id(&mut spec.data, &series)?;

    if bar.is_stacked() {
        let mut groupby = vec![bar.dimension.clone()];
        groupby.extend(bar.trellis.iter().cloned());
        let filtered = get_filtered_table_data(&mut spec.data)?;
        add_stack_transform(filtered, &groupby, &bar.metric, bar.order.as_deref());
    }

    add_bar_scales(&mut spec.scales, bar, &layout);
    add_tooltip_signals(
        &mut spec.signals,
        &bar.name,
        &bar.name,
        &bar.interactions,
        HoverTarget::Datum,
    );

    let source = match &bar.trellis {
        Some(_) => naming::facet(&naming::trellis(&bar.name)),
        None => FILTERED_TABLE.to_string(),
    };
    let group = if bar.is_stacked() {
        stacked_group(bar, &layout, &source, config)
    } else {
        dodged_group(bar, &layout, &source, config)
    };
    let mark = match &bar.trellis {
        Some(trellis) => trellis_group(&mut spec.scales, bar, &layout, trellis, group),
        None => group,
    };
    spec.marks.push(mark);

    let (_, metric_end) = metric_fields(bar);
    let parent = TrendlineParent {
        name: &bar.name,
        color: &bar.color,
        dimension: bar.dimension.clone(),
        metric: metric_end,
        dimension_scale: layout.dimension_scale.to_string(),
        dimension_scale_type: DimensionScaleType::Band,
        metric_scale: layout.metric_scale.to_string(),
        is_horizontal: bar.orientation == Orientation::Horizontal,
    };
    for trendline in &bar.trendlines {
        add_trendline(spec, &parent, trendline, config)?;
    }
    Ok(())
}

fn add_bar_scales(scales: &mut Vec<ScaleSpec>, bar: &BarOptions, layout: &BarLayout) {
    let dimension = add_fields_to_scale(
        scales,
        layout.dimension_scale,
        ScaleTypeSpec::Band,
        &[bar.dimension.clone()],
    );
    let scale = &mut scales[dimension];
    scale.padding_inner.get_or_insert(bar.padding_ratio);
    scale.padding_outer.get_or_insert(bar.padding_outer);

    let (start, end) = metric_fields(bar);
    let fields = if start == end { vec![end] } else { vec![start, end] };
    add_metric_scale(scales, layout.metric_scale, &fields);

    add_field_to_facet_scale_domain(scales, FacetScale::Color, &bar.color);
    add_field_to_facet_scale_domain(scales, FacetScale::LineType, &bar.line_type);
    add_field_to_facet_scale_domain(scales, FacetScale::LineWidth, &bar.line_width);
    add_field_to_facet_scale_domain(scales, FacetScale::Opacity, &bar.opacity);
}

/// Encoding of the bar rect, positioned along the dimension by `position`/`size`
fn rect_encode(
    bar: &BarOptions,
    layout: &BarLayout,
    position: MarkEncodingSpec,
    size: MarkEncodingSpec,
    config: &BuilderConfig,
) -> MarkEncodeSpec {
    let (start_channel, end_channel) = layout.metric_channels;
    let (start, end) = metric_fields(bar);
    let metric_start = if bar.is_stacked() {
        MarkEncodingSpec::scale_field(layout.metric_scale, start)
    } else {
        MarkEncodingSpec::scale_value(layout.metric_scale, 0)
    };
    let metric_end = MarkEncodingSpec::scale_field(layout.metric_scale, end);

    let fill = facet_encoding(FacetScale::Color, &bar.color);
    let opacity = opacity_encoding(&bar.opacity);
    let has_popover = bar.interactions.has_popover();

    let mut encode = MarkEncodeSpec::default()
        .enter(layout.dimension_channels.0, position)
        .enter(layout.dimension_channels.1, size)
        .enter(start_channel, metric_start)
        .enter(end_channel, metric_end)
        .enter("fill", fill.clone())
        .enter(
            "strokeDash",
            facet_encoding(FacetScale::LineType, &bar.line_type),
        )
        .enter(
            "strokeWidth",
            facet_encoding(FacetScale::LineWidth, &bar.line_width),
        );

    if !bar.has_squared_corners {
        let corners = match bar.orientation {
            Orientation::Vertical => ["cornerRadiusTopLeft", "cornerRadiusTopRight"],
            Orientation::Horizontal => ["cornerRadiusTopRight", "cornerRadiusBottomRight"],
        };
        for corner in corners {
            encode.set("enter", corner, MarkEncodingSpec::value(1));
        }
    }

    if bar.is_interactive() {
        encode.set("update", "fillOpacity", opacity_rules(opacity, has_popover, config));
    } else {
        encode.set("update", "fillOpacity", opacity);
    }
    if has_popover {
        encode.set("update", "stroke", selection_stroke_rules(fill, config));
        encode.set("update", "cursor", MarkEncodingSpec::value("pointer"));
    } else {
        encode.set("update", "stroke", fill);
    }
    encode
}

fn bar_rect(
    bar: &BarOptions,
    layout: &BarLayout,
    from: String,
    position: MarkEncodingSpec,
    size: MarkEncodingSpec,
    config: &BuilderConfig,
) -> MarkSpec {
    MarkSpec::new("rect", bar.name.as_str())
        .from_data(from)
        .interactive(bar.interactions.is_interactive())
        .with_encode(rect_encode(bar, layout, position, size, config))
}

/// One group per series drawing rects stacked along the metric
fn stacked_group(
    bar: &BarOptions,
    layout: &BarLayout,
    source: &str,
    config: &BuilderConfig,
) -> MarkSpec {
    let mut groupby = bar.color.fields();
    if groupby.is_empty() {
        groupby.push(SERIES_ID.to_string());
    }
    let facet = naming::facet(&bar.name);
    let position = MarkEncodingSpec::scale_field(layout.dimension_scale, bar.dimension.as_str());
    let size = MarkEncodingSpec::scale_band(layout.dimension_scale, 1.0);

    let mut group = MarkSpec::new("group", naming::group(&bar.name))
        .from_facet(MarkFacetSpec::new(facet.as_str(), source, groupby));
    group.marks.push(bar_rect(
        bar,
        layout,
        facet.clone(),
        position.clone(),
        size,
        config,
    ));
    for annotation in bar.annotations.iter().take(1) {
        group
            .marks
            .extend(annotation_marks(bar, layout, annotation, &facet, position.clone(), config));
    }
    group
}

/// One group per dimension value with the series side by side on a nested band scale
fn dodged_group(
    bar: &BarOptions,
    layout: &BarLayout,
    source: &str,
    config: &BuilderConfig,
) -> MarkSpec {
    let facet = naming::facet(&bar.name);
    let position_scale = naming::dodge_position(&bar.name);
    let dodge_key = dodge_key(bar);

    let mut scale = ScaleSpec::new(position_scale.as_str(), ScaleTypeSpec::Band);
    scale.domain = Some(ScaleDomainSpec::FieldReference(ScaleDataReferenceSpec::new(
        FILTERED_TABLE,
        dodge_key.as_str(),
    )));
    scale.range = Some(ScaleRangeSpec::Value(json!(layout.dimension_extent())));
    scale.padding_inner = Some(bar.grouped_padding);

    let (position_channel, size_channel) = layout.dimension_channels;
    let mut group = MarkSpec::new("group", naming::group(&bar.name))
        .from_facet(MarkFacetSpec::new(
            facet.as_str(),
            source,
            vec![bar.dimension.clone()],
        ))
        .with_encode(
            MarkEncodeSpec::default()
                .enter(
                    position_channel,
                    MarkEncodingSpec::scale_field(layout.dimension_scale, bar.dimension.as_str()),
                )
                .enter(
                    size_channel,
                    MarkEncodingSpec::scale_band(layout.dimension_scale, 1.0),
                )
                .enter(
                    layout.metric_extent,
                    MarkEncodingSpec::signal(layout.metric_extent),
                ),
        );
    group.scales.push(scale);

    let position = MarkEncodingSpec::scale_field(position_scale.as_str(), dodge_key);
    let size = MarkEncodingSpec::scale_band(position_scale.as_str(), 1.0);
    group.marks.push(bar_rect(
        bar,
        layout,
        facet.clone(),
        position.clone(),
        size,
        config,
    ));
    for annotation in bar.annotations.iter().take(1) {
        group
            .marks
            .extend(annotation_marks(bar, layout, annotation, &facet, position.clone(), config));
    }
    group
}

/// Outer grid of small multiples, one cell per trellis value
fn trellis_group(
    scales: &mut Vec<ScaleSpec>,
    bar: &BarOptions,
    layout: &BarLayout,
    trellis: &str,
    inner: MarkSpec,
) -> MarkSpec {
    let (axis, position, size, other_size) = match bar.trellis_orientation {
        Orientation::Horizontal => ("x", "x", "width", "height"),
        Orientation::Vertical => ("y", "y", "height", "width"),
    };
    let trellis_scale = format!("{axis}TrellisBand");
    let index = add_fields_to_scale(
        scales,
        &trellis_scale,
        ScaleTypeSpec::Band,
        &[trellis.to_string()],
    );
    scales[index].padding_inner.get_or_insert(bar.trellis_padding);

    // The scale running along the trellis axis now spans a single cell
    let cell = format!("bandwidth('{trellis_scale}')");
    let inner_scale = if layout.dimension_scale.starts_with(axis) {
        Some((layout.dimension_scale, format!("[0, {cell}]")))
    } else if layout.metric_scale.starts_with(axis) {
        let range = if axis == "y" {
            format!("[{cell}, 0]")
        } else {
            format!("[0, {cell}]")
        };
        Some((layout.metric_scale, range))
    } else {
        None
    };
    if let Some((name, range)) = inner_scale {
        if let Some(scale) = scales.iter_mut().find(|s| s.name == name) {
            scale.range = Some(ScaleRangeSpec::Signal(SignalExpressionSpec::new(range)));
        }
    }

    let trellis_name = naming::trellis(&bar.name);
    let mut group = MarkSpec::new("group", trellis_name.as_str())
        .from_facet(MarkFacetSpec::new(
            naming::facet(&trellis_name),
            FILTERED_TABLE,
            vec![trellis.to_string()],
        ))
        .with_encode(
            MarkEncodeSpec::default()
                .enter(
                    position,
                    MarkEncodingSpec::scale_field(trellis_scale.as_str(), trellis),
                )
                .enter(size, MarkEncodingSpec::scale_band(trellis_scale.as_str(), 1.0))
                .enter(other_size, MarkEncodingSpec::signal(other_size)),
        );
    group.marks.push(inner);
    group
}

/// Text at the end of each bar, over an optional background
fn annotation_marks(
    bar: &BarOptions,
    layout: &BarLayout,
    annotation: &BarAnnotationOptions,
    facet: &str,
    position: MarkEncodingSpec,
    config: &BuilderConfig,
) -> Vec<MarkSpec> {
    let text_key = annotation.text_key.as_deref().unwrap_or(&bar.metric);
    let text = match &annotation.number_format {
        Some(format) => MarkEncodingSpec::signal(format!(
            "format({}, '{format}')",
            datum_field(text_key)
        )),
        None => MarkEncodingSpec::field(text_key),
    };
    let (_, end) = metric_fields(bar);
    let (dimension_channel, _) = layout.dimension_channels;
    let (_, end_channel) = layout.metric_channels;
    let metric_channel = &end_channel[..1];
    let (offset, align, baseline) = match bar.orientation {
        Orientation::Vertical => (-ANNOTATION_PADDING, "center", "bottom"),
        Orientation::Horizontal => (ANNOTATION_PADDING, "left", "middle"),
    };

    let text_name = naming::annotation_text(&bar.name);
    let mut text_mark = MarkSpec::new("text", text_name.as_str())
        .from_data(facet)
        .interactive(false)
        .with_encode(
            MarkEncodeSpec::default()
                .enter("text", text)
                .enter("fill", MarkEncodingSpec::value("rgb(70, 70, 70)"))
                .enter("fontWeight", MarkEncodingSpec::value("bold"))
                .enter("align", MarkEncodingSpec::value(align))
                .enter("baseline", MarkEncodingSpec::value(baseline))
                .update(dimension_channel, position.with_band(0.5))
                .update(
                    metric_channel,
                    MarkEncodingSpec::scale_field(layout.metric_scale, end).with_offset(offset),
                ),
        );
    text_mark.extra.insert("zindex".to_string(), json!(1));

    let mut marks = vec![text_mark];
    if annotation.show_background {
        let pad = ANNOTATION_PADDING / 2.0;
        marks.push(
            MarkSpec::new("rect", naming::annotation_background(&bar.name))
                .from_data(text_name)
                .interactive(false)
                .with_encode(
                    MarkEncodeSpec::default()
                        .enter("fill", MarkEncodingSpec::value(config.background_color.as_str()))
                        .enter("cornerRadius", MarkEncodingSpec::value(2))
                        .update("x", MarkEncodingSpec::signal(format!("datum.bounds.x1 - {pad}")))
                        .update("x2", MarkEncodingSpec::signal(format!("datum.bounds.x2 + {pad}")))
                        .update("y", MarkEncodingSpec::signal(format!("datum.bounds.y1 - {pad}")))
                        .update("y2", MarkEncodingSpec::signal(format!("datum.bounds.y2 + {pad}"))),
                ),
        );
    }
    marks
}

#[cfg(test)]
mod tests {
    use crate::builder::data::base_data;
    use crate::builder::signal::default_signals;
    use crate::config::BuilderConfig;
    use crate::marks::bar::add_bar;
    use crate::options::{BarOptions, BarProps, Normalize, NormalizeContext};
    use crate::spec::chart::ChartSpec;
    use serde_json::json;

    fn bar(props: serde_json::Value) -> BarOptions {
        let config = BuilderConfig::default();
        let props: BarProps = serde_json::from_value(props).unwrap();
        props.normalize(0, &NormalizeContext::new(&config))
    }

    fn base_spec() -> ChartSpec {
        let mut spec = ChartSpec::new();
        spec.data = base_data(vec![]);
        spec.signals = default_signals(&[], None, None);
        spec
    }

    #[test]
    fn test_dodged_bar() {
        let config = BuilderConfig::default();
        let mut spec = base_spec();
        add_bar(
            &mut spec,
            &bar(json!({"type": "dodged", "dimension": "browser", "metric": "downloads", "color": "os"})),
            &config,
        )
        .unwrap();

        let group = spec.find_mark("bar0_group").unwrap();
        assert_eq!(group.scales[0].name, "bar0_position");
        assert_eq!(group.scales[0].padding_inner, Some(0.4));
        let rect = serde_json::to_value(spec.find_mark("bar0").unwrap()).unwrap();
        assert_eq!(
            rect["encode"]["enter"]["x"],
            json!({"scale": "bar0_position", "field": "os"})
        );
        assert_eq!(
            rect["encode"]["enter"]["y2"],
            json!({"scale": "yLinear", "value": 0})
        );
        let filtered = spec.get_data("filteredTable").unwrap();
        assert!(!filtered.has_transform_output("downloads0"));
        assert_eq!(
            spec.get_scale("yLinear").unwrap().domain_fields(),
            vec!["downloads".to_string()]
        );
    }

    #[test]
    fn test_horizontal_stacked_bar() {
        let config = BuilderConfig::default();
        let mut spec = base_spec();
        add_bar(
            &mut spec,
            &bar(json!({"orientation": "horizontal", "order": "rank"})),
            &config,
        )
        .unwrap();
        assert!(spec.get_scale("yBand").is_some());
        assert_eq!(
            spec.get_scale("xLinear").unwrap().domain_fields(),
            vec!["value0".to_string(), "value1".to_string()]
        );
        let rect = serde_json::to_value(spec.find_mark("bar0").unwrap()).unwrap();
        assert_eq!(rect["encode"]["enter"]["x"], json!({"scale": "xLinear", "field": "value0"}));
        assert_eq!(rect["encode"]["enter"]["x2"], json!({"scale": "xLinear", "field": "value1"}));
    }

    #[test]
    fn test_trellis_bar() {
        let config = BuilderConfig::default();
        let mut spec = base_spec();
        add_bar(&mut spec, &bar(json!({"trellis": "region"})), &config).unwrap();

        let trellis = spec.find_mark("bar0_trellis").unwrap();
        assert_eq!(trellis.marks[0].name.as_deref(), Some("bar0_group"));
        let group = serde_json::to_value(&trellis.marks[0]).unwrap();
        assert_eq!(group["from"]["facet"]["data"], json!("bar0_trellis_facet"));
        let x_band = serde_json::to_value(spec.get_scale("xBand").unwrap()).unwrap();
        assert_eq!(x_band["range"], json!({"signal": "[0, bandwidth('xTrellisBand')]"}));
        assert!(spec.get_scale("xTrellisBand").is_some());
    }

    #[test]
    fn test_interactive_bar() {
        let config = BuilderConfig::default();
        let mut spec = base_spec();
        add_bar(
            &mut spec,
            &bar(json!({"chartTooltips": [{}], "chartPopovers": [{}]})),
            &config,
        )
        .unwrap();
        let rect = spec.find_mark("bar0").unwrap();
        assert_eq!(rect.interactive, Some(true));
        let encode = serde_json::to_value(rect.encode.as_ref().unwrap()).unwrap();
        assert_eq!(encode["update"]["fillOpacity"].as_array().unwrap().len(), 4);
        assert_eq!(encode["update"]["stroke"].as_array().unwrap().len(), 2);
        assert!(spec.get_signal("bar0_hoveredId").is_some());
        assert_eq!(spec.get_signal("highlightedItem").unwrap().on.len(), 2);
    }

    #[test]
    fn test_annotation() {
        let config = BuilderConfig::default();
        let mut spec = base_spec();
        add_bar(
            &mut spec,
            &bar(json!({"barAnnotations": [{"textKey": "percent", "numberFormat": ".0%"}]})),
            &config,
        )
        .unwrap();
        let text = serde_json::to_value(spec.find_mark("bar0_annotationText").unwrap()).unwrap();
        assert_eq!(
            text["encode"]["enter"]["text"],
            json!({"signal": "format(datum.percent, '.0%')"})
        );
        assert_eq!(text["encode"]["update"]["y"]["field"], json!("value1"));
        assert!(spec.find_mark("bar0_annotationBackground").is_some());
        assert!(spec.dangling_references().unwrap().is_empty());
    }
}
