use crate::builder::data::get_or_add_derived_data;
use crate::builder::scale::{add_field_to_facet_scale_domain, facet_encoding, FacetScale};
use crate::builder::signal::{add_highlighted_series_bindings, add_hovered_id_signal, HoverTarget};
use crate::config::BuilderConfig;
use crate::constants::{
    ANNOTATION_DATUM, ANNOTATION_DISTANCE, COLOR_SCALE, FILTERED_TABLE, HIGHLIGHTED_SERIES,
    LABEL_ANCHORS, SERIES_ID, TRENDLINE_VALUE,
};
use crate::marks::facet_fields;
use crate::naming;
use crate::options::trendline::{AnnotationPosition, ExtentBound, TrendlineMethod};
use crate::options::{DimensionScaleType, FacetRef, TrendlineAnnotationOptions, TrendlineOptions};
use crate::spec::chart::ChartSpec;
use crate::spec::mark::{MarkEncodeSpec, MarkEncodingSpec, MarkFacetSpec, MarkSpec};
use crate::spec::transform::aggregate::{AggregateOpSpec, AggregateTransformSpec};
use crate::spec::transform::extent::ExtentTransformSpec;
use crate::spec::transform::formula::FormulaTransformSpec;
use crate::spec::transform::label::LabelTransformSpec;
use crate::spec::transform::regression::{RegressionMethodSpec, RegressionTransformSpec};
use crate::spec::transform::TransformSpec;
use crate::spec::values::{Field, NumberOrSignalSpec};
use chartspec_common::error::Result;
use chartspec_common::escape::datum_field;
use log::warn;
use serde_json::json;

/// What a trendline needs to know about the mark it belongs to
#[derive(Debug, Clone)]
pub struct TrendlineParent<'a> {
    pub name: &'a str,
    pub color: &'a FacetRef,
    /// Field read through the dimension scale
    pub dimension: String,
    pub metric: String,
    pub dimension_scale: String,
    pub dimension_scale_type: DimensionScaleType,
    pub metric_scale: String,
    /// The dimension runs along the y axis
    pub is_horizontal: bool,
}

impl<'a> TrendlineParent<'a> {
    /// Channels of the dimension and metric positions
    fn channels(&self) -> (&'static str, &'static str, &'static str) {
        if self.is_horizontal {
            ("y", "y2", "x")
        } else {
            ("x", "x2", "y")
        }
    }

    fn is_discrete(&self) -> bool {
        matches!(
            self.dimension_scale_type,
            DimensionScaleType::Band | DimensionScaleType::Point
        )
    }

    fn dimension_min(&self) -> String {
        format!("{}Min", self.dimension)
    }

    fn dimension_max(&self) -> String {
        format!("{}Max", self.dimension)
    }
}

fn regression_method(method: TrendlineMethod) -> (RegressionMethodSpec, Option<u32>) {
    match method {
        TrendlineMethod::Exponential => (RegressionMethodSpec::Exp, None),
        TrendlineMethod::Logarithmic => (RegressionMethodSpec::Log, None),
        TrendlineMethod::Power => (RegressionMethodSpec::Pow, None),
        TrendlineMethod::Quadratic => (RegressionMethodSpec::Quad, None),
        TrendlineMethod::Polynomial(order) => (RegressionMethodSpec::Poly, Some(order)),
        _ => (RegressionMethodSpec::Linear, None),
    }
}

/// Regression extent: explicit value, then scale domain edge, then data extent
fn regression_extent(
    parent: &TrendlineParent,
    trendline: &TrendlineOptions,
) -> Option<[NumberOrSignalSpec; 2]> {
    if trendline.dimension_extent == [ExtentBound::Data, ExtentBound::Data] {
        return None;
    }
    let extent_signal = naming::extent(&trendline.name);
    let bound = |i: usize| match trendline.dimension_extent[i] {
        ExtentBound::Value(v) => NumberOrSignalSpec::Number(v),
        ExtentBound::Domain => {
            NumberOrSignalSpec::signal(format!("domain('{}')[{i}]", parent.dimension_scale))
        }
        ExtentBound::Data => NumberOrSignalSpec::signal(format!("{extent_signal}[{i}]")),
    };
    Some([bound(0), bound(1)])
}

/// Position on the dimension for an aggregate trendline end
fn aggregate_bound(parent: &TrendlineParent, bound: ExtentBound, end: usize) -> MarkEncodingSpec {
    if parent.is_discrete() {
        let size = if parent.is_horizontal { "height" } else { "width" };
        return match end {
            0 => MarkEncodingSpec::value(0),
            _ => MarkEncodingSpec::signal(size),
        };
    }
    match bound {
        ExtentBound::Value(v) => MarkEncodingSpec::scale_value(parent.dimension_scale.as_str(), v),
        ExtentBound::Domain => {
            MarkEncodingSpec::signal(format!("range('{}')[{end}]", parent.dimension_scale))
        }
        ExtentBound::Data => {
            let field = if end == 0 {
                parent.dimension_min()
            } else {
                parent.dimension_max()
            };
            MarkEncodingSpec::scale_field(parent.dimension_scale.as_str(), field)
        }
    }
}

fn trendline_encode(
    parent: &TrendlineParent,
    trendline: &TrendlineOptions,
    color: &FacetRef,
) -> MarkEncodeSpec {
    let opacity = if trendline.display_on_hover {
        vec![
            MarkEncodingSpec::value(trendline.opacity)
                .with_test(format!("{HIGHLIGHTED_SERIES} === datum.{SERIES_ID}")),
            MarkEncodingSpec::value(0),
        ]
    } else {
        vec![MarkEncodingSpec::value(trendline.opacity)]
    };
    MarkEncodeSpec::default()
        .enter("stroke", facet_encoding(FacetScale::Color, color))
        .enter(
            "strokeDash",
            facet_encoding(FacetScale::LineType, &trendline.line_type),
        )
        .enter(
            "strokeWidth",
            facet_encoding(FacetScale::LineWidth, &trendline.line_width),
        )
        .update("strokeOpacity", opacity)
        .update(
            parent.channels().2,
            MarkEncodingSpec::scale_field(parent.metric_scale.as_str(), TRENDLINE_VALUE),
        )
}

/// Add the trendline data, its mark and its annotations
pub fn add_trendline(
    spec: &mut ChartSpec,
    parent: &TrendlineParent,
    trendline: &TrendlineOptions,
    config: &BuilderConfig,
) -> Result<()> {
    if let TrendlineMethod::MovingAverage(period) = trendline.method {
        warn!(
            "Moving average trendlines are not supported yet, {} (period {period}) is not drawn",
            trendline.name
        );
        return Ok(());
    }
    if trendline.method.is_regression() && parent.is_discrete() {
        warn!(
            "Regression trendlines need a continuous dimension, {} is not drawn",
            trendline.name
        );
        return Ok(());
    }

    let color = trendline.color.as_ref().unwrap_or(parent.color);
    add_field_to_facet_scale_domain(&mut spec.scales, FacetScale::Color, color);
    add_field_to_facet_scale_domain(&mut spec.scales, FacetScale::LineType, &trendline.line_type);

    let mut groupby = facet_fields(&[color]);
    if !groupby.iter().any(|f| f == SERIES_ID) {
        groupby.push(SERIES_ID.to_string());
    }

    let data_name = naming::data(&trendline.name);
    let data = get_or_add_derived_data(&mut spec.data, &data_name, FILTERED_TABLE);
    let (dim_start, dim_end, _) = parent.channels();
    let mut encode = trendline_encode(parent, trendline, color);

    let mark = if trendline.method.is_aggregate() {
        let op = match trendline.method {
            TrendlineMethod::Median => AggregateOpSpec::Median,
            _ => AggregateOpSpec::Mean,
        };
        let mut fields = vec![Some(Field::from(parent.metric.as_str()))];
        let mut ops = vec![op];
        let mut as_ = vec![Some(TRENDLINE_VALUE.to_string())];
        if !parent.is_discrete() {
            fields.push(Some(Field::from(parent.dimension.as_str())));
            fields.push(Some(Field::from(parent.dimension.as_str())));
            ops.extend([AggregateOpSpec::Min, AggregateOpSpec::Max]);
            as_.push(Some(parent.dimension_min()));
            as_.push(Some(parent.dimension_max()));
        }
        data.push_transform_once(TransformSpec::Aggregate(AggregateTransformSpec {
            groupby: groupby.iter().cloned().map(Field::from).collect(),
            fields: Some(fields),
            ops: Some(ops),
            as_: Some(as_),
            cross: None,
            drop: None,
            extra: Default::default(),
        }));
        encode.set(
            "update",
            dim_start,
            aggregate_bound(parent, trendline.dimension_extent[0], 0),
        );
        encode.set(
            "update",
            dim_end,
            aggregate_bound(parent, trendline.dimension_extent[1], 1),
        );
        MarkSpec::new("rule", trendline.name.as_str())
            .from_data(data_name.as_str())
            .with_encode(encode)
    } else {
        let extent = regression_extent(parent, trendline);
        if extent.is_some() && trendline.dimension_extent.contains(&ExtentBound::Data) {
            data.push_transform_once(TransformSpec::Extent(ExtentTransformSpec {
                field: Field::from(parent.dimension.as_str()),
                signal: Some(naming::extent(&trendline.name)),
                extra: Default::default(),
            }));
        }
        let (method, order) = regression_method(trendline.method);
        data.push_transform_once(TransformSpec::Regression(RegressionTransformSpec {
            x: Field::from(parent.dimension.as_str()),
            y: Field::from(parent.metric.as_str()),
            groupby: Some(groupby.iter().cloned().map(Field::from).collect()),
            method: Some(method),
            order,
            extent,
            as_: Some([parent.dimension.clone(), TRENDLINE_VALUE.to_string()]),
            extra: Default::default(),
        }));
        encode.set(
            "update",
            dim_start,
            MarkEncodingSpec::scale_field(parent.dimension_scale.as_str(), parent.dimension.as_str()),
        );
        let line = MarkSpec::new("line", trendline.name.as_str())
            .from_data(naming::facet(&trendline.name))
            .with_encode(encode);
        let mut group = MarkSpec::new("group", naming::group(&trendline.name)).from_facet(
            MarkFacetSpec::new(naming::facet(&trendline.name), data_name.as_str(), groupby.clone()),
        );
        group.marks.push(line);
        group
    };

    let has_tooltip = trendline.interactions.has_tooltip();
    let mark = if has_tooltip {
        add_hovered_id_signal(&mut spec.signals, &trendline.name);
        add_highlighted_series_bindings(&mut spec.signals, &trendline.name, HoverTarget::Datum);
        set_interactive(mark, &trendline.name)
    } else {
        mark
    };
    spec.marks.push(mark);

    for annotation in &trendline.annotations {
        add_trendline_annotation(spec, parent, trendline, annotation, color, &groupby, config);
    }
    Ok(())
}

/// Mark the drawn trendline itself interactive, wherever it sits in the tree
fn set_interactive(mut mark: MarkSpec, name: &str) -> MarkSpec {
    if let Some(target) = mark.find_mark_mut(name) {
        target.interactive = Some(true);
    }
    mark
}

/// Color of an annotation text or badge read from the anchor row at `path`
fn anchored_color(color: &FacetRef, path: &str) -> MarkEncodingSpec {
    match color {
        FacetRef::Field(field) | FacetRef::Dual(field, _) => {
            MarkEncodingSpec::scale_field(COLOR_SCALE, format!("{path}.{field}"))
        }
        FacetRef::Static(s) => MarkEncodingSpec::value(s.value.clone()),
    }
}

fn add_trendline_annotation(
    spec: &mut ChartSpec,
    parent: &TrendlineParent,
    trendline: &TrendlineOptions,
    annotation: &TrendlineAnnotationOptions,
    color: &FacetRef,
    groupby: &[String],
    config: &BuilderConfig,
) {
    let (dim_channel, _, metric_channel) = parent.channels();
    let trendline_data = naming::data(&trendline.name);

    // Anchor rows: one per series, with the value read from `prefix`
    let (source, prefix, dimension_encoding) = if trendline.method.is_aggregate() {
        let dimension_encoding = match annotation.position {
            AnnotationPosition::Start => aggregate_bound(parent, trendline.dimension_extent[0], 0),
            AnnotationPosition::End => aggregate_bound(parent, trendline.dimension_extent[1], 1),
            AnnotationPosition::Value(v) => {
                MarkEncodingSpec::scale_value(parent.dimension_scale.as_str(), v)
            }
        };
        (trendline_data, String::new(), dimension_encoding)
    } else {
        let anchor_data_name = naming::data(&annotation.name);
        let anchor_data = get_or_add_derived_data(&mut spec.data, &anchor_data_name, &trendline_data);
        let (field, op) = match annotation.position {
            AnnotationPosition::Start => (parent.dimension.clone(), AggregateOpSpec::Argmin),
            AnnotationPosition::End => (parent.dimension.clone(), AggregateOpSpec::Argmax),
            AnnotationPosition::Value(v) => {
                anchor_data.push_transform_once(TransformSpec::Formula(FormulaTransformSpec::new(
                    format!("abs({} - {v})", datum_field(&parent.dimension)),
                    ANNOTATION_DISTANCE,
                )));
                (ANNOTATION_DISTANCE.to_string(), AggregateOpSpec::Argmin)
            }
        };
        anchor_data.push_transform_once(TransformSpec::Aggregate(AggregateTransformSpec {
            groupby: groupby.iter().cloned().map(Field::from).collect(),
            fields: Some(vec![Some(Field::from(field))]),
            ops: Some(vec![op]),
            as_: Some(vec![Some(ANNOTATION_DATUM.to_string())]),
            cross: None,
            drop: None,
            extra: Default::default(),
        }));
        let dimension_encoding = MarkEncodingSpec::scale_field(
            parent.dimension_scale.as_str(),
            format!("{ANNOTATION_DATUM}.{}", parent.dimension),
        );
        (anchor_data_name, format!("{ANNOTATION_DATUM}."), dimension_encoding)
    };

    // Invisible point the label is placed around
    let anchor_name = naming::anchor_point(&annotation.name);
    let anchor = MarkSpec::new("symbol", anchor_name.as_str())
        .from_data(source)
        .interactive(false)
        .with_encode(
            MarkEncodeSpec::default()
                .enter("size", MarkEncodingSpec::value(0))
                .update(dim_channel, dimension_encoding)
                .update(
                    metric_channel,
                    MarkEncodingSpec::scale_field(
                        parent.metric_scale.as_str(),
                        format!("{prefix}{TRENDLINE_VALUE}"),
                    ),
                ),
        );

    let value = format!("datum.datum.{prefix}{TRENDLINE_VALUE}");
    let formatted = if annotation.number_format.is_empty() {
        value
    } else {
        format!("format({value}, '{}')", annotation.number_format)
    };
    let text_expr = if annotation.prefix.is_empty() {
        formatted
    } else {
        format!("'{} ' + {formatted}", annotation.prefix.replace('\'', "\\'"))
    };
    let text_fill = if annotation.badge {
        MarkEncodingSpec::value(config.background_color.as_str())
    } else {
        anchored_color(color, "datum.datum")
    };
    let mut text = MarkSpec::new("text", annotation.name.as_str())
        .from_data(anchor_name.as_str())
        .interactive(false)
        .with_encode(
            MarkEncodeSpec::default()
                .enter("text", MarkEncodingSpec::signal(text_expr))
                .enter("fill", text_fill)
                .enter("fontWeight", MarkEncodingSpec::value("bold")),
        );
    text.extra.insert("zindex".to_string(), json!(1));
    text.transform.push(TransformSpec::Label(LabelTransformSpec {
        size: [
            NumberOrSignalSpec::signal("width"),
            NumberOrSignalSpec::signal("height"),
        ],
        anchor: LABEL_ANCHORS.iter().map(|a| a.to_string()).collect(),
        offset: vec![6.0],
        avoid_marks: vec![trendline.name.clone()],
        avoid_base_mark: Some(false),
        padding: None,
        extra: Default::default(),
    }));

    spec.marks.push(anchor);
    spec.marks.push(text);
    if annotation.badge {
        let badge = MarkSpec::new("rect", naming::badge(&annotation.name))
            .from_data(annotation.name.as_str())
            .interactive(false)
            .with_encode(
                MarkEncodeSpec::default()
                    .enter("cornerRadius", MarkEncodingSpec::value(2))
                    .update("fill", anchored_color(color, "datum.datum.datum"))
                    .update("x", MarkEncodingSpec::signal("datum.bounds.x1 - 3"))
                    .update("x2", MarkEncodingSpec::signal("datum.bounds.x2 + 3"))
                    .update("y", MarkEncodingSpec::signal("datum.bounds.y1 - 3"))
                    .update("y2", MarkEncodingSpec::signal("datum.bounds.y2 + 3")),
            );
        spec.marks.push(badge);
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BuilderConfig;
    use crate::marks::trendline::{add_trendline, TrendlineParent};
    use crate::options::trendline::{ExtentBound, TrendlineMethod};
    use crate::options::{
        DimensionScaleType, FacetRef, Normalize, NormalizeContext, TrendlineProps,
    };
    use crate::spec::chart::ChartSpec;
    use serde_json::json;

    fn parent(color: &FacetRef) -> TrendlineParent<'_> {
        TrendlineParent {
            name: "scatter0",
            color,
            dimension: "x".to_string(),
            metric: "y".to_string(),
            dimension_scale: "xLinear".to_string(),
            dimension_scale_type: DimensionScaleType::Linear,
            metric_scale: "yLinear".to_string(),
            is_horizontal: false,
        }
    }

    fn trendline(props: serde_json::Value) -> crate::options::TrendlineOptions {
        let config = BuilderConfig::default();
        let ctx = NormalizeContext::new(&config);
        let props: TrendlineProps = serde_json::from_value(props).unwrap();
        props.normalize(0, &ctx.child("scatter0"))
    }

    #[test]
    fn test_regression_trendline() {
        let config = BuilderConfig::default();
        let color = FacetRef::field("series");
        let mut spec = ChartSpec::new();
        let options = trendline(json!({"method": "polynomial-3", "dimensionExtent": [0, "domain"]}));
        assert_eq!(options.method, TrendlineMethod::Polynomial(3));
        add_trendline(&mut spec, &parent(&color), &options, &config).unwrap();

        let data = serde_json::to_value(spec.get_data("scatter0Trendline0_data").unwrap()).unwrap();
        assert_eq!(
            data["transform"][0],
            json!({
                "type": "regression",
                "x": "x",
                "y": "y",
                "groupby": ["series", "rscSeriesId"],
                "method": "poly",
                "order": 3,
                "extent": [0.0, {"signal": "domain('xLinear')[1]"}],
                "as": ["x", "rscTrendlineValue"]
            })
        );
        assert!(spec.find_mark("scatter0Trendline0_group").is_some());
        assert_eq!(spec.find_mark("scatter0Trendline0").unwrap().type_, "line");
    }

    #[test]
    fn test_data_bound_uses_extent_signal() {
        let config = BuilderConfig::default();
        let color = FacetRef::field("series");
        let mut spec = ChartSpec::new();
        let mut options = trendline(json!({"method": "linear"}));
        options.dimension_extent = [ExtentBound::Data, ExtentBound::Value(10.0)];
        add_trendline(&mut spec, &parent(&color), &options, &config).unwrap();

        let data = serde_json::to_value(spec.get_data("scatter0Trendline0_data").unwrap()).unwrap();
        assert_eq!(
            data["transform"][0],
            json!({"type": "extent", "field": "x", "signal": "scatter0Trendline0_extent"})
        );
        assert_eq!(
            data["transform"][1]["extent"],
            json!([{"signal": "scatter0Trendline0_extent[0]"}, 10.0])
        );
    }

    #[test]
    fn test_average_trendline_is_a_rule() {
        let config = BuilderConfig::default();
        let color = FacetRef::field("series");
        let mut spec = ChartSpec::new();
        let options = trendline(json!({"method": "average"}));
        add_trendline(&mut spec, &parent(&color), &options, &config).unwrap();

        let rule = spec.find_mark("scatter0Trendline0").unwrap();
        assert_eq!(rule.type_, "rule");
        let data = serde_json::to_value(spec.get_data("scatter0Trendline0_data").unwrap()).unwrap();
        assert_eq!(data["transform"][0]["ops"], json!(["mean", "min", "max"]));
        assert_eq!(
            data["transform"][0]["as"],
            json!(["rscTrendlineValue", "xMin", "xMax"])
        );
    }

    #[test]
    fn test_moving_average_adds_nothing() {
        let config = BuilderConfig::default();
        let color = FacetRef::field("series");
        let mut spec = ChartSpec::new();
        let options = trendline(json!({"method": "movingAverage-3"}));
        add_trendline(&mut spec, &parent(&color), &options, &config).unwrap();
        assert!(spec.data.is_empty());
        assert!(spec.marks.is_empty());
    }

    #[test]
    fn test_annotation_with_badge() {
        let config = BuilderConfig::default();
        let color = FacetRef::field("series");
        let mut spec = ChartSpec::new();
        let options = trendline(json!({
            "method": "linear",
            "trendlineAnnotations": [{"dimensionValue": "end", "badge": true, "numberFormat": ".2f"}]
        }));
        add_trendline(&mut spec, &parent(&color), &options, &config).unwrap();

        let anchor_data =
            serde_json::to_value(spec.get_data("scatter0Trendline0Annotation0_data").unwrap())
                .unwrap();
        assert_eq!(anchor_data["source"], json!("scatter0Trendline0_data"));
        assert_eq!(anchor_data["transform"][0]["ops"], json!(["argmax"]));

        let text = serde_json::to_value(spec.find_mark("scatter0Trendline0Annotation0").unwrap())
            .unwrap();
        assert_eq!(text["from"], json!({"data": "scatter0Trendline0Annotation0_anchorPoint"}));
        assert_eq!(text["transform"][0]["type"], json!("label"));
        assert_eq!(text["transform"][0]["anchor"][0], json!("top"));
        assert_eq!(
            text["encode"]["enter"]["text"]["signal"],
            json!("format(datum.datum.rscAnnotationDatum.rscTrendlineValue, '.2f')")
        );
        assert!(spec.find_mark("scatter0Trendline0Annotation0_badge").is_some());
    }
}
