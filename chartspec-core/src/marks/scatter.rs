use crate::builder::data::{add_selected_data, add_series_id, add_time_transform, get_table_data};
use crate::builder::encoding::{
    opacity_encoding, opacity_rules, selection_ring_mark, selection_stroke_rules, voronoi_mark,
};
use crate::builder::scale::{
    add_dimension_scale, add_field_to_facet_scale_domain, add_fields_to_scale, facet_encoding,
    FacetScale,
};
use crate::builder::signal::HoverTarget;
use crate::config::BuilderConfig;
use crate::constants::{FILTERED_TABLE, SERIES_ID, Y_LINEAR};
use crate::marks::trendline::{add_trendline, TrendlineParent};
use crate::marks::{add_tooltip_signals, facet_fields};
use crate::naming;
use crate::options::{DimensionScaleType, ScatterOptions, ScatterPathOptions};
use crate::spec::chart::ChartSpec;
use crate::spec::mark::{MarkEncodeSpec, MarkEncodingSpec, MarkFacetSpec, MarkSpec};
use crate::spec::scale::ScaleTypeSpec;
use chartspec_common::error::Result;

pub fn add_scatter(
    spec: &mut ChartSpec,
    scatter: &ScatterOptions,
    config: &BuilderConfig,
) -> Result<()> {
    let series = facet_fields(&[
        &scatter.color,
        &scatter.line_type,
        &scatter.opacity,
        &scatter.size,
    ]);
    add_series_id(&mut spec.data, &series)?;

    let dimension = match scatter.dimension_scale_type {
        DimensionScaleType::Time => {
            add_time_transform(
                get_table_data(&mut spec.data)?,
                &scatter.dimension,
                Default::default(),
            );
            format!("{}0", scatter.dimension)
        }
        _ => scatter.dimension.clone(),
    };
    let x_scale = add_dimension_scale(
        &mut spec.scales,
        "x",
        scatter.dimension_scale_type,
        &dimension,
        0.0,
    );
    // Unlike bar and area metrics, scatter metrics are not anchored at zero
    let y_index = add_fields_to_scale(
        &mut spec.scales,
        Y_LINEAR,
        ScaleTypeSpec::Linear,
        &[scatter.metric.clone()],
    );
    spec.scales[y_index].nice.get_or_insert(true);
    spec.scales[y_index].zero.get_or_insert(false);

    add_field_to_facet_scale_domain(&mut spec.scales, FacetScale::Color, &scatter.color);
    add_field_to_facet_scale_domain(&mut spec.scales, FacetScale::LineType, &scatter.line_type);
    add_field_to_facet_scale_domain(&mut spec.scales, FacetScale::LineWidth, &scatter.line_width);
    add_field_to_facet_scale_domain(&mut spec.scales, FacetScale::Opacity, &scatter.opacity);
    add_field_to_facet_scale_domain(&mut spec.scales, FacetScale::SymbolSize, &scatter.size);

    let x = MarkEncodingSpec::scale_field(x_scale.as_str(), dimension.as_str());
    let y = MarkEncodingSpec::scale_field(Y_LINEAR, scatter.metric.as_str());

    // Paths go first so the points are drawn over them
    for path in &scatter.scatter_paths {
        add_field_to_facet_scale_domain(
            &mut spec.scales,
            FacetScale::SymbolPathWidth,
            &path.path_width,
        );
        spec.marks.push(scatter_path_group(path, &x, &y));
    }

    spec.marks.push(scatter_mark(scatter, &x, &y, config));

    if scatter.interactions.has_popover() {
        add_selected_data(&mut spec.data, &scatter.name);
        spec.marks.push(selection_ring_mark(
            &scatter.name,
            x.clone(),
            y.clone(),
            &scatter.size,
            config,
        ));
    }
    if scatter.interactions.is_interactive() {
        spec.marks.push(voronoi_mark(&scatter.name, &scatter.name));
        add_tooltip_signals(
            &mut spec.signals,
            &scatter.name,
            &naming::voronoi(&scatter.name),
            &scatter.interactions,
            HoverTarget::Voronoi,
        );
    }

    let parent = TrendlineParent {
        name: &scatter.name,
        color: &scatter.color,
        dimension,
        metric: scatter.metric.clone(),
        dimension_scale: x_scale,
        dimension_scale_type: scatter.dimension_scale_type,
        metric_scale: Y_LINEAR.to_string(),
        is_horizontal: false,
    };
    for trendline in &scatter.trendlines {
        add_trendline(spec, &parent, trendline, config)?;
    }
    Ok(())
}

fn scatter_mark(
    scatter: &ScatterOptions,
    x: &MarkEncodingSpec,
    y: &MarkEncodingSpec,
    config: &BuilderConfig,
) -> MarkSpec {
    let color = facet_encoding(FacetScale::Color, &scatter.color);
    let opacity = opacity_encoding(&scatter.opacity);
    let has_popover = scatter.interactions.has_popover();

    let mut encode = MarkEncodeSpec::default()
        .enter("shape", MarkEncodingSpec::value("circle"))
        .enter("blend", MarkEncodingSpec::value(scatter.color_scheme.blend_mode()))
        .enter("fill", color.clone())
        .enter(
            "size",
            facet_encoding(FacetScale::SymbolSize, &scatter.size),
        )
        .enter(
            "strokeDash",
            facet_encoding(FacetScale::LineType, &scatter.line_type),
        )
        .enter(
            "strokeWidth",
            facet_encoding(FacetScale::LineWidth, &scatter.line_width),
        )
        .update("x", x.clone())
        .update("y", y.clone());
    if scatter.has_interactive_children() {
        encode.set(
            "update",
            "fillOpacity",
            opacity_rules(opacity.clone(), has_popover, config),
        );
        encode.set(
            "update",
            "strokeOpacity",
            opacity_rules(opacity, has_popover, config),
        );
    } else {
        encode.set("update", "fillOpacity", opacity.clone());
        encode.set("update", "strokeOpacity", opacity);
    }
    if has_popover {
        encode.set("update", "stroke", selection_stroke_rules(color, config));
    } else {
        encode.set("update", "stroke", color);
    }

    MarkSpec::new("symbol", scatter.name.as_str())
        .from_data(FILTERED_TABLE)
        .interactive(false)
        .with_encode(encode)
}

/// Trail connecting the points of each `groupBy` group
fn scatter_path_group(
    path: &ScatterPathOptions,
    x: &MarkEncodingSpec,
    y: &MarkEncodingSpec,
) -> MarkSpec {
    let groupby = if path.group_by.is_empty() {
        vec![SERIES_ID.to_string()]
    } else {
        path.group_by.clone()
    };
    let facet = naming::facet(&path.name);
    let mut group = MarkSpec::new("group", naming::group(&path.name)).from_facet(
        MarkFacetSpec::new(facet.as_str(), FILTERED_TABLE, groupby),
    );
    group.marks.push(
        MarkSpec::new("trail", path.name.as_str())
            .from_data(facet)
            .interactive(false)
            .with_encode(
                MarkEncodeSpec::default()
                    .enter("fill", MarkEncodingSpec::value(path.color.as_str()))
                    .enter("fillOpacity", MarkEncodingSpec::value(path.opacity))
                    .enter(
                        "size",
                        facet_encoding(FacetScale::SymbolPathWidth, &path.path_width),
                    )
                    .update("x", x.clone())
                    .update("y", y.clone()),
            ),
    );
    group
}

#[cfg(test)]
mod tests {
    use crate::builder::data::base_data;
    use crate::builder::signal::default_signals;
    use crate::config::{BuilderConfig, ColorScheme};
    use crate::marks::scatter::add_scatter;
    use crate::options::{Normalize, NormalizeContext, ScatterProps};
    use crate::spec::chart::ChartSpec;
    use rstest::rstest;
    use serde_json::json;

    fn build(props: serde_json::Value, config: &BuilderConfig) -> ChartSpec {
        let props: ScatterProps = serde_json::from_value(props).unwrap();
        let scatter = props.normalize(0, &NormalizeContext::new(config));
        let mut spec = ChartSpec::new();
        spec.data = base_data(vec![]);
        spec.signals = default_signals(&[], None, None);
        add_scatter(&mut spec, &scatter, config).unwrap();
        spec
    }

    fn update_channel(spec: &ChartSpec, mark: &str, channel: &str) -> serde_json::Value {
        let mark = serde_json::to_value(spec.find_mark(mark).unwrap()).unwrap();
        mark["encode"]["update"][channel].clone()
    }

    #[rstest]
    #[case(ColorScheme::Light, "multiply")]
    #[case(ColorScheme::Dark, "screen")]
    fn test_blend_follows_color_scheme(#[case] scheme: ColorScheme, #[case] blend: &str) {
        let config = BuilderConfig {
            color_scheme: scheme,
            ..Default::default()
        };
        let spec = build(json!({}), &config);
        let mark = serde_json::to_value(spec.find_mark("scatter0").unwrap()).unwrap();
        assert_eq!(mark["encode"]["enter"]["blend"], json!({"value": blend}));
    }

    #[rstest]
    #[case(json!({}), 0)]
    #[case(json!({"chartTooltips": [{}]}), 3)]
    #[case(json!({"chartTooltips": [{}], "chartPopovers": [{}]}), 4)]
    fn test_opacity_rules_match_children(#[case] props: serde_json::Value, #[case] rules: usize) {
        let spec = build(props, &BuilderConfig::default());
        let opacity = update_channel(&spec, "scatter0", "fillOpacity");
        match opacity.as_array() {
            Some(list) => assert_eq!(list.len(), rules),
            None => assert_eq!(rules, 0),
        }
    }

    #[test]
    fn test_selection_ring_size() {
        let spec = build(json!({"chartPopovers": [{}]}), &BuilderConfig::default());
        let ring = serde_json::to_value(spec.find_mark("scatter0_selectionRing").unwrap()).unwrap();
        assert_eq!(ring["encode"]["enter"]["size"], json!({"value": 196.0}));
        let voronoi = spec.find_mark("scatter0_voronoi").unwrap();
        assert_eq!(voronoi.source_data(), Some("scatter0"));
    }

    #[test]
    fn test_scatter_path() {
        let spec = build(
            json!({"scatterPaths": [{"groupBy": ["team"], "pathWidth": "pathSize"}]}),
            &BuilderConfig::default(),
        );
        assert_eq!(spec.marks[0].name.as_deref(), Some("scatter0Path0_group"));
        let trail = serde_json::to_value(spec.find_mark("scatter0Path0").unwrap()).unwrap();
        assert_eq!(
            trail["encode"]["enter"]["size"],
            json!({"scale": "symbolPathWidth", "field": "pathSize"})
        );
        assert_eq!(
            spec.get_scale("yLinear").unwrap().zero,
            Some(false)
        );
        assert!(spec.dangling_references().unwrap().is_empty());
    }
}
