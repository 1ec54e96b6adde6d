use crate::builder::data::{
    add_highlighted_data, add_selected_data_series, add_series_id, add_stack_transform,
    add_time_transform, get_filtered_table_data, get_table_data, HighlightContext,
};
use crate::builder::encoding::{point_highlight_mark, points_for_voronoi_mark, voronoi_mark};
use crate::builder::scale::{
    add_dimension_scale, add_field_to_facet_scale_domain, add_metric_scale, facet_encoding,
    FacetScale,
};
use crate::builder::signal::{add_highlighted_series_bindings, HoverTarget};
use crate::config::BuilderConfig;
use crate::constants::{
    DEFAULT_SYMBOL_STROKE_WIDTH, FILTERED_TABLE, HIGHLIGHTED_SERIES, SELECTED_SERIES, SERIES_ID,
    Y_LINEAR,
};
use crate::marks::{add_highlight_group_bindings, add_tooltip_signals, facet_fields};
use crate::naming;
use crate::options::{AreaOptions, DimensionScaleType, HighlightBy, HighlightMode};
use crate::spec::chart::ChartSpec;
use crate::spec::mark::{MarkEncodeSpec, MarkEncodingSpec, MarkFacetSpec, MarkSpec};
use chartspec_common::error::Result;

fn dimension_field(area: &AreaOptions) -> String {
    match area.scale_type {
        DimensionScaleType::Time => format!("{}0", area.dimension),
        _ => area.dimension.clone(),
    }
}

fn fill_opacity_rules(area: &AreaOptions, config: &BuilderConfig) -> Vec<MarkEncodingSpec> {
    let faded = MarkEncodingSpec::value(area.opacity * config.highlight_contrast_ratio);
    let mut rules = vec![faded.clone().with_test(format!(
        "isValid({HIGHLIGHTED_SERIES}) && {HIGHLIGHTED_SERIES} !== datum.{SERIES_ID}"
    ))];
    if area.interactions.has_popover() {
        rules.push(faded.with_test(format!(
            "isValid({SELECTED_SERIES}) && {SELECTED_SERIES} !== datum.{SERIES_ID}"
        )));
    }
    rules.push(MarkEncodingSpec::value(area.opacity));
    rules
}

pub fn add_area(spec: &mut ChartSpec, area: &AreaOptions, config: &BuilderConfig) -> Result<()> {
    add_series_id(&mut spec.data, &facet_fields(&[&area.color]))?;
    if area.scale_type == DimensionScaleType::Time {
        add_time_transform(
            get_table_data(&mut spec.data)?,
            &area.dimension,
            area.granularity,
        );
    }
    let dimension = dimension_field(area);
    if area.is_stacked() {
        add_stack_transform(
            get_filtered_table_data(&mut spec.data)?,
            &[dimension.clone()],
            &area.metric,
            area.order.as_deref(),
        );
    }
    let (start, end) = area.bounds();

    let x_scale = add_dimension_scale(
        &mut spec.scales,
        "x",
        area.scale_type,
        &dimension,
        area.padding,
    );
    add_metric_scale(&mut spec.scales, Y_LINEAR, &[start.clone(), end.clone()]);
    add_field_to_facet_scale_domain(&mut spec.scales, FacetScale::Color, &area.color);

    let x = MarkEncodingSpec::scale_field(x_scale.as_str(), dimension.as_str());
    let y = MarkEncodingSpec::scale_field(Y_LINEAR, end.as_str());
    let y2 = MarkEncodingSpec::scale_field(Y_LINEAR, start.as_str());
    let fill = facet_encoding(FacetScale::Color, &area.color);

    let mut groupby = area.color.fields();
    if groupby.is_empty() {
        groupby.push(SERIES_ID.to_string());
    }
    let facet = naming::facet(&area.name);
    let mut encode = MarkEncodeSpec::default()
        .enter("fill", fill.clone())
        .enter("y", y.clone())
        .enter("y2", y2.clone())
        .update("x", x.clone());
    if area.is_interactive() {
        encode.set("update", "fillOpacity", fill_opacity_rules(area, config));
    } else {
        encode.set("update", "fillOpacity", MarkEncodingSpec::value(area.opacity));
    }
    let mut group = MarkSpec::new("group", naming::group(&area.name)).from_facet(
        MarkFacetSpec::new(facet.as_str(), FILTERED_TABLE, groupby),
    );
    group.marks.push(
        MarkSpec::new("area", area.name.as_str())
            .from_data(facet.as_str())
            .interactive(area.interactions.has_popover())
            .with_encode(encode),
    );
    if area.interactions.has_popover() {
        // One invisible point per row of the series, popovers open on the one nearest the click
        group.marks.push(
            MarkSpec::new("symbol", naming::anchor_point(&area.name))
                .from_data(facet.as_str())
                .interactive(false)
                .with_encode(
                    MarkEncodeSpec::default()
                        .enter("fill", MarkEncodingSpec::value("transparent"))
                        .enter("stroke", MarkEncodingSpec::value("transparent"))
                        .update("x", x.clone())
                        .update("y", y.clone()),
                ),
        );
    }
    spec.marks.push(group);

    if !area.is_interactive() {
        return Ok(());
    }

    let highlight = HighlightContext {
        name: &area.name,
        dimension: &dimension,
        highlight_by: &area.highlight_by,
        has_tooltip: area.interactions.has_tooltip(),
        has_popover: area.interactions.has_popover(),
    };
    add_highlighted_data(&mut spec.data, &highlight)?;
    let highlighted = naming::highlighted_data(&area.name);

    spec.marks.push(point_highlight_mark(
        &area.name,
        x.clone(),
        y.clone(),
        fill.clone(),
        config,
    ));
    if area.highlight_by == HighlightBy::Mode(HighlightMode::Dimension) {
        spec.marks.push(
            MarkSpec::new("rule", naming::highlight_rule(&area.name))
                .from_data(highlighted)
                .interactive(false)
                .with_encode(
                    MarkEncodeSpec::default()
                        .enter("y", MarkEncodingSpec::value(0))
                        .enter("y2", MarkEncodingSpec::signal("height"))
                        .enter("stroke", MarkEncodingSpec::value("rgb(144, 144, 144)"))
                        .enter("strokeWidth", MarkEncodingSpec::value(1))
                        .update("x", x.clone()),
                ),
        );
    }

    if area.interactions.has_popover() {
        add_selected_data_series(&mut spec.data, &area.name);
        spec.marks.push(
            MarkSpec::new("area", naming::select_border(&area.name))
                .from_data(naming::selected_data_series(&area.name))
                .interactive(false)
                .with_encode(
                    MarkEncodeSpec::default()
                        .enter("fill", MarkEncodingSpec::value("transparent"))
                        .enter("stroke", MarkEncodingSpec::value(config.selection_color.as_str()))
                        .enter(
                            "strokeWidth",
                            MarkEncodingSpec::value(DEFAULT_SYMBOL_STROKE_WIDTH),
                        )
                        .enter("y", y.clone())
                        .enter("y2", y2)
                        .update("x", x.clone()),
                ),
        );
    }

    let voronoi = naming::voronoi(&area.name);
    spec.marks.push(points_for_voronoi_mark(
        &area.name,
        FILTERED_TABLE,
        x,
        y,
    ));
    spec.marks.push(voronoi_mark(
        &area.name,
        &naming::points_for_voronoi(&area.name),
    ));
    add_tooltip_signals(
        &mut spec.signals,
        &area.name,
        &voronoi,
        &area.interactions,
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
    use crate::marks::area::add_area;
    use crate::options::{AreaProps, Normalize, NormalizeContext};
    use crate::spec::chart::ChartSpec;
    use serde_json::json;

    fn build(props: serde_json::Value) -> ChartSpec {
        let config = BuilderConfig::default();
        let props: AreaProps = serde_json::from_value(props).unwrap();
        let area = props.normalize(0, &NormalizeContext::new(&config));
        let mut spec = ChartSpec::new();
        spec.data = base_data(vec![]);
        spec.signals = default_signals(&[], None, None);
        add_area(&mut spec, &area, &config).unwrap();
        spec
    }

    #[test]
    fn test_stacked_area() {
        let spec = build(json!({"metric": "users"}));
        let filtered = spec.get_data("filteredTable").unwrap();
        assert!(filtered.has_transform_output("users0"));
        assert_eq!(
            spec.get_scale("yLinear").unwrap().domain_fields(),
            vec!["users0", "users1"]
        );
        let area = serde_json::to_value(spec.find_mark("area0").unwrap()).unwrap();
        assert_eq!(area["encode"]["enter"]["y2"]["field"], json!("users0"));
        assert_eq!(area["encode"]["update"]["fillOpacity"], json!({"value": 0.8}));
        assert!(spec.find_mark("area0_anchorPoint").is_none());
    }

    #[test]
    fn test_explicit_bounds_skip_stacking() {
        let spec = build(json!({"metricStart": "low", "metricEnd": "high"}));
        let filtered = spec.get_data("filteredTable").unwrap();
        assert!(!filtered.has_transform_output("value0"));
        assert_eq!(
            spec.get_scale("yLinear").unwrap().domain_fields(),
            vec!["low", "high"]
        );
    }

    #[test]
    fn test_anchor_points_need_a_popover() {
        let spec = build(json!({"chartTooltips": [{}]}));
        assert!(spec.find_mark("area0_anchorPoint").is_none());
        assert_eq!(spec.find_mark("area0_group").unwrap().marks.len(), 1);
    }

    #[test]
    fn test_interactive_area() {
        let spec = build(json!({
            "highlightBy": "dimension",
            "chartTooltips": [{}],
            "chartPopovers": [{}]
        }));
        let group = spec.find_mark("area0_group").unwrap();
        let anchor = group
            .marks
            .iter()
            .find(|m| m.name.as_deref() == Some("area0_anchorPoint"))
            .unwrap();
        assert_eq!(anchor.source_data(), Some("area0_facet"));
        assert!(spec.find_mark("area0_point_highlight").is_some());
        assert!(spec.find_mark("area0_highlightRule").is_some());
        let border = spec.find_mark("area0_selectBorder").unwrap();
        assert_eq!(border.source_data(), Some("area0_selectedDataSeries"));
        assert_eq!(
            spec.get_signal("highlightedGroup").unwrap().on.len(),
            2
        );
        let area = serde_json::to_value(spec.find_mark("area0").unwrap()).unwrap();
        assert_eq!(
            area["encode"]["update"]["fillOpacity"].as_array().unwrap().len(),
            3
        );
        assert!(spec.dangling_references().unwrap().is_empty());
    }
}
