//! Encoding rules and helper marks shared by several mark kinds
use crate::config::BuilderConfig;
use crate::constants::{
    DEFAULT_SYMBOL_STROKE_WIDTH, HIGHLIGHTED_ITEM, HIGHLIGHT_POINT_SIZE, MARK_ID, OPACITY_SCALE,
    SELECTED_ITEM, SELECTION_RING_PADDING, SYMBOL_SIZE_SCALE,
};
use crate::naming;
use crate::options::{symbol_size_value, FacetRef};
use crate::spec::mark::{MarkEncodeSpec, MarkEncodingSpec, MarkSpec};
use crate::spec::transform::voronoi::VoronoiTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::{Field, NumberOrSignalSpec};
use chartspec_common::escape::datum_field;

/// Row is not one of the highlighted items in an array-valued `highlightedItem`
pub fn highlighted_array_exclusion_test() -> String {
    format!(
        "isArray({HIGHLIGHTED_ITEM}) && length({HIGHLIGHTED_ITEM}) > 0 && indexof({HIGHLIGHTED_ITEM}, datum.{MARK_ID}) === -1"
    )
}

/// Row is not the single highlighted item
pub fn highlighted_item_exclusion_test() -> String {
    format!(
        "isValid({HIGHLIGHTED_ITEM}) && !isArray({HIGHLIGHTED_ITEM}) && {HIGHLIGHTED_ITEM} !== datum.{MARK_ID}"
    )
}

/// Another row is selected
pub fn selection_exclusion_test() -> String {
    format!("isValid({SELECTED_ITEM}) && {SELECTED_ITEM} !== datum.{MARK_ID}")
}

pub fn selected_item_test() -> String {
    format!("isValid({SELECTED_ITEM}) && {SELECTED_ITEM} === datum.{MARK_ID}")
}

/// Faded version of an opacity rule
pub fn fade_encoding(base: &MarkEncodingSpec, ratio: f64) -> MarkEncodingSpec {
    if let Some(value) = base.value.as_ref().and_then(|v| v.as_f64()) {
        return MarkEncodingSpec::value(value * ratio);
    }
    if let Some(signal) = &base.signal {
        return MarkEncodingSpec::signal(format!("({signal}) * {ratio}"));
    }
    match (&base.scale, base.field_name()) {
        (Some(scale), Some(field)) => MarkEncodingSpec::signal(format!(
            "scale('{scale}', {}) * {ratio}",
            datum_field(field)
        )),
        _ => MarkEncodingSpec::value(ratio),
    }
}

/// Opacity rules of an interactive mark, highest priority first, ending with `base`.
///
/// The selection rule is only present when the mark has a popover.
pub fn opacity_rules(
    base: MarkEncodingSpec,
    has_popover: bool,
    config: &BuilderConfig,
) -> Vec<MarkEncodingSpec> {
    let fade = fade_encoding(&base, config.highlight_contrast_ratio);
    let mut rules = vec![
        fade.clone().with_test(highlighted_array_exclusion_test()),
        fade.clone().with_test(highlighted_item_exclusion_test()),
    ];
    if has_popover {
        rules.push(fade.with_test(selection_exclusion_test()));
    }
    rules.push(base);
    rules
}

/// Opacity channel driven by a facet, before any highlight rule
pub fn opacity_encoding(opacity: &FacetRef) -> MarkEncodingSpec {
    match opacity {
        FacetRef::Static(s) => MarkEncodingSpec::value(s.value.clone()),
        FacetRef::Field(field) | FacetRef::Dual(field, _) => {
            MarkEncodingSpec::scale_field(OPACITY_SCALE, field.as_str())
        }
    }
}

/// Stroke rules drawing the selected item in the selection color
pub fn selection_stroke_rules(
    base: MarkEncodingSpec,
    config: &BuilderConfig,
) -> Vec<MarkEncodingSpec> {
    vec![
        MarkEncodingSpec::value(config.selection_color.as_str()).with_test(selected_item_test()),
        base,
    ]
}

/// Size of the ring drawn around a selected symbol: a radius `SELECTION_RING_PADDING`
/// pixels larger than the symbol's own
pub fn selection_ring_size(size: &FacetRef) -> MarkEncodingSpec {
    match size {
        FacetRef::Static(s) => {
            let radius = symbol_size_value(&s.value).sqrt() + SELECTION_RING_PADDING;
            MarkEncodingSpec::value(radius * radius)
        }
        FacetRef::Field(field) | FacetRef::Dual(field, _) => MarkEncodingSpec::signal(format!(
            "pow(sqrt(scale('{SYMBOL_SIZE_SCALE}', {})) + {SELECTION_RING_PADDING}, 2)",
            datum_field(field)
        )),
    }
}

/// Ring around the selected point of `name`, drawn from `${name}_selectedData`
pub fn selection_ring_mark(
    name: &str,
    x: MarkEncodingSpec,
    y: MarkEncodingSpec,
    size: &FacetRef,
    config: &BuilderConfig,
) -> MarkSpec {
    MarkSpec::new("symbol", naming::selection_ring(name))
        .from_data(naming::selected_data(name))
        .interactive(false)
        .with_encode(
            MarkEncodeSpec::default()
                .enter("fill", MarkEncodingSpec::value("transparent"))
                .enter("stroke", MarkEncodingSpec::value(config.selection_color.as_str()))
                .enter(
                    "strokeWidth",
                    MarkEncodingSpec::value(DEFAULT_SYMBOL_STROKE_WIDTH),
                )
                .enter("size", selection_ring_size(size))
                .update("x", x)
                .update("y", y),
        )
}

/// Point drawn on top of the highlighted rows of `name`
pub fn point_highlight_mark(
    name: &str,
    x: MarkEncodingSpec,
    y: MarkEncodingSpec,
    fill: MarkEncodingSpec,
    config: &BuilderConfig,
) -> MarkSpec {
    MarkSpec::new("symbol", naming::point_highlight(name))
        .from_data(naming::highlighted_data(name))
        .interactive(false)
        .with_encode(
            MarkEncodeSpec::default()
                .enter("size", MarkEncodingSpec::value(HIGHLIGHT_POINT_SIZE))
                .enter("stroke", MarkEncodingSpec::value(config.background_color.as_str()))
                .enter(
                    "strokeWidth",
                    MarkEncodingSpec::value(DEFAULT_SYMBOL_STROKE_WIDTH),
                )
                .update("fill", fill)
                .update("x", x)
                .update("y", y),
        )
}

/// Invisible points the voronoi of a line or area is computed from
pub fn points_for_voronoi_mark(
    name: &str,
    source_data: &str,
    x: MarkEncodingSpec,
    y: MarkEncodingSpec,
) -> MarkSpec {
    MarkSpec::new("symbol", naming::points_for_voronoi(name))
        .from_data(source_data)
        .interactive(false)
        .with_encode(
            MarkEncodeSpec::default()
                .enter("fill", MarkEncodingSpec::value("transparent"))
                .enter("stroke", MarkEncodingSpec::value("transparent"))
                .update("x", x)
                .update("y", y),
        )
}

/// Voronoi hit targets over the items of `source_mark`
pub fn voronoi_mark(name: &str, source_mark: &str) -> MarkSpec {
    let mut mark = MarkSpec::new("path", naming::voronoi(name))
        .from_data(source_mark)
        .with_encode(
            MarkEncodeSpec::default()
                .enter("fill", MarkEncodingSpec::value("transparent"))
                .enter("stroke", MarkEncodingSpec::value("transparent"))
                .enter("isVoronoi", MarkEncodingSpec::value(true)),
        );
    mark.transform
        .push(TransformSpec::Voronoi(VoronoiTransformSpec {
            x: Field::from("datum.x"),
            y: Field::from("datum.y"),
            size: Some([
                NumberOrSignalSpec::signal("width"),
                NumberOrSignalSpec::signal("height"),
            ]),
            as_: None,
            extra: Default::default(),
        }));
    mark
}

#[cfg(test)]
mod tests {
    use crate::builder::encoding::{
        fade_encoding, opacity_rules, selection_ring_size, voronoi_mark,
    };
    use crate::config::BuilderConfig;
    use crate::options::FacetRef;
    use crate::spec::mark::MarkEncodingSpec;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(FacetRef::value(100), 196.0)]
    #[case(FacetRef::value("M"), 196.0)]
    #[case(FacetRef::value(36), 100.0)]
    fn test_static_selection_ring_size(#[case] size: FacetRef, #[case] expected: f64) {
        let encoding = selection_ring_size(&size);
        assert_eq!(encoding.value.and_then(|v| v.as_f64()), Some(expected));
    }

    #[test]
    fn test_field_selection_ring_size() {
        let encoding = selection_ring_size(&FacetRef::field("weight"));
        assert_eq!(
            encoding.signal.as_deref(),
            Some("pow(sqrt(scale('symbolSize', datum.weight)) + 4, 2)")
        );
    }

    #[test]
    fn test_opacity_rules_without_popover() {
        let config = BuilderConfig::default();
        let rules = opacity_rules(MarkEncodingSpec::value(1), false, &config);
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].value, Some(json!(0.2)));
        assert!(rules[2].test.is_none());
    }

    #[test]
    fn test_fade_of_scaled_opacity() {
        let base = MarkEncodingSpec::scale_field("opacity", "weight");
        assert_eq!(
            fade_encoding(&base, 0.5).signal.as_deref(),
            Some("scale('opacity', datum.weight) * 0.5")
        );
    }

    #[test]
    fn test_voronoi_reads_source_mark() {
        let voronoi = serde_json::to_value(voronoi_mark("line0", "line0_pointsForVoronoi")).unwrap();
        assert_eq!(voronoi["name"], json!("line0_voronoi"));
        assert_eq!(voronoi["from"], json!({"data": "line0_pointsForVoronoi"}));
        assert_eq!(voronoi["transform"][0]["type"], json!("voronoi"));
    }
}
