use crate::builder::data::{add_series_id, add_tree_data, get_or_add_derived_data};
use crate::builder::encoding::{opacity_rules, selection_stroke_rules};
use crate::builder::scale::{add_field_to_facet_scale_domain, FacetScale};
use crate::builder::signal::HoverTarget;
use crate::config::BuilderConfig;
use crate::constants::COLOR_SCALE;
use crate::marks::add_tooltip_signals;
use crate::naming;
use crate::options::{FacetRef, TreemapOptions};
use crate::spec::chart::ChartSpec;
use crate::spec::mark::{MarkEncodeSpec, MarkEncodingSpec, MarkSpec};
use crate::spec::transform::filter::FilterTransformSpec;
use crate::spec::transform::hierarchy::{TreemapMethodSpec, TreemapTransformSpec};
use crate::spec::transform::TransformSpec;
use crate::spec::values::{Field, NumberOrSignalSpec};
use chartspec_common::error::Result;

const LABEL_PADDING: f64 = 4.0;

pub fn add_treemap(
    spec: &mut ChartSpec,
    treemap: &TreemapOptions,
    config: &BuilderConfig,
) -> Result<()> {
    add_series_id(&mut spec.data, &[treemap.color.clone()])?;
    add_field_to_facet_scale_domain(
        &mut spec.scales,
        FacetScale::Color,
        &FacetRef::field(treemap.color.as_str()),
    );

    let tree = add_tree_data(
        &mut spec.data,
        &treemap.name,
        &treemap.id,
        &treemap.parent_key,
        TransformSpec::Treemap(TreemapTransformSpec {
            field: Some(Field::from(treemap.metric.as_str())),
            sort: None,
            method: Some(TreemapMethodSpec::Squarify),
            padding_inner: Some(2.0),
            padding_top: None,
            ratio: None,
            size: Some([
                NumberOrSignalSpec::signal("width"),
                NumberOrSignalSpec::signal("height"),
            ]),
            as_: None,
            extra: Default::default(),
        }),
    );
    // Only leaves are drawn, parents are covered by their children
    let leaves = naming::leaves(&treemap.name);
    get_or_add_derived_data(&mut spec.data, &leaves, &tree).push_transform_once(
        TransformSpec::Filter(FilterTransformSpec::new("!datum.children")),
    );

    let fill = MarkEncodingSpec::scale_field(COLOR_SCALE, treemap.color.as_str());
    let has_popover = treemap.interactions.has_popover();
    let mut encode = MarkEncodeSpec::default()
        .enter("fill", fill)
        .update("x", MarkEncodingSpec::field("x0"))
        .update("y", MarkEncodingSpec::field("y0"))
        .update("x2", MarkEncodingSpec::field("x1"))
        .update("y2", MarkEncodingSpec::field("y1"));
    if treemap.interactions.is_interactive() {
        encode.set(
            "update",
            "fillOpacity",
            opacity_rules(MarkEncodingSpec::value(1), has_popover, config),
        );
    }
    if has_popover {
        encode.set(
            "update",
            "stroke",
            selection_stroke_rules(MarkEncodingSpec::value("transparent"), config),
        );
        encode.set("update", "strokeWidth", MarkEncodingSpec::value(2));
    }
    spec.marks.push(
        MarkSpec::new("rect", treemap.name.as_str())
            .from_data(leaves.as_str())
            .interactive(treemap.interactions.is_interactive())
            .with_encode(encode),
    );

    let label_key = treemap.label_key.as_deref().unwrap_or(&treemap.id);
    spec.marks.push(
        MarkSpec::new("text", naming::label(&treemap.name))
            .from_data(leaves)
            .interactive(false)
            .with_encode(
                MarkEncodeSpec::default()
                    .enter("text", MarkEncodingSpec::field(label_key))
                    .enter("align", MarkEncodingSpec::value("left"))
                    .enter("baseline", MarkEncodingSpec::value("top"))
                    .enter("fill", MarkEncodingSpec::value(config.background_color.as_str()))
                    .update(
                        "x",
                        MarkEncodingSpec::field("x0").with_offset(LABEL_PADDING),
                    )
                    .update(
                        "y",
                        MarkEncodingSpec::field("y0").with_offset(LABEL_PADDING),
                    )
                    .update(
                        "limit",
                        MarkEncodingSpec::signal(format!(
                            "max(0, datum.x1 - datum.x0 - {})",
                            2.0 * LABEL_PADDING
                        )),
                    ),
            ),
    );

    add_tooltip_signals(
        &mut spec.signals,
        &treemap.name,
        &treemap.name,
        &treemap.interactions,
        HoverTarget::Datum,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::builder::data::base_data;
    use crate::builder::signal::default_signals;
    use crate::config::BuilderConfig;
    use crate::marks::treemap::add_treemap;
    use crate::options::{Normalize, NormalizeContext, TreemapProps};
    use crate::spec::chart::ChartSpec;
    use serde_json::json;

    #[test]
    fn test_treemap() {
        let config = BuilderConfig::default();
        let props: TreemapProps =
            serde_json::from_value(json!({"labelKey": "title", "chartPopovers": [{}]})).unwrap();
        let treemap = props.normalize(0, &NormalizeContext::new(&config));
        let mut spec = ChartSpec::new();
        spec.data = base_data(vec![]);
        spec.signals = default_signals(&[], None, None);
        add_treemap(&mut spec, &treemap, &config).unwrap();

        let leaves = serde_json::to_value(spec.get_data("treemap0_leaves").unwrap()).unwrap();
        assert_eq!(leaves["source"], json!("treemap0_tree"));
        assert_eq!(leaves["transform"][0]["expr"], json!("!datum.children"));
        let tree = serde_json::to_value(spec.get_data("treemap0_tree").unwrap()).unwrap();
        assert_eq!(tree["transform"][1]["method"], json!("squarify"));

        let rect = serde_json::to_value(spec.find_mark("treemap0").unwrap()).unwrap();
        assert_eq!(rect["encode"]["update"]["fillOpacity"].as_array().unwrap().len(), 4);
        let label = serde_json::to_value(spec.find_mark("treemap0_label").unwrap()).unwrap();
        assert_eq!(label["encode"]["enter"]["text"], json!({"field": "title"}));
        assert!(spec.dangling_references().unwrap().is_empty());
    }
}
