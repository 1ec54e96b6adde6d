use crate::builder::data::{add_series_id, add_tree_data};
use crate::builder::encoding::{opacity_rules, selection_stroke_rules};
use crate::builder::scale::{add_field_to_facet_scale_domain, FacetScale};
use crate::builder::signal::HoverTarget;
use crate::config::BuilderConfig;
use crate::constants::COLOR_SCALE;
use crate::marks::add_tooltip_signals;
use crate::marks::donut::RADIUS_SIGNAL;
use crate::options::{FacetRef, SunburstOptions};
use crate::spec::chart::ChartSpec;
use crate::spec::mark::{MarkEncodeSpec, MarkEncodingSpec, MarkSpec};
use crate::spec::signal::SignalSpec;
use crate::spec::transform::hierarchy::PartitionTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::{Field, NumberOrSignalSpec};
use chartspec_common::error::Result;

pub fn add_sunburst(
    spec: &mut ChartSpec,
    sunburst: &SunburstOptions,
    config: &BuilderConfig,
) -> Result<()> {
    add_series_id(&mut spec.data, &[sunburst.color.clone()])?;
    add_field_to_facet_scale_domain(
        &mut spec.scales,
        FacetScale::Color,
        &FacetRef::field(sunburst.color.as_str()),
    );
    if spec.get_signal(RADIUS_SIGNAL).is_none() {
        spec.signals
            .push(SignalSpec::with_update(RADIUS_SIGNAL, "min(width, height) / 2"));
    }

    // Angles span the full turn, depth maps onto the radius
    let tree = add_tree_data(
        &mut spec.data,
        &sunburst.name,
        &sunburst.id,
        &sunburst.parent_key,
        TransformSpec::Partition(PartitionTransformSpec {
            field: Some(Field::from(sunburst.metric.as_str())),
            sort: None,
            padding: None,
            size: Some([
                NumberOrSignalSpec::signal("2 * PI"),
                NumberOrSignalSpec::signal(RADIUS_SIGNAL),
            ]),
            as_: None,
            extra: Default::default(),
        }),
    );

    let fill = MarkEncodingSpec::scale_field(COLOR_SCALE, sunburst.color.as_str());
    let has_popover = sunburst.interactions.has_popover();
    let mut encode = MarkEncodeSpec::default()
        .enter("x", MarkEncodingSpec::signal("width / 2"))
        .enter("y", MarkEncodingSpec::signal("height / 2"))
        .enter("fill", fill.clone())
        .update("startAngle", MarkEncodingSpec::field("x0"))
        .update("endAngle", MarkEncodingSpec::field("x1"))
        .update("innerRadius", MarkEncodingSpec::field("y0"))
        .update("outerRadius", MarkEncodingSpec::field("y1"));
    if sunburst.interactions.is_interactive() {
        encode.set(
            "update",
            "fillOpacity",
            opacity_rules(MarkEncodingSpec::value(1), has_popover, config),
        );
    }
    if has_popover {
        encode.set("update", "stroke", selection_stroke_rules(
            MarkEncodingSpec::value(config.background_color.as_str()),
            config,
        ));
    } else {
        encode.set(
            "update",
            "stroke",
            MarkEncodingSpec::value(config.background_color.as_str()),
        );
    }
    spec.marks.push(
        MarkSpec::new("arc", sunburst.name.as_str())
            .from_data(tree)
            .interactive(sunburst.interactions.is_interactive())
            .with_encode(encode),
    );
    add_tooltip_signals(
        &mut spec.signals,
        &sunburst.name,
        &sunburst.name,
        &sunburst.interactions,
        HoverTarget::Datum,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::builder::data::base_data;
    use crate::builder::signal::default_signals;
    use crate::config::BuilderConfig;
    use crate::marks::sunburst::add_sunburst;
    use crate::options::{Normalize, NormalizeContext, SunburstProps};
    use crate::spec::chart::ChartSpec;
    use serde_json::json;

    #[test]
    fn test_sunburst() {
        let config = BuilderConfig::default();
        let props: SunburstProps =
            serde_json::from_value(json!({"parentKey": "owner", "chartTooltips": [{}]})).unwrap();
        let sunburst = props.normalize(0, &NormalizeContext::new(&config));
        let mut spec = ChartSpec::new();
        spec.data = base_data(vec![]);
        spec.signals = default_signals(&[], None, None);
        add_sunburst(&mut spec, &sunburst, &config).unwrap();

        let tree = serde_json::to_value(spec.get_data("sunburst0_tree").unwrap()).unwrap();
        assert_eq!(
            tree["transform"][0],
            json!({"type": "stratify", "key": "id", "parentKey": "owner"})
        );
        assert_eq!(tree["transform"][1]["type"], json!("partition"));
        assert_eq!(tree["transform"][1]["size"], json!([{"signal": "2 * PI"}, {"signal": "radius"}]));
        let arc = spec.find_mark("sunburst0").unwrap();
        assert_eq!(arc.source_data(), Some("sunburst0_tree"));
        assert!(spec.get_signal("sunburst0_hoveredId").is_some());
        assert!(spec.dangling_references().unwrap().is_empty());
    }
}
