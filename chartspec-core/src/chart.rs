//! Assembles a complete chart spec from normalized options.
use crate::builder::data::base_data;
use crate::builder::scale::fill_facet_ranges;
use crate::builder::signal::default_signals;
use crate::builder::SpecBuilder;
use crate::config::BuilderConfig;
use crate::element::{chart_options, ChartElement};
use crate::marks::add_mark;
use crate::marks::axis::add_axis;
use crate::marks::legend::add_legend;
use crate::marks::title::add_title;
use crate::options::ChartOptions;
use crate::spec::chart::ChartSpec;
use chartspec_common::error::Result;
use log::debug;
use serde_json::json;

fn base_spec(options: &ChartOptions, config: &BuilderConfig) -> ChartSpec {
    let mut spec = ChartSpec::new();
    spec.width = Some(json!(options.width));
    spec.height = Some(json!(options.height));
    spec.padding = Some(json!(options.padding));
    spec.background = Some(config.background_color.clone());
    spec.data = base_data(options.data.clone());
    spec.signals = default_signals(
        &options.hidden_series,
        options.highlighted_item.as_ref(),
        options.highlighted_series.as_ref(),
    );
    spec
}

pub fn build_chart_spec(options: &ChartOptions, config: &BuilderConfig) -> Result<ChartSpec> {
    let mut builder = SpecBuilder::new(base_spec(options, config), config);

    for mark in &options.marks {
        debug!("Adding mark {}", mark.name());
        builder.apply(mark.name(), |spec, config| add_mark(spec, mark, config))?;
    }
    // Guides read the scales registered by the marks
    for axis in &options.axes {
        builder.apply(&axis.name, |spec, _| add_axis(spec, axis))?;
    }
    for legend in &options.legends {
        builder.apply(&legend.name, |spec, config| add_legend(spec, legend, config))?;
    }
    for title in &options.titles {
        builder.apply("title", |spec, _| {
            add_title(spec, title);
            Ok(())
        })?;
    }

    let mut spec = builder.into_spec();
    fill_facet_ranges(&mut spec.scales, config);

    let dangling = spec.dangling_references()?;
    if !dangling.is_empty() {
        debug!("Chart spec has dangling references: {}", dangling.join(", "));
    }
    Ok(spec)
}

/// Build the spec of a `Chart` element tree
pub fn build_chart_spec_from_element(
    element: &ChartElement,
    config: &BuilderConfig,
) -> Result<ChartSpec> {
    let (options, config) = chart_options(element, config)?;
    build_chart_spec(&options, &config)
}

#[cfg(test)]
mod tests {
    use crate::chart::build_chart_spec_from_element;
    use crate::config::BuilderConfig;
    use crate::element::ChartElement;
    use serde_json::json;

    fn build(element: serde_json::Value) -> serde_json::Value {
        let element: ChartElement = serde_json::from_value(element).unwrap();
        let spec = build_chart_spec_from_element(&element, &BuilderConfig::default()).unwrap();
        serde_json::to_value(spec).unwrap()
    }

    #[test]
    fn test_empty_chart() {
        let spec = build(json!({"kind": "Chart", "props": {"hiddenSeries": ["a"]}}));
        assert_eq!(spec["width"], json!(600.0));
        assert_eq!(spec["data"][0]["name"], json!("table"));
        assert_eq!(spec["data"][1]["name"], json!("filteredTable"));
        let hidden = spec["signals"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["name"] == json!("hiddenSeries"))
            .unwrap();
        assert_eq!(hidden["value"], json!(["a"]));
        assert!(spec.get("marks").is_none());
    }

    #[test]
    fn test_guides_follow_marks() {
        let spec = build(json!({
            "kind": "Chart",
            "props": {"data": [{"browser": "Chrome", "value": 5}]},
            "children": [
                {"kind": "Title", "props": {"text": "Browsers"}},
                {"kind": "Legend"},
                {"kind": "Axis", "props": {"position": "bottom"}},
                {"kind": "Bar", "props": {"dimension": "browser", "color": "browser"}}
            ]
        }));
        assert_eq!(spec["axes"][0]["scale"], json!("xBand"));
        assert_eq!(spec["legends"][0]["fill"], json!("legend0Entries"));
        assert_eq!(spec["title"]["text"], json!("Browsers"));
        let color = spec["scales"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["name"] == json!("color"))
            .unwrap();
        assert!(color["range"].is_array());
    }
}
