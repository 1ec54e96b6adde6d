use crate::builder::data::{add_series_id, get_or_add_derived_data};
use crate::builder::scale::{dual_facet_lookup, FacetScale};
use crate::builder::signal::{add_hover_bindings, HoverTarget};
use crate::config::BuilderConfig;
use crate::constants::{HIDDEN_SERIES, HIGHLIGHTED_SERIES, SERIES_ID, TABLE};
use crate::naming;
use crate::options::axis::Position;
use crate::options::LegendOptions;
use crate::spec::chart::ChartSpec;
use crate::spec::legend::{GuideEncodeSpec, LegendSpec};
use crate::spec::mark::{MarkEncodeSpec, MarkEncodingSpec};
use crate::spec::scale::{ScaleDataReferenceSpec, ScaleDomainSpec, ScaleSpec, ScaleTypeSpec};
use crate::spec::transform::aggregate::AggregateTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::Field;
use chartspec_common::error::Result;
use chartspec_common::escape::member_access;
use indexmap::IndexMap;
use log::warn;

/// Opacity of the entries of hidden series
const HIDDEN_ENTRY_OPACITY: f64 = 0.3;

/// Facet scales a legend symbol can show, with the symbol channel each one drives
const LEGEND_FACETS: [(FacetScale, &str); 4] = [
    (FacetScale::Color, "fill"),
    (FacetScale::LineType, "strokeDash"),
    (FacetScale::Opacity, "fillOpacity"),
    (FacetScale::SymbolShape, "shape"),
];

/// A facet scale that marks registered a data field on
#[derive(Debug, Clone)]
struct LegendFacet {
    facet: FacetScale,
    channel: &'static str,
    field: String,
    secondary: Option<String>,
}

impl LegendFacet {
    /// Channel value for the series row `entry`
    fn expression(&self, entry: &str) -> String {
        let primary = member_access(entry, &self.field);
        match (&self.secondary, self.facet.array_name()) {
            (Some(secondary), Some(array_name)) => dual_facet_lookup(
                array_name,
                &naming::secondary_scale(self.facet.name()),
                &primary,
                &member_access(entry, secondary),
            ),
            _ => format!("scale('{}', {primary})", self.facet.name()),
        }
    }
}

fn first_domain_field(spec: &ChartSpec, scale: &str) -> Option<String> {
    spec.get_scale(scale)?.domain_fields().into_iter().next()
}

fn legend_facets(spec: &ChartSpec) -> Vec<LegendFacet> {
    LEGEND_FACETS
        .into_iter()
        .filter_map(|(facet, channel)| {
            let field = first_domain_field(spec, facet.name())?;
            let secondary = facet
                .array_name()
                .and_then(|_| first_domain_field(spec, &naming::secondary_scale(facet.name())));
            Some(LegendFacet {
                facet,
                channel,
                field,
                secondary,
            })
        })
        .collect()
}

/// One row per series id carrying the facet values of that series. Built from `table` so that
/// hidden series keep their entry.
fn add_entries_data(spec: &mut ChartSpec, entries: &str, facets: &[LegendFacet]) -> Result<()> {
    let mut groupby = vec![SERIES_ID.to_string()];
    for field in facets
        .iter()
        .flat_map(|f| std::iter::once(&f.field).chain(f.secondary.as_ref()))
    {
        if !groupby.contains(field) {
            groupby.push(field.clone());
        }
    }
    add_series_id(&mut spec.data, &groupby[1..])?;
    get_or_add_derived_data(&mut spec.data, entries, TABLE).push_transform_once(
        TransformSpec::Aggregate(AggregateTransformSpec {
            groupby: groupby.into_iter().map(Field::from).collect(),
            fields: None,
            ops: None,
            as_: None,
            cross: None,
            drop: None,
            extra: Default::default(),
        }),
    );
    if spec.get_scale(entries).is_none() {
        let mut scale = ScaleSpec::new(entries, ScaleTypeSpec::Ordinal);
        scale.domain = Some(ScaleDomainSpec::FieldReference(ScaleDataReferenceSpec::new(
            entries, SERIES_ID,
        )));
        spec.scales.push(scale);
    }
    Ok(())
}

/// Symbol legend listing series ids. Hovering and hiding entries publish the same
/// `rscSeriesId` values the marks compare against.
pub fn add_legend(spec: &mut ChartSpec, legend: &LegendOptions, config: &BuilderConfig) -> Result<()> {
    let facets = legend_facets(spec);
    if facets.is_empty() {
        warn!(
            "{}: no facet scale is driven by a data field, skipping the legend",
            legend.name
        );
        return Ok(());
    }
    let entries_name = naming::legend_entries(&legend.name);
    add_entries_data(spec, &entries_name, &facets)?;

    let (orient, direction) = match legend.position {
        Position::Top => ("top", "horizontal"),
        Position::Bottom => ("bottom", "horizontal"),
        Position::Left => ("left", "vertical"),
        Position::Right => ("right", "vertical"),
    };

    let entry = format!(
        "data('{entries_name}')[indexof(pluck(data('{entries_name}'), '{SERIES_ID}'), datum.value)]"
    );
    let mut symbols = GuideEncodeSpec::default();
    for facet in &facets {
        symbols.encode.set(
            "update",
            facet.channel,
            MarkEncodingSpec::signal(facet.expression(&entry)),
        );
    }

    let entry_name = naming::legend_entry(&legend.name);
    let mut opacity = vec![MarkEncodingSpec::value(HIDDEN_ENTRY_OPACITY)
        .with_test(format!("indexof({HIDDEN_SERIES}, datum.value) !== -1"))];
    if legend.highlight {
        opacity.push(
            MarkEncodingSpec::value(config.highlight_contrast_ratio).with_test(format!(
                "isValid({HIGHLIGHTED_SERIES}) && {HIGHLIGHTED_SERIES} !== datum.value"
            )),
        );
    }
    opacity.push(MarkEncodingSpec::value(1));

    let mut entries = GuideEncodeSpec {
        name: Some(entry_name.clone()),
        interactive: Some(legend.highlight || legend.is_hidable),
        encode: MarkEncodeSpec::default(),
    };
    entries.encode.set("update", "opacity", opacity);
    if legend.is_hidable {
        entries
            .encode
            .set("update", "cursor", MarkEncodingSpec::value("pointer"));
    }

    spec.legends.push(LegendSpec {
        fill: Some(entries_name),
        title: legend.title.clone(),
        orient: Some(orient.to_string()),
        direction: Some(direction.to_string()),
        encode: Some(IndexMap::from([
            ("symbols".to_string(), symbols),
            ("entries".to_string(), entries),
        ])),
        ..Default::default()
    });

    if legend.highlight {
        add_hover_bindings(
            &mut spec.signals,
            HIGHLIGHTED_SERIES,
            &entry_name,
            "value",
            HoverTarget::Datum,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::builder::data::{add_series_id, base_data};
    use crate::builder::scale::{add_field_to_facet_scale_domain, FacetScale};
    use crate::builder::signal::default_signals;
    use crate::config::BuilderConfig;
    use crate::marks::legend::add_legend;
    use crate::options::{FacetRef, LegendProps, Normalize, NormalizeContext};
    use crate::spec::chart::ChartSpec;
    use crate::test_logger::{capture_logs, messages};
    use log::Level;
    use serde_json::json;

    fn build(props: serde_json::Value, facets: &[(FacetScale, FacetRef)]) -> ChartSpec {
        let config = BuilderConfig::default();
        let mut spec = ChartSpec::new();
        spec.data = base_data(vec![]);
        spec.signals = default_signals(&[], None, None);
        let fields: Vec<String> = facets.iter().flat_map(|(_, f)| f.fields()).collect();
        if !fields.is_empty() {
            add_series_id(&mut spec.data, &fields).unwrap();
        }
        for (facet_scale, facet) in facets {
            add_field_to_facet_scale_domain(&mut spec.scales, *facet_scale, facet);
        }
        let props: LegendProps = serde_json::from_value(props).unwrap();
        let legend = props.normalize(0, &NormalizeContext::new(&config));
        add_legend(&mut spec, &legend, &config).unwrap();
        spec
    }

    #[test]
    fn test_legend_needs_a_field_scale() {
        let (spec, records) = capture_logs(|| build(json!({}), &[]));
        assert_eq!(
            messages(&records, Level::Warn),
            vec!["legend0: no facet scale is driven by a data field, skipping the legend"]
        );
        assert!(spec.legends.is_empty());
        assert!(spec.get_data("legend0Entries").is_none());
    }

    #[test]
    fn test_highlight_legend() {
        let spec = build(
            json!({"highlight": true, "position": "right", "title": "OS"}),
            &[(FacetScale::Color, FacetRef::field("series"))],
        );
        let legend = serde_json::to_value(&spec.legends[0]).unwrap();
        assert_eq!(legend["fill"], json!("legend0Entries"));
        assert_eq!(legend["orient"], json!("right"));
        assert_eq!(legend["encode"]["entries"]["name"], json!("legend0_legendEntry"));
        assert_eq!(
            legend["encode"]["entries"]["update"]["opacity"].as_array().unwrap().len(),
            3
        );
        assert_eq!(
            legend["encode"]["symbols"]["update"]["fill"],
            json!({"signal": "scale('color', data('legend0Entries')[indexof(pluck(data('legend0Entries'), 'rscSeriesId'), datum.value)].series)"})
        );
        let signal = serde_json::to_value(spec.get_signal("highlightedSeries").unwrap()).unwrap();
        assert_eq!(
            signal["on"][0],
            json!({"events": "@legend0_legendEntry:mouseover", "update": "datum.value"})
        );
        assert!(spec.dangling_references().unwrap().is_empty());
    }

    #[test]
    fn test_entries_are_keyed_by_series_id() {
        let spec = build(
            json!({"highlight": true, "isHidable": true}),
            &[
                (FacetScale::Color, FacetRef::field("browser")),
                (FacetScale::LineType, FacetRef::field("os")),
            ],
        );
        let entries = serde_json::to_value(spec.get_data("legend0Entries").unwrap()).unwrap();
        assert_eq!(entries["source"], json!("table"));
        assert_eq!(
            entries["transform"][0]["groupby"],
            json!(["rscSeriesId", "browser", "os"])
        );
        let scale = serde_json::to_value(spec.get_scale("legend0Entries").unwrap()).unwrap();
        assert_eq!(
            scale["domain"],
            json!({"data": "legend0Entries", "field": "rscSeriesId"})
        );
        let legend = serde_json::to_value(&spec.legends[0]).unwrap();
        assert!(legend["encode"]["symbols"]["update"]["strokeDash"]["signal"]
            .as_str()
            .unwrap()
            .starts_with("scale('lineType', "));
        assert!(spec.dangling_references().unwrap().is_empty());
    }

    #[test]
    fn test_dual_facet_symbols() {
        let spec = build(
            json!({}),
            &[(
                FacetScale::Color,
                FacetRef::Dual("browser".to_string(), "version".to_string()),
            )],
        );
        let legend = serde_json::to_value(&spec.legends[0]).unwrap();
        let fill = legend["encode"]["symbols"]["update"]["fill"]["signal"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(fill.starts_with("scale('colors', data('legend0Entries')"));
        assert!(fill.contains("indexof(domain('secondaryColor'), "));
        assert!(fill.ends_with(".version) % length(scale('colors', data('legend0Entries')[indexof(pluck(data('legend0Entries'), 'rscSeriesId'), datum.value)].browser))]"));
    }
}
