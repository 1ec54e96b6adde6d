//! One builder per mark kind. Each adds its data, scales, signals and marks to the draft.
pub mod area;
pub mod axis;
pub mod bar;
pub mod donut;
pub mod legend;
pub mod line;
pub mod scatter;
pub mod sunburst;
pub mod title;
pub mod treemap;
pub mod trendline;

use crate::builder::data::HighlightContext;
use crate::builder::signal::{
    add_highlighted_item_bindings, add_hover_bindings, add_hovered_id_signal, HoverTarget,
};
use crate::constants::HIGHLIGHTED_GROUP;
use crate::config::BuilderConfig;
use crate::options::{FacetRef, Interactions, MarkOptions};
use crate::spec::chart::ChartSpec;
use crate::spec::signal::SignalSpec;
use chartspec_common::error::Result;

pub fn add_mark(spec: &mut ChartSpec, mark: &MarkOptions, config: &BuilderConfig) -> Result<()> {
    match mark {
        MarkOptions::Area(area) => area::add_area(spec, area, config),
        MarkOptions::Bar(bar) => bar::add_bar(spec, bar, config),
        MarkOptions::Donut(donut) => donut::add_donut(spec, donut, config),
        MarkOptions::Line(line) => line::add_line(spec, line, config),
        MarkOptions::Scatter(scatter) => scatter::add_scatter(spec, scatter, config),
        MarkOptions::Sunburst(sunburst) => sunburst::add_sunburst(spec, sunburst, config),
        MarkOptions::Treemap(treemap) => treemap::add_treemap(spec, treemap, config),
    }
}

/// Distinct data fields read by the given facets, in order of first use
pub(crate) fn facet_fields(facets: &[&FacetRef]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for field in facets.iter().flat_map(|f| f.fields()) {
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    fields
}

/// Hover bindings and the hovered id signal of a mark with a tooltip
pub(crate) fn add_tooltip_signals(
    signals: &mut Vec<SignalSpec>,
    name: &str,
    hover_mark: &str,
    interactions: &Interactions,
    target: HoverTarget,
) {
    if interactions.has_tooltip() {
        add_hovered_id_signal(signals, name);
        add_highlighted_item_bindings(signals, hover_mark, target);
    }
}

/// Hovering a row of a grouped highlight publishes its group id
pub(crate) fn add_highlight_group_bindings(
    signals: &mut Vec<SignalSpec>,
    highlight: &HighlightContext,
    hover_mark: &str,
    target: HoverTarget,
) {
    if highlight.group_fields().is_some() {
        add_hover_bindings(
            signals,
            HIGHLIGHTED_GROUP,
            hover_mark,
            &highlight.group_id_field(),
            target,
        );
    }
}
