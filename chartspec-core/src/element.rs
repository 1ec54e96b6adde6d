//! Declarative element trees and their conversion into normalized options.
//!
//! An element is `{"kind": "Bar", "props": {...}, "children": [...]}`. Each parent kind
//! accepts a fixed set of child kinds; anything else is dropped with a warning.
use crate::config::BuilderConfig;
use crate::options::area::AreaProps;
use crate::options::axis::{AxisAnnotationProps, AxisProps, AxisThumbnailProps, ReferenceLineProps};
use crate::options::bar::{BarAnnotationProps, BarProps};
use crate::options::chart::{ChartOptions, ChartProps, MarkOptions};
use crate::options::donut::{DonutProps, DonutSummaryProps, SegmentLabelProps};
use crate::options::hierarchy::{SunburstProps, TreemapProps};
use crate::options::legend::{LegendProps, TitleProps};
use crate::options::line::{LineProps, MetricRangeProps};
use crate::options::scatter::{ScatterPathProps, ScatterProps};
use crate::options::trendline::{TrendlineAnnotationProps, TrendlineProps};
use crate::options::{ChartPopoverProps, ChartTooltipProps, Normalize, NormalizeContext};
use chartspec_common::error::{ChartSpecError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::TryFrom;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node<P> {
    #[serde(default)]
    pub props: P,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChartElement>,
}

impl<P> Node<P> {
    pub fn new(props: P) -> Self {
        Self {
            props,
            children: vec![],
        }
    }

    pub fn with_children(mut self, children: Vec<ChartElement>) -> Self {
        self.children = children;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ChartElement {
    Chart(Node<ChartProps>),
    Area(Node<AreaProps>),
    Axis(Node<AxisProps>),
    AxisAnnotation(Node<AxisAnnotationProps>),
    AxisThumbnail(Node<AxisThumbnailProps>),
    Bar(Node<BarProps>),
    BarAnnotation(Node<BarAnnotationProps>),
    ChartPopover(Node<ChartPopoverProps>),
    ChartTooltip(Node<ChartTooltipProps>),
    Donut(Node<DonutProps>),
    DonutSummary(Node<DonutSummaryProps>),
    Legend(Node<LegendProps>),
    Line(Node<LineProps>),
    MetricRange(Node<MetricRangeProps>),
    ReferenceLine(Node<ReferenceLineProps>),
    Scatter(Node<ScatterProps>),
    ScatterPath(Node<ScatterPathProps>),
    SegmentLabel(Node<SegmentLabelProps>),
    Sunburst(Node<SunburstProps>),
    Title(Node<TitleProps>),
    Treemap(Node<TreemapProps>),
    Trendline(Node<TrendlineProps>),
    TrendlineAnnotation(Node<TrendlineAnnotationProps>),
}

impl ChartElement {
    pub fn kind(&self) -> &'static str {
        match self {
            ChartElement::Chart(_) => "Chart",
            ChartElement::Area(_) => "Area",
            ChartElement::Axis(_) => "Axis",
            ChartElement::AxisAnnotation(_) => "AxisAnnotation",
            ChartElement::AxisThumbnail(_) => "AxisThumbnail",
            ChartElement::Bar(_) => "Bar",
            ChartElement::BarAnnotation(_) => "BarAnnotation",
            ChartElement::ChartPopover(_) => "ChartPopover",
            ChartElement::ChartTooltip(_) => "ChartTooltip",
            ChartElement::Donut(_) => "Donut",
            ChartElement::DonutSummary(_) => "DonutSummary",
            ChartElement::Legend(_) => "Legend",
            ChartElement::Line(_) => "Line",
            ChartElement::MetricRange(_) => "MetricRange",
            ChartElement::ReferenceLine(_) => "ReferenceLine",
            ChartElement::Scatter(_) => "Scatter",
            ChartElement::ScatterPath(_) => "ScatterPath",
            ChartElement::SegmentLabel(_) => "SegmentLabel",
            ChartElement::Sunburst(_) => "Sunburst",
            ChartElement::Title(_) => "Title",
            ChartElement::Treemap(_) => "Treemap",
            ChartElement::Trendline(_) => "Trendline",
            ChartElement::TrendlineAnnotation(_) => "TrendlineAnnotation",
        }
    }

    pub fn children(&self) -> &[ChartElement] {
        match self {
            ChartElement::Chart(n) => &n.children,
            ChartElement::Area(n) => &n.children,
            ChartElement::Axis(n) => &n.children,
            ChartElement::AxisAnnotation(n) => &n.children,
            ChartElement::AxisThumbnail(n) => &n.children,
            ChartElement::Bar(n) => &n.children,
            ChartElement::BarAnnotation(n) => &n.children,
            ChartElement::ChartPopover(n) => &n.children,
            ChartElement::ChartTooltip(n) => &n.children,
            ChartElement::Donut(n) => &n.children,
            ChartElement::DonutSummary(n) => &n.children,
            ChartElement::Legend(n) => &n.children,
            ChartElement::Line(n) => &n.children,
            ChartElement::MetricRange(n) => &n.children,
            ChartElement::ReferenceLine(n) => &n.children,
            ChartElement::Scatter(n) => &n.children,
            ChartElement::ScatterPath(n) => &n.children,
            ChartElement::SegmentLabel(n) => &n.children,
            ChartElement::Sunburst(n) => &n.children,
            ChartElement::Title(n) => &n.children,
            ChartElement::Treemap(n) => &n.children,
            ChartElement::Trendline(n) => &n.children,
            ChartElement::TrendlineAnnotation(n) => &n.children,
        }
    }

    /// Child kinds this element accepts
    pub fn allowed_children(&self) -> &'static [&'static str] {
        match self {
            ChartElement::Chart(_) => &[
                "Area", "Axis", "Bar", "Donut", "Legend", "Line", "Scatter", "Sunburst", "Title",
                "Treemap",
            ],
            ChartElement::Axis(_) => &["AxisAnnotation", "AxisThumbnail", "ReferenceLine"],
            ChartElement::Bar(_) => &["BarAnnotation", "ChartPopover", "ChartTooltip", "Trendline"],
            ChartElement::Line(_) => &["ChartPopover", "ChartTooltip", "MetricRange", "Trendline"],
            ChartElement::Area(_) => &["ChartPopover", "ChartTooltip"],
            ChartElement::Scatter(_) => {
                &["ChartPopover", "ChartTooltip", "ScatterPath", "Trendline"]
            }
            ChartElement::Donut(_) => {
                &["ChartPopover", "ChartTooltip", "DonutSummary", "SegmentLabel"]
            }
            ChartElement::Sunburst(_) | ChartElement::Treemap(_) => {
                &["ChartPopover", "ChartTooltip"]
            }
            ChartElement::Trendline(_) => &["ChartTooltip", "TrendlineAnnotation"],
            _ => &[],
        }
    }

    /// Children that pass the allow-list, in order
    pub fn accepted_children(&self) -> Vec<&ChartElement> {
        let allowed = self.allowed_children();
        self.children()
            .iter()
            .filter(|child| {
                let ok = allowed.contains(&child.kind());
                if !ok {
                    warn!(
                        "{} is not a valid child of {} and will be ignored",
                        child.kind(),
                        self.kind()
                    );
                }
                ok
            })
            .collect()
    }
}

fn wrong_kind(expected: &str, element: &ChartElement) -> ChartSpecError {
    ChartSpecError::specification(format!(
        "Expected a {expected} element, received {}",
        element.kind()
    ))
}

/// Props of elements that take no children
macro_rules! leaf_props {
    ($variant:ident, $props:ty) => {
        impl TryFrom<&ChartElement> for $props {
            type Error = ChartSpecError;

            fn try_from(element: &ChartElement) -> Result<Self> {
                match element {
                    ChartElement::$variant(node) => {
                        // Logs a warning for any child
                        element.accepted_children();
                        Ok(node.props.clone())
                    }
                    other => Err(wrong_kind(stringify!($variant), other)),
                }
            }
        }
    };
}

leaf_props!(AxisAnnotation, AxisAnnotationProps);
leaf_props!(AxisThumbnail, AxisThumbnailProps);
leaf_props!(BarAnnotation, BarAnnotationProps);
leaf_props!(ChartPopover, ChartPopoverProps);
leaf_props!(ChartTooltip, ChartTooltipProps);
leaf_props!(DonutSummary, DonutSummaryProps);
leaf_props!(Legend, LegendProps);
leaf_props!(MetricRange, MetricRangeProps);
leaf_props!(ReferenceLine, ReferenceLineProps);
leaf_props!(ScatterPath, ScatterPathProps);
leaf_props!(SegmentLabel, SegmentLabelProps);
leaf_props!(Title, TitleProps);
leaf_props!(TrendlineAnnotation, TrendlineAnnotationProps);

impl TryFrom<&ChartElement> for ChartProps {
    type Error = ChartSpecError;

    fn try_from(element: &ChartElement) -> Result<Self> {
        match element {
            ChartElement::Chart(node) => Ok(node.props.clone()),
            other => Err(wrong_kind("Chart", other)),
        }
    }
}

/// Tooltips and popovers are accepted by every mark kind
fn push_interaction(
    child: &ChartElement,
    tooltips: &mut Vec<ChartTooltipProps>,
    popovers: &mut Vec<ChartPopoverProps>,
) -> Result<()> {
    match child {
        ChartElement::ChartTooltip(_) => tooltips.push(child.try_into()?),
        ChartElement::ChartPopover(_) => popovers.push(child.try_into()?),
        _ => {}
    }
    Ok(())
}

impl TryFrom<&ChartElement> for TrendlineProps {
    type Error = ChartSpecError;

    fn try_from(element: &ChartElement) -> Result<Self> {
        let ChartElement::Trendline(node) = element else {
            return Err(wrong_kind("Trendline", element));
        };
        let mut props = node.props.clone();
        for child in element.accepted_children() {
            match child {
                ChartElement::TrendlineAnnotation(_) => {
                    props.trendline_annotations.push(child.try_into()?)
                }
                _ => push_interaction(child, &mut props.chart_tooltips, &mut vec![])?,
            }
        }
        Ok(props)
    }
}

impl TryFrom<&ChartElement> for BarProps {
    type Error = ChartSpecError;

    fn try_from(element: &ChartElement) -> Result<Self> {
        let ChartElement::Bar(node) = element else {
            return Err(wrong_kind("Bar", element));
        };
        let mut props = node.props.clone();
        for child in element.accepted_children() {
            match child {
                ChartElement::BarAnnotation(_) => props.bar_annotations.push(child.try_into()?),
                ChartElement::Trendline(_) => props.trendlines.push(child.try_into()?),
                _ => push_interaction(child, &mut props.chart_tooltips, &mut props.chart_popovers)?,
            }
        }
        Ok(props)
    }
}

impl TryFrom<&ChartElement> for LineProps {
    type Error = ChartSpecError;

    fn try_from(element: &ChartElement) -> Result<Self> {
        let ChartElement::Line(node) = element else {
            return Err(wrong_kind("Line", element));
        };
        let mut props = node.props.clone();
        for child in element.accepted_children() {
            match child {
                ChartElement::MetricRange(_) => props.metric_ranges.push(child.try_into()?),
                ChartElement::Trendline(_) => props.trendlines.push(child.try_into()?),
                _ => push_interaction(child, &mut props.chart_tooltips, &mut props.chart_popovers)?,
            }
        }
        Ok(props)
    }
}

impl TryFrom<&ChartElement> for ScatterProps {
    type Error = ChartSpecError;

    fn try_from(element: &ChartElement) -> Result<Self> {
        let ChartElement::Scatter(node) = element else {
            return Err(wrong_kind("Scatter", element));
        };
        let mut props = node.props.clone();
        for child in element.accepted_children() {
            match child {
                ChartElement::ScatterPath(_) => props.scatter_paths.push(child.try_into()?),
                ChartElement::Trendline(_) => props.trendlines.push(child.try_into()?),
                _ => push_interaction(child, &mut props.chart_tooltips, &mut props.chart_popovers)?,
            }
        }
        Ok(props)
    }
}

impl TryFrom<&ChartElement> for DonutProps {
    type Error = ChartSpecError;

    fn try_from(element: &ChartElement) -> Result<Self> {
        let ChartElement::Donut(node) = element else {
            return Err(wrong_kind("Donut", element));
        };
        let mut props = node.props.clone();
        for child in element.accepted_children() {
            match child {
                ChartElement::DonutSummary(_) => props.donut_summaries.push(child.try_into()?),
                ChartElement::SegmentLabel(_) => props.segment_labels.push(child.try_into()?),
                _ => push_interaction(child, &mut props.chart_tooltips, &mut props.chart_popovers)?,
            }
        }
        Ok(props)
    }
}

impl TryFrom<&ChartElement> for AxisProps {
    type Error = ChartSpecError;

    fn try_from(element: &ChartElement) -> Result<Self> {
        let ChartElement::Axis(node) = element else {
            return Err(wrong_kind("Axis", element));
        };
        let mut props = node.props.clone();
        for child in element.accepted_children() {
            match child {
                ChartElement::ReferenceLine(_) => props.reference_lines.push(child.try_into()?),
                ChartElement::AxisAnnotation(_) => props.axis_annotations.push(child.try_into()?),
                ChartElement::AxisThumbnail(_) => props.axis_thumbnails.push(child.try_into()?),
                _ => {}
            }
        }
        Ok(props)
    }
}

/// Marks whose only children are tooltips and popovers
macro_rules! interactive_props {
    ($variant:ident, $props:ty) => {
        impl TryFrom<&ChartElement> for $props {
            type Error = ChartSpecError;

            fn try_from(element: &ChartElement) -> Result<Self> {
                let ChartElement::$variant(node) = element else {
                    return Err(wrong_kind(stringify!($variant), element));
                };
                let mut props = node.props.clone();
                for child in element.accepted_children() {
                    push_interaction(child, &mut props.chart_tooltips, &mut props.chart_popovers)?;
                }
                Ok(props)
            }
        }
    };
}

interactive_props!(Area, AreaProps);
interactive_props!(Sunburst, SunburstProps);
interactive_props!(Treemap, TreemapProps);

/// Walk a `Chart` element into chart options, along with the config after chart-level
/// overrides. Marks are indexed per kind, so the first bar and the first line are
/// `bar0` and `line0`.
pub fn chart_options(
    element: &ChartElement,
    config: &BuilderConfig,
) -> Result<(ChartOptions, BuilderConfig)> {
    let props = ChartProps::try_from(element)?;
    let config = props.apply_to(config);
    let ctx = NormalizeContext::new(&config);
    let mut options = props.normalize(0, &ctx);

    let mut counters: HashMap<&'static str, usize> = HashMap::new();
    for child in element.accepted_children() {
        let counter = counters.entry(child.kind()).or_insert(0);
        let index = *counter;
        *counter += 1;

        match child {
            ChartElement::Area(_) => options.marks.push(MarkOptions::Area(
                AreaProps::try_from(child)?.normalize(index, &ctx),
            )),
            ChartElement::Bar(_) => options.marks.push(MarkOptions::Bar(
                BarProps::try_from(child)?.normalize(index, &ctx),
            )),
            ChartElement::Donut(_) => options.marks.push(MarkOptions::Donut(
                DonutProps::try_from(child)?.normalize(index, &ctx),
            )),
            ChartElement::Line(_) => options.marks.push(MarkOptions::Line(
                LineProps::try_from(child)?.normalize(index, &ctx),
            )),
            ChartElement::Scatter(_) => options.marks.push(MarkOptions::Scatter(
                ScatterProps::try_from(child)?.normalize(index, &ctx),
            )),
            ChartElement::Sunburst(_) => options.marks.push(MarkOptions::Sunburst(
                SunburstProps::try_from(child)?.normalize(index, &ctx),
            )),
            ChartElement::Treemap(_) => options.marks.push(MarkOptions::Treemap(
                TreemapProps::try_from(child)?.normalize(index, &ctx),
            )),
            ChartElement::Axis(_) => options
                .axes
                .push(AxisProps::try_from(child)?.normalize(index, &ctx)),
            ChartElement::Legend(_) => options
                .legends
                .push(LegendProps::try_from(child)?.normalize(index, &ctx)),
            ChartElement::Title(_) => options
                .titles
                .push(TitleProps::try_from(child)?.normalize(index, &ctx)),
            _ => {}
        }
    }
    Ok((options, config))
}

#[cfg(test)]
mod tests {
    use crate::config::BuilderConfig;
    use crate::element::{chart_options, ChartElement, Node};
    use crate::options::bar::BarProps;
    use crate::options::ChartTooltipProps;
    use crate::options::chart::MarkOptions;
    use chartspec_common::error::ChartSpecError;
    use serde_json::json;
    use std::convert::TryFrom;

    fn element(value: serde_json::Value) -> ChartElement {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_disallowed_children_are_dropped() {
        let bar = element(json!({
            "kind": "Bar",
            "props": {"dimension": "browser"},
            "children": [
                {"kind": "ChartTooltip"},
                {"kind": "MetricRange"},
                {"kind": "Trendline", "children": [{"kind": "TrendlineAnnotation"}]}
            ]
        }));
        let props = BarProps::try_from(&bar).unwrap();
        assert_eq!(props.dimension.as_deref(), Some("browser"));
        assert_eq!(props.chart_tooltips.len(), 1);
        assert_eq!(props.trendlines.len(), 1);
        assert_eq!(props.trendlines[0].trendline_annotations.len(), 1);
    }

    #[test]
    fn test_built_in_code_matches_json() {
        let built = ChartElement::Bar(
            Node::new(BarProps {
                dimension: Some("browser".to_string()),
                ..Default::default()
            })
            .with_children(vec![ChartElement::ChartTooltip(Node::new(
                ChartTooltipProps::default(),
            ))]),
        );
        let parsed = element(json!({
            "kind": "Bar",
            "props": {"dimension": "browser"},
            "children": [{"kind": "ChartTooltip"}]
        }));
        assert_eq!(built, parsed);
    }

    #[test]
    fn test_wrong_kind_is_an_error() {
        let line = element(json!({"kind": "Line"}));
        let err = BarProps::try_from(&line).unwrap_err();
        assert!(matches!(err, ChartSpecError::SpecificationError(..)));
    }

    #[test]
    fn test_marks_are_indexed_per_kind() {
        let chart = element(json!({
            "kind": "Chart",
            "props": {"data": [], "colorScheme": "dark"},
            "children": [
                {"kind": "Bar"},
                {"kind": "Line"},
                {"kind": "Bar", "props": {"name": "second bar"}},
                {"kind": "Trendline"},
                {"kind": "Axis", "props": {"position": "left"}}
            ]
        }));
        let (options, config) = chart_options(&chart, &BuilderConfig::default()).unwrap();
        let names: Vec<_> = options.marks.iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names, vec!["bar0", "line0", "secondBar"]);
        assert_eq!(options.axes.len(), 1);
        assert_eq!(config.color_scheme.blend_mode(), "screen");
        assert!(matches!(options.marks[1], MarkOptions::Line(_)));
    }
}
