//! Raw element props and the normalized option records built from them.
//!
//! Every `*Props` struct mirrors what an author writes (all fields optional, camelCase
//! keys). Normalizing applies the per-kind defaults and never fails; invalid but
//! recoverable combinations are logged and replaced by a default.
pub mod area;
pub mod axis;
pub mod bar;
pub mod chart;
pub mod donut;
pub mod hierarchy;
pub mod legend;
pub mod line;
pub mod scatter;
pub mod trendline;

use crate::config::BuilderConfig;
use crate::naming;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use area::{AreaOptions, AreaProps};
pub use axis::{
    AxisAnnotationOptions, AxisAnnotationProps, AxisOptions, AxisProps, AxisThumbnailOptions,
    AxisThumbnailProps, ReferenceLineOptions, ReferenceLineProps,
};
pub use bar::{BarAnnotationOptions, BarAnnotationProps, BarOptions, BarProps};
pub use chart::{ChartOptions, ChartProps, MarkOptions};
pub use donut::{
    DonutOptions, DonutProps, DonutSummaryOptions, DonutSummaryProps, SegmentLabelOptions,
    SegmentLabelProps,
};
pub use hierarchy::{SunburstOptions, SunburstProps, TreemapOptions, TreemapProps};
pub use legend::{LegendOptions, LegendProps, TitleOptions, TitleProps};
pub use line::{LineOptions, LineProps, MetricRangeOptions, MetricRangeProps};
pub use scatter::{ScatterOptions, ScatterPathOptions, ScatterPathProps, ScatterProps};
pub use trendline::{
    TrendlineAnnotationOptions, TrendlineAnnotationProps, TrendlineOptions, TrendlineProps,
};

/// What a normalizer needs besides the raw props
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub config: &'a BuilderConfig,
    /// Name of the enclosing mark or axis when normalizing a child
    pub parent_name: Option<&'a str>,
}

impl<'a> NormalizeContext<'a> {
    pub fn new(config: &'a BuilderConfig) -> Self {
        Self {
            config,
            parent_name: None,
        }
    }

    pub fn child<'b>(&self, parent_name: &'b str) -> NormalizeContext<'b>
    where
        'a: 'b,
    {
        NormalizeContext {
            config: self.config,
            parent_name: Some(parent_name),
        }
    }

    pub fn parent(&self) -> &'a str {
        self.parent_name.unwrap_or_default()
    }
}

pub trait Normalize {
    type Output;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> Self::Output;
}

/// Normalize a list of child props, each with its position as index
pub fn normalize_all<P: Normalize>(props: &[P], ctx: &NormalizeContext) -> Vec<P::Output> {
    props
        .iter()
        .enumerate()
        .map(|(i, p)| p.normalize(i, ctx))
        .collect()
}

/// How a visual property is mapped from the data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetRef {
    /// Key of the data field that drives the property
    Field(String),
    /// Primary and secondary keys; the secondary key picks among the primary's shades
    Dual(String, String),
    Static(StaticFacet),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticFacet {
    pub value: Value,
}

impl FacetRef {
    pub fn field<S: Into<String>>(field: S) -> Self {
        FacetRef::Field(field.into())
    }

    pub fn value<V: Into<Value>>(value: V) -> Self {
        FacetRef::Static(StaticFacet {
            value: value.into(),
        })
    }

    /// Data fields this facet reads, primary first
    pub fn fields(&self) -> Vec<String> {
        match self {
            FacetRef::Field(f) => vec![f.clone()],
            FacetRef::Dual(primary, secondary) => vec![primary.clone(), secondary.clone()],
            FacetRef::Static(_) => vec![],
        }
    }

    pub fn static_value(&self) -> Option<&Value> {
        match self {
            FacetRef::Static(s) => Some(&s.value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HighlightMode {
    #[default]
    Item,
    Dimension,
    Series,
}

/// Which rows light up together when one row is hovered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HighlightBy {
    Mode(HighlightMode),
    Keys(Vec<String>),
}

impl Default for HighlightBy {
    fn default() -> Self {
        HighlightBy::Mode(HighlightMode::Item)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DimensionScaleType {
    Time,
    Linear,
    Point,
    Band,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Granularity {
    Minute,
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartTooltipProps {
    pub highlight_by: Option<HighlightBy>,
    pub exclude_data_keys: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartTooltipOptions {
    pub highlight_by: HighlightBy,
    pub exclude_data_keys: Vec<String>,
}

impl Normalize for ChartTooltipProps {
    type Output = ChartTooltipOptions;

    fn normalize(&self, _index: usize, _ctx: &NormalizeContext) -> ChartTooltipOptions {
        ChartTooltipOptions {
            highlight_by: self.highlight_by.clone().unwrap_or_default(),
            exclude_data_keys: self.exclude_data_keys.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartPopoverProps {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPopoverOptions {
    pub width: f64,
    pub height: Option<f64>,
}

impl Normalize for ChartPopoverProps {
    type Output = ChartPopoverOptions;

    fn normalize(&self, _index: usize, _ctx: &NormalizeContext) -> ChartPopoverOptions {
        ChartPopoverOptions {
            width: self.width.unwrap_or(250.0),
            height: self.height,
        }
    }
}

/// Tooltip and popover children of a mark
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interactions {
    pub tooltips: Vec<ChartTooltipOptions>,
    pub popovers: Vec<ChartPopoverOptions>,
}

impl Interactions {
    pub fn new(
        tooltips: &[ChartTooltipProps],
        popovers: &[ChartPopoverProps],
        ctx: &NormalizeContext,
    ) -> Self {
        Self {
            tooltips: normalize_all(tooltips, ctx),
            popovers: normalize_all(popovers, ctx),
        }
    }

    pub fn has_tooltip(&self) -> bool {
        !self.tooltips.is_empty()
    }

    pub fn has_popover(&self) -> bool {
        !self.popovers.is_empty()
    }

    pub fn is_interactive(&self) -> bool {
        self.has_tooltip() || self.has_popover()
    }

    /// Highlight grouping requested by the first tooltip
    pub fn highlight_by(&self) -> HighlightBy {
        self.tooltips
            .first()
            .map(|t| t.highlight_by.clone())
            .unwrap_or_default()
    }
}

/// Named symbol sizes resolve to areas in square pixels, numbers pass through
pub fn symbol_size_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(100.0),
        Value::String(s) => match s.as_str() {
            "XS" => 36.0,
            "S" => 64.0,
            "L" => 144.0,
            "XL" => 196.0,
            "XXL" => 256.0,
            _ => 100.0,
        },
        _ => 100.0,
    }
}

/// Named line widths resolve to pixels, numbers pass through
pub fn line_width_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(1.0),
        Value::String(s) => match s.as_str() {
            "XS" => 0.5,
            "S" => 1.0,
            "M" => 1.5,
            "L" => 2.0,
            "XL" => 3.0,
            _ => 1.0,
        },
        _ => 1.0,
    }
}

pub(crate) fn mark_name(name: &Option<String>, mark_type: &str, index: usize) -> String {
    naming::mark_name(name.as_deref(), mark_type, index)
}

#[cfg(test)]
mod tests {
    use crate::options::{line_width_value, symbol_size_value, FacetRef, HighlightBy, HighlightMode};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("series"), FacetRef::field("series"))]
    #[case(json!(["series", "subSeries"]), FacetRef::Dual("series".into(), "subSeries".into()))]
    #[case(json!({"value": "dashed"}), FacetRef::value("dashed"))]
    fn test_facet_ref_from_json(#[case] input: serde_json::Value, #[case] expected: FacetRef) {
        let facet: FacetRef = serde_json::from_value(input).unwrap();
        assert_eq!(facet, expected);
    }

    #[test]
    fn test_highlight_by_from_json() {
        let by: HighlightBy = serde_json::from_value(json!("dimension")).unwrap();
        assert_eq!(by, HighlightBy::Mode(HighlightMode::Dimension));
        let by: HighlightBy = serde_json::from_value(json!(["region", "series"])).unwrap();
        assert_eq!(by, HighlightBy::Keys(vec!["region".into(), "series".into()]));
    }

    #[test]
    fn test_named_sizes() {
        assert_eq!(symbol_size_value(&json!("XS")), 36.0);
        assert_eq!(symbol_size_value(&json!("XXL")), 256.0);
        assert_eq!(symbol_size_value(&json!(50)), 50.0);
        assert_eq!(line_width_value(&json!("M")), 1.5);
        assert_eq!(line_width_value(&json!("XL")), 3.0);
    }
}
