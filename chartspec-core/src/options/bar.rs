use crate::constants::{DEFAULT_CATEGORICAL_DIMENSION, DEFAULT_COLOR, DEFAULT_METRIC};
use crate::options::trendline::{TrendlineOptions, TrendlineProps};
use crate::options::{
    mark_name, normalize_all, ChartPopoverProps, ChartTooltipProps, FacetRef, Interactions,
    Normalize, NormalizeContext, Orientation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BarType {
    #[default]
    Stacked,
    Dodged,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarProps {
    pub name: Option<String>,
    pub color: Option<FacetRef>,
    pub dimension: Option<String>,
    pub metric: Option<String>,
    pub line_type: Option<FacetRef>,
    pub line_width: Option<FacetRef>,
    pub opacity: Option<FacetRef>,
    pub order: Option<String>,
    #[serde(rename = "type")]
    pub bar_type: Option<BarType>,
    pub orientation: Option<Orientation>,
    pub padding_ratio: Option<f64>,
    pub padding_outer: Option<f64>,
    pub grouped_padding: Option<f64>,
    pub has_squared_corners: Option<bool>,
    pub trellis: Option<String>,
    pub trellis_orientation: Option<Orientation>,
    pub trellis_padding: Option<f64>,
    pub highlighted_item: Option<Value>,
    pub chart_tooltips: Vec<ChartTooltipProps>,
    pub chart_popovers: Vec<ChartPopoverProps>,
    pub trendlines: Vec<TrendlineProps>,
    pub bar_annotations: Vec<BarAnnotationProps>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarOptions {
    pub name: String,
    pub index: usize,
    pub color: FacetRef,
    pub dimension: String,
    pub metric: String,
    pub line_type: FacetRef,
    pub line_width: FacetRef,
    pub opacity: FacetRef,
    pub order: Option<String>,
    pub bar_type: BarType,
    pub orientation: Orientation,
    pub padding_ratio: f64,
    pub padding_outer: f64,
    pub grouped_padding: f64,
    pub has_squared_corners: bool,
    pub trellis: Option<String>,
    pub trellis_orientation: Orientation,
    pub trellis_padding: f64,
    pub highlighted_item: Option<Value>,
    pub interactions: Interactions,
    pub trendlines: Vec<TrendlineOptions>,
    pub annotations: Vec<BarAnnotationOptions>,
}

impl BarOptions {
    pub fn is_stacked(&self) -> bool {
        self.bar_type == BarType::Stacked
    }

    /// Whether opacity and stroke rules reacting to highlight or selection are needed
    pub fn is_interactive(&self) -> bool {
        self.interactions.is_interactive() || self.highlighted_item.is_some()
    }
}

impl Normalize for BarProps {
    type Output = BarOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> BarOptions {
        let name = mark_name(&self.name, "bar", index);
        let child_ctx = ctx.child(&name);
        let padding_ratio = self.padding_ratio.unwrap_or(0.4);
        BarOptions {
            index,
            color: self
                .color
                .clone()
                .unwrap_or_else(|| FacetRef::field(DEFAULT_COLOR)),
            dimension: self
                .dimension
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORICAL_DIMENSION.to_string()),
            metric: self
                .metric
                .clone()
                .unwrap_or_else(|| DEFAULT_METRIC.to_string()),
            line_type: self
                .line_type
                .clone()
                .unwrap_or_else(|| FacetRef::value("solid")),
            line_width: self
                .line_width
                .clone()
                .unwrap_or_else(|| FacetRef::value(0)),
            opacity: self.opacity.clone().unwrap_or_else(|| FacetRef::value(1)),
            order: self.order.clone(),
            bar_type: self.bar_type.unwrap_or_default(),
            orientation: self.orientation.unwrap_or_default(),
            padding_ratio,
            padding_outer: self.padding_outer.unwrap_or(padding_ratio / 2.0),
            grouped_padding: self.grouped_padding.unwrap_or(padding_ratio),
            has_squared_corners: self.has_squared_corners.unwrap_or(false),
            trellis: self.trellis.clone(),
            trellis_orientation: self
                .trellis_orientation
                .unwrap_or(Orientation::Horizontal),
            trellis_padding: self.trellis_padding.unwrap_or(0.2),
            highlighted_item: self.highlighted_item.clone(),
            interactions: Interactions::new(&self.chart_tooltips, &self.chart_popovers, ctx),
            trendlines: normalize_all(&self.trendlines, &child_ctx),
            annotations: normalize_all(&self.bar_annotations, &child_ctx),
            name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarAnnotationProps {
    pub text_key: Option<String>,
    pub number_format: Option<String>,
    pub show_background: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarAnnotationOptions {
    /// Falls back to the bar metric when not set
    pub text_key: Option<String>,
    pub number_format: Option<String>,
    pub show_background: bool,
}

impl Normalize for BarAnnotationProps {
    type Output = BarAnnotationOptions;

    fn normalize(&self, _index: usize, _ctx: &NormalizeContext) -> BarAnnotationOptions {
        BarAnnotationOptions {
            text_key: self.text_key.clone(),
            number_format: self.number_format.clone(),
            show_background: self.show_background.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BuilderConfig;
    use crate::options::bar::{BarProps, BarType};
    use crate::options::{FacetRef, Normalize, NormalizeContext, Orientation};

    #[test]
    fn test_bar_defaults() {
        let config = BuilderConfig::default();
        let options = BarProps::default().normalize(0, &NormalizeContext::new(&config));
        assert_eq!(options.name, "bar0");
        assert_eq!(options.color, FacetRef::field("series"));
        assert_eq!(options.dimension, "category");
        assert_eq!(options.metric, "value");
        assert_eq!(options.bar_type, BarType::Stacked);
        assert_eq!(options.orientation, Orientation::Vertical);
        assert_eq!(options.padding_ratio, 0.4);
        assert_eq!(options.padding_outer, 0.2);
        assert_eq!(options.grouped_padding, 0.4);
        assert_eq!(options.trellis_orientation, Orientation::Horizontal);
        assert!(!options.is_interactive());
    }

    #[test]
    fn test_trendline_children_are_namespaced() {
        let config = BuilderConfig::default();
        let props = BarProps {
            name: Some("downloads".to_string()),
            trendlines: vec![Default::default(), Default::default()],
            ..Default::default()
        };
        let options = props.normalize(2, &NormalizeContext::new(&config));
        let names: Vec<_> = options.trendlines.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["downloadsTrendline0", "downloadsTrendline1"]);
    }
}
