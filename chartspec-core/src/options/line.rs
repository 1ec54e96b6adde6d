use crate::constants::{DEFAULT_COLOR, DEFAULT_METRIC, DEFAULT_TIME_DIMENSION};
use crate::naming;
use crate::options::trendline::{TrendlineOptions, TrendlineProps};
use crate::options::{
    mark_name, normalize_all, ChartPopoverProps, ChartTooltipProps, DimensionScaleType,
    FacetRef, Granularity, Interactions, Normalize, NormalizeContext,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineProps {
    pub name: Option<String>,
    pub color: Option<FacetRef>,
    pub dimension: Option<String>,
    pub metric: Option<String>,
    pub line_type: Option<FacetRef>,
    pub line_width: Option<FacetRef>,
    pub opacity: Option<FacetRef>,
    pub scale_type: Option<DimensionScaleType>,
    pub granularity: Option<Granularity>,
    pub padding: Option<f64>,
    pub static_point: Option<String>,
    pub gradient: Option<bool>,
    pub highlighted_item: Option<Value>,
    pub chart_tooltips: Vec<ChartTooltipProps>,
    pub chart_popovers: Vec<ChartPopoverProps>,
    pub metric_ranges: Vec<MetricRangeProps>,
    pub trendlines: Vec<TrendlineProps>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineOptions {
    pub name: String,
    pub index: usize,
    pub color: FacetRef,
    pub dimension: String,
    pub metric: String,
    pub line_type: FacetRef,
    pub line_width: FacetRef,
    pub opacity: FacetRef,
    pub scale_type: DimensionScaleType,
    pub granularity: Granularity,
    pub padding: f64,
    /// Boolean data key selecting the rows drawn as static points
    pub static_point: Option<String>,
    pub gradient: bool,
    pub highlighted_item: Option<Value>,
    pub interactions: Interactions,
    pub metric_ranges: Vec<MetricRangeOptions>,
    pub trendlines: Vec<TrendlineOptions>,
}

impl LineOptions {
    /// Hover geometry is only built when something reacts to it
    pub fn is_interactive(&self) -> bool {
        self.interactions.is_interactive()
            || self.highlighted_item.is_some()
            || self.metric_ranges.iter().any(|r| r.display_on_hover)
            || self.trendlines.iter().any(|t| t.display_on_hover)
    }
}

impl Normalize for LineProps {
    type Output = LineOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> LineOptions {
        let name = mark_name(&self.name, "line", index);
        let child_ctx = ctx.child(&name);
        LineOptions {
            index,
            color: self
                .color
                .clone()
                .unwrap_or_else(|| FacetRef::field(DEFAULT_COLOR)),
            dimension: self
                .dimension
                .clone()
                .unwrap_or_else(|| DEFAULT_TIME_DIMENSION.to_string()),
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
                .unwrap_or_else(|| FacetRef::value(1)),
            opacity: self.opacity.clone().unwrap_or_else(|| FacetRef::value(1)),
            scale_type: self.scale_type.unwrap_or(DimensionScaleType::Time),
            granularity: self.granularity.unwrap_or_default(),
            padding: self.padding.unwrap_or(0.0),
            static_point: self.static_point.clone(),
            gradient: self.gradient.unwrap_or(false),
            highlighted_item: self.highlighted_item.clone(),
            interactions: Interactions::new(&self.chart_tooltips, &self.chart_popovers, ctx),
            metric_ranges: normalize_all(&self.metric_ranges, &child_ctx),
            trendlines: normalize_all(&self.trendlines, &child_ctx),
            name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricRangeProps {
    pub metric_start: Option<String>,
    pub metric_end: Option<String>,
    pub metric: Option<String>,
    pub line_type: Option<FacetRef>,
    pub line_width: Option<FacetRef>,
    pub rect_opacity: Option<f64>,
    pub display_on_hover: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRangeOptions {
    /// `${parent}MetricRange${index}`
    pub name: String,
    pub metric_start: String,
    pub metric_end: String,
    /// Optional center line drawn on top of the band
    pub metric: Option<String>,
    pub line_type: FacetRef,
    pub line_width: FacetRef,
    pub rect_opacity: f64,
    pub display_on_hover: bool,
}

impl Normalize for MetricRangeProps {
    type Output = MetricRangeOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> MetricRangeOptions {
        MetricRangeOptions {
            name: naming::metric_range(ctx.parent(), index),
            metric_start: self
                .metric_start
                .clone()
                .unwrap_or_else(|| "metricStart".to_string()),
            metric_end: self
                .metric_end
                .clone()
                .unwrap_or_else(|| "metricEnd".to_string()),
            metric: self.metric.clone(),
            line_type: self
                .line_type
                .clone()
                .unwrap_or_else(|| FacetRef::value("dashed")),
            line_width: self
                .line_width
                .clone()
                .unwrap_or_else(|| FacetRef::value("S")),
            rect_opacity: self.rect_opacity.unwrap_or(0.2),
            display_on_hover: self.display_on_hover.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BuilderConfig;
    use crate::options::line::{LineProps, MetricRangeProps};
    use crate::options::{DimensionScaleType, FacetRef, Normalize, NormalizeContext};

    #[test]
    fn test_line_defaults() {
        let config = BuilderConfig::default();
        let props = LineProps {
            metric_ranges: vec![MetricRangeProps {
                display_on_hover: Some(true),
                ..Default::default()
            }],
            ..Default::default()
        };
        let options = props.normalize(1, &NormalizeContext::new(&config));
        assert_eq!(options.name, "line1");
        assert_eq!(options.dimension, "datetime");
        assert_eq!(options.scale_type, DimensionScaleType::Time);
        assert_eq!(options.line_width, FacetRef::value(1));
        assert_eq!(options.metric_ranges[0].name, "line1MetricRange0");
        assert!(options.is_interactive());
    }
}
