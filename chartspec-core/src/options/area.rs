use crate::constants::{DEFAULT_COLOR, DEFAULT_METRIC, DEFAULT_TIME_DIMENSION};
use crate::options::{
    mark_name, ChartPopoverProps, ChartTooltipProps, DimensionScaleType, FacetRef, Granularity,
    HighlightBy, HighlightMode, Interactions, Normalize, NormalizeContext,
};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AreaProps {
    pub name: Option<String>,
    pub color: Option<FacetRef>,
    pub dimension: Option<String>,
    pub metric: Option<String>,
    pub metric_start: Option<String>,
    pub metric_end: Option<String>,
    pub order: Option<String>,
    pub opacity: Option<f64>,
    pub scale_type: Option<DimensionScaleType>,
    pub granularity: Option<Granularity>,
    pub padding: Option<f64>,
    pub highlight_by: Option<HighlightBy>,
    pub highlighted_item: Option<Value>,
    pub chart_tooltips: Vec<ChartTooltipProps>,
    pub chart_popovers: Vec<ChartPopoverProps>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaOptions {
    pub name: String,
    pub index: usize,
    pub color: FacetRef,
    pub dimension: String,
    pub metric: String,
    /// Either both bounds are set or neither is
    pub metric_start: Option<String>,
    pub metric_end: Option<String>,
    pub order: Option<String>,
    pub opacity: f64,
    pub scale_type: DimensionScaleType,
    pub granularity: Granularity,
    pub padding: f64,
    pub highlight_by: HighlightBy,
    pub highlighted_item: Option<Value>,
    pub interactions: Interactions,
}

impl AreaOptions {
    pub fn is_stacked(&self) -> bool {
        self.metric_start.is_none()
    }

    /// Lower and upper field of the filled band
    pub fn bounds(&self) -> (String, String) {
        match (&self.metric_start, &self.metric_end) {
            (Some(start), Some(end)) => (start.clone(), end.clone()),
            _ => (format!("{}0", self.metric), format!("{}1", self.metric)),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactions.is_interactive() || self.highlighted_item.is_some()
    }
}

impl Normalize for AreaProps {
    type Output = AreaOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> AreaOptions {
        let name = mark_name(&self.name, "area", index);
        let metric = self
            .metric
            .clone()
            .unwrap_or_else(|| DEFAULT_METRIC.to_string());
        let (metric_start, metric_end) = match (&self.metric_start, &self.metric_end) {
            (Some(start), Some(end)) => (Some(start.clone()), Some(end.clone())),
            (None, None) => (None, None),
            _ => {
                warn!(
                    "{name}: metricStart and metricEnd must both be set or both be omitted, \
                     falling back to metric '{metric}'"
                );
                (None, None)
            }
        };
        AreaOptions {
            index,
            color: self
                .color
                .clone()
                .unwrap_or_else(|| FacetRef::field(DEFAULT_COLOR)),
            dimension: self
                .dimension
                .clone()
                .unwrap_or_else(|| DEFAULT_TIME_DIMENSION.to_string()),
            metric,
            metric_start,
            metric_end,
            order: self.order.clone(),
            opacity: self.opacity.unwrap_or(0.8),
            scale_type: self.scale_type.unwrap_or(DimensionScaleType::Time),
            granularity: self.granularity.unwrap_or_default(),
            padding: self.padding.unwrap_or(0.0),
            highlight_by: self
                .highlight_by
                .clone()
                .unwrap_or(HighlightBy::Mode(HighlightMode::Series)),
            highlighted_item: self.highlighted_item.clone(),
            interactions: Interactions::new(&self.chart_tooltips, &self.chart_popovers, ctx),
            name,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BuilderConfig;
    use crate::options::area::AreaProps;
    use crate::options::{Normalize, NormalizeContext};
    use crate::test_logger::{capture_logs, messages};
    use log::Level;
    use rstest::rstest;

    #[rstest]
    #[case(Some("a"), None)]
    #[case(None, Some("b"))]
    fn test_single_bound_falls_back_to_metric(
        #[case] start: Option<&str>,
        #[case] end: Option<&str>,
    ) {
        let config = BuilderConfig::default();
        let props = AreaProps {
            metric: Some("value".to_string()),
            metric_start: start.map(String::from),
            metric_end: end.map(String::from),
            ..Default::default()
        };
        let (options, records) =
            capture_logs(|| props.normalize(0, &NormalizeContext::new(&config)));
        assert_eq!(
            messages(&records, Level::Warn),
            vec![
                "area0: metricStart and metricEnd must both be set or both be omitted, \
                 falling back to metric 'value'"
            ]
        );
        assert_eq!(options.metric, "value");
        assert_eq!(options.metric_start, None);
        assert_eq!(options.metric_end, None);
        assert!(options.is_stacked());
        assert_eq!(options.bounds(), ("value0".to_string(), "value1".to_string()));
    }

    #[test]
    fn test_both_bounds_disable_stacking() {
        let config = BuilderConfig::default();
        let props = AreaProps {
            metric_start: Some("low".to_string()),
            metric_end: Some("high".to_string()),
            ..Default::default()
        };
        let (options, records) =
            capture_logs(|| props.normalize(0, &NormalizeContext::new(&config)));
        assert!(messages(&records, Level::Warn).is_empty());
        assert!(!options.is_stacked());
        assert_eq!(options.bounds(), ("low".to_string(), "high".to_string()));
        assert_eq!(options.opacity, 0.8);
    }
}
