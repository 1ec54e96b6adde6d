use crate::constants::{DEFAULT_COLOR, DEFAULT_METRIC};
use crate::options::{
    mark_name, normalize_all, ChartPopoverProps, ChartTooltipProps, Interactions, Normalize,
    NormalizeContext,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DonutProps {
    pub name: Option<String>,
    pub color: Option<String>,
    pub metric: Option<String>,
    pub start_angle: Option<f64>,
    pub hole_ratio: Option<f64>,
    pub chart_tooltips: Vec<ChartTooltipProps>,
    pub chart_popovers: Vec<ChartPopoverProps>,
    pub donut_summaries: Vec<DonutSummaryProps>,
    pub segment_labels: Vec<SegmentLabelProps>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonutOptions {
    pub name: String,
    pub index: usize,
    pub color: String,
    pub metric: String,
    pub start_angle: f64,
    pub hole_ratio: f64,
    pub interactions: Interactions,
    pub summaries: Vec<DonutSummaryOptions>,
    pub segment_labels: Vec<SegmentLabelOptions>,
}

impl Normalize for DonutProps {
    type Output = DonutOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> DonutOptions {
        let name = mark_name(&self.name, "donut", index);
        let child_ctx = ctx.child(&name);
        DonutOptions {
            index,
            color: self
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            metric: self
                .metric
                .clone()
                .unwrap_or_else(|| DEFAULT_METRIC.to_string()),
            start_angle: self.start_angle.unwrap_or(0.0),
            hole_ratio: self.hole_ratio.unwrap_or(0.85),
            interactions: Interactions::new(&self.chart_tooltips, &self.chart_popovers, ctx),
            summaries: normalize_all(&self.donut_summaries, &child_ctx),
            segment_labels: normalize_all(&self.segment_labels, &child_ctx),
            name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DonutSummaryProps {
    pub label: Option<String>,
    pub number_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonutSummaryOptions {
    pub label: Option<String>,
    pub number_format: String,
}

impl Normalize for DonutSummaryProps {
    type Output = DonutSummaryOptions;

    fn normalize(&self, _index: usize, _ctx: &NormalizeContext) -> DonutSummaryOptions {
        DonutSummaryOptions {
            label: self.label.clone(),
            number_format: self
                .number_format
                .clone()
                .unwrap_or_else(|| ",".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentLabelProps {
    pub label_key: Option<String>,
    pub value: Option<bool>,
    pub percent: Option<bool>,
    pub value_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentLabelOptions {
    /// Falls back to the donut color key
    pub label_key: Option<String>,
    pub value: bool,
    pub percent: bool,
    pub value_format: String,
}

impl Normalize for SegmentLabelProps {
    type Output = SegmentLabelOptions;

    fn normalize(&self, _index: usize, _ctx: &NormalizeContext) -> SegmentLabelOptions {
        SegmentLabelOptions {
            label_key: self.label_key.clone(),
            value: self.value.unwrap_or(false),
            percent: self.percent.unwrap_or(false),
            value_format: self
                .value_format
                .clone()
                .unwrap_or_else(|| ",".to_string()),
        }
    }
}
