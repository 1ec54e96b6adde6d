use crate::config::{BuilderConfig, ColorScheme};
use crate::options::area::AreaOptions;
use crate::options::axis::AxisOptions;
use crate::options::bar::BarOptions;
use crate::options::donut::DonutOptions;
use crate::options::hierarchy::{SunburstOptions, TreemapOptions};
use crate::options::legend::{LegendOptions, TitleOptions};
use crate::options::line::LineOptions;
use crate::options::scatter::ScatterOptions;
use crate::options::{Normalize, NormalizeContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartProps {
    pub data: Vec<Value>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub padding: Option<f64>,
    pub background_color: Option<String>,
    pub color_scheme: Option<String>,
    pub chart_id: Option<String>,
    pub hidden_series: Vec<String>,
    pub highlighted_item: Option<Value>,
    pub highlighted_series: Option<Value>,
}

impl ChartProps {
    /// Chart-level props take precedence over the builder config
    pub fn apply_to(&self, config: &BuilderConfig) -> BuilderConfig {
        let mut config = config.clone();
        if let Some(scheme) = &self.color_scheme {
            config.color_scheme = ColorScheme::from_name(scheme);
        }
        if let Some(background) = &self.background_color {
            config.background_color = background.clone();
        }
        if let Some(chart_id) = &self.chart_id {
            config.chart_id = chart_id.clone();
        }
        config
    }
}

/// A normalized mark child of the chart
#[derive(Debug, Clone, PartialEq)]
pub enum MarkOptions {
    Area(AreaOptions),
    Bar(BarOptions),
    Donut(DonutOptions),
    Line(LineOptions),
    Scatter(ScatterOptions),
    Sunburst(SunburstOptions),
    Treemap(TreemapOptions),
}

impl MarkOptions {
    pub fn name(&self) -> &str {
        match self {
            MarkOptions::Area(o) => &o.name,
            MarkOptions::Bar(o) => &o.name,
            MarkOptions::Donut(o) => &o.name,
            MarkOptions::Line(o) => &o.name,
            MarkOptions::Scatter(o) => &o.name,
            MarkOptions::Sunburst(o) => &o.name,
            MarkOptions::Treemap(o) => &o.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub data: Vec<Value>,
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub hidden_series: Vec<String>,
    pub highlighted_item: Option<Value>,
    pub highlighted_series: Option<Value>,
    pub marks: Vec<MarkOptions>,
    pub axes: Vec<AxisOptions>,
    pub legends: Vec<LegendOptions>,
    pub titles: Vec<TitleOptions>,
}

impl Normalize for ChartProps {
    type Output = ChartOptions;

    /// Children are added afterwards by the element adapter
    fn normalize(&self, _index: usize, _ctx: &NormalizeContext) -> ChartOptions {
        ChartOptions {
            data: self.data.clone(),
            width: self.width.unwrap_or(600.0),
            height: self.height.unwrap_or(400.0),
            padding: self.padding.unwrap_or(0.0),
            hidden_series: self.hidden_series.clone(),
            highlighted_item: self.highlighted_item.clone(),
            highlighted_series: self.highlighted_series.clone(),
            marks: vec![],
            axes: vec![],
            legends: vec![],
            titles: vec![],
        }
    }
}
