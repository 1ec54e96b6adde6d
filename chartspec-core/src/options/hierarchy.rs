use crate::constants::{DEFAULT_COLOR, DEFAULT_HIERARCHY_ID, DEFAULT_HIERARCHY_PARENT, DEFAULT_METRIC};
use crate::options::{
    mark_name, ChartPopoverProps, ChartTooltipProps, Interactions, Normalize, NormalizeContext,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SunburstProps {
    pub name: Option<String>,
    pub id: Option<String>,
    pub parent_key: Option<String>,
    pub metric: Option<String>,
    pub color: Option<String>,
    pub chart_tooltips: Vec<ChartTooltipProps>,
    pub chart_popovers: Vec<ChartPopoverProps>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SunburstOptions {
    pub name: String,
    pub index: usize,
    pub id: String,
    pub parent_key: String,
    pub metric: String,
    pub color: String,
    pub interactions: Interactions,
}

impl Normalize for SunburstProps {
    type Output = SunburstOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> SunburstOptions {
        let (id, parent_key, metric, color) =
            hierarchy_keys(&self.id, &self.parent_key, &self.metric, &self.color);
        SunburstOptions {
            name: mark_name(&self.name, "sunburst", index),
            index,
            id,
            parent_key,
            metric,
            color,
            interactions: Interactions::new(&self.chart_tooltips, &self.chart_popovers, ctx),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreemapProps {
    pub name: Option<String>,
    pub id: Option<String>,
    pub parent_key: Option<String>,
    pub metric: Option<String>,
    pub color: Option<String>,
    pub label_key: Option<String>,
    pub chart_tooltips: Vec<ChartTooltipProps>,
    pub chart_popovers: Vec<ChartPopoverProps>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreemapOptions {
    pub name: String,
    pub index: usize,
    pub id: String,
    pub parent_key: String,
    pub metric: String,
    pub color: String,
    /// Falls back to the id key
    pub label_key: Option<String>,
    pub interactions: Interactions,
}

impl Normalize for TreemapProps {
    type Output = TreemapOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> TreemapOptions {
        let (id, parent_key, metric, color) =
            hierarchy_keys(&self.id, &self.parent_key, &self.metric, &self.color);
        TreemapOptions {
            name: mark_name(&self.name, "treemap", index),
            index,
            id,
            parent_key,
            metric,
            color,
            label_key: self.label_key.clone(),
            interactions: Interactions::new(&self.chart_tooltips, &self.chart_popovers, ctx),
        }
    }
}

fn hierarchy_keys(
    id: &Option<String>,
    parent_key: &Option<String>,
    metric: &Option<String>,
    color: &Option<String>,
) -> (String, String, String, String) {
    (
        id.clone().unwrap_or_else(|| DEFAULT_HIERARCHY_ID.to_string()),
        parent_key
            .clone()
            .unwrap_or_else(|| DEFAULT_HIERARCHY_PARENT.to_string()),
        metric.clone().unwrap_or_else(|| DEFAULT_METRIC.to_string()),
        color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_string()),
    )
}
