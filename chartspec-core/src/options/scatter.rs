use crate::constants::{DEFAULT_SCATTER_DIMENSION, DEFAULT_SCATTER_METRIC};
use crate::naming;
use crate::options::trendline::{TrendlineOptions, TrendlineProps};
use crate::options::{
    mark_name, normalize_all, ChartPopoverProps, ChartTooltipProps, DimensionScaleType,
    FacetRef, Interactions, Normalize, NormalizeContext,
};
use crate::config::ColorScheme;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScatterProps {
    pub name: Option<String>,
    pub color: Option<FacetRef>,
    pub dimension: Option<String>,
    pub metric: Option<String>,
    pub dimension_scale_type: Option<DimensionScaleType>,
    pub line_type: Option<FacetRef>,
    pub line_width: Option<FacetRef>,
    pub opacity: Option<FacetRef>,
    pub size: Option<FacetRef>,
    pub chart_tooltips: Vec<ChartTooltipProps>,
    pub chart_popovers: Vec<ChartPopoverProps>,
    pub scatter_paths: Vec<ScatterPathProps>,
    pub trendlines: Vec<TrendlineProps>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterOptions {
    pub name: String,
    pub index: usize,
    pub color: FacetRef,
    pub color_scheme: ColorScheme,
    pub dimension: String,
    pub metric: String,
    pub dimension_scale_type: DimensionScaleType,
    pub line_type: FacetRef,
    pub line_width: FacetRef,
    pub opacity: FacetRef,
    pub size: FacetRef,
    pub interactions: Interactions,
    pub scatter_paths: Vec<ScatterPathOptions>,
    pub trendlines: Vec<TrendlineOptions>,
}

impl ScatterOptions {
    /// Whether any child reacts to hover, which is what the highlight opacity rules need
    pub fn has_interactive_children(&self) -> bool {
        self.interactions.is_interactive()
            || self
                .trendlines
                .iter()
                .any(|t| t.display_on_hover || t.interactions.is_interactive())
    }
}

impl Normalize for ScatterProps {
    type Output = ScatterOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> ScatterOptions {
        let name = mark_name(&self.name, "scatter", index);
        let child_ctx = ctx.child(&name);
        ScatterOptions {
            index,
            color: self
                .color
                .clone()
                .unwrap_or_else(|| FacetRef::value(ctx.config.first_color())),
            color_scheme: ctx.config.color_scheme,
            dimension: self
                .dimension
                .clone()
                .unwrap_or_else(|| DEFAULT_SCATTER_DIMENSION.to_string()),
            metric: self
                .metric
                .clone()
                .unwrap_or_else(|| DEFAULT_SCATTER_METRIC.to_string()),
            dimension_scale_type: self
                .dimension_scale_type
                .unwrap_or(DimensionScaleType::Linear),
            line_type: self
                .line_type
                .clone()
                .unwrap_or_else(|| FacetRef::value("solid")),
            line_width: self
                .line_width
                .clone()
                .unwrap_or_else(|| FacetRef::value(0)),
            opacity: self.opacity.clone().unwrap_or_else(|| FacetRef::value(1)),
            size: self.size.clone().unwrap_or_else(|| FacetRef::value("M")),
            interactions: Interactions::new(&self.chart_tooltips, &self.chart_popovers, ctx),
            scatter_paths: normalize_all(&self.scatter_paths, &child_ctx),
            trendlines: normalize_all(&self.trendlines, &child_ctx),
            name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScatterPathProps {
    pub group_by: Option<Vec<String>>,
    pub color: Option<String>,
    pub path_width: Option<FacetRef>,
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPathOptions {
    /// `${parent}Path${index}`
    pub name: String,
    pub group_by: Vec<String>,
    pub color: String,
    pub path_width: FacetRef,
    pub opacity: f64,
}

impl Normalize for ScatterPathProps {
    type Output = ScatterPathOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> ScatterPathOptions {
        ScatterPathOptions {
            name: naming::scatter_path(ctx.parent(), index),
            group_by: self.group_by.clone().unwrap_or_default(),
            color: self.color.clone().unwrap_or_else(|| "gray".to_string()),
            path_width: self
                .path_width
                .clone()
                .unwrap_or_else(|| FacetRef::value("M")),
            opacity: self.opacity.unwrap_or(0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BuilderConfig;
    use crate::options::scatter::ScatterProps;
    use crate::options::{DimensionScaleType, FacetRef, Normalize, NormalizeContext};

    #[test]
    fn test_scatter_defaults() {
        let config = BuilderConfig::default();
        let options = ScatterProps::default().normalize(0, &NormalizeContext::new(&config));
        assert_eq!(options.name, "scatter0");
        assert_eq!(options.color, FacetRef::value(config.first_color()));
        assert_eq!(options.dimension, "x");
        assert_eq!(options.metric, "y");
        assert_eq!(options.dimension_scale_type, DimensionScaleType::Linear);
        assert_eq!(options.size, FacetRef::value("M"));
        assert!(!options.has_interactive_children());
    }
}
