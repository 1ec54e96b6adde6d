use crate::naming;
use crate::options::{
    normalize_all, ChartTooltipProps, FacetRef, Interactions, Normalize, NormalizeContext,
};
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

lazy_static! {
    static ref POLYNOMIAL_METHOD: Regex = Regex::new(r"^polynomial-(\d+)$").unwrap();
    static ref MOVING_AVERAGE_METHOD: Regex = Regex::new(r"^movingAverage-(\d+)$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendlineMethod {
    Average,
    Median,
    Linear,
    Exponential,
    Logarithmic,
    Power,
    Quadratic,
    Polynomial(u32),
    MovingAverage(u32),
}

impl TrendlineMethod {
    /// Parse a method name, `None` if it isn't one of the supported methods
    pub fn parse(method: &str) -> Option<Self> {
        let parsed = match method {
            "average" => TrendlineMethod::Average,
            "median" => TrendlineMethod::Median,
            "linear" => TrendlineMethod::Linear,
            "exponential" => TrendlineMethod::Exponential,
            "logarithmic" => TrendlineMethod::Logarithmic,
            "power" => TrendlineMethod::Power,
            "quadratic" => TrendlineMethod::Quadratic,
            _ => {
                if let Some(caps) = POLYNOMIAL_METHOD.captures(method) {
                    TrendlineMethod::Polynomial(caps[1].parse().ok()?)
                } else if let Some(caps) = MOVING_AVERAGE_METHOD.captures(method) {
                    TrendlineMethod::MovingAverage(caps[1].parse().ok()?)
                } else {
                    return None;
                }
            }
        };
        Some(parsed)
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, TrendlineMethod::Average | TrendlineMethod::Median)
    }

    pub fn is_regression(&self) -> bool {
        !self.is_aggregate() && !self.is_windowed()
    }

    pub fn is_windowed(&self) -> bool {
        matches!(self, TrendlineMethod::MovingAverage(_))
    }
}

/// One end of the dimension range a trendline is drawn over
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtentBound {
    /// Explicit dimension value
    Value(f64),
    /// Extend to the edge of the dimension scale domain
    Domain,
    /// Stop at the first or last data point
    Data,
}

impl From<&Value> for ExtentBound {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(ExtentBound::Value).unwrap_or(ExtentBound::Data),
            Value::String(s) if s == "domain" => ExtentBound::Domain,
            _ => ExtentBound::Data,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrendlineProps {
    pub method: Option<String>,
    pub dimension_extent: Option<[Value; 2]>,
    pub display_on_hover: Option<bool>,
    pub color: Option<FacetRef>,
    pub line_type: Option<FacetRef>,
    pub line_width: Option<FacetRef>,
    pub opacity: Option<f64>,
    pub chart_tooltips: Vec<ChartTooltipProps>,
    pub trendline_annotations: Vec<TrendlineAnnotationProps>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendlineOptions {
    /// `${parent}Trendline${index}`
    pub name: String,
    pub index: usize,
    pub method: TrendlineMethod,
    pub dimension_extent: [ExtentBound; 2],
    pub display_on_hover: bool,
    /// Overrides the parent mark's color when set
    pub color: Option<FacetRef>,
    pub line_type: FacetRef,
    pub line_width: FacetRef,
    pub opacity: f64,
    pub interactions: Interactions,
    pub annotations: Vec<TrendlineAnnotationOptions>,
}

impl Normalize for TrendlineProps {
    type Output = TrendlineOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> TrendlineOptions {
        let name = naming::trendline(ctx.parent(), index);
        let method = match self.method.as_deref() {
            None => TrendlineMethod::Linear,
            Some(method) => TrendlineMethod::parse(method).unwrap_or_else(|| {
                warn!("Trendline method '{method}' is not supported, using 'linear' for {name}");
                TrendlineMethod::Linear
            }),
        };
        let dimension_extent = match &self.dimension_extent {
            Some([start, end]) => [ExtentBound::from(start), ExtentBound::from(end)],
            None => [ExtentBound::Data, ExtentBound::Data],
        };
        let child_ctx = ctx.child(&name);
        TrendlineOptions {
            index,
            method,
            dimension_extent,
            display_on_hover: self.display_on_hover.unwrap_or(false),
            color: self.color.clone(),
            line_type: self
                .line_type
                .clone()
                .unwrap_or_else(|| FacetRef::value("dashed")),
            line_width: self
                .line_width
                .clone()
                .unwrap_or_else(|| FacetRef::value("M")),
            opacity: self.opacity.unwrap_or(1.0),
            interactions: Interactions::new(&self.chart_tooltips, &[], ctx),
            annotations: normalize_all(&self.trendline_annotations, &child_ctx),
            name,
        }
    }
}

/// Where along the trendline an annotation is attached
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnnotationPosition {
    Start,
    End,
    Value(f64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrendlineAnnotationProps {
    pub dimension_value: Option<Value>,
    pub number_format: Option<String>,
    pub prefix: Option<String>,
    pub badge: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendlineAnnotationOptions {
    /// `${trendline}Annotation${index}`
    pub name: String,
    pub position: AnnotationPosition,
    pub number_format: String,
    pub prefix: String,
    pub badge: bool,
}

impl Normalize for TrendlineAnnotationProps {
    type Output = TrendlineAnnotationOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> TrendlineAnnotationOptions {
        let position = match &self.dimension_value {
            Some(Value::String(s)) if s == "start" => AnnotationPosition::Start,
            Some(Value::Number(n)) => n
                .as_f64()
                .map(AnnotationPosition::Value)
                .unwrap_or(AnnotationPosition::End),
            _ => AnnotationPosition::End,
        };
        TrendlineAnnotationOptions {
            name: naming::annotation(ctx.parent(), index),
            position,
            number_format: self.number_format.clone().unwrap_or_default(),
            prefix: self.prefix.clone().unwrap_or_default(),
            badge: self.badge.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BuilderConfig;
    use crate::options::trendline::{
        AnnotationPosition, ExtentBound, TrendlineMethod, TrendlineProps,
    };
    use crate::options::{FacetRef, Normalize, NormalizeContext};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("average", Some(TrendlineMethod::Average))]
    #[case("polynomial-3", Some(TrendlineMethod::Polynomial(3)))]
    #[case("movingAverage-7", Some(TrendlineMethod::MovingAverage(7)))]
    #[case("quadratic", Some(TrendlineMethod::Quadratic))]
    #[case("polynomial-", None)]
    #[case("spline", None)]
    fn test_parse_method(#[case] input: &str, #[case] expected: Option<TrendlineMethod>) {
        assert_eq!(TrendlineMethod::parse(input), expected);
    }

    #[test]
    fn test_unsupported_method_falls_back_to_linear() {
        let config = BuilderConfig::default();
        let ctx = NormalizeContext::new(&config);
        let props = TrendlineProps {
            method: Some("spline".to_string()),
            ..Default::default()
        };
        let options = props.normalize(0, &ctx.child("line0"));
        assert_eq!(options.name, "line0Trendline0");
        assert_eq!(options.method, TrendlineMethod::Linear);
        assert_eq!(options.line_type, FacetRef::value("dashed"));
        assert_eq!(options.dimension_extent, [ExtentBound::Data, ExtentBound::Data]);
    }

    #[test]
    fn test_extent_and_annotation_parsing() {
        let config = BuilderConfig::default();
        let ctx = NormalizeContext::new(&config);
        let props: TrendlineProps = serde_json::from_value(json!({
            "method": "average",
            "dimensionExtent": [0, "domain"],
            "trendlineAnnotations": [{"dimensionValue": "start"}, {"dimensionValue": 5}]
        }))
        .unwrap();
        let options = props.normalize(1, &ctx.child("scatter0"));
        assert_eq!(
            options.dimension_extent,
            [ExtentBound::Value(0.0), ExtentBound::Domain]
        );
        assert_eq!(options.annotations[0].name, "scatter0Trendline1Annotation0");
        assert_eq!(options.annotations[0].position, AnnotationPosition::Start);
        assert_eq!(options.annotations[1].position, AnnotationPosition::Value(5.0));
    }
}
