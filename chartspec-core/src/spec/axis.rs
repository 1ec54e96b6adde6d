use crate::spec::legend::GuideEncodeSpec;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub scale: String,

    pub orient: AxisOrientSpec,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,

    #[serde(rename = "formatType", skip_serializing_if = "Option::is_none")]
    pub format_type: Option<AxisFormatTypeSpec>,

    #[serde(rename = "tickMinStep", skip_serializing_if = "Option::is_none")]
    pub tick_min_step: Option<f64>,

    #[serde(rename = "labelAngle", skip_serializing_if = "Option::is_none")]
    pub label_angle: Option<f64>,

    #[serde(rename = "zindex", skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode: Option<IndexMap<String, GuideEncodeSpec>>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrientSpec {
    Left,
    Right,
    Top,
    #[default]
    Bottom,
}

impl AxisOrientSpec {
    /// Whether this axis runs horizontally along the chart
    pub fn is_horizontal(&self) -> bool {
        matches!(self, AxisOrientSpec::Top | AxisOrientSpec::Bottom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisFormatTypeSpec {
    Number,
    Time,
    Utc,
}
