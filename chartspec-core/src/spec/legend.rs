use crate::spec::mark::MarkEncodeSpec;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendSpec {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,

    #[serde(rename = "strokeDash", skip_serializing_if = "Option::is_none")]
    pub stroke_dash: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub orient: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode: Option<IndexMap<String, GuideEncodeSpec>>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl LegendSpec {
    /// Scale names this legend is bound to
    pub fn scales(&self) -> Vec<&str> {
        [
            &self.fill,
            &self.stroke,
            &self.stroke_dash,
            &self.opacity,
            &self.shape,
            &self.size,
        ]
        .into_iter()
        .filter_map(|s| s.as_deref())
        .collect()
    }
}

/// Encoding block for one part of a guide, e.g. legend `entries` or axis `labels`
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideEncodeSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,

    #[serde(flatten)]
    pub encode: MarkEncodeSpec,
}
