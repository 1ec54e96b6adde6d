use crate::naming;
use crate::options::{normalize_all, FacetRef, Granularity, Normalize, NormalizeContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Position {
    Left,
    Right,
    Top,
    Bottom,
}

impl Position {
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Position::Top | Position::Bottom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelFormat {
    Linear,
    Percentage,
    Duration,
    Time,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisProps {
    pub name: Option<String>,
    pub position: Option<Position>,
    pub title: Option<String>,
    pub grid: Option<bool>,
    pub ticks: Option<bool>,
    pub base_line: Option<bool>,
    pub hide_labels: Option<bool>,
    pub label_format: Option<LabelFormat>,
    pub number_format: Option<String>,
    pub tick_min_step: Option<f64>,
    pub vertical_labels: Option<bool>,
    pub granularity: Option<Granularity>,
    pub reference_lines: Vec<ReferenceLineProps>,
    pub axis_annotations: Vec<AxisAnnotationProps>,
    pub axis_thumbnails: Vec<AxisThumbnailProps>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisOptions {
    pub name: String,
    pub index: usize,
    pub position: Position,
    pub title: Option<String>,
    pub grid: bool,
    pub ticks: bool,
    pub base_line: bool,
    pub hide_labels: bool,
    pub label_format: Option<LabelFormat>,
    pub number_format: Option<String>,
    pub tick_min_step: Option<f64>,
    pub vertical_labels: bool,
    pub granularity: Granularity,
    pub reference_lines: Vec<ReferenceLineOptions>,
    pub annotations: Vec<AxisAnnotationOptions>,
    pub thumbnails: Vec<AxisThumbnailOptions>,
}

impl Normalize for AxisProps {
    type Output = AxisOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> AxisOptions {
        let name = naming::mark_name(self.name.as_deref(), "axis", index);
        let child_ctx = ctx.child(&name);
        let position = self.position.unwrap_or(Position::Bottom);
        AxisOptions {
            index,
            position,
            title: self.title.clone(),
            grid: self.grid.unwrap_or(false),
            ticks: self.ticks.unwrap_or(false),
            // A baseline on the metric axis overlaps the first grid line
            base_line: self.base_line.unwrap_or(position.is_horizontal()),
            hide_labels: self.hide_labels.unwrap_or(false),
            label_format: self.label_format,
            number_format: self.number_format.clone(),
            tick_min_step: self.tick_min_step,
            vertical_labels: self.vertical_labels.unwrap_or(false),
            granularity: self.granularity.unwrap_or_default(),
            reference_lines: normalize_all(&self.reference_lines, &child_ctx),
            annotations: normalize_all(&self.axis_annotations, &child_ctx),
            thumbnails: normalize_all(&self.axis_thumbnails, &child_ctx),
            name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BandPosition {
    Before,
    #[default]
    Center,
    After,
}

impl BandPosition {
    /// Offset within the band, as a fraction of its width
    pub fn band(&self) -> f64 {
        match self {
            BandPosition::Before => 0.0,
            BandPosition::Center => 0.5,
            BandPosition::After => 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceLineProps {
    pub value: Option<Value>,
    pub label: Option<String>,
    pub color: Option<String>,
    pub line_type: Option<FacetRef>,
    pub line_width: Option<FacetRef>,
    pub position: Option<BandPosition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLineOptions {
    /// `${axis}ReferenceLine${index}`
    pub name: String,
    pub value: Value,
    pub label: Option<String>,
    pub color: String,
    pub line_type: FacetRef,
    pub line_width: FacetRef,
    pub position: BandPosition,
}

impl Normalize for ReferenceLineProps {
    type Output = ReferenceLineOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> ReferenceLineOptions {
        ReferenceLineOptions {
            name: naming::reference_line(ctx.parent(), index),
            value: self.value.clone().unwrap_or(Value::from(0)),
            label: self.label.clone(),
            color: self.color.clone().unwrap_or_else(|| "gray".to_string()),
            line_type: self
                .line_type
                .clone()
                .unwrap_or_else(|| FacetRef::value("solid")),
            line_width: self
                .line_width
                .clone()
                .unwrap_or_else(|| FacetRef::value("M")),
            position: self.position.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisAnnotationProps {
    pub data_key: Option<String>,
    pub color: Option<String>,
    pub offset: Option<f64>,
    pub options: Vec<AxisAnnotationColorProps>,
}

/// Per-annotation color override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisAnnotationColorProps {
    pub id: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisAnnotationOptions {
    /// `${axis}Annotation${index}`
    pub name: String,
    pub data_key: String,
    pub color: String,
    pub offset: f64,
    pub colors: Vec<(String, String)>,
}

impl Normalize for AxisAnnotationProps {
    type Output = AxisAnnotationOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> AxisAnnotationOptions {
        AxisAnnotationOptions {
            name: naming::annotation(ctx.parent(), index),
            data_key: self
                .data_key
                .clone()
                .unwrap_or_else(|| "annotations".to_string()),
            color: self.color.clone().unwrap_or_else(|| "gray".to_string()),
            offset: self.offset.unwrap_or(80.0),
            colors: self
                .options
                .iter()
                .map(|o| (o.id.clone(), o.color.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisThumbnailProps {
    pub url_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisThumbnailOptions {
    /// `${axis}Thumbnail${index}`
    pub name: String,
    pub url_key: String,
}

impl Normalize for AxisThumbnailProps {
    type Output = AxisThumbnailOptions;

    fn normalize(&self, index: usize, ctx: &NormalizeContext) -> AxisThumbnailOptions {
        AxisThumbnailOptions {
            name: naming::thumbnail(ctx.parent(), index),
            url_key: self
                .url_key
                .clone()
                .unwrap_or_else(|| "thumbnail".to_string()),
        }
    }
}
