use crate::options::axis::Position;
use crate::options::{Normalize, NormalizeContext};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegendProps {
    pub name: Option<String>,
    pub position: Option<Position>,
    pub title: Option<String>,
    pub highlight: Option<bool>,
    pub is_hidable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendOptions {
    pub name: String,
    pub index: usize,
    pub position: Position,
    pub title: Option<String>,
    /// Hovering an entry highlights its series
    pub highlight: bool,
    /// Clicking an entry toggles its series in `hiddenSeries`
    pub is_hidable: bool,
}

impl Normalize for LegendProps {
    type Output = LegendOptions;

    fn normalize(&self, index: usize, _ctx: &NormalizeContext) -> LegendOptions {
        LegendOptions {
            name: crate::naming::mark_name(self.name.as_deref(), "legend", index),
            index,
            position: self.position.unwrap_or(Position::Bottom),
            title: self.title.clone(),
            highlight: self.highlight.unwrap_or(false),
            is_hidable: self.is_hidable.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TitlePosition {
    Start,
    #[default]
    Middle,
    End,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitleProps {
    pub text: Option<String>,
    pub font_weight: Option<String>,
    pub position: Option<TitlePosition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleOptions {
    pub text: String,
    pub font_weight: String,
    pub position: TitlePosition,
}

impl Normalize for TitleProps {
    type Output = TitleOptions;

    fn normalize(&self, _index: usize, _ctx: &NormalizeContext) -> TitleOptions {
        TitleOptions {
            text: self.text.clone().unwrap_or_default(),
            font_weight: self
                .font_weight
                .clone()
                .unwrap_or_else(|| "bold".to_string()),
            position: self.position.unwrap_or_default(),
        }
    }
}
