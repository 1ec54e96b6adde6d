use crate::spec::chart::ChartVisitor;
use crate::spec::data::DataSpec;
use crate::spec::scale::ScaleSpec;
use crate::spec::signal::SignalSpec;
use crate::spec::transform::TransformSpec;
use chartspec_common::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkSpec {
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<MarkFromSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encode: Option<MarkEncodeSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<DataSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<SignalSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scales: Vec<ScaleSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<MarkSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<TransformSpec>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl MarkSpec {
    pub fn new<T: Into<String>, N: Into<String>>(type_: T, name: N) -> Self {
        Self {
            type_: type_.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn from_data<S: Into<String>>(mut self, data: S) -> Self {
        self.from = Some(MarkFromSpec {
            data: Some(data.into()),
            facet: None,
        });
        self
    }

    pub fn from_facet(mut self, facet: MarkFacetSpec) -> Self {
        self.from = Some(MarkFromSpec {
            data: None,
            facet: Some(facet),
        });
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = Some(interactive);
        self
    }

    pub fn with_encode(mut self, encode: MarkEncodeSpec) -> Self {
        self.encode = Some(encode);
        self
    }

    pub fn is_group(&self) -> bool {
        self.type_ == "group"
    }

    /// Name of the data source this mark draws from, either directly or through a facet
    pub fn source_data(&self) -> Option<&str> {
        let from = self.from.as_ref()?;
        match (&from.data, &from.facet) {
            (Some(data), _) => Some(data.as_str()),
            (None, Some(facet)) => Some(facet.data.as_str()),
            _ => None,
        }
    }

    pub fn walk(&self, visitor: &mut dyn ChartVisitor, scope: &[u32]) -> Result<()> {
        let scope = Vec::from(scope);
        for data in &self.data {
            visitor.visit_data(data, &scope)?;
        }
        for scale in &self.scales {
            visitor.visit_scale(scale, &scope)?;
        }
        for signal in &self.signals {
            visitor.visit_signal(signal, &scope)?;
        }
        let mut group_index = 0;
        for mark in &self.marks {
            if mark.is_group() {
                let mut nested_scope = scope.clone();
                nested_scope.push(group_index);

                visitor.visit_group_mark(mark, &nested_scope)?;
                mark.walk(visitor, &nested_scope)?;

                group_index += 1;
            } else {
                // Keep parent scope
                visitor.visit_non_group_mark(mark, &scope)?;
            }
        }

        Ok(())
    }

    /// Depth-first search for a mark with the given name, including this mark
    pub fn find_mark(&self, name: &str) -> Option<&MarkSpec> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.marks.iter().find_map(|m| m.find_mark(name))
    }

    pub fn find_mark_mut(&mut self, name: &str) -> Option<&mut MarkSpec> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.marks.iter_mut().find_map(|m| m.find_mark_mut(name))
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkEncodeSpec {
    // e.g. enter, update, hover, etc.
    #[serde(flatten)]
    pub encodings: IndexMap<String, MarkEncodingsSpec>,
}

impl MarkEncodeSpec {
    pub fn set<E: Into<MarkEncodingOrList>>(&mut self, set: &str, channel: &str, encoding: E) {
        self.encodings
            .entry(set.to_string())
            .or_default()
            .channels
            .insert(channel.to_string(), encoding.into());
    }

    pub fn with<E: Into<MarkEncodingOrList>>(mut self, set: &str, channel: &str, encoding: E) -> Self {
        self.set(set, channel, encoding);
        self
    }

    pub fn enter<E: Into<MarkEncodingOrList>>(self, channel: &str, encoding: E) -> Self {
        self.with("enter", channel, encoding)
    }

    pub fn update<E: Into<MarkEncodingOrList>>(self, channel: &str, encoding: E) -> Self {
        self.with("update", channel, encoding)
    }

    pub fn get(&self, set: &str, channel: &str) -> Option<&MarkEncodingOrList> {
        self.encodings.get(set)?.channels.get(channel)
    }

    pub fn get_mut(&mut self, set: &str, channel: &str) -> Option<&mut MarkEncodingOrList> {
        self.encodings.get_mut(set)?.channels.get_mut(channel)
    }

    pub fn channels(&self) -> impl Iterator<Item = (&String, &MarkEncodingOrList)> {
        self.encodings.values().flat_map(|e| e.channels.iter())
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkEncodingsSpec {
    // e.g. x, fill, width, etc.
    #[serde(flatten)]
    pub channels: IndexMap<String, MarkEncodingOrList>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkEncodingOrList {
    List(Vec<MarkEncodingSpec>),
    Scalar(Box<MarkEncodingSpec>),
}

impl MarkEncodingOrList {
    pub fn to_vec(&self) -> Vec<MarkEncodingSpec> {
        match self {
            MarkEncodingOrList::List(m) => m.clone(),
            MarkEncodingOrList::Scalar(m) => vec![m.as_ref().clone()],
        }
    }
}

impl From<MarkEncodingSpec> for MarkEncodingOrList {
    fn from(value: MarkEncodingSpec) -> Self {
        MarkEncodingOrList::Scalar(Box::new(value))
    }
}

impl From<Vec<MarkEncodingSpec>> for MarkEncodingOrList {
    fn from(value: Vec<MarkEncodingSpec>) -> Self {
        MarkEncodingOrList::List(value)
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkEncodingSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<MarkEncodingField>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mult: Option<f64>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl MarkEncodingSpec {
    pub fn value<V: Into<Value>>(value: V) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn signal<S: Into<String>>(signal: S) -> Self {
        Self {
            signal: Some(signal.into()),
            ..Default::default()
        }
    }

    pub fn field<F: Into<String>>(field: F) -> Self {
        Self {
            field: Some(MarkEncodingField::Field(field.into())),
            ..Default::default()
        }
    }

    pub fn scale_field<S: Into<String>, F: Into<String>>(scale: S, field: F) -> Self {
        Self {
            scale: Some(scale.into()),
            field: Some(MarkEncodingField::Field(field.into())),
            ..Default::default()
        }
    }

    pub fn scale_value<S: Into<String>, V: Into<Value>>(scale: S, value: V) -> Self {
        Self {
            scale: Some(scale.into()),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn scale_band<S: Into<String>>(scale: S, band: f64) -> Self {
        Self {
            scale: Some(scale.into()),
            band: Some(band),
            ..Default::default()
        }
    }

    pub fn with_test<S: Into<String>>(mut self, test: S) -> Self {
        self.test = Some(test.into());
        self
    }

    pub fn with_offset<V: Into<Value>>(mut self, offset: V) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn with_band(mut self, band: f64) -> Self {
        self.band = Some(band);
        self
    }

    pub fn field_name(&self) -> Option<&str> {
        match &self.field {
            Some(MarkEncodingField::Field(f)) => Some(f.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkFromSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<MarkFacetSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkFacetSpec {
    pub name: String,
    pub data: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub groupby: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl MarkFacetSpec {
    pub fn new<N: Into<String>, D: Into<String>>(name: N, data: D, groupby: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            groupby: Some(groupby),
            extra: Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkEncodingField {
    Field(String),
    Object(MarkEncodingFieldObject),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkEncodingFieldObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub datum: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}
