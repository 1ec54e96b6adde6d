use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrStringList {
    String(String),
    StringList(Vec<String>),
}

impl StringOrStringList {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            StringOrStringList::String(v) => vec![v.clone()],
            StringOrStringList::StringList(v) => v.clone(),
        }
    }
}

impl From<&str> for StringOrStringList {
    fn from(value: &str) -> Self {
        StringOrStringList::String(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    String(String),
    Object(FieldObject),
}

impl Field {
    pub fn field(&self) -> String {
        match self {
            Field::String(field) => field.clone(),
            Field::Object(FieldObject { field, .. }) => field.clone(),
        }
    }

    pub fn as_(&self) -> Option<String> {
        match self {
            Field::String(_) => None,
            Field::Object(FieldObject { as_, .. }) => as_.clone(),
        }
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::String(value.to_string())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::String(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldObject {
    pub field: String,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalExpressionSpec {
    pub signal: String,
}

impl SignalExpressionSpec {
    pub fn new<S: Into<String>>(signal: S) -> Self {
        Self {
            signal: signal.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrSignalSpec {
    String(String),
    Signal(SignalExpressionSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrSignalSpec {
    Number(f64),
    Signal(SignalExpressionSpec),
}

impl NumberOrSignalSpec {
    pub fn signal<S: Into<String>>(signal: S) -> Self {
        Self::Signal(SignalExpressionSpec::new(signal))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrderSpec {
    Descending,
    Ascending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortOrderOrList {
    SortOrder(SortOrderSpec),
    SortOrderList(Vec<SortOrderSpec>),
}

impl SortOrderOrList {
    pub fn to_vec(&self) -> Vec<SortOrderSpec> {
        match self {
            SortOrderOrList::SortOrder(v) => vec![v.clone()],
            SortOrderOrList::SortOrderList(v) => v.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareSpec {
    pub field: StringOrStringList,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrderOrList>,
}

impl CompareSpec {
    pub fn ascending(field: &str) -> Self {
        Self {
            field: field.into(),
            order: Some(SortOrderOrList::SortOrder(SortOrderSpec::Ascending)),
        }
    }
}

/// Distinguishes a property that is absent from one explicitly set to `null`
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MissingNullOrValue {
    #[default]
    Missing,
    Null,
    Value(Value),
}

impl MissingNullOrValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, MissingNullOrValue::Missing)
    }

    pub fn as_option(&self) -> Option<Value> {
        match self {
            MissingNullOrValue::Missing => None,
            MissingNullOrValue::Null => Some(Value::Null),
            MissingNullOrValue::Value(v) => Some(v.clone()),
        }
    }
}

impl From<Option<Value>> for MissingNullOrValue {
    fn from(value: Option<Value>) -> Self {
        match value {
            None => MissingNullOrValue::Missing,
            Some(Value::Null) => MissingNullOrValue::Null,
            Some(v) => MissingNullOrValue::Value(v),
        }
    }
}

impl Serialize for MissingNullOrValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MissingNullOrValue::Missing | MissingNullOrValue::Null => serializer.serialize_none(),
            MissingNullOrValue::Value(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MissingNullOrValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only called when the key is present, so a missing key is handled by serde(default)
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => MissingNullOrValue::Null,
            v => MissingNullOrValue::Value(v),
        })
    }
}
