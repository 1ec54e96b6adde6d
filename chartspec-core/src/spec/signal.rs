use crate::spec::values::{MissingNullOrValue, StringOrStringList};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSpec {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub init: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,

    #[serde(default, skip_serializing_if = "MissingNullOrValue::is_missing")]
    pub value: MissingNullOrValue,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on: Vec<SignalOnSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<Value>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl SignalSpec {
    pub fn new<S: Into<String>>(name: S, value: Option<Value>) -> Self {
        Self {
            name: name.into(),
            init: None,
            update: None,
            value: MissingNullOrValue::from(value),
            on: vec![],
            bind: None,
            extra: Default::default(),
        }
    }

    pub fn with_update<S: Into<String>>(name: S, update: S) -> Self {
        Self {
            update: Some(update.into()),
            ..Self::new(name, None)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalOnSpec {
    pub events: SignalOnEventSpecOrList,
    pub update: String,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalOnEventSpecOrList {
    List(Vec<SignalOnEventSpec>),
    Scalar(SignalOnEventSpec),
}

impl SignalOnEventSpecOrList {
    pub fn to_vec(&self) -> Vec<SignalOnEventSpec> {
        match self {
            SignalOnEventSpecOrList::List(event_specs) => event_specs.clone(),
            SignalOnEventSpecOrList::Scalar(event_spec) => vec![event_spec.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalOnEventSpec {
    Signal(SignalOnSignalEvent),
    Source(SignalOnSourceEvent),
    Selector(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalOnSignalEvent {
    pub signal: String,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalOnSourceEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub markname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<StringOrStringList>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use crate::spec::signal::SignalSpec;

    #[test]
    fn test_signal_null_value_not_dropped() {
        // No value is valid
        let s = r#"{"name":"foo"}"#;
        let sig: SignalSpec = serde_json::from_str(s).unwrap();
        let res = serde_json::to_string(&sig).unwrap();
        assert_eq!(res, s);

        // Null value should not be dropped
        let s = r#"{"name":"foo","value":null}"#;
        let sig: SignalSpec = serde_json::from_str(s).unwrap();
        let res = serde_json::to_string(&sig).unwrap();
        assert_eq!(res, s);
    }
}
