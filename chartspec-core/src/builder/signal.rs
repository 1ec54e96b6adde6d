use crate::constants::{
    HIDDEN_SERIES, HIGHLIGHTED_GROUP, HIGHLIGHTED_ITEM, HIGHLIGHTED_SERIES, MARK_ID,
    SELECTED_GROUP, SELECTED_ITEM, SELECTED_SERIES, SERIES_ID,
};
use crate::naming;
use crate::spec::signal::{SignalOnEventSpec, SignalOnEventSpecOrList, SignalOnSpec, SignalSpec};
use serde_json::Value;

/// Where the hovered row lives relative to the event's item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    /// Item drawn straight from a data row
    Datum,
    /// Voronoi cell wrapping the item of the point it was computed from
    Voronoi,
}

impl HoverTarget {
    pub fn datum_path(&self) -> &'static str {
        match self {
            HoverTarget::Datum => "datum",
            HoverTarget::Voronoi => "datum.datum",
        }
    }
}

/// Interaction signals every chart starts with
pub fn default_signals(
    hidden_series: &[String],
    highlighted_item: Option<&Value>,
    highlighted_series: Option<&Value>,
) -> Vec<SignalSpec> {
    let null_or = |v: Option<&Value>| Some(v.cloned().unwrap_or(Value::Null));
    vec![
        SignalSpec::new(HIGHLIGHTED_ITEM, null_or(highlighted_item)),
        SignalSpec::new(HIGHLIGHTED_GROUP, Some(Value::Null)),
        SignalSpec::new(HIGHLIGHTED_SERIES, null_or(highlighted_series)),
        SignalSpec::new(SELECTED_ITEM, Some(Value::Null)),
        SignalSpec::new(SELECTED_SERIES, Some(Value::Null)),
        SignalSpec::new(SELECTED_GROUP, Some(Value::Null)),
        SignalSpec::new(
            HIDDEN_SERIES,
            Some(Value::Array(
                hidden_series.iter().cloned().map(Value::String).collect(),
            )),
        ),
    ]
}

/// Find the signal called `name`, creating it with `value` when absent
pub fn ensure_signal<'a>(
    signals: &'a mut Vec<SignalSpec>,
    name: &str,
    value: Option<Value>,
) -> &'a mut SignalSpec {
    let index = match signals.iter().position(|s| s.name == name) {
        Some(index) => index,
        None => {
            signals.push(SignalSpec::new(name, value));
            signals.len() - 1
        }
    };
    &mut signals[index]
}

/// Append an event handler to `signal`. Existing handlers are kept; an identical
/// handler is not added twice.
pub fn add_event_binding(signal: &mut SignalSpec, events: &str, update: &str) {
    let binding = SignalOnSpec {
        events: SignalOnEventSpecOrList::Scalar(SignalOnEventSpec::Selector(events.to_string())),
        update: update.to_string(),
        extra: Default::default(),
    };
    if !signal.on.contains(&binding) {
        signal.on.push(binding);
    }
}

/// Mouseover on `mark_name` writes `${datum}.${field}` into `signal_name`, mouseout clears it
pub fn add_hover_bindings(
    signals: &mut Vec<SignalSpec>,
    signal_name: &str,
    mark_name: &str,
    field: &str,
    target: HoverTarget,
) {
    let signal = ensure_signal(signals, signal_name, Some(Value::Null));
    add_event_binding(
        signal,
        &format!("@{mark_name}:mouseover"),
        &format!("{}.{field}", target.datum_path()),
    );
    add_event_binding(signal, &format!("@{mark_name}:mouseout"), "null");
}

pub fn add_highlighted_item_bindings(
    signals: &mut Vec<SignalSpec>,
    mark_name: &str,
    target: HoverTarget,
) {
    add_hover_bindings(signals, HIGHLIGHTED_ITEM, mark_name, MARK_ID, target);
}

pub fn add_highlighted_series_bindings(
    signals: &mut Vec<SignalSpec>,
    mark_name: &str,
    target: HoverTarget,
) {
    add_hover_bindings(signals, HIGHLIGHTED_SERIES, mark_name, SERIES_ID, target);
}

/// Externally controlled hover id for a mark with a tooltip
pub fn add_hovered_id_signal(signals: &mut Vec<SignalSpec>, mark_name: &str) {
    ensure_signal(signals, &naming::hovered_id(mark_name), Some(Value::Null));
}
