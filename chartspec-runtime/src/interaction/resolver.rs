use crate::interaction::scenegraph::{Bounds, SceneGraph, SceneNodeId};
use chartspec_core::constants::{
    HIDDEN_SERIES, MARK_ID, SELECTED_ITEM, SELECTED_SERIES, SERIES_ID,
};
use chartspec_core::naming;
use log::debug;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const LEGEND_SYMBOL: &str = "legend-symbol";
const LEGEND_LABEL: &str = "legend-label";
const LEGEND_ENTRY: &str = "legend-entry";

/// New value for one signal of the view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalUpdate {
    pub signal: String,
    pub value: Value,
}

impl SignalUpdate {
    pub fn new<S: Into<String>>(signal: S, value: Value) -> Self {
        Self {
            signal: signal.into(),
            value,
        }
    }
}

/// A click on one scene item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub item: SceneNodeId,
    /// Pointer position in chart coordinates, when the host knows it
    pub position: Option<(f64, f64)>,
}

impl Click {
    pub fn on(item: SceneNodeId) -> Self {
        Self {
            item,
            position: None,
        }
    }

    pub fn at(self, x: f64, y: f64) -> Self {
        Self {
            position: Some((x, y)),
            ..self
        }
    }
}

/// What a click resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum ClickTarget {
    /// Entry of a legend, with the series value it stands for
    Legend { value: Value },
    /// Item drawn by a builder mark
    Mark {
        node: SceneNodeId,
        mark_name: String,
        datum: Value,
    },
}

/// Everything the host does in response to a click
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickDispatch {
    pub updates: Vec<SignalUpdate>,
    /// Where to anchor the popover, in chart coordinates
    pub anchor: Option<Bounds>,
    /// DOM id of the hidden button that opens the popover
    pub trigger_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolverState {
    #[default]
    Idle,
    Classifying,
    Dispatching,
}

/// Turns clicks on rendered items into signal updates and popover triggers.
///
/// Every step is best effort: an item that cannot be classified or lacks the fields
/// the builder injects resolves to `None` and nothing is dispatched.
#[derive(Debug, Clone)]
pub struct ClickResolver {
    chart_id: String,
    state: ResolverState,
}

impl ClickResolver {
    pub fn new<S: Into<String>>(chart_id: S) -> Self {
        Self {
            chart_id: chart_id.into(),
            state: ResolverState::Idle,
        }
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// Resolve `click`. `hidden_series` is the current value of `hiddenSeries`.
    pub fn resolve(
        &mut self,
        graph: &SceneGraph,
        click: Click,
        hidden_series: &[Value],
    ) -> Option<ClickDispatch> {
        self.state = ResolverState::Classifying;
        let dispatch = match self.classify(graph, click) {
            Some(target) => {
                self.state = ResolverState::Dispatching;
                self.dispatch(graph, target, hidden_series)
            }
            None => None,
        };
        if dispatch.is_none() {
            debug!("Click on scene node {} was not resolved", click.item.0);
        }
        self.state = ResolverState::Idle;
        dispatch
    }

    pub fn classify(&self, graph: &SceneGraph, click: Click) -> Option<ClickTarget> {
        let item = click.item;
        let node = graph.node(item)?;
        let is_legend = [LEGEND_SYMBOL, LEGEND_LABEL, LEGEND_ENTRY]
            .iter()
            .any(|role| node.has_role(role));
        if is_legend {
            return legend_value(graph, item).map(|value| ClickTarget::Legend { value });
        }

        let mark_name = node.name.clone()?;
        let owner = naming::owner_of(&mark_name).to_string();
        if node.mark_type == "area" {
            // The area is one item per series, its anchor points mark the rows
            let series = node.datum.as_ref()?.get(SERIES_ID)?;
            let anchor = nearest_anchor(graph, &owner, series, click.position)?;
            let datum = graph.node(anchor)?.datum.clone()?;
            return Some(ClickTarget::Mark {
                node: anchor,
                mark_name: owner,
                datum,
            });
        }

        // Groups and voronoi cells wrap the item of the point they stand for
        let wraps_item = node.is_group() || mark_name == naming::voronoi(&owner);
        let datum = if wraps_item {
            node.datum.as_ref()?.get("datum")?.clone()
        } else {
            node.datum.clone()?
        };
        Some(ClickTarget::Mark {
            node: item,
            mark_name: owner,
            datum,
        })
    }

    fn dispatch(
        &self,
        graph: &SceneGraph,
        target: ClickTarget,
        hidden_series: &[Value],
    ) -> Option<ClickDispatch> {
        match target {
            ClickTarget::Legend { value } => {
                let mut hidden: Vec<Value> = hidden_series.to_vec();
                match hidden.iter().position(|v| *v == value) {
                    Some(index) => {
                        hidden.remove(index);
                    }
                    None => hidden.push(value),
                }
                Some(ClickDispatch {
                    updates: vec![SignalUpdate::new(HIDDEN_SERIES, Value::Array(hidden))],
                    ..Default::default()
                })
            }
            ClickTarget::Mark {
                node,
                mark_name,
                datum,
            } => {
                let mark_id = datum.get(MARK_ID)?.clone();
                let mut updates = vec![SignalUpdate::new(SELECTED_ITEM, mark_id)];
                if let Some(series) = datum.get(SERIES_ID) {
                    updates.push(SignalUpdate::new(SELECTED_SERIES, series.clone()));
                }
                Some(ClickDispatch {
                    updates,
                    anchor: Some(graph.absolute_bounds(node)?),
                    trigger_id: Some(naming::popover_trigger_id(&self.chart_id, &mark_name)),
                })
            }
        }
    }
}

/// Anchor point of `series` closest to `position`, or its first one without a position
fn nearest_anchor(
    graph: &SceneGraph,
    owner: &str,
    series: &Value,
    position: Option<(f64, f64)>,
) -> Option<SceneNodeId> {
    graph
        .find_by_name(&naming::anchor_point(owner))
        .into_iter()
        .filter(|id| {
            graph
                .node(*id)
                .and_then(|n| n.datum.as_ref())
                .and_then(|d| d.get(SERIES_ID))
                == Some(series)
        })
        .min_by_key(|id| match (position, graph.absolute_bounds(*id)) {
            (Some((x, y)), Some(bounds)) => OrderedFloat(bounds.distance_squared(x, y)),
            (Some(_), None) => OrderedFloat(f64::INFINITY),
            (None, _) => OrderedFloat(0.0),
        })
}

/// Value of the legend entry containing `item`, read from its label
fn legend_value(graph: &SceneGraph, item: SceneNodeId) -> Option<Value> {
    let node = graph.node(item)?;
    if node.has_role(LEGEND_LABEL) {
        return node.datum.as_ref()?.get("value").cloned();
    }
    let candidates = if node.is_group() {
        graph.node(item)?.children.clone()
    } else {
        graph.siblings(item)
    };
    candidates.into_iter().find_map(|id| {
        let node = graph.node(id)?;
        if node.has_role(LEGEND_LABEL) {
            node.datum.as_ref()?.get("value").cloned()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::interaction::resolver::{Click, ClickResolver, ResolverState, SignalUpdate};
    use crate::interaction::scenegraph::{Bounds, SceneGraph, SceneNode};
    use serde_json::json;

    fn item(mark_type: &str, name: &str, datum: serde_json::Value) -> SceneNode {
        SceneNode {
            name: Some(name.to_string()),
            datum: Some(datum),
            bounds: Some(Bounds { x1: 0.0, y1: 0.0, x2: 10.0, y2: 10.0 }),
            ..SceneNode::new(mark_type)
        }
    }

    #[test]
    fn test_voronoi_click_selects_the_point() {
        let mut graph = SceneGraph::new();
        let cell = graph.add_node(
            item(
                "path",
                "line0_voronoi",
                json!({"datum": {"rscMarkId": 4, "rscSeriesId": "Chrome"}}),
            ),
            None,
        );
        let mut resolver = ClickResolver::new("chart");
        let dispatch = resolver.resolve(&graph, Click::on(cell), &[]).unwrap();
        assert_eq!(
            dispatch.updates,
            vec![
                SignalUpdate::new("selectedItem", json!(4)),
                SignalUpdate::new("selectedSeries", json!("Chrome")),
            ]
        );
        assert_eq!(dispatch.trigger_id.as_deref(), Some("chart-line0-popover-trigger"));
        assert_eq!(resolver.state(), ResolverState::Idle);
    }

    #[test]
    fn test_item_without_mark_id_is_ignored() {
        let mut graph = SceneGraph::new();
        let rect = graph.add_node(item("rect", "bar0", json!({"value": 3})), None);
        assert_eq!(
            ClickResolver::new("chart").resolve(&graph, Click::on(rect), &[]),
            None
        );
    }

    #[test]
    fn test_area_without_position_uses_first_anchor_of_its_series() {
        let mut graph = SceneGraph::new();
        graph.add_node(
            item("symbol", "area0_anchorPoint", json!({"rscMarkId": 1, "rscSeriesId": "a"})),
            None,
        );
        graph.add_node(
            item("symbol", "area0_anchorPoint", json!({"rscMarkId": 2, "rscSeriesId": "b"})),
            None,
        );
        graph.add_node(
            item("symbol", "area0_anchorPoint", json!({"rscMarkId": 3, "rscSeriesId": "b"})),
            None,
        );
        let area = graph.add_node(
            item("area", "area0", json!({"rscMarkId": 2, "rscSeriesId": "b"})),
            None,
        );
        let dispatch = ClickResolver::new("chart")
            .resolve(&graph, Click::on(area), &[])
            .unwrap();
        assert_eq!(dispatch.updates[0], SignalUpdate::new("selectedItem", json!(2)));
        assert_eq!(dispatch.updates[1], SignalUpdate::new("selectedSeries", json!("b")));
    }

    #[test]
    fn test_area_without_series_anchor_is_ignored() {
        let mut graph = SceneGraph::new();
        graph.add_node(
            item("symbol", "area0_anchorPoint", json!({"rscMarkId": 1, "rscSeriesId": "a"})),
            None,
        );
        let area = graph.add_node(
            item("area", "area0", json!({"rscMarkId": 5, "rscSeriesId": "b"})),
            None,
        );
        let click = Click::on(area).at(5.0, 5.0);
        assert_eq!(ClickResolver::new("chart").resolve(&graph, click, &[]), None);
    }
}
