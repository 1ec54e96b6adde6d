use chartspec_common::error::{Result, ToExternalError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Bounds {
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Squared distance from the center of the bounds to `(x, y)`
    pub fn distance_squared(&self, x: f64, y: f64) -> f64 {
        let (cx, cy) = self.center();
        (cx - x).powi(2) + (cy - y).powi(2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneNodeId(pub usize);

/// One rendered item along with the mark it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub mark_type: String,
    pub role: Option<String>,
    pub name: Option<String>,
    pub datum: Option<Value>,
    /// Bounds relative to the enclosing group
    pub bounds: Option<Bounds>,
    /// Offset of a group item, applied to everything inside it
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub parent: Option<SceneNodeId>,
    pub children: Vec<SceneNodeId>,
}

impl SceneNode {
    pub fn new<S: Into<String>>(mark_type: S) -> Self {
        Self {
            mark_type: mark_type.into(),
            role: None,
            name: None,
            datum: None,
            bounds: None,
            x: None,
            y: None,
            parent: None,
            children: vec![],
        }
    }

    pub fn is_group(&self) -> bool {
        self.mark_type == "group"
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }
}

/// Scene mark as serialized by the renderer
#[derive(Debug, Deserialize)]
struct SceneMarkJson {
    marktype: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    items: Vec<SceneItemJson>,
}

#[derive(Debug, Deserialize)]
struct SceneItemJson {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    bounds: Option<Bounds>,
    #[serde(default)]
    datum: Option<Value>,
    /// Marks nested in a group item
    #[serde(default)]
    items: Vec<SceneMarkJson>,
}

/// Arena of rendered items. Items of nested marks are children of their group item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the renderer's scenegraph JSON, rooted at a mark
    pub fn from_json(scene: &Value) -> Result<Self> {
        let root: SceneMarkJson =
            serde_json::from_value(scene.clone()).external("while reading the scenegraph")?;
        let mut graph = Self::new();
        graph.add_mark(&root, None);
        Ok(graph)
    }

    fn add_mark(&mut self, mark: &SceneMarkJson, parent: Option<SceneNodeId>) {
        for item in &mark.items {
            let id = self.add_node(
                SceneNode {
                    role: mark.role.clone(),
                    name: mark.name.clone(),
                    datum: item.datum.clone(),
                    bounds: item.bounds,
                    x: item.x,
                    y: item.y,
                    ..SceneNode::new(mark.marktype.as_str())
                },
                parent,
            );
            for child in &item.items {
                self.add_mark(child, Some(id));
            }
        }
    }

    pub fn add_node(&mut self, mut node: SceneNode, parent: Option<SceneNodeId>) -> SceneNodeId {
        let id = SceneNodeId(self.nodes.len());
        node.parent = parent;
        node.children.clear();
        self.nodes.push(node);
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p.0)) {
            parent.children.push(id);
        }
        id
    }

    pub fn node(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: SceneNodeId) -> Option<SceneNodeId> {
        self.node(id)?.parent
    }

    /// Nodes sharing the parent of `id`, `id` excluded
    pub fn siblings(&self, id: SceneNodeId) -> Vec<SceneNodeId> {
        let children = match self.parent(id).and_then(|p| self.node(p)) {
            Some(parent) => parent.children.clone(),
            None => self.roots(),
        };
        children.into_iter().filter(|c| *c != id).collect()
    }

    fn roots(&self) -> Vec<SceneNodeId> {
        (0..self.nodes.len())
            .map(SceneNodeId)
            .filter(|id| self.nodes[id.0].parent.is_none())
            .collect()
    }

    /// Items of the mark called `name`, in drawing order
    pub fn find_by_name(&self, name: &str) -> Vec<SceneNodeId> {
        (0..self.nodes.len())
            .map(SceneNodeId)
            .filter(|id| self.nodes[id.0].name.as_deref() == Some(name))
            .collect()
    }

    /// Bounds of `id` in chart coordinates, adding the offsets of every enclosing group
    pub fn absolute_bounds(&self, id: SceneNodeId) -> Option<Bounds> {
        let bounds = self.node(id)?.bounds?;
        let (mut dx, mut dy) = (0.0, 0.0);
        let mut current = self.parent(id);
        while let Some(parent) = current {
            let node = self.node(parent)?;
            dx += node.x.unwrap_or(0.0);
            dy += node.y.unwrap_or(0.0);
            current = node.parent;
        }
        Some(bounds.translate(dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use crate::interaction::scenegraph::{Bounds, SceneGraph, SceneNode};
    use chartspec_common::error::ChartSpecError;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let graph = SceneGraph::from_json(&json!({
            "marktype": "group",
            "role": "frame",
            "items": [{
                "x": 10, "y": 20,
                "items": [{
                    "marktype": "group",
                    "name": "bar0_group",
                    "items": [{
                        "x": 5, "y": 0,
                        "items": [{
                            "marktype": "rect",
                            "name": "bar0",
                            "items": [
                                {"bounds": {"x1": 0, "y1": 50, "x2": 20, "y2": 100}, "datum": {"rscMarkId": 1}},
                                {"bounds": {"x1": 30, "y1": 40, "x2": 50, "y2": 100}, "datum": {"rscMarkId": 2}}
                            ]
                        }]
                    }]
                }]
            }]
        }))
        .unwrap();
        assert_eq!(graph.len(), 4);
        let bars = graph.find_by_name("bar0");
        assert_eq!(bars.len(), 2);
        assert_eq!(graph.siblings(bars[0]), vec![bars[1]]);
        assert_eq!(
            graph.absolute_bounds(bars[1]),
            Some(Bounds { x1: 45.0, y1: 60.0, x2: 65.0, y2: 120.0 })
        );
    }

    #[test]
    fn test_malformed_scene() {
        let err = SceneGraph::from_json(&json!({"items": []})).unwrap_err();
        assert!(matches!(err, ChartSpecError::ExternalError(..)));
    }

    #[test]
    fn test_node_without_bounds() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(SceneNode::new("group"), None);
        let child = graph.add_node(SceneNode::new("symbol"), Some(root));
        assert_eq!(graph.node(root).unwrap().children, vec![child]);
        assert_eq!(graph.absolute_bounds(child), None);
    }
}
