//! Pointer interaction on a rendered chart, resolved against the names the builder emits.
pub mod resolver;
pub mod scenegraph;

pub use resolver::{Click, ClickDispatch, ClickResolver, ClickTarget, SignalUpdate};
pub use scenegraph::{Bounds, SceneGraph, SceneNode, SceneNodeId};
