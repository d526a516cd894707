use crate::editor::NodeId;

/// A node's rendered footprint, in diagram pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSize {
    pub width: f32,
    pub height: f32,
}

impl NodeSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Narrow capability surface onto the host's visual layer.
///
/// The bridge never assumes a particular rendering technology: measurement is
/// supplied from outside, and position/geometry updates go back out through
/// the same trait. `measure` returning `None` means the node has no usable
/// visual footprint yet (not rendered, or detached) and is skipped for layout.
pub trait NodeView {
    fn measure(&self, node: NodeId) -> Option<NodeSize>;
    fn set_transform(&self, node: NodeId, x: f32, y: f32);
    fn refresh_connections(&self, node: NodeId);
}

/// View for headless hosts: every node measures the same fixed size and
/// visual updates are dropped. Useful when layout runs before first render.
#[derive(Debug, Clone, Copy)]
pub struct UniformView {
    size: NodeSize,
}

impl UniformView {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: NodeSize::new(width, height),
        }
    }
}

impl NodeView for UniformView {
    fn measure(&self, _node: NodeId) -> Option<NodeSize> {
        Some(self.size)
    }

    fn set_transform(&self, _node: NodeId, _x: f32, _y: f32) {}

    fn refresh_connections(&self, _node: NodeId) {}
}
