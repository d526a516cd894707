use tracing::warn;

use crate::editor::{FlowEditor, NodeId};
use crate::view::NodeView;

use super::engine::LayoutResult;

/// Offset added to every computed position so the laid-out graph does not
/// start at the canvas origin.
pub const CANVAS_OFFSET: (f32, f32) = (50.0, 50.0);

/// Writes computed positions into the live node records and the view, then
/// refreshes connection geometry for every moved node. Stale entries (node
/// deleted while the computation was in flight) and entries with ids the
/// request never contained are skipped with a warning. Reapplying the same
/// result is idempotent.
///
/// Returns the ids whose positions were written.
pub fn apply_layout(
    editor: &mut FlowEditor,
    view: &dyn NodeView,
    module: &str,
    result: &LayoutResult,
) -> Vec<NodeId> {
    let mut moved = Vec::with_capacity(result.positions.len());
    for position in &result.positions {
        let Ok(id) = position.id.parse::<NodeId>() else {
            warn!(id = %position.id, "layout result carries a foreign node id, skipping it");
            continue;
        };
        let Some(node) = editor.node_mut(module, id) else {
            warn!(node = id, module, "node vanished before the layout result arrived, skipping it");
            continue;
        };
        node.pos_x = position.x + CANVAS_OFFSET.0;
        node.pos_y = position.y + CANVAS_OFFSET.1;
        let (x, y) = (node.pos_x, node.pos_y);
        view.set_transform(id, x, y);
        moved.push(id);
    }

    // Edge geometry reads the stored positions of both endpoints, so the
    // refresh pass must not start until every position is written.
    for id in &moved {
        view.refresh_connections(*id);
    }
    moved
}
