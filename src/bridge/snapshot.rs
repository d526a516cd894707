use tracing::warn;

use crate::editor::{FlowEditor, NodeId};
use crate::error::LayoutError;
use crate::view::NodeView;

/// One measurable node at snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotNode {
    pub id: NodeId,
    pub width: f32,
    pub height: f32,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

/// One directed connection, output→input, at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEdge {
    pub source: NodeId,
    pub source_port: String,
    pub target: NodeId,
    pub target_port: String,
}

/// Point-in-time, read-only copy of one module's layoutable state. Created
/// fresh for every layout request and discarded afterwards.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    pub module: String,
    pub nodes: Vec<SnapshotNode>,
    pub edges: Vec<SnapshotEdge>,
}

/// Reads the live state of `module` together with each node's measured
/// footprint. Nodes the view cannot measure are skipped with a warning; a
/// module with no nodes, or none measurable, fails with the matching
/// condition so the caller can degrade to a no-op.
pub fn extract_snapshot(
    editor: &FlowEditor,
    view: &dyn NodeView,
    module: &str,
) -> Result<GraphSnapshot, LayoutError> {
    let records = editor
        .nodes(module)
        .ok_or_else(|| LayoutError::EmptyModule(module.to_string()))?;
    if records.is_empty() {
        return Err(LayoutError::EmptyModule(module.to_string()));
    }

    let mut nodes = Vec::with_capacity(records.len());
    let mut edges = Vec::new();
    for (id, record) in records {
        let Some(size) = view.measure(*id) else {
            warn!(node = *id, module, "node has no measurable footprint, skipping it for layout");
            continue;
        };
        nodes.push(SnapshotNode {
            id: *id,
            width: size.width,
            height: size.height,
            inputs: record.inputs.keys().cloned().collect(),
            outputs: record.outputs.keys().cloned().collect(),
        });
        for (port, connections) in &record.outputs {
            for end in &connections.connections {
                edges.push(SnapshotEdge {
                    source: *id,
                    source_port: port.clone(),
                    target: end.node,
                    target_port: end.port.clone(),
                });
            }
        }
    }

    if nodes.is_empty() {
        return Err(LayoutError::NoMeasurableNodes(module.to_string()));
    }
    Ok(GraphSnapshot {
        module: module.to_string(),
        nodes,
        edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{DEFAULT_MODULE, NewNode};
    use crate::view::{NodeSize, UniformView};

    struct SelectiveView {
        hidden: NodeId,
    }

    impl NodeView for SelectiveView {
        fn measure(&self, node: NodeId) -> Option<NodeSize> {
            (node != self.hidden).then_some(NodeSize::new(120.0, 60.0))
        }
        fn set_transform(&self, _node: NodeId, _x: f32, _y: f32) {}
        fn refresh_connections(&self, _node: NodeId) {}
    }

    fn chain_editor() -> (FlowEditor, NodeId, NodeId) {
        let mut editor = FlowEditor::new();
        let a = editor
            .add_node(
                DEFAULT_MODULE,
                NewNode {
                    name: "a".to_string(),
                    outputs: 1,
                    ..NewNode::default()
                },
            )
            .unwrap();
        let b = editor
            .add_node(
                DEFAULT_MODULE,
                NewNode {
                    name: "b".to_string(),
                    inputs: 1,
                    ..NewNode::default()
                },
            )
            .unwrap();
        editor
            .add_connection(DEFAULT_MODULE, a, "output_1", b, "input_1")
            .unwrap();
        (editor, a, b)
    }

    #[test]
    fn captures_nodes_sizes_and_edges() {
        let (editor, a, b) = chain_editor();
        let view = UniformView::new(120.0, 60.0);
        let snapshot = extract_snapshot(&editor, &view, DEFAULT_MODULE).unwrap();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].width, 120.0);
        assert_eq!(
            snapshot.edges,
            vec![SnapshotEdge {
                source: a,
                source_port: "output_1".to_string(),
                target: b,
                target_port: "input_1".to_string(),
            }]
        );
    }

    #[test]
    fn unmeasurable_node_is_skipped_not_fatal() {
        let (editor, a, b) = chain_editor();
        let view = SelectiveView { hidden: b };
        let snapshot = extract_snapshot(&editor, &view, DEFAULT_MODULE).unwrap();
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.nodes[0].id, a);
    }

    #[test]
    fn empty_module_is_reported() {
        let editor = FlowEditor::new();
        let view = UniformView::new(120.0, 60.0);
        let err = extract_snapshot(&editor, &view, DEFAULT_MODULE).unwrap_err();
        assert_eq!(err, LayoutError::EmptyModule(DEFAULT_MODULE.to_string()));
    }

    #[test]
    fn unknown_module_counts_as_empty() {
        let editor = FlowEditor::new();
        let view = UniformView::new(120.0, 60.0);
        let err = extract_snapshot(&editor, &view, "Elsewhere").unwrap_err();
        assert_eq!(err, LayoutError::EmptyModule("Elsewhere".to_string()));
    }

    #[test]
    fn all_unmeasurable_is_reported() {
        struct BlindView;
        impl NodeView for BlindView {
            fn measure(&self, _node: NodeId) -> Option<NodeSize> {
                None
            }
            fn set_transform(&self, _node: NodeId, _x: f32, _y: f32) {}
            fn refresh_connections(&self, _node: NodeId) {}
        }
        let (editor, _, _) = chain_editor();
        let err = extract_snapshot(&editor, &BlindView, DEFAULT_MODULE).unwrap_err();
        assert_eq!(
            err,
            LayoutError::NoMeasurableNodes(DEFAULT_MODULE.to_string())
        );
    }
}
