use std::collections::HashSet;

use async_trait::async_trait;
use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};

use crate::error::LayoutError;

use super::request::LayoutGraph;

/// Computed top-left position for one node, relative to the layout origin.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePosition {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

/// Result of one layout computation. Consumed exactly once by the reconciler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutResult {
    pub positions: Vec<NodePosition>,
}

/// Single-shot, asynchronous layout computation. The caller suspends until
/// the computation completes or fails; there is no partial result and no
/// built-in timeout. A caller that needs bounded latency races this against
/// an external timer and treats expiry as failure. On failure no live state
/// has been touched.
#[async_trait]
pub trait LayoutEngine: Send + Sync {
    async fn compute(&self, graph: &LayoutGraph) -> Result<LayoutResult, LayoutError>;
}

/// The shipped engine: drives the dagre layered algorithm. Port spacing,
/// edge-node spacing, placement strategy and routing style from the request
/// have no dagre knob and are left to engines that honor them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredEngine;

#[async_trait]
impl LayoutEngine for LayeredEngine {
    async fn compute(&self, graph: &LayoutGraph) -> Result<LayoutResult, LayoutError> {
        Ok(run_layered(graph))
    }
}

fn run_layered(graph: &LayoutGraph) -> LayoutResult {
    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let options = &graph.options;
    let mut config = DagreConfig::default();
    config.rankdir = Some(options.direction.rankdir().to_string());
    config.nodesep = Some(options.node_spacing);
    config.ranksep = Some(options.layer_spacing);
    config.marginx = Some(options.padding);
    config.marginy = Some(options.padding);
    dagre_graph.set_graph(config);

    for child in &graph.children {
        let mut node = DagreNode::default();
        node.width = child.width;
        node.height = child.height;
        dagre_graph.set_node(child.id.clone(), Some(node));
    }

    // Port-level multi-edges collapse to one ranking edge per node pair.
    let mut edge_set: HashSet<(String, String)> = HashSet::new();
    for edge in &graph.edges {
        if edge.source == edge.target {
            continue;
        }
        if !edge_set.insert((edge.source.clone(), edge.target.clone())) {
            continue;
        }
        let _ = dagre_graph.set_edge(&edge.source, &edge.target, Some(DagreEdge::default()), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut positions = Vec::with_capacity(graph.children.len());
    for child in &graph.children {
        let Some(dagre_node) = dagre_graph.node(&child.id) else {
            continue;
        };
        // dagre reports node centers; the bridge works in top-left space.
        positions.push(NodePosition {
            id: child.id.clone(),
            x: dagre_node.x - child.width / 2.0,
            y: dagre_node.y - child.height / 2.0,
        });
    }
    LayoutResult { positions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::request::{LayoutEdge, LayoutNode, LayoutOptions};

    fn boxed(id: &str) -> LayoutNode {
        LayoutNode {
            id: id.to_string(),
            width: 120.0,
            height: 60.0,
            ports: Vec::new(),
        }
    }

    fn edge(source: &str, target: &str) -> LayoutEdge {
        LayoutEdge {
            id: format!("edge-{source}-output_1-{target}-input_1"),
            source: source.to_string(),
            source_port: format!("{source}_output_1"),
            target: target.to_string(),
            target_port: format!("{target}_input_1"),
        }
    }

    #[test]
    fn chain_flows_left_to_right() {
        let graph = LayoutGraph {
            id: "root".to_string(),
            children: vec![boxed("1"), boxed("2"), boxed("3")],
            edges: vec![edge("1", "2"), edge("2", "3")],
            options: LayoutOptions::default(),
        };
        let result = run_layered(&graph);
        assert_eq!(result.positions.len(), 3);
        let x = |id: &str| {
            result
                .positions
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.x)
                .unwrap()
        };
        assert!(x("2") > x("1"));
        assert!(x("3") > x("2"));
    }

    #[test]
    fn every_requested_node_gets_a_position() {
        let graph = LayoutGraph {
            id: "root".to_string(),
            children: vec![boxed("1"), boxed("2")],
            edges: Vec::new(),
            options: LayoutOptions::default(),
        };
        let result = run_layered(&graph);
        let ids: Vec<_> = result.positions.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
