use std::collections::HashSet;

use crate::editor::NodeId;

use super::snapshot::GraphSnapshot;

/// Which side of the node a port attaches to. Inputs always land on the west
/// side and outputs on the east side, encoding the left-to-right flow
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSide {
    West,
    East,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPort {
    pub id: String,
    pub side: PortSide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub width: f32,
    pub height: f32,
    pub ports: Vec<LayoutPort>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub source_port: String,
    pub target: String,
    pub target_port: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Layered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    Right,
    Down,
}

impl FlowDirection {
    pub fn rankdir(self) -> &'static str {
        match self {
            Self::Right => "lr",
            Self::Down => "tb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePlacement {
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRouting {
    Orthogonal,
}

/// Fixed layout configuration. Changing any value changes visual output, so
/// the table is deliberately not exposed to callers of the bridge.
///
/// | option                  | value         |
/// |-------------------------|---------------|
/// | algorithm               | layered       |
/// | direction               | left-to-right |
/// | node-node spacing       | 70            |
/// | port-port spacing       | 10            |
/// | edge-node spacing       | 40            |
/// | inter-layer spacing     | 100           |
/// | node placement strategy | simple        |
/// | padding                 | 20 all sides  |
/// | edge routing            | orthogonal    |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub algorithm: Algorithm,
    pub direction: FlowDirection,
    pub node_spacing: f32,
    pub port_spacing: f32,
    pub edge_node_spacing: f32,
    pub layer_spacing: f32,
    pub placement: NodePlacement,
    pub padding: f32,
    pub edge_routing: EdgeRouting,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Layered,
            direction: FlowDirection::Right,
            node_spacing: 70.0,
            port_spacing: 10.0,
            edge_node_spacing: 40.0,
            layer_spacing: 100.0,
            placement: NodePlacement::Simple,
            padding: 20.0,
            edge_routing: EdgeRouting::Orthogonal,
        }
    }
}

/// Engine-neutral layout request. Exists only for the duration of one layout
/// call.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutGraph {
    pub id: String,
    pub children: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub options: LayoutOptions,
}

pub fn port_id(node: NodeId, port: &str) -> String {
    format!("{node}_{port}")
}

/// Pure, synchronous transform from a snapshot to the neutral request.
/// Edge ids are derived from both endpoints, so an unchanged graph always
/// produces the same identifiers. Connections whose endpoints were not both
/// measurable are dropped.
pub fn build_request(snapshot: &GraphSnapshot) -> LayoutGraph {
    let members: HashSet<NodeId> = snapshot.nodes.iter().map(|n| n.id).collect();

    let children = snapshot
        .nodes
        .iter()
        .map(|node| {
            let mut ports = Vec::with_capacity(node.inputs.len() + node.outputs.len());
            for input in &node.inputs {
                ports.push(LayoutPort {
                    id: port_id(node.id, input),
                    side: PortSide::West,
                });
            }
            for output in &node.outputs {
                ports.push(LayoutPort {
                    id: port_id(node.id, output),
                    side: PortSide::East,
                });
            }
            LayoutNode {
                id: node.id.to_string(),
                width: node.width,
                height: node.height,
                ports,
            }
        })
        .collect();

    let edges = snapshot
        .edges
        .iter()
        .filter(|edge| members.contains(&edge.source) && members.contains(&edge.target))
        .map(|edge| LayoutEdge {
            id: format!(
                "edge-{}-{}-{}-{}",
                edge.source, edge.source_port, edge.target, edge.target_port
            ),
            source: edge.source.to_string(),
            source_port: port_id(edge.source, &edge.source_port),
            target: edge.target.to_string(),
            target_port: port_id(edge.target, &edge.target_port),
        })
        .collect();

    LayoutGraph {
        id: "root".to_string(),
        children,
        edges,
        options: LayoutOptions::default(),
    }
}
