use thiserror::Error;

use crate::editor::NodeId;

/// Errors raised by the editing surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("unknown module `{0}`")]
    UnknownModule(String),
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("node {node} has no port `{port}`")]
    UnknownPort { node: NodeId, port: String },
    #[error("unknown node template `{0}`")]
    UnknownTemplate(String),
}

/// Errors raised by the auto-layout bridge. None of these are fatal to the
/// host: every failure degrades to "layout not applied".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("module `{0}` has no nodes to lay out")]
    EmptyModule(String),
    #[error("module `{0}` has no layoutable nodes")]
    NoMeasurableNodes(String),
    #[error("a layout request is already in flight for module `{0}`")]
    LayoutInFlight(String),
    #[error("layout computation failed: {0}")]
    Engine(String),
}
