//! The automatic layout bridge: snapshot the live diagram, build an
//! engine-neutral request, run the layered layout, reconcile positions.
//!
//! Each stage depends only on the previous stage's output; nothing is kept
//! across invocations beyond the live diagram itself and the per-module
//! in-flight set.

mod engine;
mod reconcile;
mod request;
mod snapshot;

pub use engine::{LayeredEngine, LayoutEngine, LayoutResult, NodePosition};
pub use reconcile::{CANVAS_OFFSET, apply_layout};
pub use request::{
    Algorithm, EdgeRouting, FlowDirection, LayoutEdge, LayoutGraph, LayoutNode, LayoutOptions,
    LayoutPort, NodePlacement, PortSide, build_request, port_id,
};
pub use snapshot::{GraphSnapshot, SnapshotEdge, SnapshotNode, extract_snapshot};

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::editor::FlowEditor;
use crate::error::LayoutError;
use crate::view::NodeView;

/// Why a layout request turned into a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyModule,
    NoMeasurableNodes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutOutcome {
    /// Positions were computed and written; `moved` nodes were updated.
    Applied { moved: usize },
    /// Nothing to lay out; live state is untouched.
    Skipped(SkipReason),
}

/// Orchestrates one auto-layout request per module at a time.
///
/// The bridge holds no diagram state; the live store and view capabilities
/// are passed in per call. Only one request may be in flight per module: a
/// second request for a busy module is rejected with
/// [`LayoutError::LayoutInFlight`] rather than silently raced.
#[derive(Debug, Default)]
pub struct LayoutBridge {
    in_flight: Mutex<HashSet<String>>,
}

impl LayoutBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the full pipeline for `module`. Empty or unmeasurable modules
    /// degrade to a warned [`LayoutOutcome::Skipped`]; engine failures leave
    /// the diagram exactly as it was.
    pub async fn auto_layout(
        &self,
        editor: &mut FlowEditor,
        view: &dyn NodeView,
        engine: &dyn LayoutEngine,
        module: &str,
    ) -> Result<LayoutOutcome, LayoutError> {
        let _guard = self.claim(module)?;

        let snapshot = match extract_snapshot(editor, view, module) {
            Ok(snapshot) => snapshot,
            Err(LayoutError::EmptyModule(module)) => {
                warn!(module = %module, "no nodes to lay out");
                return Ok(LayoutOutcome::Skipped(SkipReason::EmptyModule));
            }
            Err(LayoutError::NoMeasurableNodes(module)) => {
                warn!(module = %module, "no layoutable nodes found after measuring, layout skipped");
                return Ok(LayoutOutcome::Skipped(SkipReason::NoMeasurableNodes));
            }
            Err(other) => return Err(other),
        };

        let request = build_request(&snapshot);
        debug!(
            module,
            nodes = request.children.len(),
            edges = request.edges.len(),
            "running layered layout"
        );
        // The diagram stays interactive while we are suspended here; the
        // reconciler tolerates whatever changed in the meantime.
        let result = engine.compute(&request).await?;

        let moved = apply_layout(editor, view, module, &result);
        debug!(module, moved = moved.len(), "layout applied");
        Ok(LayoutOutcome::Applied { moved: moved.len() })
    }

    fn claim(&self, module: &str) -> Result<InFlightGuard<'_>, LayoutError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !in_flight.insert(module.to_string()) {
            return Err(LayoutError::LayoutInFlight(module.to_string()));
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            module: module.to_string(),
        })
    }
}

/// Clears the in-flight entry on every return path, including engine failure.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    module: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&self.module);
    }
}
