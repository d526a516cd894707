pub mod bridge;
pub mod editor;
pub mod error;
pub mod templates;
pub mod view;

pub use bridge::{LayeredEngine, LayoutBridge, LayoutEngine, LayoutOutcome, SkipReason};
pub use editor::{FlowEditor, NodeId};
pub use error::{EditorError, LayoutError};
pub use view::{NodeSize, NodeView, UniformView};
