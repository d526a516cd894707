use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::editor::NodeId;

/// A reusable node shape: port counts, icon and color defaults, plus the
/// HTML body rendered into the node's visual element.
#[derive(Debug, Clone, Copy)]
pub struct NodeTemplate {
    pub id: &'static str,
    pub icon: &'static str,
    pub inputs: usize,
    pub outputs: usize,
    pub header_bg: &'static str,
    pub body_bg: &'static str,
    pub conn_color: &'static str,
    pub fallback_content: &'static str,
    detailed: bool,
}

/// Caller-supplied text for one node instance.
#[derive(Debug, Clone, Default)]
pub struct NodeParams {
    pub title: String,
    pub content: Option<String>,
    pub tooltip: Option<String>,
}

impl NodeParams {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }
}

static CATALOG: Lazy<BTreeMap<&'static str, NodeTemplate>> = Lazy::new(|| {
    let templates = [
        NodeTemplate {
            id: "basic_start",
            icon: "\u{2237}",
            inputs: 0,
            outputs: 1,
            header_bg: "#4f46e5",
            body_bg: "#eef2ff",
            conn_color: "#4f46e5",
            fallback_content: "Start point",
            detailed: false,
        },
        NodeTemplate {
            id: "basic_intermediate",
            icon: "\u{1f4c4}",
            inputs: 1,
            outputs: 1,
            header_bg: "#16a34a",
            body_bg: "#f0fdf4",
            conn_color: "#16a34a",
            fallback_content: "Processing step",
            detailed: false,
        },
        NodeTemplate {
            id: "basic_end",
            icon: "\u{1f6d1}",
            inputs: 1,
            outputs: 0,
            header_bg: "#db2777",
            body_bg: "#fdf2f8",
            conn_color: "#db2777",
            fallback_content: "End point",
            detailed: false,
        },
        NodeTemplate {
            id: "detailed_intermediate",
            icon: "\u{1f9e9}",
            inputs: 1,
            outputs: 2,
            header_bg: "#059669",
            body_bg: "#ecfdf5",
            conn_color: "#059669",
            fallback_content: "Detailed task",
            detailed: true,
        },
    ];
    templates.into_iter().map(|t| (t.id, t)).collect()
});

pub fn template(id: &str) -> Option<&'static NodeTemplate> {
    CATALOG.get(id)
}

pub fn template_ids() -> impl Iterator<Item = &'static str> {
    CATALOG.keys().copied()
}

impl NodeTemplate {
    /// CSS class for the node element, derived from the port configuration.
    pub fn node_class(&self) -> String {
        let specific = if self.inputs > 0 && self.outputs > 0 {
            "intermediate-node"
        } else if self.outputs > 0 {
            "start-node"
        } else {
            "end-node"
        };
        format!("flow-node {specific}")
    }

    /// CSS custom properties carried on the wrapper element.
    pub fn style_string(&self) -> String {
        format!(
            "--node-header-bg: {}; --node-body-bg: {}; --node-conn-color: {}",
            self.header_bg, self.body_bg, self.conn_color
        )
    }

    pub fn render_html(&self, params: &NodeParams, node_id: NodeId) -> String {
        let tooltip = params.tooltip.as_deref().unwrap_or("");
        let content = params.content.as_deref().unwrap_or(self.fallback_content);
        let header = if self.detailed {
            format!(
                "<div class=\"node-header\" title=\"{tooltip}\"> \
                 <span class=\"node-icon\">{}</span> <strong>{}</strong> \
                 <small class=\"node-detail\">#{node_id}</small> </div>",
                self.icon, params.title
            )
        } else {
            format!(
                "<div class=\"node-header\" title=\"{tooltip}\"> \
                 <span class=\"node-icon\">{}</span> <strong>{}</strong> </div>",
                self.icon, params.title
            )
        };
        let body = format!("<div class=\"node-body\"> <p>{content}</p> </div>");
        let footer = if self.detailed {
            format!(
                "<div class=\"node-footer\"> <small>I: {}, O: {}</small> </div>",
                self.inputs, self.outputs
            )
        } else {
            String::new()
        };
        format!(
            "<div class=\"template-node-wrapper\" style=\"{}\">{header}{body}{footer}</div>",
            self.style_string()
        )
    }
}
