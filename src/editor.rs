use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EditorError;
use crate::templates::{self, NodeParams};

/// Node identifiers are assigned by the editor, monotonically increasing and
/// never reused within a session.
pub type NodeId = u64;

pub const DEFAULT_MODULE: &str = "Home";

/// One endpoint of a connection, as stored on the opposite side: an output
/// port's entries name (target node, target input port) and an input port's
/// entries name (source node, source output port).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEnd {
    pub node: NodeId,
    pub port: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConnections {
    pub connections: Vec<ConnectionEnd>,
}

/// The authoritative record for one node. Port names are stable for the
/// node's lifetime; positions are the only fields the layout bridge writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub name: String,
    pub class: String,
    pub html: String,
    pub data: Value,
    pub inputs: BTreeMap<String, PortConnections>,
    pub outputs: BTreeMap<String, PortConnections>,
    pub pos_x: f32,
    pub pos_y: f32,
}

/// Everything needed to create a node except its id.
#[derive(Debug, Clone)]
pub struct NewNode {
    pub name: String,
    pub inputs: usize,
    pub outputs: usize,
    pub x: f32,
    pub y: f32,
    pub class: String,
    pub data: Value,
    pub html: String,
}

impl Default for NewNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            inputs: 0,
            outputs: 0,
            x: 0.0,
            y: 0.0,
            class: "flow-node".to_string(),
            data: Value::Null,
            html: String::new(),
        }
    }
}

/// Serialized editor state: every module with its full node map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowExport {
    pub modules: BTreeMap<String, BTreeMap<NodeId, NodeRecord>>,
}

/// The live diagram store: named modules (independently laid-out
/// sub-diagrams), each holding id-addressed node records.
#[derive(Debug)]
pub struct FlowEditor {
    modules: BTreeMap<String, BTreeMap<NodeId, NodeRecord>>,
    next_id: NodeId,
}

impl Default for FlowEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowEditor {
    pub fn new() -> Self {
        let mut modules = BTreeMap::new();
        modules.insert(DEFAULT_MODULE.to_string(), BTreeMap::new());
        Self {
            modules,
            next_id: 1,
        }
    }

    pub fn add_module(&mut self, name: &str) {
        self.modules.entry(name.to_string()).or_default();
    }

    pub fn remove_module(&mut self, name: &str) -> Result<(), EditorError> {
        self.modules
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| EditorError::UnknownModule(name.to_string()))
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Drops all content and re-creates the default module. The id counter
    /// keeps running so cleared ids are never reused.
    pub fn clear(&mut self) {
        self.modules.clear();
        self.modules.insert(DEFAULT_MODULE.to_string(), BTreeMap::new());
    }

    pub fn nodes(&self, module: &str) -> Option<&BTreeMap<NodeId, NodeRecord>> {
        self.modules.get(module)
    }

    pub fn node(&self, module: &str, id: NodeId) -> Option<&NodeRecord> {
        self.modules.get(module)?.get(&id)
    }

    pub fn node_mut(&mut self, module: &str, id: NodeId) -> Option<&mut NodeRecord> {
        self.modules.get_mut(module)?.get_mut(&id)
    }

    pub fn position(&self, module: &str, id: NodeId) -> Option<(f32, f32)> {
        self.node(module, id).map(|n| (n.pos_x, n.pos_y))
    }

    pub fn set_position(&mut self, module: &str, id: NodeId, x: f32, y: f32) -> bool {
        match self.node_mut(module, id) {
            Some(node) => {
                node.pos_x = x;
                node.pos_y = y;
                true
            }
            None => false,
        }
    }

    /// Adds a node with `input_1..input_n` / `output_1..output_m` ports and
    /// returns its id.
    pub fn add_node(&mut self, module: &str, spec: NewNode) -> Result<NodeId, EditorError> {
        let records = self
            .modules
            .get_mut(module)
            .ok_or_else(|| EditorError::UnknownModule(module.to_string()))?;
        let id = self.next_id;
        self.next_id += 1;

        let inputs = (1..=spec.inputs)
            .map(|i| (format!("input_{i}"), PortConnections::default()))
            .collect();
        let outputs = (1..=spec.outputs)
            .map(|i| (format!("output_{i}"), PortConnections::default()))
            .collect();

        records.insert(
            id,
            NodeRecord {
                id,
                name: spec.name,
                class: spec.class,
                html: spec.html,
                data: spec.data,
                inputs,
                outputs,
                pos_x: spec.x,
                pos_y: spec.y,
            },
        );
        Ok(id)
    }

    /// Adds a node from the built-in template catalog.
    pub fn add_template_node(
        &mut self,
        module: &str,
        template_id: &str,
        params: &NodeParams,
        x: f32,
        y: f32,
    ) -> Result<NodeId, EditorError> {
        let tpl = templates::template(template_id)
            .ok_or_else(|| EditorError::UnknownTemplate(template_id.to_string()))?;
        let data = serde_json::json!({
            "templateId": tpl.id,
            "title": params.title,
            "content": params.content.as_deref().unwrap_or(""),
            "tooltip": params.tooltip.as_deref().unwrap_or(""),
        });
        let id = self.add_node(
            module,
            NewNode {
                name: params.title.clone(),
                inputs: tpl.inputs,
                outputs: tpl.outputs,
                x,
                y,
                class: tpl.node_class(),
                data,
                html: String::new(),
            },
        )?;
        // The rendered body embeds the node id, so fill it in after assignment.
        let html = tpl.render_html(params, id);
        if let Some(node) = self.node_mut(module, id) {
            node.html = html;
        }
        Ok(id)
    }

    /// Removes a node and strips every connection end referencing it from the
    /// remaining nodes of the module.
    pub fn remove_node(&mut self, module: &str, id: NodeId) -> Result<(), EditorError> {
        let records = self
            .modules
            .get_mut(module)
            .ok_or_else(|| EditorError::UnknownModule(module.to_string()))?;
        if records.remove(&id).is_none() {
            return Err(EditorError::UnknownNode(id));
        }
        for record in records.values_mut() {
            for port in record.inputs.values_mut().chain(record.outputs.values_mut()) {
                port.connections.retain(|end| end.node != id);
            }
        }
        Ok(())
    }

    /// Connects an output port to an input port. Both sides of the link are
    /// recorded; duplicate connections are ignored.
    pub fn add_connection(
        &mut self,
        module: &str,
        source: NodeId,
        source_port: &str,
        target: NodeId,
        target_port: &str,
    ) -> Result<(), EditorError> {
        let records = self
            .modules
            .get(module)
            .ok_or_else(|| EditorError::UnknownModule(module.to_string()))?;
        let source_node = records.get(&source).ok_or(EditorError::UnknownNode(source))?;
        let target_node = records.get(&target).ok_or(EditorError::UnknownNode(target))?;
        if !source_node.outputs.contains_key(source_port) {
            return Err(EditorError::UnknownPort {
                node: source,
                port: source_port.to_string(),
            });
        }
        if !target_node.inputs.contains_key(target_port) {
            return Err(EditorError::UnknownPort {
                node: target,
                port: target_port.to_string(),
            });
        }

        let target_end = ConnectionEnd {
            node: target,
            port: target_port.to_string(),
        };
        let records = self
            .modules
            .get_mut(module)
            .ok_or_else(|| EditorError::UnknownModule(module.to_string()))?;
        if let Some(port) = records
            .get_mut(&source)
            .and_then(|n| n.outputs.get_mut(source_port))
        {
            if port.connections.contains(&target_end) {
                return Ok(());
            }
            port.connections.push(target_end);
        }
        if let Some(port) = records
            .get_mut(&target)
            .and_then(|n| n.inputs.get_mut(target_port))
        {
            port.connections.push(ConnectionEnd {
                node: source,
                port: source_port.to_string(),
            });
        }
        Ok(())
    }

    pub fn remove_connection(
        &mut self,
        module: &str,
        source: NodeId,
        source_port: &str,
        target: NodeId,
        target_port: &str,
    ) -> Result<(), EditorError> {
        let records = self
            .modules
            .get_mut(module)
            .ok_or_else(|| EditorError::UnknownModule(module.to_string()))?;
        if let Some(node) = records.get_mut(&source) {
            if let Some(port) = node.outputs.get_mut(source_port) {
                port.connections
                    .retain(|end| !(end.node == target && end.port == target_port));
            }
        }
        if let Some(node) = records.get_mut(&target) {
            if let Some(port) = node.inputs.get_mut(target_port) {
                port.connections
                    .retain(|end| !(end.node == source && end.port == source_port));
            }
        }
        Ok(())
    }

    pub fn export(&self) -> FlowExport {
        FlowExport {
            modules: self.modules.clone(),
        }
    }

    /// Replaces the editor content. The id counter resumes above the highest
    /// imported id so ids stay unique across the session.
    pub fn import(&mut self, data: FlowExport) {
        self.modules = data.modules;
        if self.modules.is_empty() {
            self.modules.insert(DEFAULT_MODULE.to_string(), BTreeMap::new());
        }
        let highest = self
            .modules
            .values()
            .flat_map(|records| records.keys())
            .max()
            .copied()
            .unwrap_or(0);
        self.next_id = self.next_id.max(highest + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn basic_node(name: &str, inputs: usize, outputs: usize) -> NewNode {
        NewNode {
            name: name.to_string(),
            inputs,
            outputs,
            ..NewNode::default()
        }
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut editor = FlowEditor::new();
        let a = editor.add_node(DEFAULT_MODULE, basic_node("a", 0, 1)).unwrap();
        let b = editor.add_node(DEFAULT_MODULE, basic_node("b", 1, 0)).unwrap();
        assert!(b > a);
        editor.remove_node(DEFAULT_MODULE, b).unwrap();
        let c = editor.add_node(DEFAULT_MODULE, basic_node("c", 1, 0)).unwrap();
        assert!(c > b);
    }

    #[test]
    fn connection_records_both_sides() {
        let mut editor = FlowEditor::new();
        let a = editor.add_node(DEFAULT_MODULE, basic_node("a", 0, 1)).unwrap();
        let b = editor.add_node(DEFAULT_MODULE, basic_node("b", 1, 0)).unwrap();
        editor
            .add_connection(DEFAULT_MODULE, a, "output_1", b, "input_1")
            .unwrap();

        let out = &editor.node(DEFAULT_MODULE, a).unwrap().outputs["output_1"];
        assert_eq!(
            out.connections,
            vec![ConnectionEnd {
                node: b,
                port: "input_1".to_string()
            }]
        );
        let inp = &editor.node(DEFAULT_MODULE, b).unwrap().inputs["input_1"];
        assert_eq!(
            inp.connections,
            vec![ConnectionEnd {
                node: a,
                port: "output_1".to_string()
            }]
        );
    }

    #[test]
    fn duplicate_connections_are_ignored() {
        let mut editor = FlowEditor::new();
        let a = editor.add_node(DEFAULT_MODULE, basic_node("a", 0, 1)).unwrap();
        let b = editor.add_node(DEFAULT_MODULE, basic_node("b", 1, 0)).unwrap();
        editor
            .add_connection(DEFAULT_MODULE, a, "output_1", b, "input_1")
            .unwrap();
        editor
            .add_connection(DEFAULT_MODULE, a, "output_1", b, "input_1")
            .unwrap();
        let out = &editor.node(DEFAULT_MODULE, a).unwrap().outputs["output_1"];
        assert_eq!(out.connections.len(), 1);
    }

    #[test]
    fn connecting_unknown_port_fails() {
        let mut editor = FlowEditor::new();
        let a = editor.add_node(DEFAULT_MODULE, basic_node("a", 0, 1)).unwrap();
        let b = editor.add_node(DEFAULT_MODULE, basic_node("b", 1, 0)).unwrap();
        let err = editor
            .add_connection(DEFAULT_MODULE, a, "output_9", b, "input_1")
            .unwrap_err();
        assert_eq!(
            err,
            EditorError::UnknownPort {
                node: a,
                port: "output_9".to_string()
            }
        );
    }

    #[test]
    fn removing_a_node_strips_dangling_ends() {
        let mut editor = FlowEditor::new();
        let a = editor.add_node(DEFAULT_MODULE, basic_node("a", 0, 1)).unwrap();
        let b = editor.add_node(DEFAULT_MODULE, basic_node("b", 1, 1)).unwrap();
        let c = editor.add_node(DEFAULT_MODULE, basic_node("c", 1, 0)).unwrap();
        editor
            .add_connection(DEFAULT_MODULE, a, "output_1", b, "input_1")
            .unwrap();
        editor
            .add_connection(DEFAULT_MODULE, b, "output_1", c, "input_1")
            .unwrap();

        editor.remove_node(DEFAULT_MODULE, b).unwrap();
        let out = &editor.node(DEFAULT_MODULE, a).unwrap().outputs["output_1"];
        assert!(out.connections.is_empty());
        let inp = &editor.node(DEFAULT_MODULE, c).unwrap().inputs["input_1"];
        assert!(inp.connections.is_empty());
    }

    #[test]
    fn export_import_round_trips_and_keeps_ids_unique() {
        let mut editor = FlowEditor::new();
        let a = editor.add_node(DEFAULT_MODULE, basic_node("a", 0, 1)).unwrap();
        let b = editor.add_node(DEFAULT_MODULE, basic_node("b", 1, 0)).unwrap();
        editor
            .add_connection(DEFAULT_MODULE, a, "output_1", b, "input_1")
            .unwrap();
        let exported = editor.export();

        let json = serde_json::to_string(&exported).unwrap();
        let parsed: FlowExport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, exported);

        let mut restored = FlowEditor::new();
        restored.import(parsed);
        assert_eq!(restored.export(), exported);
        let c = restored
            .add_node(DEFAULT_MODULE, basic_node("c", 0, 0))
            .unwrap();
        assert!(c > b);
    }

    #[test]
    fn template_node_gets_ports_class_and_html() {
        let mut editor = FlowEditor::new();
        let id = editor
            .add_template_node(
                DEFAULT_MODULE,
                "detailed_intermediate",
                &NodeParams::titled("Task"),
                10.0,
                20.0,
            )
            .unwrap();
        let node = editor.node(DEFAULT_MODULE, id).unwrap();
        assert_eq!(node.inputs.len(), 1);
        assert_eq!(node.outputs.len(), 2);
        assert_eq!(node.class, "flow-node intermediate-node");
        assert!(node.html.contains(&format!("#{id}")));
        assert_eq!((node.pos_x, node.pos_y), (10.0, 20.0));
    }

    #[test]
    fn clear_keeps_the_default_module() {
        let mut editor = FlowEditor::new();
        editor.add_module("Other");
        editor.add_node("Other", basic_node("a", 0, 0)).unwrap();
        editor.clear();
        assert_eq!(editor.module_names().collect::<Vec<_>>(), vec![DEFAULT_MODULE]);
        assert!(editor.nodes(DEFAULT_MODULE).unwrap().is_empty());
    }
}
