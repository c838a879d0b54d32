use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::ToolDefinition;

/// Where a node lands when the caller does not place it.
pub const DEFAULT_NODE_POSITION: Position = Position { x: 100.0, y: 100.0 };

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.max(0.0),
            y: y.max(0.0),
        }
    }

    /// Staggered slot for the `index`-th node placed without an explicit position.
    pub fn cascade(index: usize) -> Self {
        let offset = index as f32 * 50.0;
        Self::new(DEFAULT_NODE_POSITION.x + offset, DEFAULT_NODE_POSITION.y + offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 120.0,
        }
    }
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}

// =============================================================================
// Port kinds
// =============================================================================

/// Kind of data a port produces or accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    Text,
    Number,
    Boolean,
    Image,
    Audio,
    Video,
    File,
    Json,
    /// Wildcard: accepts or produces anything.
    Any,
}

impl PortKind {
    pub const ALL: [PortKind; 9] = [
        PortKind::Text,
        PortKind::Number,
        PortKind::Boolean,
        PortKind::Image,
        PortKind::Audio,
        PortKind::Video,
        PortKind::File,
        PortKind::Json,
        PortKind::Any,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            PortKind::Text => "text",
            PortKind::Number => "number",
            PortKind::Boolean => "boolean",
            PortKind::Image => "image",
            PortKind::Audio => "audio",
            PortKind::Video => "video",
            PortKind::File => "file",
            PortKind::Json => "json",
            PortKind::Any => "any",
        }
    }

    /// Whether an output of kind `self` may feed an input of kind `input`.
    pub fn can_feed(self, input: PortKind) -> bool {
        match (self, input) {
            (PortKind::Any, _) | (_, PortKind::Any) => true,
            (PortKind::Text, PortKind::Text)
            | (PortKind::Number, PortKind::Number)
            | (PortKind::Boolean, PortKind::Boolean)
            | (PortKind::Image, PortKind::Image)
            | (PortKind::Audio, PortKind::Audio)
            | (PortKind::Video, PortKind::Video)
            | (PortKind::File, PortKind::File)
            | (PortKind::Json, PortKind::Json) => true,
            (
                PortKind::Text
                | PortKind::Number
                | PortKind::Boolean
                | PortKind::Image
                | PortKind::Audio
                | PortKind::Video
                | PortKind::File
                | PortKind::Json,
                _,
            ) => false,
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// =============================================================================
// Nodes & connections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub name: String,
    pub kind: PortKind,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Idle,
    Running,
    Success,
    Error,
    Warning,
}

/// A placed instance of a tool inside a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: Uuid,
    pub tool_id: String,
    pub label: String,
    pub position: Position,
    pub size: Size,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub status: NodeStatus,
}

impl WorkflowNode {
    pub fn input(&self, port_id: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.id == port_id)
    }

    pub fn output(&self, port_id: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.id == port_id)
    }
}

/// Build a node for `tool`, deriving one port per declared input/output type.
///
/// The first input is required; ids are time-ordered so they are never reused.
pub fn create_node(tool: &ToolDefinition, position: Option<Position>) -> WorkflowNode {
    let inputs = tool
        .input_types
        .iter()
        .enumerate()
        .map(|(i, kind)| Port {
            id: format!("input-{i}"),
            name: format!("{} input", kind),
            kind: *kind,
            required: i == 0,
        })
        .collect();
    let outputs = tool
        .output_types
        .iter()
        .enumerate()
        .map(|(i, kind)| Port {
            id: format!("output-{i}"),
            name: format!("{} output", kind),
            kind: *kind,
            required: false,
        })
        .collect();

    WorkflowNode {
        id: Uuid::now_v7(),
        tool_id: tool.id.clone(),
        label: tool.name.clone(),
        position: position.unwrap_or(DEFAULT_NODE_POSITION),
        size: Size::default(),
        inputs,
        outputs,
        status: NodeStatus::Idle,
    }
}

/// Directed edge from one node's output port to another node's input port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConnection {
    pub id: Uuid,
    pub from_node: Uuid,
    pub from_port: String,
    pub to_node: Uuid,
    pub to_port: String,
    pub kind: PortKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Node {0} does not exist")]
    UnknownNode(Uuid),

    #[error("Node {0} cannot feed its own input")]
    SelfConnection(Uuid),

    #[error("Node {node} has no output '{port}'")]
    UnknownOutput { node: Uuid, port: String },

    #[error("Node {node} has no input '{port}'")]
    UnknownInput { node: Uuid, port: String },

    #[error("Input '{port}' on node {node} is already connected")]
    InputAlreadyConnected { node: Uuid, port: String },

    #[error("Cannot connect {from} output to {to} input")]
    IncompatibleKinds { from: PortKind, to: PortKind },
}

/// The in-memory node/connection graph edited by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowGraph {
    pub nodes: Vec<WorkflowNode>,
    pub connections: Vec<WorkflowConnection>,
}

impl WorkflowGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, node: WorkflowNode) -> Uuid {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    /// Place a new node for `tool`, cascading it when no position is given.
    pub fn add_tool(&mut self, tool: &ToolDefinition, position: Option<Position>) -> Uuid {
        let position = position.unwrap_or_else(|| Position::cascade(self.nodes.len()));
        self.add_node(create_node(tool, Some(position)))
    }

    pub fn find_node(&self, id: Uuid) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn find_node_mut(&mut self, id: Uuid) -> Option<&mut WorkflowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Remove a node together with every connection touching it.
    pub fn remove_node(&mut self, id: Uuid) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        self.connections.retain(|c| c.from_node != id && c.to_node != id);
        self.nodes.len() != before
    }

    pub fn remove_connection(&mut self, id: Uuid) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        self.connections.len() != before
    }

    pub fn is_input_connected(&self, node: Uuid, port: &str) -> bool {
        self.connections
            .iter()
            .any(|c| c.to_node == node && c.to_port == port)
    }

    pub fn is_output_connected(&self, node: Uuid, port: &str) -> bool {
        self.connections
            .iter()
            .any(|c| c.from_node == node && c.from_port == port)
    }

    /// Check a prospective connection, returning the kind it would carry.
    pub fn check_connection(
        &self,
        from_node: Uuid,
        from_output: &str,
        to_node: Uuid,
        to_input: &str,
    ) -> Result<PortKind, ConnectionError> {
        let source = self
            .find_node(from_node)
            .ok_or(ConnectionError::UnknownNode(from_node))?;
        let target = self
            .find_node(to_node)
            .ok_or(ConnectionError::UnknownNode(to_node))?;
        if from_node == to_node {
            return Err(ConnectionError::SelfConnection(from_node));
        }

        let output = source
            .output(from_output)
            .ok_or_else(|| ConnectionError::UnknownOutput {
                node: from_node,
                port: from_output.to_string(),
            })?;
        let input = target
            .input(to_input)
            .ok_or_else(|| ConnectionError::UnknownInput {
                node: to_node,
                port: to_input.to_string(),
            })?;

        if self.is_input_connected(to_node, to_input) {
            return Err(ConnectionError::InputAlreadyConnected {
                node: to_node,
                port: to_input.to_string(),
            });
        }

        if !output.kind.can_feed(input.kind) {
            return Err(ConnectionError::IncompatibleKinds {
                from: output.kind,
                to: input.kind,
            });
        }

        Ok(output.kind)
    }

    pub fn validate_connection(
        &self,
        from_node: Uuid,
        from_output: &str,
        to_node: Uuid,
        to_input: &str,
    ) -> bool {
        self.check_connection(from_node, from_output, to_node, to_input)
            .is_ok()
    }

    pub fn connect(
        &mut self,
        from_node: Uuid,
        from_output: &str,
        to_node: Uuid,
        to_input: &str,
    ) -> Result<Uuid, ConnectionError> {
        let kind = self.check_connection(from_node, from_output, to_node, to_input)?;
        let id = Uuid::now_v7();
        self.connections.push(WorkflowConnection {
            id,
            from_node,
            from_port: from_output.to_string(),
            to_node,
            to_port: to_input.to_string(),
            kind,
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(id: &str, inputs: &[PortKind], outputs: &[PortKind]) -> ToolDefinition {
        ToolDefinition {
            id: id.to_string(),
            name: id.to_string(),
            category: "Testing".to_string(),
            input_types: inputs.to_vec(),
            output_types: outputs.to_vec(),
        }
    }

    #[test]
    fn create_node_derives_ports_from_tool() {
        let t = tool(
            "writer",
            &[PortKind::Text, PortKind::Json, PortKind::Image],
            &[PortKind::Text, PortKind::Any],
        );
        let node = create_node(&t, None);

        assert_eq!(node.inputs.len(), 3);
        assert_eq!(node.outputs.len(), 2);
        assert!(node.inputs[0].required);
        assert!(!node.inputs[1].required);
        assert!(!node.inputs[2].required);
        assert_eq!(node.position, DEFAULT_NODE_POSITION);
        assert_eq!(node.status, NodeStatus::Idle);

        let graph = WorkflowGraph {
            nodes: vec![node.clone()],
            connections: vec![],
        };
        for port in &node.inputs {
            assert!(!graph.is_input_connected(node.id, &port.id));
        }
        for port in &node.outputs {
            assert!(!graph.is_output_connected(node.id, &port.id));
        }
    }

    #[test]
    fn node_ids_are_unique() {
        let t = tool("a", &[], &[PortKind::Text]);
        let a = create_node(&t, None);
        let b = create_node(&t, None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn position_and_size_are_clamped() {
        let p = Position::new(-5.0, 10.0);
        assert_eq!(p, Position { x: 0.0, y: 10.0 });
        let s = Size::new(-1.0, -1.0);
        assert_eq!(s.width, 0.0);
        assert_eq!(s.height, 0.0);
    }

    #[test]
    fn any_is_compatible_with_everything() {
        for kind in PortKind::ALL {
            assert!(PortKind::Any.can_feed(kind));
            assert!(kind.can_feed(PortKind::Any));
        }
        assert!(PortKind::Text.can_feed(PortKind::Text));
        assert!(!PortKind::Text.can_feed(PortKind::Image));
        assert!(!PortKind::Json.can_feed(PortKind::Number));
    }

    #[test]
    fn connect_links_compatible_ports() {
        let mut graph = WorkflowGraph::default();
        let a = graph.add_tool(&tool("a", &[], &[PortKind::Text]), None);
        let b = graph.add_tool(&tool("b", &[PortKind::Text], &[]), None);

        let id = graph.connect(a, "output-0", b, "input-0").unwrap();
        assert_eq!(graph.connections.len(), 1);
        assert_eq!(graph.connections[0].id, id);
        assert!(graph.is_input_connected(b, "input-0"));
        assert!(graph.is_output_connected(a, "output-0"));
    }

    #[test]
    fn validate_connection_rejects_connected_input_even_if_compatible() {
        let mut graph = WorkflowGraph::default();
        let a = graph.add_tool(&tool("a", &[], &[PortKind::Any]), None);
        let b = graph.add_tool(&tool("b", &[], &[PortKind::Any]), None);
        let c = graph.add_tool(&tool("c", &[PortKind::Any], &[]), None);

        graph.connect(a, "output-0", c, "input-0").unwrap();
        assert!(!graph.validate_connection(b, "output-0", c, "input-0"));
        assert_eq!(
            graph.connect(b, "output-0", c, "input-0"),
            Err(ConnectionError::InputAlreadyConnected {
                node: c,
                port: "input-0".to_string()
            })
        );
    }

    #[test]
    fn validate_connection_rejects_mismatched_kinds_and_missing_ports() {
        let mut graph = WorkflowGraph::default();
        let a = graph.add_tool(&tool("a", &[], &[PortKind::Image]), None);
        let b = graph.add_tool(&tool("b", &[PortKind::Text], &[]), None);

        assert!(!graph.validate_connection(a, "output-0", b, "input-0"));
        assert!(!graph.validate_connection(a, "output-9", b, "input-0"));
        assert!(!graph.validate_connection(a, "output-0", b, "input-9"));
        assert!(!graph.validate_connection(Uuid::new_v4(), "output-0", b, "input-0"));
        assert!(matches!(
            graph.check_connection(a, "output-0", b, "input-0"),
            Err(ConnectionError::IncompatibleKinds {
                from: PortKind::Image,
                to: PortKind::Text
            })
        ));
    }

    #[test]
    fn node_cannot_feed_itself() {
        let mut graph = WorkflowGraph::default();
        let a = graph.add_tool(&tool("a", &[PortKind::Text], &[PortKind::Text]), None);

        assert!(!graph.validate_connection(a, "output-0", a, "input-0"));
        assert_eq!(
            graph.connect(a, "output-0", a, "input-0"),
            Err(ConnectionError::SelfConnection(a))
        );
        assert!(graph.connections.is_empty());
    }

    #[test]
    fn wildcard_input_accepts_specific_output() {
        let mut graph = WorkflowGraph::default();
        let a = graph.add_tool(&tool("a", &[], &[PortKind::Audio]), None);
        let b = graph.add_tool(&tool("b", &[PortKind::Any], &[]), None);
        assert!(graph.validate_connection(a, "output-0", b, "input-0"));
    }

    #[test]
    fn remove_node_drops_attached_connections() {
        let mut graph = WorkflowGraph::default();
        let a = graph.add_tool(&tool("a", &[], &[PortKind::Text]), None);
        let b = graph.add_tool(&tool("b", &[PortKind::Text], &[PortKind::Text]), None);
        let c = graph.add_tool(&tool("c", &[PortKind::Text], &[]), None);
        graph.connect(a, "output-0", b, "input-0").unwrap();
        graph.connect(b, "output-0", c, "input-0").unwrap();

        assert!(graph.remove_node(b));
        assert_eq!(graph.nodes.len(), 2);
        assert!(graph.connections.is_empty());
        assert!(!graph.is_input_connected(c, "input-0"));
        assert!(!graph.remove_node(b));
    }

    #[test]
    fn removing_connection_frees_the_input() {
        let mut graph = WorkflowGraph::default();
        let a = graph.add_tool(&tool("a", &[], &[PortKind::Text]), None);
        let b = graph.add_tool(&tool("b", &[PortKind::Text], &[]), None);
        let id = graph.connect(a, "output-0", b, "input-0").unwrap();

        assert!(graph.remove_connection(id));
        assert!(graph.validate_connection(a, "output-0", b, "input-0"));
    }

    #[test]
    fn add_tool_cascades_positions() {
        let mut graph = WorkflowGraph::default();
        let t = tool("a", &[], &[]);
        let first = graph.add_tool(&t, None);
        let second = graph.add_tool(&t, None);
        let p1 = graph.find_node(first).unwrap().position;
        let p2 = graph.find_node(second).unwrap().position;
        assert!(p2.x > p1.x && p2.y > p1.y);
    }
}
