//! Fluent builder for layout graphs
//!
//! Provides a compact way to construct layouts programmatically, mostly for
//! fixtures and for importing layouts produced elsewhere.

use crate::types::{GraphEdge, GraphNode, LayoutGraph, NodeEdit, NodeKind, Position};

/// Fluent builder for constructing layout graphs
///
/// # Example
///
/// ```
/// use layout_engine::{LayoutBuilder, NodeEdit, NodeKind};
///
/// let graph = LayoutBuilder::new()
///     .add_node("src", NodeKind::Source, (0.0, 0.0))
///     .with_label("Feed")
///     .with_edit(NodeEdit::new().mu_type("PartA").amount(5))
///     .add_node("weld", NodeKind::Station, (200.0, 0.0))
///     .connect("src", "weld")
///     .build();
///
/// assert_eq!(graph.nodes.len(), 2);
/// assert_eq!(graph.edges.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl LayoutBuilder {
    /// Create a new layout builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node labelled with its id
    pub fn add_node(mut self, id: impl Into<String>, kind: NodeKind, position: (f64, f64)) -> Self {
        let id = id.into();
        self.nodes.push(GraphNode::new(
            id.clone(),
            kind,
            Position::new(position.0, position.1),
            id,
        ));
        self
    }

    /// Set the label of the most recently added node
    ///
    /// Must be called immediately after `add_node`.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.data.label = label.into();
        }
        self
    }

    /// Apply a field edit to the most recently added node
    pub fn with_edit(mut self, edit: NodeEdit) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.apply_edit(&edit);
        }
        self
    }

    /// Mark the most recently added node as selected
    pub fn selected(mut self) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.selected = true;
        }
        self
    }

    /// Add an edge between two nodes (ID derived from the endpoints)
    pub fn connect(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edges.push(GraphEdge::between(source, target));
        self
    }

    /// Add an edge with an explicit ID
    pub fn connect_with_id(
        mut self,
        edge_id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.edges.push(GraphEdge {
            id: edge_id.into(),
            source: source.into(),
            target: target.into(),
        });
        self
    }

    /// Build the graph without validation
    pub fn build(self) -> LayoutGraph {
        LayoutGraph::new(self.nodes, self.edges)
    }
}
