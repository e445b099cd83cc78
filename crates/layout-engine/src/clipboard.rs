//! Copy, cut, paste and duplicate
//!
//! The clipboard holds at most one [`Fragment`]: deep copies of the copied
//! nodes and of the copied edges running between them. Pasting never hands
//! out the stored nodes themselves; every paste allocates fresh ids from the
//! shared [`IdGenerator`] and rewires edges through an old-to-new id table.
//!
//! None of these operations look at node kinds.

use std::collections::{HashMap, HashSet};

use crate::config::ClipboardConfig;
use crate::ids::IdGenerator;
use crate::store::{GraphAccess, GraphMutation};
use crate::types::{edge_id, GraphEdge, GraphNode, LayoutGraph, NodeId, Position, Selection};

/// An immutable copied subgraph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl Fragment {
    /// Fragment of `nodes` and those of `edges` with both endpoints among them
    pub fn new(nodes: Vec<GraphNode>, edges: impl IntoIterator<Item = GraphEdge>) -> Self {
        let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let edges = edges
            .into_iter()
            .filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
            .collect();
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_graph(self) -> LayoutGraph {
        LayoutGraph::new(self.nodes, self.edges)
    }
}

/// Clipboard state for one editor session
#[derive(Debug, Clone)]
pub struct Clipboard {
    fragment: Option<Fragment>,
    offset: Position,
}

impl Clipboard {
    pub fn new(config: &ClipboardConfig) -> Self {
        Self {
            fragment: None,
            offset: config.paste_offset,
        }
    }

    /// The stored fragment, if anything has been copied
    pub fn fragment(&self) -> Option<&Fragment> {
        self.fragment.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.fragment.is_none()
    }

    /// Store the selected nodes and the selected edges between them
    ///
    /// Replaces any previous fragment. Ids not present in the graph are
    /// ignored. Returns the number of nodes copied.
    pub fn copy<G: GraphAccess + ?Sized>(&mut self, graph: &G, selection: &Selection) -> usize {
        let fragment = Self::capture(graph, selection);
        let count = fragment.nodes.len();
        log::debug!("Copied {} node(s) and {} edge(s)", count, fragment.edges.len());
        self.fragment = Some(fragment);
        count
    }

    /// Copy the selection, then remove it from the graph
    ///
    /// Edges touching a removed node go with it. Returns whether the graph
    /// changed.
    pub fn cut<G: GraphAccess + ?Sized>(&mut self, graph: &mut G, selection: &Selection) -> bool {
        self.copy(graph, selection);
        graph.apply(GraphMutation::Remove(selection.clone()))
    }

    /// Fresh copies of the stored fragment
    ///
    /// Each node gets a new id and the paste offset; edges are remapped onto
    /// the new ids. The result is empty when nothing has been copied. The
    /// caller appends it to the live graph.
    pub fn paste(&self, ids: &mut IdGenerator) -> Fragment {
        let Some(fragment) = &self.fragment else {
            return Fragment::default();
        };

        let mut mapping: HashMap<&str, NodeId> = HashMap::with_capacity(fragment.nodes.len());
        let nodes: Vec<GraphNode> = fragment
            .nodes
            .iter()
            .map(|node| {
                let copy = self.clone_node(node, ids.next_id(), false);
                mapping.insert(node.id.as_str(), copy.id.clone());
                copy
            })
            .collect();

        let edges: Vec<GraphEdge> = fragment
            .edges
            .iter()
            .filter_map(|edge| {
                let source = mapping.get(edge.source.as_str())?;
                let target = mapping.get(edge.target.as_str())?;
                Some(GraphEdge {
                    id: edge_id(source, target),
                    source: source.clone(),
                    target: target.clone(),
                })
            })
            .collect();

        log::debug!("Pasting {} node(s) and {} edge(s)", nodes.len(), edges.len());
        Fragment { nodes, edges }
    }

    /// Clone nodes in place, making the clones the new selection
    ///
    /// Edges are not duplicated. Returns the new nodes.
    pub fn duplicate<G: GraphAccess + ?Sized>(
        &self,
        graph: &mut G,
        node_ids: &[NodeId],
        ids: &mut IdGenerator,
    ) -> Vec<GraphNode> {
        let wanted: HashSet<&str> = node_ids.iter().map(String::as_str).collect();
        let copies: Vec<GraphNode> = graph
            .nodes()
            .iter()
            .filter(|n| wanted.contains(n.id.as_str()))
            .map(|n| self.clone_node(n, ids.next_id(), true))
            .collect();
        if copies.is_empty() {
            return copies;
        }

        graph.apply(GraphMutation::Select(Vec::new()));
        graph.apply(GraphMutation::Append(LayoutGraph::new(copies.clone(), Vec::new())));
        log::debug!("Duplicated {} node(s)", copies.len());
        copies
    }

    fn capture<G: GraphAccess + ?Sized>(graph: &G, selection: &Selection) -> Fragment {
        let nodes: Vec<GraphNode> = graph
            .nodes()
            .iter()
            .filter(|n| selection.contains_node(&n.id))
            .cloned()
            .collect();
        let edges = graph
            .edges()
            .iter()
            .filter(|e| selection.contains_edge(&e.id))
            .cloned();
        Fragment::new(nodes, edges)
    }

    fn clone_node(&self, node: &GraphNode, id: NodeId, selected: bool) -> GraphNode {
        GraphNode {
            id,
            kind: node.kind,
            position: node.position.offset(self.offset),
            data: node.data.clone(),
            selected,
        }
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new(&ClipboardConfig::default())
    }
}
