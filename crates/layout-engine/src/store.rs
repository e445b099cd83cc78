//! Graph store with mutation primitives
//!
//! The store owns the live node and edge lists. Every change goes through
//! [`GraphAccess::apply`], which leaves the lists consistent before it
//! returns: an edge never outlives either of its endpoints.

use std::collections::HashSet;

use crate::types::{
    GraphEdge, GraphNode, LayoutGraph, NodeEdit, NodeId, Position, Selection,
};

/// A single, complete change to the live graph
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    /// Append a node
    AddNode(GraphNode),
    /// Move a node to a new position
    MoveNode { id: NodeId, position: Position },
    /// Merge a field edit into a node
    EditNode { id: NodeId, edit: NodeEdit },
    /// Connect two existing nodes
    Connect { source: NodeId, target: NodeId },
    /// Remove nodes and edges, plus every edge touching a removed node
    Remove(Selection),
    /// Append a fragment of new nodes and edges
    Append(LayoutGraph),
    /// Flag exactly these nodes as selected
    Select(Vec<NodeId>),
    /// Replace the whole graph, e.g. with a history snapshot
    Replace(LayoutGraph),
}

/// Read and mutate access to a live graph
///
/// History and clipboard code depends on this trait rather than on the
/// concrete store.
pub trait GraphAccess {
    /// The current graph
    fn graph(&self) -> &LayoutGraph;

    /// Apply a mutation; returns whether anything changed
    fn apply(&mut self, mutation: GraphMutation) -> bool;

    fn nodes(&self) -> &[GraphNode] {
        &self.graph().nodes
    }

    fn edges(&self) -> &[GraphEdge] {
        &self.graph().edges
    }

    /// Full, independent copy of the current graph
    fn snapshot(&self) -> LayoutGraph {
        self.graph().clone()
    }
}

/// In-memory graph store
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: LayoutGraph,
}

impl GraphStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from restored state
    ///
    /// Dangling edges are dropped and repeated edge ids are renamed.
    pub fn from_graph(mut graph: LayoutGraph) -> Self {
        let pruned = graph.prune_dangling_edges();
        if pruned > 0 {
            log::warn!("Dropped {} edge(s) referencing missing nodes", pruned);
        }
        let renamed = graph.dedupe_edge_ids();
        if renamed > 0 {
            log::warn!("Renamed {} edge(s) with a repeated id", renamed);
        }
        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edges.len()
    }

    fn add_node(&mut self, node: GraphNode) -> bool {
        if self.graph.find_node(&node.id).is_some() {
            log::warn!("Ignoring node with duplicate id '{}'", node.id);
            return false;
        }
        log::debug!("Added {} node '{}'", node.kind, node.id);
        self.graph.nodes.push(node);
        true
    }

    fn move_node(&mut self, id: &str, position: Position) -> bool {
        match self.graph.find_node_mut(id) {
            Some(node) if node.position != position => {
                node.position = position;
                true
            }
            _ => false,
        }
    }

    fn edit_node(&mut self, id: &str, edit: &NodeEdit) -> bool {
        let Some(node) = self.graph.find_node_mut(id) else {
            return false;
        };
        let before = node.data.clone();
        node.apply_edit(edit);
        let changed = node.data != before;
        if changed {
            log::debug!("Edited node '{}'", id);
        }
        changed
    }

    fn connect(&mut self, source: NodeId, target: NodeId) -> bool {
        if source == target {
            return false;
        }
        if self.graph.find_node(&source).is_none() || self.graph.find_node(&target).is_none() {
            log::debug!("Ignoring connection {} -> {}: missing endpoint", source, target);
            return false;
        }
        if self.graph.has_edge_between(&source, &target) {
            return false;
        }
        let edge = GraphEdge {
            id: self.graph.unused_edge_id(&source, &target),
            source,
            target,
        };
        log::debug!("Connected {} -> {} as '{}'", edge.source, edge.target, edge.id);
        self.graph.edges.push(edge);
        true
    }

    fn remove(&mut self, selection: &Selection) -> bool {
        let node_ids: HashSet<&str> = selection.nodes.iter().map(String::as_str).collect();
        let edge_ids: HashSet<&str> = selection.edges.iter().map(String::as_str).collect();
        let (nodes_before, edges_before) = (self.graph.nodes.len(), self.graph.edges.len());

        self.graph.nodes.retain(|n| !node_ids.contains(n.id.as_str()));
        self.graph.edges.retain(|e| {
            !edge_ids.contains(e.id.as_str())
                && !node_ids.contains(e.source.as_str())
                && !node_ids.contains(e.target.as_str())
        });

        let removed_nodes = nodes_before - self.graph.nodes.len();
        let removed_edges = edges_before - self.graph.edges.len();
        if removed_nodes + removed_edges > 0 {
            log::debug!("Removed {} node(s) and {} edge(s)", removed_nodes, removed_edges);
        }
        removed_nodes + removed_edges > 0
    }

    fn append(&mut self, fragment: LayoutGraph) -> bool {
        let mut changed = false;
        for node in fragment.nodes {
            changed |= self.add_node(node);
        }
        let ids: HashSet<String> = self.graph.nodes.iter().map(|n| n.id.clone()).collect();
        for mut edge in fragment.edges {
            let valid = ids.contains(&edge.source) && ids.contains(&edge.target);
            if !valid || self.graph.has_edge_between(&edge.source, &edge.target) {
                continue;
            }
            if self.graph.find_edge(&edge.id).is_some() {
                edge.id = self.graph.unused_edge_id(&edge.source, &edge.target);
            }
            self.graph.edges.push(edge);
            changed = true;
        }
        changed
    }

    fn select(&mut self, ids: &[NodeId]) -> bool {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut changed = false;
        for node in &mut self.graph.nodes {
            let selected = wanted.contains(node.id.as_str());
            changed |= node.selected != selected;
            node.selected = selected;
        }
        changed
    }
}

impl GraphAccess for GraphStore {
    fn graph(&self) -> &LayoutGraph {
        &self.graph
    }

    fn apply(&mut self, mutation: GraphMutation) -> bool {
        match mutation {
            GraphMutation::AddNode(node) => self.add_node(node),
            GraphMutation::MoveNode { id, position } => self.move_node(&id, position),
            GraphMutation::EditNode { id, edit } => self.edit_node(&id, &edit),
            GraphMutation::Connect { source, target } => self.connect(source, target),
            GraphMutation::Remove(selection) => self.remove(&selection),
            GraphMutation::Append(fragment) => self.append(fragment),
            GraphMutation::Select(ids) => self.select(&ids),
            GraphMutation::Replace(mut graph) => {
                graph.prune_dangling_edges();
                let changed = graph != self.graph;
                self.graph = graph;
                changed
            }
        }
    }
}
