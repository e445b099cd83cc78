//! Core types for facility layout graphs
//!
//! These types define the structure of a layout: nodes of three fixed kinds,
//! directed edges between them, and the selection the editor acts on. The
//! serde shape matches the persisted editor state, so a node keeps its kind
//! under `type` and its label and attributes under `data`.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a node
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// The kind of a layout node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Material origin
    Source,
    /// Processing step
    Station,
    /// Material sink
    Drain,
}

impl NodeKind {
    /// Name used in labels and class types
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Source => "Source",
            NodeKind::Station => "Station",
            NodeKind::Drain => "Drain",
        }
    }

    /// Class type exported when a node carries none
    pub fn default_class_type(&self) -> String {
        format!(".UserObjects.{}", self.as_str())
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Position shifted by `delta` on both axes
    pub fn offset(&self, delta: Position) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }
}

/// Optional, kind-dependent node attributes
///
/// Stations use `ClassType`, `ProcTime` and `WorkerPool`; sources use
/// `MU_Type` and `Amount`. Absent values fall back to export defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeAttributes {
    #[serde(rename = "ClassType", default, skip_serializing_if = "Option::is_none")]
    pub class_type: Option<String>,
    #[serde(rename = "ProcTime", default, skip_serializing_if = "Option::is_none")]
    pub proc_time: Option<String>,
    #[serde(rename = "WorkerPool", default, skip_serializing_if = "Option::is_none")]
    pub worker_pool: Option<String>,
    #[serde(rename = "MU_Type", default, skip_serializing_if = "Option::is_none")]
    pub mu_type: Option<String>,
    #[serde(
        rename = "Amount",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::option_int"
    )]
    pub amount: Option<i64>,
}

impl NodeAttributes {
    /// Class type, or the kind-derived default
    pub fn class_type_or_default(&self, kind: NodeKind) -> String {
        non_blank(&self.class_type)
            .map(str::to_string)
            .unwrap_or_else(|| kind.default_class_type())
    }

    /// Processing time, or `00:00:00`
    pub fn proc_time_or_default(&self) -> &str {
        non_blank(&self.proc_time).unwrap_or("00:00:00")
    }

    /// Worker pool name, or `N/A`
    pub fn worker_pool_or_default(&self) -> &str {
        non_blank(&self.worker_pool).unwrap_or("N/A")
    }

    /// Material unit type, or `.UserObjects.Part`
    pub fn mu_type_or_default(&self) -> &str {
        non_blank(&self.mu_type).unwrap_or(".UserObjects.Part")
    }

    /// Material amount, or 1 when absent
    ///
    /// Only absence falls back to 1. A stored 0, including one coerced from
    /// non-numeric input, exports as 0 and is not bumped up to 1.
    pub fn amount_or_default(&self) -> i64 {
        self.amount.unwrap_or(1)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Label plus attributes, stored under a node's `data` key
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub attributes: NodeAttributes,
}

/// A node instance in a layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier for this node instance
    pub id: NodeId,
    /// Node kind, fixed at creation
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Position on the canvas
    pub position: Position,
    /// Label and attributes
    #[serde(default)]
    pub data: NodeData,
    /// Whether the node is part of the active selection
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl GraphNode {
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        position: Position,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            data: NodeData {
                label: label.into(),
                attributes: NodeAttributes::default(),
            },
            selected: false,
        }
    }

    /// Display label
    pub fn label(&self) -> &str {
        &self.data.label
    }

    /// Attributes of this node
    pub fn attributes(&self) -> &NodeAttributes {
        &self.data.attributes
    }

    /// Export key derived from the label
    pub fn export_name(&self) -> String {
        normalize_label(&self.data.label)
    }

    /// Merge an edit into this node; fields absent from the edit are kept
    pub fn apply_edit(&mut self, edit: &NodeEdit) {
        if let Some(label) = &edit.label {
            self.data.label = label.trim().to_string();
        }
        let attrs = &mut self.data.attributes;
        merge_text(&mut attrs.class_type, &edit.class_type);
        merge_text(&mut attrs.proc_time, &edit.proc_time);
        merge_text(&mut attrs.worker_pool, &edit.worker_pool);
        merge_text(&mut attrs.mu_type, &edit.mu_type);
        if let Some(amount) = edit.amount {
            attrs.amount = Some(amount);
        }
    }
}

// An empty string resets the attribute to its default.
fn merge_text(slot: &mut Option<String>, edit: &Option<String>) {
    if let Some(value) = edit {
        *slot = if value.trim().is_empty() {
            None
        } else {
            Some(value.clone())
        };
    }
}

/// A field edit submitted from the node form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeEdit {
    pub label: Option<String>,
    pub class_type: Option<String>,
    pub proc_time: Option<String>,
    pub worker_pool: Option<String>,
    pub mu_type: Option<String>,
    pub amount: Option<i64>,
}

impl NodeEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn class_type(mut self, value: impl Into<String>) -> Self {
        self.class_type = Some(value.into());
        self
    }

    pub fn proc_time(mut self, value: impl Into<String>) -> Self {
        self.proc_time = Some(value.into());
        self
    }

    pub fn worker_pool(mut self, value: impl Into<String>) -> Self {
        self.worker_pool = Some(value.into());
        self
    }

    pub fn mu_type(mut self, value: impl Into<String>) -> Self {
        self.mu_type = Some(value.into());
        self
    }

    pub fn amount(mut self, value: i64) -> Self {
        self.amount = Some(value);
        self
    }

    /// Set the amount from raw form text; non-numeric input becomes 0
    pub fn amount_text(mut self, value: &str) -> Self {
        self.amount = Some(coerce_int(value));
        self
    }
}

/// A directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// Source node ID
    pub source: NodeId,
    /// Target node ID
    pub target: NodeId,
}

impl GraphEdge {
    /// Edge whose id is derived from its endpoints
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, &target),
            source,
            target,
        }
    }

    /// Whether either endpoint is `node_id`
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Deterministic edge id for a pair of endpoints
pub fn edge_id(source: &str, target: &str) -> EdgeId {
    format!("edge-{}-{}", source, target)
}

/// A complete layout: the node and edge lists
///
/// Also serves as the history snapshot type. Cloning it yields a full,
/// independent copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl LayoutGraph {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find a node by ID (mutable)
    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Find an edge by ID
    pub fn find_edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// An id for a new `source -> target` edge that no current edge uses
    ///
    /// Node ids may contain `-`, so the derived id can already belong to a
    /// different edge. A `#n` suffix is added until the id is free.
    pub fn unused_edge_id(&self, source: &str, target: &str) -> EdgeId {
        let base = edge_id(source, target);
        let mut candidate = base.clone();
        let mut n = 1;
        while self.find_edge(&candidate).is_some() {
            n += 1;
            candidate = format!("{}#{}", base, n);
        }
        candidate
    }

    /// Give every edge sharing an earlier edge's id a fresh one
    ///
    /// Returns the number of edges renamed.
    pub fn dedupe_edge_ids(&mut self) -> usize {
        let mut seen: HashSet<EdgeId> = HashSet::with_capacity(self.edges.len());
        let mut renamed = 0;
        for i in 0..self.edges.len() {
            if seen.insert(self.edges[i].id.clone()) {
                continue;
            }
            let id = self.unused_edge_id(&self.edges[i].source, &self.edges[i].target);
            seen.insert(id.clone());
            self.edges[i].id = id;
            renamed += 1;
        }
        renamed
    }

    /// Whether an edge `source -> target` already exists
    pub fn has_edge_between(&self, source: &str, target: &str) -> bool {
        self.edges.iter().any(|e| e.source == source && e.target == target)
    }

    /// Edges with an endpoint that is not in the node list
    pub fn dangling_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(move |e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
    }

    /// Remove edges whose endpoints are not both present; returns how many
    pub fn prune_dangling_edges(&mut self) -> usize {
        let ids: HashSet<String> = self.nodes.iter().map(|n| n.id.clone()).collect();
        let before = self.edges.len();
        self.edges
            .retain(|e| ids.contains(&e.source) && ids.contains(&e.target));
        before - self.edges.len()
    }
}

/// The nodes and edges an editor operation acts on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
}

impl Selection {
    /// Selection of the given nodes only
    pub fn nodes<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: ids.into_iter().map(Into::into).collect(),
            edges: Vec::new(),
        }
    }

    /// Add edges to the selection
    pub fn with_edges<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edges.extend(ids.into_iter().map(Into::into));
        self
    }

    /// The nodes flagged `selected`, plus every edge running between two of them
    pub fn from_flags(graph: &LayoutGraph) -> Self {
        let nodes: Vec<NodeId> = graph
            .nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.id.clone())
            .collect();
        let set: HashSet<&str> = nodes.iter().map(String::as_str).collect();
        let edges = graph
            .edges
            .iter()
            .filter(|e| set.contains(e.source.as_str()) && set.contains(e.target.as_str()))
            .map(|e| e.id.clone())
            .collect();
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e == id)
    }
}

/// Normalize a display label into an export token
///
/// Runs of whitespace and underscores collapse into a single `_`, leading
/// and trailing separators are dropped, and the result is upper-cased.
/// Normalizing an already normalized label returns it unchanged.
pub fn normalize_label(label: &str) -> String {
    label
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Parse the leading integer of form input; anything else becomes 0
///
/// Accepts surrounding whitespace, an optional sign and trailing garbage
/// (`"12 pcs"` is 12, `"3.7"` is 3).
pub fn coerce_int(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    match digits[..end].parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) => 0,
    }
}

/// Deserializers that coerce numeric fields instead of rejecting them
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};

    use super::coerce_int;

    fn to_int(value: serde_json::Value) -> i64 {
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .unwrap_or(0),
            serde_json::Value::String(s) => coerce_int(&s),
            _ => 0,
        }
    }

    pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<serde_json::Value>::deserialize(deserializer)?
            .map(to_int)
            .unwrap_or(0))
    }

    pub fn option_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<serde_json::Value>::deserialize(deserializer)?.map(to_int))
    }
}
