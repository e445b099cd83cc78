//! Saved editor state
//!
//! The complete recoverable state is one JSON document holding the nodes,
//! edges and workers. Loading never fails: a missing or unreadable document
//! yields an empty layout, and a missing or null key yields an empty list.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::types::{GraphEdge, GraphNode, LayoutGraph};
use crate::workers::WorkerRecord;

/// Everything needed to restore an editor session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub nodes: Vec<GraphNode>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub edges: Vec<GraphEdge>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub workers: Vec<WorkerRecord>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl PersistedState {
    pub fn new(graph: LayoutGraph, workers: Vec<WorkerRecord>) -> Self {
        Self {
            nodes: graph.nodes,
            edges: graph.edges,
            workers,
        }
    }

    /// Parse a saved document, falling back to an empty state
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Could not parse saved state, starting empty: {}", e);
                Self::default()
            }
        }
    }

    /// Read a saved document from disk, falling back to an empty state
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No saved state at {:?}", path);
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let state = Self::from_json(&text);
                log::info!(
                    "Loaded {} node(s), {} edge(s), {} worker(s) from {:?}",
                    state.nodes.len(),
                    state.edges.len(),
                    state.workers.len(),
                    path
                );
                state
            }
            Err(e) => {
                log::warn!("Could not read saved state from {:?}, starting empty: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::debug!("Saved state to {:?}", path);
        Ok(())
    }

    /// The node and edge lists as a graph
    pub fn graph(&self) -> LayoutGraph {
        LayoutGraph::new(self.nodes.clone(), self.edges.clone())
    }
}
