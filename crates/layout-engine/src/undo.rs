//! Undo/redo history using compressed snapshots
//!
//! Each history entry is the full node and edge list, serialized to JSON and
//! zstd-compressed. A stored entry therefore never shares data with the live
//! graph, and later edits cannot reach back into it.
//!
//! History is linear: recording after an undo discards the undone branch.
//! The stack always holds at least the initial snapshot, so the cursor is
//! always valid.

use std::collections::VecDeque;

use crate::config::HistoryConfig;
use crate::error::{LayoutEngineError, Result};
use crate::types::LayoutGraph;

/// Linear undo/redo history of layout snapshots
pub struct HistoryStack {
    /// zstd-compressed JSON of each recorded layout
    snapshots: VecDeque<Vec<u8>>,
    /// Index of the snapshot matching the live graph
    cursor: usize,
    /// Cap on retained snapshots; `None` keeps everything
    max_snapshots: Option<usize>,
    compression_level: i32,
}

impl HistoryStack {
    /// Create a history whose only entry is `initial`
    pub fn new(initial: &LayoutGraph, config: &HistoryConfig) -> Result<Self> {
        let mut stack = Self {
            snapshots: VecDeque::new(),
            cursor: 0,
            max_snapshots: config.max_snapshots.map(|max| max.max(1)),
            compression_level: config.compression_level,
        };
        stack.snapshots.push_back(stack.compress(initial)?);
        Ok(stack)
    }

    /// Append `graph` as the newest entry, discarding anything undone
    pub fn record(&mut self, graph: &LayoutGraph) -> Result<()> {
        let compressed = self.compress(graph)?;

        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(compressed);
        self.cursor = self.snapshots.len() - 1;

        // Oldest entries go first once the cap is reached
        if let Some(max) = self.max_snapshots {
            while self.snapshots.len() > max {
                self.snapshots.pop_front();
                self.cursor -= 1;
            }
        }

        log::debug!("Recorded history entry {} of {}", self.cursor + 1, self.snapshots.len());
        Ok(())
    }

    /// Step back; `None` when the cursor is at the oldest entry
    ///
    /// The cursor only moves once the entry has been decoded.
    pub fn undo(&mut self) -> Option<Result<LayoutGraph>> {
        if !self.can_undo() {
            return None;
        }
        Some(self.step_to(self.cursor - 1))
    }

    /// Step forward; `None` when nothing has been undone
    pub fn redo(&mut self) -> Option<Result<LayoutGraph>> {
        if !self.can_redo() {
            return None;
        }
        Some(self.step_to(self.cursor + 1))
    }

    fn step_to(&mut self, index: usize) -> Result<LayoutGraph> {
        let graph = self.decompress(index)?;
        self.cursor = index;
        log::debug!("Moved to history entry {} of {}", index + 1, self.snapshots.len());
        Ok(graph)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Never true once constructed
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Index of the current snapshot
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bytes held by all entries
    pub fn compressed_size(&self) -> usize {
        self.snapshots.iter().map(Vec::len).sum()
    }

    fn compress(&self, graph: &LayoutGraph) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(graph)?;
        zstd::encode_all(&json[..], self.compression_level)
            .map_err(|e| LayoutEngineError::Compression(e.to_string()))
    }

    fn decompress(&self, index: usize) -> Result<LayoutGraph> {
        let json = zstd::decode_all(self.snapshots[index].as_slice())
            .map_err(|e| LayoutEngineError::Compression(e.to_string()))?;
        Ok(serde_json::from_slice(&json)?)
    }
}
