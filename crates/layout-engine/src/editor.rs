//! Editor session
//!
//! [`Editor`] is the single entry point for UI intents. Each intent runs to
//! completion on a staged copy of the graph. A significant change becomes
//! live only after its history snapshot is recorded, and the event sink is
//! notified before the intent returns.
//!
//! A position change reported while a drag is still in progress updates the
//! graph but is not recorded. The drag's final position is.

use std::sync::Arc;

use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::error::Result;
use crate::events::{EditorEvent, EventSink, NullEventSink};
use crate::export::{compile, Workbook};
use crate::ids::IdGenerator;
use crate::persistence::PersistedState;
use crate::store::{GraphAccess, GraphMutation, GraphStore};
use crate::types::{
    GraphEdge, GraphNode, LayoutGraph, NodeEdit, NodeId, NodeKind, Position, Selection,
};
use crate::undo::HistoryStack;
use crate::workers::{WorkerField, WorkerRecord, WorkerRoster};

/// A layout editing session
pub struct Editor {
    store: GraphStore,
    history: HistoryStack,
    clipboard: Clipboard,
    ids: IdGenerator,
    workers: WorkerRoster,
    config: EditorConfig,
    events: Arc<dyn EventSink>,
    /// A drag has moved nodes since the last recorded snapshot
    drag_pending: bool,
}

impl Editor {
    /// Start an empty session
    pub fn new(config: EditorConfig) -> Result<Self> {
        Self::from_state(PersistedState::default(), config)
    }

    /// Resume a session from saved state
    ///
    /// Dangling edges are dropped, ids continue after the highest restored
    /// one, and the restored graph becomes the first history entry.
    pub fn from_state(state: PersistedState, config: EditorConfig) -> Result<Self> {
        config.validate()?;
        let store = GraphStore::from_graph(state.graph());
        let ids = IdGenerator::seeded_from(store.nodes().iter().map(|n| n.id.as_str()));
        let history = HistoryStack::new(store.graph(), &config.history)?;
        log::debug!(
            "Editor session started with {} node(s); next id number {}",
            store.node_count(),
            ids.peek()
        );
        Ok(Self {
            store,
            history,
            clipboard: Clipboard::new(&config.clipboard),
            ids,
            workers: WorkerRoster::new(state.workers),
            config,
            events: Arc::new(NullEventSink),
            drag_pending: false,
        })
    }

    /// Route change notifications to `sink`
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn graph(&self) -> &LayoutGraph {
        self.store.graph()
    }

    pub fn nodes(&self) -> &[GraphNode] {
        self.store.nodes()
    }

    pub fn edges(&self) -> &[GraphEdge] {
        self.store.edges()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.store.graph().find_node(id)
    }

    pub fn workers(&self) -> &[WorkerRecord] {
        self.workers.records()
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Nodes flagged selected, with the edges between them
    pub fn selection(&self) -> Selection {
        Selection::from_flags(self.store.graph())
    }

    /// The document to hand to the storage collaborator
    pub fn persisted_state(&self) -> PersistedState {
        PersistedState::new(self.store.snapshot(), self.workers.records().to_vec())
    }

    // =========================================================================
    // Graph intents
    // =========================================================================

    /// Drop a new node of `kind` at `position`
    ///
    /// The node is labelled `{Kind}_{n}` after its id number.
    pub fn create_node(&mut self, kind: NodeKind, position: Position) -> Result<NodeId> {
        let number = self.ids.peek();
        let id = self.ids.next_id();
        let node = GraphNode::new(id.clone(), kind, position, format!("{}_{}", kind, number));
        self.apply_recorded(GraphMutation::AddNode(node))?;
        Ok(id)
    }

    /// Move a node; only recorded once `dragging` is false
    pub fn move_node(&mut self, id: &str, position: Position, dragging: bool) -> Result<bool> {
        let mutation = GraphMutation::MoveNode {
            id: id.to_string(),
            position,
        };
        if dragging {
            let changed = self.store.apply(mutation);
            self.drag_pending |= changed;
            if changed {
                self.emit_graph_changed();
            }
            return Ok(changed);
        }
        let mut staged = self.store.clone();
        let changed = staged.apply(mutation);
        self.commit(staged, changed || self.drag_pending)?;
        Ok(changed)
    }

    /// Connect two nodes; a no-op for missing endpoints or an existing edge
    pub fn connect(&mut self, source: &str, target: &str) -> Result<bool> {
        self.apply_recorded(GraphMutation::Connect {
            source: source.to_string(),
            target: target.to_string(),
        })
    }

    /// Merge a form edit into a node
    pub fn edit_node(&mut self, id: &str, edit: NodeEdit) -> Result<bool> {
        self.apply_recorded(GraphMutation::EditNode {
            id: id.to_string(),
            edit,
        })
    }

    /// Delete the selection and every edge touching a deleted node
    pub fn delete(&mut self, selection: &Selection) -> Result<bool> {
        self.apply_recorded(GraphMutation::Remove(selection.clone()))
    }

    /// Make exactly `ids` the selected nodes; selection is not recorded
    pub fn select(&mut self, ids: &[NodeId]) -> bool {
        self.store.apply(GraphMutation::Select(ids.to_vec()))
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Step back one history entry; false when already at the start
    pub fn undo(&mut self) -> Result<bool> {
        match self.history.undo() {
            Some(snapshot) => self.restore(snapshot?),
            None => Ok(false),
        }
    }

    /// Step forward one history entry; false when already at the end
    pub fn redo(&mut self) -> Result<bool> {
        match self.history.redo() {
            Some(snapshot) => self.restore(snapshot?),
            None => Ok(false),
        }
    }

    fn restore(&mut self, snapshot: LayoutGraph) -> Result<bool> {
        self.store.apply(GraphMutation::Replace(snapshot));
        log::debug!("Restored history entry {}", self.history.cursor() + 1);
        self.drag_pending = false;
        self.emit_graph_changed();
        self.emit_history_changed();
        Ok(true)
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    /// Copy the selection; a selection without nodes keeps the previous fragment
    pub fn copy(&mut self, selection: &Selection) -> usize {
        if selection.nodes.is_empty() {
            return 0;
        }
        let count = self.clipboard.copy(&self.store, selection);
        self.emit(EditorEvent::ClipboardChanged { node_count: count });
        count
    }

    /// Copy the selection, then delete it
    ///
    /// Like [`Editor::copy`], a selection without nodes leaves the clipboard
    /// alone; its edges are still deleted.
    pub fn cut(&mut self, selection: &Selection) -> Result<bool> {
        if selection.nodes.is_empty() {
            return self.delete(selection);
        }
        let mut staged = self.store.clone();
        let mut clipboard = self.clipboard.clone();
        let changed = clipboard.cut(&mut staged, selection);
        self.commit(staged, changed)?;

        self.clipboard = clipboard;
        let node_count = self.clipboard.fragment().map_or(0, |f| f.nodes().len());
        self.emit(EditorEvent::ClipboardChanged { node_count });
        Ok(changed)
    }

    /// Append fresh copies of the clipboard fragment; returns the new node ids
    pub fn paste(&mut self) -> Result<Vec<NodeId>> {
        let fragment = self.clipboard.paste(&mut self.ids);
        if fragment.is_empty() {
            return Ok(Vec::new());
        }
        let new_ids: Vec<NodeId> = fragment.nodes().iter().map(|n| n.id.clone()).collect();
        self.apply_recorded(GraphMutation::Append(fragment.into_graph()))?;
        Ok(new_ids)
    }

    /// Duplicate nodes in place; the copies become the selection
    pub fn duplicate(&mut self, node_ids: &[NodeId]) -> Result<Vec<NodeId>> {
        let mut staged = self.store.clone();
        let copies = self.clipboard.duplicate(&mut staged, node_ids, &mut self.ids);
        self.commit(staged, !copies.is_empty())?;
        Ok(copies.into_iter().map(|n| n.id).collect())
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Compile the current layout into workbook tables
    pub fn export(&self) -> Workbook {
        let workbook = compile(
            self.store.nodes(),
            self.store.edges(),
            self.workers.records(),
            &self.config.export,
        );
        self.emit(EditorEvent::Exported {
            row_count: workbook.row_count(),
        });
        workbook
    }

    // =========================================================================
    // Workers
    // =========================================================================

    /// Add a worker row with the default team values
    pub fn add_worker(&mut self) -> usize {
        let index = self.workers.add();
        self.emit_workers_changed();
        index
    }

    /// Edit one worker field from form input
    pub fn update_worker(&mut self, index: usize, field: WorkerField, value: &str) -> bool {
        let updated = self.workers.update(index, field, value);
        if updated {
            self.emit_workers_changed();
        }
        updated
    }

    pub fn remove_worker(&mut self, index: usize) -> Option<WorkerRecord> {
        let removed = self.workers.remove(index);
        if removed.is_some() {
            self.emit_workers_changed();
        }
        removed
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Apply `mutation` to a staged copy and commit it
    fn apply_recorded(&mut self, mutation: GraphMutation) -> Result<bool> {
        let mut staged = self.store.clone();
        let changed = staged.apply(mutation);
        self.commit(staged, changed)
    }

    /// Make `staged` the live graph once it is recorded
    ///
    /// Nothing changes when `significant` is false or recording fails, so
    /// the live graph always matches the history cursor.
    fn commit(&mut self, staged: GraphStore, significant: bool) -> Result<bool> {
        if significant {
            self.history.record(staged.graph())?;
            log::debug!("History holds {} byte(s)", self.history.compressed_size());
            self.store = staged;
            self.drag_pending = false;
            self.emit_graph_changed();
            self.emit_history_changed();
        }
        Ok(significant)
    }

    fn emit(&self, event: EditorEvent) {
        if let Err(e) = self.events.send(event) {
            log::warn!("Failed to deliver editor event: {}", e);
        }
    }

    fn emit_graph_changed(&self) {
        self.emit(EditorEvent::GraphChanged {
            node_count: self.store.node_count(),
            edge_count: self.store.edge_count(),
        });
    }

    fn emit_history_changed(&self) {
        self.emit(EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn emit_workers_changed(&self) {
        self.emit(EditorEvent::WorkersChanged {
            worker_count: self.workers.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::VecEventSink;

    fn editor() -> Editor {
        Editor::new(EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_create_node_labels_and_ids() {
        let mut editor = editor();
        let a = editor.create_node(NodeKind::Source, Position::new(0.0, 0.0)).unwrap();
        let b = editor.create_node(NodeKind::Station, Position::new(50.0, 0.0)).unwrap();
        assert_eq!(a, "node_1");
        assert_eq!(b, "node_2");
        assert_eq!(editor.node(&b).unwrap().label(), "Station_2");
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn test_drag_records_only_final_position() {
        let mut editor = editor();
        let id = editor.create_node(NodeKind::Station, Position::new(0.0, 0.0)).unwrap();
        let entries = editor.history().len();

        for step in 1..=5 {
            let p = Position::new(step as f64 * 10.0, 0.0);
            editor.move_node(&id, p, true).unwrap();
        }
        assert_eq!(editor.history().len(), entries);

        // Released where the last drag update left it
        editor.move_node(&id, Position::new(50.0, 0.0), false).unwrap();
        assert_eq!(editor.history().len(), entries + 1);

        editor.undo().unwrap();
        assert_eq!(editor.node(&id).unwrap().position, Position::new(0.0, 0.0));
        editor.redo().unwrap();
        assert_eq!(editor.node(&id).unwrap().position, Position::new(50.0, 0.0));
    }

    #[test]
    fn test_noop_intents_are_not_recorded() {
        let mut editor = editor();
        let id = editor.create_node(NodeKind::Station, Position::default()).unwrap();
        let entries = editor.history().len();

        assert!(!editor.connect(&id, "missing").unwrap());
        assert!(!editor.move_node(&id, Position::default(), false).unwrap());
        assert!(!editor.delete(&Selection::nodes(["missing"])).unwrap());
        assert!(editor.paste().unwrap().is_empty());
        assert!(editor.duplicate(&[]).unwrap().is_empty());
        assert_eq!(editor.copy(&Selection::default()), 0);
        assert!(editor.select(&[id]));

        assert_eq!(editor.history().len(), entries);
    }

    #[test]
    fn test_events_follow_mutations() {
        let sink = Arc::new(VecEventSink::new());
        let mut editor = editor().with_event_sink(sink.clone());

        editor.create_node(NodeKind::Drain, Position::default()).unwrap();
        editor.add_worker();
        editor.export();

        let events = sink.events();
        assert_eq!(
            events,
            vec![
                EditorEvent::GraphChanged { node_count: 1, edge_count: 0 },
                EditorEvent::HistoryChanged { can_undo: true, can_redo: false },
                EditorEvent::WorkersChanged { worker_count: 1 },
                EditorEvent::Exported { row_count: 2 },
            ]
        );
    }

    #[test]
    fn test_workers_are_outside_history() {
        let mut editor = editor();
        editor.add_worker();
        assert!(editor.update_worker(0, WorkerField::Amount, "7"));
        assert!(!editor.can_undo());
        assert_eq!(editor.workers()[0].amount, 7);
        assert!(editor.remove_worker(0).is_some());
        assert!(editor.workers().is_empty());
    }

    #[test]
    fn test_edge_only_cut_keeps_clipboard() {
        let mut editor = editor();
        let a = editor.create_node(NodeKind::Station, Position::new(0.0, 0.0)).unwrap();
        let b = editor.create_node(NodeKind::Station, Position::new(60.0, 0.0)).unwrap();
        editor.connect(&a, &b).unwrap();
        let edge = editor.edges()[0].id.clone();

        assert_eq!(editor.copy(&Selection::nodes([a.clone()])), 1);
        let before = editor.clipboard().fragment().cloned();

        let edge_only = Selection::default().with_edges([edge]);
        assert_eq!(editor.copy(&edge_only), 0);
        assert!(editor.cut(&edge_only).unwrap());

        assert_eq!(editor.clipboard().fragment().cloned(), before);
        assert!(editor.edges().is_empty());
        assert_eq!(editor.nodes().len(), 2);
        assert_eq!(editor.paste().unwrap().len(), 1);

        // The edge deletion is undoable on its own
        editor.undo().unwrap();
        editor.undo().unwrap();
        assert_eq!(editor.edges().len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EditorConfig::default();
        config.history.max_snapshots = Some(0);
        assert!(Editor::new(config).is_err());
    }
}
