//! Layout Engine - Facility layout editing and workbook export
//!
//! This crate holds the editing core of a factory-floor layout tool. A
//! layout is a directed graph of material sources, processing stations and
//! drains, plus a table of worker pools. It supports:
//!
//! - Graph editing with stable `node_{n}` identifiers
//! - Compressed snapshot-based undo/redo
//! - Copy, cut, paste and duplicate of node fragments
//! - Compilation into the five simulation import tables
//! - Lenient loading of saved editor state
//!
//! # Architecture
//!
//! - `Editor`: Session facade that turns UI intents into recorded mutations
//! - `GraphStore`: The live graph, mutated only through `GraphMutation`
//! - `HistoryStack`: Compressed immutable snapshots for undo/redo
//! - `Clipboard`: Captures fragments and re-identifies them on paste
//! - `compile`: Pure projection of a layout into a `Workbook`
//! - `EventSink`: Change notifications, independent of any UI toolkit
//!
//! # Example
//!
//! ```
//! use layout_engine::{compile, ExportOptions, LayoutBuilder, NodeEdit, NodeKind};
//!
//! let graph = LayoutBuilder::new()
//!     .add_node("node_1", NodeKind::Source, (0.0, 0.0))
//!     .with_edit(NodeEdit::new().label("feed").mu_type("Pallet"))
//!     .add_node("node_2", NodeKind::Station, (100.0, 0.0))
//!     .with_label("Assemble")
//!     .connect("node_1", "node_2")
//!     .build();
//!
//! let workbook = compile(&graph.nodes, &graph.edges, &[], &ExportOptions::default());
//! assert_eq!(workbook.mat_inflow[0].source_name, "FEED");
//! assert_eq!(workbook.mat_inflow[0].successor, "ASSEMBLE");
//! ```

pub mod builder;
pub mod clipboard;
pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod export;
pub mod ids;
pub mod persistence;
pub mod store;
pub mod types;
pub mod undo;
pub mod workers;

// Re-export key types
pub use builder::LayoutBuilder;
pub use clipboard::{Clipboard, Fragment};
pub use config::{ClipboardConfig, EditorConfig, HistoryConfig};
pub use editor::Editor;
pub use error::{LayoutEngineError, Result};
pub use events::{EditorEvent, EventError, EventSink, NullEventSink, VecEventSink};
pub use export::{compile, CoordinateMode, ExportOptions, Sheet, SheetRow, Workbook};
pub use ids::IdGenerator;
pub use persistence::PersistedState;
pub use store::{GraphAccess, GraphMutation, GraphStore};
pub use types::{
    coerce_int, normalize_label, GraphEdge, GraphNode, LayoutGraph, NodeEdit, NodeId, NodeKind,
    Position, Selection,
};
pub use undo::HistoryStack;
pub use workers::{WorkerField, WorkerRecord, WorkerRoster};
