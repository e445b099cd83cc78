//! End-to-end behaviour of an editor session

use std::collections::HashSet;

use layout_engine::export::MatInflowRow;
use layout_engine::{
    compile, normalize_label, Editor, EditorConfig, ExportOptions, LayoutBuilder, NodeEdit,
    NodeId, NodeKind, PersistedState, Position, Selection,
};

fn editor() -> Editor {
    Editor::new(EditorConfig::default()).unwrap()
}

fn at(x: f64, y: f64) -> Position {
    Position::new(x, y)
}

/// Two stations joined by an edge, both selected
fn selected_pair(editor: &mut Editor) -> (NodeId, NodeId) {
    let a = editor.create_node(NodeKind::Station, at(0.0, 0.0)).unwrap();
    let b = editor.create_node(NodeKind::Station, at(100.0, 0.0)).unwrap();
    editor.connect(&a, &b).unwrap();
    editor.select(&[a.clone(), b.clone()]);
    (a, b)
}

#[test]
fn test_normalization_is_idempotent() {
    for label in ["Feed", "  assemble  line ", "a__b", "Out_1", "", "___", "Mixed Case_x"] {
        let once = normalize_label(label);
        assert_eq!(normalize_label(&once), once, "{:?}", label);
    }
}

#[test]
fn test_history_is_linear() {
    let mut editor = editor();
    editor.create_node(NodeKind::Station, at(0.0, 0.0)).unwrap();
    editor.create_node(NodeKind::Station, at(10.0, 0.0)).unwrap();
    assert!(editor.undo().unwrap());
    editor.create_node(NodeKind::Drain, at(20.0, 0.0)).unwrap();

    assert!(!editor.can_redo());
    assert!(!editor.redo().unwrap());
    // Initial state, first node, then the replacement branch
    assert_eq!(editor.history().len(), 3);
    let kinds: Vec<NodeKind> = editor.nodes().iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NodeKind::Station, NodeKind::Drain]);
}

#[test]
fn test_undo_redo_round_trip() {
    let mut editor = editor();
    let (a, b) = selected_pair(&mut editor);
    editor
        .edit_node(&a, NodeEdit::new().label("Weld").proc_time("00:02:00"))
        .unwrap();
    editor.move_node(&b, at(150.0, 40.0), false).unwrap();
    editor.duplicate(&[a.clone()]).unwrap();

    let before = editor.graph().clone();
    let mut steps = 0;
    while editor.undo().unwrap() {
        steps += 1;
    }
    assert!(editor.nodes().is_empty());
    for _ in 0..steps {
        assert!(editor.redo().unwrap());
    }
    assert_eq!(editor.graph(), &before);
}

#[test]
fn test_paste_never_aliases() {
    let mut editor = editor();
    let (a, b) = selected_pair(&mut editor);
    let selection = editor.selection();
    assert_eq!(editor.copy(&selection), 2);

    let first = editor.paste().unwrap();
    let second = editor.paste().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);

    let originals: HashSet<&NodeId> = [&a, &b].into_iter().collect();
    let first_set: HashSet<&NodeId> = first.iter().collect();
    let second_set: HashSet<&NodeId> = second.iter().collect();
    assert!(first_set.is_disjoint(&second_set));
    assert!(first_set.is_disjoint(&originals));
    assert!(second_set.is_disjoint(&originals));

    // Each paste brings its own copy of the internal edge
    assert_eq!(editor.edges().len(), 3);
    let edge_ids: HashSet<&str> = editor.edges().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(edge_ids.len(), 3);

    editor.edit_node(&first[0], NodeEdit::new().label("Changed")).unwrap();
    assert_eq!(editor.node(&first[0]).unwrap().label(), "Changed");
    assert_ne!(editor.node(&second[0]).unwrap().label(), "Changed");
    assert_ne!(editor.node(&a).unwrap().label(), "Changed");

    let pasted = editor.node(&first[0]).unwrap();
    assert_eq!(pasted.position, at(20.0, 20.0));
    assert!(!pasted.selected);
}

#[test]
fn test_cut_is_copy_then_delete() {
    let mut editor = editor();
    let (a, b) = selected_pair(&mut editor);
    let c = editor.create_node(NodeKind::Drain, at(200.0, 0.0)).unwrap();
    editor.connect(&b, &c).unwrap();
    let selection = editor.selection();

    editor.copy(&selection);
    let copied = editor.clipboard().fragment().cloned().unwrap();
    assert!(editor.cut(&selection).unwrap());

    assert_eq!(editor.clipboard().fragment(), Some(&copied));
    let remaining: Vec<&str> = editor.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(remaining, vec![c.as_str()]);
    assert!(editor.edges().is_empty());
    assert!(editor.node(&a).is_none());
}

#[test]
fn test_delete_prunes_touching_edges() {
    let mut editor = editor();
    let hub = editor.create_node(NodeKind::Station, at(0.0, 0.0)).unwrap();
    let mut spokes = Vec::new();
    for i in 0..3 {
        let spoke = editor
            .create_node(NodeKind::Station, at(100.0, i as f64 * 50.0))
            .unwrap();
        editor.connect(&hub, &spoke).unwrap();
        spokes.push(spoke);
    }
    editor.connect(&spokes[0], &hub).unwrap();
    editor.connect(&spokes[1], &spokes[2]).unwrap();

    editor.delete(&Selection::nodes([hub.clone()])).unwrap();

    assert!(editor.edges().iter().all(|e| !e.touches(&hub)));
    assert!(editor.graph().dangling_edges().next().is_none());
    assert_eq!(editor.edges().len(), 1);
}

#[test]
fn test_export_routing_concrete_case() {
    let mut editor = editor();
    let s1 = editor.create_node(NodeKind::Source, at(0.0, 0.0)).unwrap();
    let t1 = editor.create_node(NodeKind::Station, at(100.0, 0.0)).unwrap();
    let d1 = editor.create_node(NodeKind::Drain, at(200.0, 0.0)).unwrap();
    editor
        .edit_node(&s1, NodeEdit::new().label("Feed").mu_type("PartA").amount(5))
        .unwrap();
    editor.edit_node(&t1, NodeEdit::new().label("Assemble")).unwrap();
    editor.edit_node(&d1, NodeEdit::new().label("Out")).unwrap();
    editor.connect(&s1, &t1).unwrap();
    editor.connect(&t1, &d1).unwrap();

    let workbook = editor.export();

    assert_eq!(
        workbook.mat_inflow,
        vec![MatInflowRow {
            source_name: "FEED".to_string(),
            successor: "ASSEMBLE".to_string(),
            mu_type: "PartA".to_string(),
            amount: 5,
        }]
    );
    assert_eq!(workbook.mat_outflow.len(), 1);
    assert_eq!(workbook.mat_outflow[0].predecessor, "ASSEMBLE");
    assert_eq!(workbook.mat_outflow[0].drain_name, "OUT");
    assert_eq!(workbook.flows.len(), 1);
    assert_eq!(workbook.flows[0].predecessor, "ASSEMBLE");
    assert_eq!(workbook.flows[0].successor, "OUT");
    assert_eq!(workbook.stations.len(), 3);
}

#[test]
fn test_export_order_is_stable() {
    let graph = LayoutBuilder::new()
        .add_node("node_1", NodeKind::Source, (0.0, 0.0))
        .add_node("node_2", NodeKind::Station, (40.0, 12.0))
        .add_node("node_3", NodeKind::Station, (80.0, 25.0))
        .add_node("node_4", NodeKind::Drain, (120.0, 38.0))
        .connect("node_1", "node_2")
        .connect("node_2", "node_3")
        .connect("node_3", "node_4")
        .connect("node_1", "node_3")
        .build();
    let options = ExportOptions::default();

    let render = || {
        let workbook = compile(&graph.nodes, &graph.edges, &[], &options);
        serde_json::to_string(&workbook).unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn test_restored_session_continues_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");

    let mut editor = editor();
    for i in 0..3 {
        editor.create_node(NodeKind::Station, at(i as f64, 0.0)).unwrap();
    }
    editor.delete(&Selection::nodes(["node_3"])).unwrap();
    editor.add_worker();
    editor.persisted_state().save(&path).unwrap();

    let state = PersistedState::load(&path);
    let mut restored = Editor::from_state(state, EditorConfig::default()).unwrap();
    assert_eq!(restored.nodes().len(), 2);
    assert_eq!(restored.workers().len(), 1);
    assert!(!restored.can_undo());

    let id = restored.create_node(NodeKind::Drain, at(0.0, 0.0)).unwrap();
    assert_eq!(id, "node_3");
}

#[test]
fn test_restored_dangling_edges_are_dropped() {
    let graph = LayoutBuilder::new()
        .add_node("node_7", NodeKind::Station, (0.0, 0.0))
        .connect("node_7", "node_9")
        .build();
    let state = PersistedState::new(graph, Vec::new());

    let mut editor = Editor::from_state(state, EditorConfig::default()).unwrap();
    assert!(editor.edges().is_empty());
    assert_eq!(editor.create_node(NodeKind::Station, at(0.0, 0.0)).unwrap(), "node_8");
}

#[test]
fn test_malformed_state_starts_empty() {
    let state = PersistedState::from_json("{not json");
    let editor = Editor::from_state(state, EditorConfig::default()).unwrap();
    assert!(editor.nodes().is_empty());
    assert!(editor.edges().is_empty());
    assert!(editor.workers().is_empty());
}
