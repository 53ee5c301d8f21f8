//! Integration tests: end-to-end editing flows driven through collaborator
//! events, the way a host page drives the editor.

use pretty_assertions::assert_eq;
use scena_core::{
    Content, ElementDescriptor, ElementHandle, ElementId, Frame, GestureDelta, GestureKind,
};
use scena_editor::{
    ActionKind, Editor, EditorConfig, EditorEvent, GestureEvent, GuideEvent, HistoryAction,
    KeyEvent, Orientation, SelectionEvent,
};
use std::cell::RefCell;
use std::rc::Rc;

fn editor() -> Editor {
    let _ = env_logger::builder().is_test(true).try_init();
    Editor::new(EditorConfig::default()).unwrap()
}

fn div(id: &str) -> ElementDescriptor {
    ElementDescriptor::new("div")
        .with_id(ElementId::intern(id))
        .named(id)
}

fn record_events(editor: &mut Editor) -> Rc<RefCell<Vec<EditorEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    editor.subscribe(move |ev| sink.borrow_mut().push(ev.clone()));
    events
}

// ─── Drag scenario ───────────────────────────────────────────────────────

#[test]
fn drag_child_records_single_render() {
    let mut editor = editor();
    let a = ElementId::intern("flow_a");
    let b = ElementId::intern("flow_b");
    editor.append(div("flow_a")).unwrap();
    editor
        .append(div("flow_b").with_frame(Frame::rect(5.0, 5.0, 20.0, 20.0)))
        .unwrap();
    editor
        .moves(&[scena_core::MoveTarget {
            id: b,
            scope_id: a,
            index: 0,
        }])
        .unwrap();
    assert_eq!(editor.scene().parent_of(b), Some(a));

    // Pointer down on B, which is not selected yet, then release on it.
    editor.set_selection(&[]);
    editor.handle_selection_event(&SelectionEvent::DragStart {
        target: Some(b),
        on_gizmo: false,
    });
    editor.handle_selection_event(&SelectionEvent::SelectEnd {
        selected: vec![b],
        is_drag_start: true,
    });
    assert_eq!(editor.selected_ids(), &[b]);

    let depth = editor.history().undo_len();
    editor.handle_gesture_event(&GestureEvent::Update {
        delta: GestureDelta::Drag { dx: 10.0, dy: -5.0 },
    });
    editor.handle_gesture_event(&GestureEvent::End);

    assert_eq!(editor.history().undo_len(), depth + 1);
    match editor.history().peek_undo() {
        Some(HistoryAction::Render(change)) => {
            assert_eq!(change.id, b);
            assert_eq!(change.prev.number("left"), Some(5.0));
            assert_eq!(change.next.number("left"), Some(15.0));
            assert_eq!(change.next.number("top"), Some(0.0));
        }
        other => panic!("expected a render action, got {other:?}"),
    }

    editor.undo().unwrap();
    assert_eq!(editor.frame(b).and_then(|f| f.number("left")), Some(5.0));
    assert_eq!(editor.frame(b).and_then(|f| f.number("top")), Some(5.0));
    editor.redo().unwrap();
    assert_eq!(editor.frame(b).and_then(|f| f.number("left")), Some(15.0));
    assert_eq!(editor.frame(b).and_then(|f| f.number("top")), Some(0.0));
}

// ─── Remove / restore ────────────────────────────────────────────────────

#[test]
fn remove_and_undo_restores_subtree_frames_and_selection() {
    let mut editor = editor();
    let p = ElementId::intern("rs_p");
    let k1 = ElementId::intern("rs_k1");
    let k2 = ElementId::intern("rs_k2");
    let q = ElementId::intern("rs_q");
    editor
        .append_many(vec![
            div("rs_p")
                .with_child(div("rs_k1").with_frame(Frame::rect(1.0, 1.0, 5.0, 5.0)))
                .with_child(div("rs_k2").with_frame(Frame::rect(8.0, 1.0, 5.0, 5.0))),
            div("rs_q"),
        ])
        .unwrap();

    // Change a child frame so removal must capture the live value.
    editor.set_selection(&[k2]);
    editor.handle_key(&KeyEvent::plain("ArrowRight")).unwrap();
    let k2_frame = editor.frame(k2).cloned();
    editor.set_selection(&[p]);
    let saved_before = editor.save();

    let events = record_events(&mut editor);
    let removed = editor.remove(&[p]);
    assert_eq!(removed.len(), 1);
    assert_eq!(editor.selected_ids(), &[q]);
    assert!(editor.frame(k1).is_none());
    assert!(
        events
            .borrow()
            .iter()
            .any(|ev| matches!(ev, EditorEvent::Remove { ids } if ids == &vec![p]))
    );

    assert_eq!(editor.undo().unwrap(), Some(ActionKind::RemoveElements));
    assert_eq!(editor.scene().children_of(ElementId::root()), vec![p, q]);
    assert_eq!(editor.scene().children_of(p), vec![k1, k2]);
    assert_eq!(editor.frame(k2).cloned(), k2_frame);
    assert_eq!(editor.selected_ids(), &[p]);
    assert_eq!(editor.save(), saved_before);
}

#[test]
fn live_handles_survive_remove_and_undo() {
    let mut editor = editor();
    editor
        .append_many(vec![
            div("lh_a").with_handle(ElementHandle(41)),
            div("lh_b").with_child(div("lh_b1")),
        ])
        .unwrap();
    let a = ElementId::intern("lh_a");
    let b1 = ElementId::intern("lh_b1");
    editor.bind_handle(b1, ElementHandle(42)).unwrap();
    assert!(editor.bind_handle(a, ElementHandle(42)).is_err());

    editor.remove(&[a, ElementId::intern("lh_b")]);
    assert_eq!(editor.id_of_handle(ElementHandle(41)), None);
    assert_eq!(editor.id_of_handle(ElementHandle(42)), None);

    editor.undo().unwrap();
    assert_eq!(editor.id_of_handle(ElementHandle(41)), Some(a));
    assert_eq!(editor.id_of_handle(ElementHandle(42)), Some(b1));

    assert!(editor.select_handles(&[ElementHandle(42), ElementHandle(99)]));
    assert_eq!(editor.selected_ids(), &[b1]);
}

// ─── Save / load ─────────────────────────────────────────────────────────

#[test]
fn load_of_save_round_trips() {
    let mut source = editor();
    source
        .append_many(vec![
            div("rt_a")
                .with_attr("data-kind", "card")
                .with_content(Content::Html("<b>hi</b>".into()))
                .with_child(
                    div("rt_a1")
                        .with_attr("contenteditable", "true")
                        .with_content(Content::Text("caption".into())),
                ),
            div("rt_b"),
        ])
        .unwrap();
    source.set_selection(&[ElementId::intern("rt_b")]);
    source.set_property(&[], "opacity", 0.5);
    let json = source.save_json().unwrap();

    let mut target = editor();
    target.load_json(&json).unwrap();
    assert_eq!(target.save(), source.save());
    assert_eq!(target.save_json().unwrap(), json);

    // One load is one action.
    assert_eq!(target.history().undo_len(), 1);
    target.undo().unwrap();
    assert!(target.scene().is_empty());
}

#[test]
fn transform_property_round_trips_through_facade() {
    let mut source = editor();
    let a = source.append(div("tf_a")).unwrap()[0].id;
    source.set_property(&[a], "transform", "rotate(10deg) scale(2)");
    source.set_property(&[a], "transform.translateX", 6.0);
    assert_eq!(
        source.style(a).map(|s| s.matches("transform:").count()),
        Some(1)
    );
    let json = source.save_json().unwrap();

    let mut target = editor();
    target.load_json(&json).unwrap();
    assert_eq!(target.save(), source.save());
    let loaded = target.scene().children_of(ElementId::root())[0];
    assert_eq!(
        target.frame(loaded).map(|f| f.transform.translate),
        Some(Some([6.0, 0.0]))
    );
}

#[test]
fn load_rejects_malformed_json() {
    let mut editor = editor();
    assert!(editor.load_json("[{\"name\": 1}]").is_err());
    assert!(editor.scene().is_empty());
    assert!(!editor.history().can_undo());
}

// ─── Selection ───────────────────────────────────────────────────────────

#[test]
fn selection_never_contains_nested_members() {
    let mut editor = editor();
    editor
        .append(div("nest_p").with_child(div("nest_k").with_child(div("nest_g"))))
        .unwrap();
    let p = ElementId::intern("nest_p");
    let k = ElementId::intern("nest_k");
    let g = ElementId::intern("nest_g");

    editor.set_selection(&[g, k, p]);
    assert_eq!(editor.selected_ids(), &[p]);
    editor.set_selection(&[g, k]);
    assert_eq!(editor.selected_ids(), &[k]);

    editor.handle_selection_event(&SelectionEvent::DragStart {
        target: None,
        on_gizmo: false,
    });
    editor.handle_selection_event(&SelectionEvent::SelectEnd {
        selected: vec![g, ElementId::intern("nest_missing")],
        is_drag_start: false,
    });
    assert_eq!(editor.selected_ids(), &[g]);
}

#[test]
fn select_all_and_delete_via_keys() {
    let mut editor = editor();
    editor
        .append_many(vec![div("ka_a"), div("ka_b").with_child(div("ka_b1"))])
        .unwrap();
    editor.set_selection(&[]);
    assert!(editor.handle_key(&KeyEvent::command("a")).unwrap());
    assert_eq!(editor.selected_ids().len(), 2);
    assert!(editor.handle_key(&KeyEvent::plain("Delete")).unwrap());
    assert!(editor.scene().is_empty());
    assert!(editor.handle_key(&KeyEvent::command("z")).unwrap());
    assert_eq!(editor.scene().len(), 3);
    assert!(editor.handle_key(&KeyEvent::command("z").with_shift()).unwrap());
    assert!(editor.scene().is_empty());
    assert!(!editor.handle_key(&KeyEvent::plain("q")).unwrap());
}

// ─── Guides ──────────────────────────────────────────────────────────────

#[test]
fn guide_events_update_snap_lines() {
    let mut editor = editor();
    editor.handle_guide_event(&GuideEvent::Changed {
        orientation: Orientation::Horizontal,
        guides: vec![300.0],
    });
    assert_eq!(editor.guides().snap(297.0, Orientation::Horizontal), 300.0);
    assert_eq!(editor.guides().snap(538.0, Orientation::Horizontal), 540.0);
    assert_eq!(editor.guides().snap(297.0, Orientation::Vertical), 297.0);
}

#[test]
fn drag_snaps_to_guide_lines() {
    let mut editor = editor();
    let a = editor
        .append(div("sn_a").with_frame(Frame::rect(100.0, 100.0, 50.0, 50.0)))
        .unwrap()[0]
        .id;
    editor.handle_guide_event(&GuideEvent::Changed {
        orientation: Orientation::Vertical,
        guides: vec![300.0],
    });

    editor.handle_gesture_event(&GestureEvent::Start {
        kind: GestureKind::Drag,
        targets: vec![a],
    });
    // The right edge lands at 297, three pixels short of the guide.
    editor.handle_gesture_event(&GestureEvent::Update {
        delta: GestureDelta::Drag { dx: 147.0, dy: 20.0 },
    });
    editor.handle_gesture_event(&GestureEvent::End);
    assert_eq!(editor.frame(a).and_then(|f| f.number("left")), Some(250.0));
    assert_eq!(editor.frame(a).and_then(|f| f.number("top")), Some(120.0));

    // Without the guide the same drag lands where it was dropped.
    editor.undo().unwrap();
    editor.handle_guide_event(&GuideEvent::Changed {
        orientation: Orientation::Vertical,
        guides: Vec::new(),
    });
    editor.handle_gesture_event(&GestureEvent::Start {
        kind: GestureKind::Drag,
        targets: vec![a],
    });
    editor.handle_gesture_event(&GestureEvent::Update {
        delta: GestureDelta::Drag { dx: 147.0, dy: 20.0 },
    });
    editor.handle_gesture_event(&GestureEvent::End);
    assert_eq!(editor.frame(a).and_then(|f| f.number("left")), Some(247.0));
}

// ─── Events ──────────────────────────────────────────────────────────────

#[test]
fn gesture_emits_render_then_change() {
    let mut editor = editor();
    let a = editor.append(div("ev_a")).unwrap()[0].id;
    let events = record_events(&mut editor);

    editor.handle_gesture_event(&GestureEvent::Start {
        kind: GestureKind::Scale,
        targets: vec![a],
    });
    editor.handle_gesture_event(&GestureEvent::Update {
        delta: GestureDelta::Scale { sx: 2.0, sy: 2.0 },
    });
    editor.handle_gesture_event(&GestureEvent::End);

    let events = events.borrow();
    assert_eq!(events[0], EditorEvent::Render { ids: vec![a] });
    assert!(matches!(&events[1], EditorEvent::Change { changes } if changes[0].id == a));
    assert_eq!(
        editor.frame(a).and_then(|f| f.transform.scale),
        Some([2.0, 2.0])
    );
}
