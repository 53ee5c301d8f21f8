//! Editor facade.
//!
//! `Editor` owns the scene, the transform store, the history, the selection
//! and the interaction controller, and is the only thing the host talks to.
//! Every mutating operation returns once the change is applied and the
//! matching events have been emitted to observers.

use crate::config::EditorConfig;
use crate::error::EditorResult;
use crate::events::{ChangedFrame, EditorEvent, ObserverId, Observers};
use crate::guides::Guides;
use crate::history::{ActionKind, HistoryAction, HistoryContext, HistoryManager};
use crate::input::{GestureEvent, GuideEvent, KeyEvent, Orientation, SelectionEvent};
use crate::interaction::{InteractionController, ToolMode};
use crate::selection::SelectionSet;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use scena_core::saved::{self, SavedData};
use scena_core::{
    Content, ElementDescriptor, ElementHandle, ElementId, ElementInfo, Frame, FrameChange,
    FrameValue, GestureDelta, GestureKind, MoveResult, MoveTarget, Scene, TransformStore,
};

pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    frames: TransformStore,
    history: HistoryManager<Editor>,
    selection: SelectionSet,
    controller: InteractionController,
    guides: Guides,
    observers: Observers,
    clipboard: Option<String>,
}

impl HistoryContext for Editor {
    fn history_mut(&mut self) -> &mut HistoryManager<Self> {
        &mut self.history
    }
}

impl Editor {
    /// Create an editor with every history action type registered.
    ///
    /// # Errors
    /// `DuplicateActionType` / `IncompleteRegistry` if the handler table is
    /// inconsistent.
    pub fn new(config: EditorConfig) -> EditorResult<Self> {
        let mut history = HistoryManager::new(config.history_depth);
        history.register_type(ActionKind::CreateElements, undo_create, redo_create)?;
        history.register_type(ActionKind::RemoveElements, undo_remove, redo_remove)?;
        history.register_type(ActionKind::SelectTargets, undo_select, redo_select)?;
        history.register_type(ActionKind::ChangeText, undo_text, redo_text)?;
        history.register_type(ActionKind::Move, undo_move, redo_move)?;
        history.register_type(ActionKind::Render, undo_render, redo_render)?;
        history.register_type(ActionKind::Renders, undo_render, redo_render)?;
        history.ensure_complete()?;

        let guides = Guides::new(config.width, config.height, config.snap_threshold);
        Ok(Self {
            config,
            scene: Scene::new(),
            frames: TransformStore::new(),
            history,
            selection: SelectionSet::new(),
            controller: InteractionController::new(),
            guides,
            observers: Observers::default(),
            clipboard: None,
        })
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn frames(&self) -> &TransformStore {
        &self.frames
    }

    pub fn history(&self) -> &HistoryManager<Editor> {
        &self.history
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn guides(&self) -> &Guides {
        &self.guides
    }

    pub fn selected_ids(&self) -> &[ElementId] {
        self.selection.ids()
    }

    pub fn frame(&self, id: ElementId) -> Option<&Frame> {
        self.frames.get(id)
    }

    pub fn style(&self, id: ElementId) -> Option<&str> {
        self.frames.style(id)
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    // ─── Observers ───────────────────────────────────────────────────────

    pub fn subscribe(&mut self, handler: impl FnMut(&EditorEvent) + 'static) -> ObserverId {
        self.observers.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn emit_frames(&mut self, changes: &[FrameChange]) {
        if changes.is_empty() {
            return;
        }
        let ids = changes.iter().map(|c| c.id).collect();
        self.observers.emit(EditorEvent::Change {
            changes: changes
                .iter()
                .map(|c| ChangedFrame {
                    id: c.id,
                    next: c.next.clone(),
                })
                .collect(),
        });
        self.observers.emit(EditorEvent::Render { ids });
    }

    // ─── Elements ────────────────────────────────────────────────────────

    /// Append one element after the selection.
    pub fn append(&mut self, descriptor: ElementDescriptor) -> EditorResult<Vec<ElementInfo>> {
        self.append_many(vec![descriptor])
    }

    /// Append elements right after the last selected element, inside its
    /// scope, or at the end of the root when nothing is selected. Elements
    /// without a frame get the configured default frame. The new elements
    /// become the selection.
    pub fn append_many(
        &mut self,
        descriptors: Vec<ElementDescriptor>,
    ) -> EditorResult<Vec<ElementInfo>> {
        let descriptors = descriptors
            .into_iter()
            .map(|mut desc| {
                if desc.frame.is_empty() {
                    desc.frame = self.config.default_frame.clone();
                }
                desc
            })
            .collect();
        self.insert(descriptors)
    }

    fn insert(&mut self, descriptors: Vec<ElementDescriptor>) -> EditorResult<Vec<ElementInfo>> {
        if descriptors.is_empty() {
            return Ok(Vec::new());
        }
        let (scope, index) = self.insertion_point();
        let infos = self.scene.append_nodes(descriptors, index, Some(scope))?;
        self.create_frames(&infos);
        log::debug!("append {} element(s) into {scope}", infos.len());

        let prev_selected = self.selection.to_vec();
        self.history.add_action(HistoryAction::CreateElements {
            infos: infos.clone(),
            prev_selected,
        });
        let ids: Vec<ElementId> = infos.iter().map(|i| i.id).collect();
        self.select(&ids, false);
        Ok(infos)
    }

    /// Scope and index right after the last selected element in document
    /// order.
    fn insertion_point(&self) -> (ElementId, Option<usize>) {
        self.scene
            .sorted_indexes_list(self.selection.ids())
            .last()
            .and_then(|path| self.scene.info_by_indexes(path))
            .and_then(|last| self.scene.position(last))
            .map_or((ElementId::root(), None), |(scope, pos)| (scope, Some(pos + 1)))
    }

    fn create_frames(&mut self, infos: &[ElementInfo]) {
        let mut ids = Vec::new();
        for info in infos {
            info.walk(&mut |node| {
                self.frames.create_frame(node.id, node.frame.clone());
                ids.push(node.id);
            });
        }
        if !ids.is_empty() {
            self.observers.emit(EditorEvent::Render { ids });
        }
    }

    /// Put captured subtrees back with their ids and frames.
    fn restore_elements(&mut self, infos: &[ElementInfo]) -> Vec<ElementInfo> {
        let restored = self.scene.restore_nodes(infos);
        self.create_frames(&restored);
        restored
    }

    /// Remove elements and their subtrees. The selection moves to the
    /// element that takes their place.
    pub fn remove(&mut self, ids: &[ElementId]) -> Vec<ElementInfo> {
        let prev_selected = self.selection.to_vec();
        let next_selection = self.scene.selection_after_removal(ids);
        let mut removed = self.scene.remove_nodes(ids);
        if removed.is_empty() {
            return removed;
        }
        let frames = &mut self.frames;
        for info in &mut removed {
            info.walk_mut(&mut |node| {
                if let Some(frame) = frames.remove_frame(node.id) {
                    node.frame = frame;
                }
            });
        }
        let removed_ids: Vec<ElementId> = removed.iter().map(|i| i.id).collect();
        log::debug!("remove {} element(s)", removed_ids.len());

        self.history.add_action(HistoryAction::RemoveElements {
            infos: removed.clone(),
            prev_selected,
        });
        self.observers.emit(EditorEvent::Remove { ids: removed_ids });
        let next: Vec<ElementId> = next_selection.into_iter().collect();
        self.select(&next, false);
        removed
    }

    /// Re-parent and reorder elements in one step.
    ///
    /// # Errors
    /// `InvalidScope` if a target scope is missing or a move would nest an
    /// element inside itself; nothing moves.
    pub fn moves(&mut self, targets: &[MoveTarget]) -> EditorResult<MoveResult> {
        let result = self.scene.move_nodes(targets)?;
        if result.moved.is_empty() || result.prev == result.next {
            return Ok(result);
        }
        log::debug!("move {} element(s)", result.moved.len());
        self.history.add_action(HistoryAction::Move {
            prev: result.prev.clone(),
            next: result.next.clone(),
        });
        if self.selection.refresh(&self.scene) {
            self.emit_selection();
        }
        Ok(result)
    }

    /// Replace the content of an element with text. Undo puts back the
    /// previous content exactly, markup included.
    ///
    /// # Errors
    /// `NotFound` if the element does not exist.
    pub fn set_text(&mut self, id: ElementId, text: &str) -> EditorResult<()> {
        let next = Content::Text(text.to_string());
        let prev = self.scene.set_content(id, next.clone())?;
        if prev != next {
            self.history.add_action(HistoryAction::ChangeText { id, prev, next });
        }
        Ok(())
    }

    /// Attach the host's live element to `id`. The handle stays with the
    /// element across remove and undo.
    ///
    /// # Errors
    /// `NotFound` if the element does not exist; `InvalidHandle` if the
    /// handle belongs to another element.
    pub fn bind_handle(&mut self, id: ElementId, handle: ElementHandle) -> EditorResult<()> {
        Ok(self.scene.bind_handle(id, handle)?)
    }

    pub fn id_of_handle(&self, handle: ElementHandle) -> Option<ElementId> {
        self.scene.id_of_handle(handle)
    }

    /// Select the elements behind live handles, as a selection box reports
    /// them. Unbound handles are skipped.
    pub fn select_handles(&mut self, handles: &[ElementHandle]) -> bool {
        let ids: Vec<ElementId> = handles
            .iter()
            .filter_map(|handle| self.scene.id_of_handle(*handle))
            .collect();
        self.set_selection(&ids)
    }

    // ─── Frames ──────────────────────────────────────────────────────────

    /// Set one frame property on `ids` (the selection when empty), recorded
    /// as one action.
    pub fn set_property(
        &mut self,
        ids: &[ElementId],
        name: &str,
        value: impl Into<FrameValue>,
    ) -> Vec<FrameChange> {
        let targets = if ids.is_empty() {
            self.selection.to_vec()
        } else {
            ids.to_vec()
        };
        let changes: Vec<FrameChange> = self
            .frames
            .set_property(&targets, name, &value.into())
            .into_iter()
            .filter(|c| c.prev != c.next)
            .collect();
        self.emit_frames(&changes);
        if let Some(action) = InteractionController::action_for(changes.clone()) {
            self.history.add_action(action);
        }
        changes
    }

    /// Move the selection by a fixed offset, recorded as one drag.
    pub fn nudge(&mut self, dx: f64, dy: f64) -> bool {
        if self.selection.is_empty() || self.frames.is_gesturing() {
            return false;
        }
        let targets = self.selection.to_vec();
        if self.controller.begin(&mut self.frames, GestureKind::Drag, &targets) == 0 {
            return false;
        }
        self.controller
            .update(&mut self.frames, &GestureDelta::Drag { dx, dy });
        self.commit_gesture()
    }

    fn commit_gesture(&mut self) -> bool {
        let Some(action) = self.controller.commit(&mut self.frames) else {
            return false;
        };
        match &action {
            HistoryAction::Render(change) => self.emit_frames(std::slice::from_ref(change)),
            HistoryAction::Renders { infos } => self.emit_frames(infos),
            _ => {}
        }
        self.history.add_action(action);
        true
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select `ids`, recording the change. Descendants of other candidates
    /// and unknown ids are dropped.
    pub fn set_selection(&mut self, ids: &[ElementId]) -> bool {
        self.select(ids, true)
    }

    /// Select every top-level element.
    pub fn select_all(&mut self) -> bool {
        let all = self.scene.children_of(ElementId::root());
        self.select(&all, true)
    }

    fn select(&mut self, ids: &[ElementId], record: bool) -> bool {
        let prevs = self.selection.to_vec();
        if !self.selection.replace(&self.scene, ids) {
            return false;
        }
        if record {
            self.history.add_action(HistoryAction::SelectTargets {
                prevs,
                nexts: self.selection.to_vec(),
            });
        }
        self.emit_selection();
        true
    }

    fn emit_selection(&mut self) {
        let ids = self.selection.to_vec();
        self.observers.emit(EditorEvent::Select { ids });
    }

    // ─── Save / load ─────────────────────────────────────────────────────

    /// Saved form of the whole scene.
    pub fn save(&self) -> Vec<SavedData> {
        self.save_targets(&self.scene.children_of(ElementId::root()))
    }

    pub fn save_targets(&self, ids: &[ElementId]) -> Vec<SavedData> {
        saved::save(&self.scene, &self.frames, &self.scene.document_order(ids))
    }

    pub fn save_json(&self) -> EditorResult<String> {
        Ok(saved::to_json(&self.save())?)
    }

    /// Insert saved elements with fresh ids after the selection, recorded
    /// as one action.
    pub fn load(&mut self, datas: Vec<SavedData>) -> EditorResult<Vec<ElementInfo>> {
        log::debug!("load {} element(s)", datas.len());
        self.insert(datas.into_iter().map(SavedData::into_descriptor).collect())
    }

    pub fn load_json(&mut self, json: &str) -> EditorResult<Vec<ElementInfo>> {
        let datas = saved::from_json(json)?;
        self.load(datas)
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Copy the selection. Returns the clipboard payload, or `None` when
    /// nothing is selected.
    pub fn copy(&mut self) -> EditorResult<Option<String>> {
        if self.selection.is_empty() {
            return Ok(None);
        }
        let json = saved::to_json(&self.save_targets(self.selection.ids()))?;
        self.clipboard = Some(json.clone());
        Ok(Some(json))
    }

    pub fn cut(&mut self) -> EditorResult<Option<String>> {
        let copied = self.copy()?;
        if copied.is_some() {
            let targets = self.selection.to_vec();
            self.remove(&targets);
        }
        Ok(copied)
    }

    pub fn paste(&mut self) -> EditorResult<Vec<ElementInfo>> {
        match self.clipboard.clone() {
            Some(json) => self.load_json(&json),
            None => Ok(Vec::new()),
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Undo the last action. A gesture in progress is rolled back first.
    pub fn undo(&mut self) -> EditorResult<Option<ActionKind>> {
        self.controller.abort(&mut self.frames);
        HistoryManager::undo(self)
    }

    pub fn redo(&mut self) -> EditorResult<Option<ActionKind>> {
        self.controller.abort(&mut self.frames);
        HistoryManager::redo(self)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Handle a key press. Returns whether a shortcut was bound to it.
    pub fn handle_key(&mut self, event: &KeyEvent) -> EditorResult<bool> {
        let Some(action) = ShortcutMap::resolve(event) else {
            return Ok(false);
        };
        log::debug!("shortcut {action:?}");
        if let Some((x, y)) = action.nudge_direction() {
            let step = self.config.nudge_step;
            self.nudge(x * step, y * step);
            return Ok(true);
        }
        match action {
            ShortcutAction::MoveTool => self.controller.set_tool(ToolMode::Move, &mut self.frames),
            ShortcutAction::HandTool => self.controller.set_tool(ToolMode::Hand, &mut self.frames),
            ShortcutAction::Undo => {
                self.undo()?;
            }
            ShortcutAction::Redo => {
                self.redo()?;
            }
            ShortcutAction::Delete => {
                let targets = self.selection.to_vec();
                self.remove(&targets);
            }
            ShortcutAction::SelectAll => {
                self.select_all();
            }
            ShortcutAction::Copy => {
                self.copy()?;
            }
            ShortcutAction::Cut => {
                self.cut()?;
            }
            ShortcutAction::Paste => {
                self.paste()?;
            }
            ShortcutAction::Deselect => {
                self.set_selection(&[]);
            }
            ShortcutAction::NudgeLeft
            | ShortcutAction::NudgeUp
            | ShortcutAction::NudgeRight
            | ShortcutAction::NudgeDown => {}
        }
        Ok(true)
    }

    pub fn handle_selection_event(&mut self, event: &SelectionEvent) {
        match event {
            SelectionEvent::DragStart { target, on_gizmo } => {
                self.controller
                    .pointer_down(*target, *on_gizmo, &self.selection);
            }
            SelectionEvent::Drag { dx, dy } => log::trace!("selection box drag ({dx}, {dy})"),
            SelectionEvent::SelectEnd {
                selected,
                is_drag_start,
            } => {
                let Some(candidates) = self.controller.select_end(selected) else {
                    return;
                };
                self.set_selection(&candidates);
                if *is_drag_start && !self.selection.is_empty() {
                    let targets = self.selection.to_vec();
                    self.controller
                        .begin(&mut self.frames, GestureKind::Drag, &targets);
                }
            }
        }
    }

    /// Drive a gizmo gesture. `End` records one action; `Abort` rolls back
    /// and records nothing.
    pub fn handle_gesture_event(&mut self, event: &GestureEvent) {
        match event {
            GestureEvent::Start { kind, targets } => {
                let targets = if targets.is_empty() {
                    self.selection.to_vec()
                } else {
                    self.scene.filter_descendants(targets)
                };
                self.controller.begin(&mut self.frames, *kind, &targets);
            }
            GestureEvent::Update { delta } => {
                let delta = self.snap_drag(delta);
                if self.controller.update(&mut self.frames, &delta) {
                    let ids = self.frames.gesture_targets();
                    self.observers.emit(EditorEvent::Render { ids });
                }
            }
            GestureEvent::End => {
                self.commit_gesture();
            }
            GestureEvent::Abort => {
                let ids = self.frames.gesture_targets();
                if self.controller.abort(&mut self.frames) {
                    self.observers.emit(EditorEvent::Render { ids });
                }
            }
        }
    }

    /// Shift a drag so the first target's edges or center land on a guide
    /// line. The whole group moves by the same shifted delta.
    fn snap_drag(&self, delta: &GestureDelta) -> GestureDelta {
        let GestureDelta::Drag { dx, dy } = *delta else {
            return delta.clone();
        };
        let lead = self.frames.gesture_targets().first().copied();
        let Some(origin) = lead.and_then(|id| self.frames.gesture_origin(id)) else {
            return delta.clone();
        };
        let (Some(left), Some(top)) = (origin.number("left"), origin.number("top")) else {
            return delta.clone();
        };
        let width = origin.number("width").unwrap_or(0.0);
        let height = origin.number("height").unwrap_or(0.0);
        GestureDelta::Drag {
            dx: dx + self.guides.snap_offset(left + dx, width, Orientation::Vertical),
            dy: dy + self.guides.snap_offset(top + dy, height, Orientation::Horizontal),
        }
    }

    pub fn handle_guide_event(&mut self, event: &GuideEvent) {
        self.guides.handle(event);
    }

    /// Tear down: observers, frames, history, selection, guides and the
    /// clipboard are dropped. The scene itself is kept.
    pub fn dispose(&mut self) {
        self.observers.clear();
        self.controller.reset(&mut self.frames);
        self.frames.clear();
        self.history.clear();
        self.selection.clear();
        self.guides.clear();
        self.clipboard = None;
    }

    // ─── Replay helpers ──────────────────────────────────────────────────

    fn restore_frames(&mut self, changes: &[FrameChange], forward: bool) {
        let mut applied = Vec::with_capacity(changes.len());
        for change in changes {
            let (frame, other) = if forward {
                (&change.next, &change.prev)
            } else {
                (&change.prev, &change.next)
            };
            match self.frames.restore(change.id, frame.clone()) {
                Ok(()) => applied.push(FrameChange {
                    id: change.id,
                    prev: other.clone(),
                    next: frame.clone(),
                }),
                Err(err) => log::warn!("replay render: {err}"),
            }
        }
        self.emit_frames(&applied);
    }
}

// ─── History handlers ────────────────────────────────────────────────────

fn top_level_ids(infos: &[ElementInfo]) -> Vec<ElementId> {
    infos.iter().map(|i| i.id).collect()
}

fn undo_create(action: &HistoryAction, editor: &mut Editor) -> EditorResult<()> {
    if let HistoryAction::CreateElements {
        infos,
        prev_selected,
    } = action
    {
        editor.remove(&top_level_ids(infos));
        editor.select(prev_selected, false);
    }
    Ok(())
}

fn redo_create(action: &HistoryAction, editor: &mut Editor) -> EditorResult<()> {
    if let HistoryAction::CreateElements { infos, .. } = action {
        let restored = editor.restore_elements(infos);
        editor.select(&top_level_ids(&restored), false);
    }
    Ok(())
}

fn undo_remove(action: &HistoryAction, editor: &mut Editor) -> EditorResult<()> {
    if let HistoryAction::RemoveElements {
        infos,
        prev_selected,
    } = action
    {
        editor.restore_elements(infos);
        editor.select(prev_selected, false);
    }
    Ok(())
}

fn redo_remove(action: &HistoryAction, editor: &mut Editor) -> EditorResult<()> {
    if let HistoryAction::RemoveElements { infos, .. } = action {
        editor.remove(&top_level_ids(infos));
    }
    Ok(())
}

fn undo_select(action: &HistoryAction, editor: &mut Editor) -> EditorResult<()> {
    if let HistoryAction::SelectTargets { prevs, .. } = action {
        editor.select(prevs, false);
    }
    Ok(())
}

fn redo_select(action: &HistoryAction, editor: &mut Editor) -> EditorResult<()> {
    if let HistoryAction::SelectTargets { nexts, .. } = action {
        editor.select(nexts, false);
    }
    Ok(())
}

fn undo_text(action: &HistoryAction, editor: &mut Editor) -> EditorResult<()> {
    if let HistoryAction::ChangeText { id, prev, .. } = action {
        editor.scene.set_content(*id, prev.clone())?;
    }
    Ok(())
}

fn redo_text(action: &HistoryAction, editor: &mut Editor) -> EditorResult<()> {
    if let HistoryAction::ChangeText { id, next, .. } = action {
        editor.scene.set_content(*id, next.clone())?;
    }
    Ok(())
}

fn undo_move(action: &HistoryAction, editor: &mut Editor) -> EditorResult<()> {
    if let HistoryAction::Move { prev, .. } = action {
        editor.moves(prev)?;
    }
    Ok(())
}

fn redo_move(action: &HistoryAction, editor: &mut Editor) -> EditorResult<()> {
    if let HistoryAction::Move { next, .. } = action {
        editor.moves(next)?;
    }
    Ok(())
}

fn undo_render(action: &HistoryAction, editor: &mut Editor) -> EditorResult<()> {
    replay_render(action, editor, false)
}

fn redo_render(action: &HistoryAction, editor: &mut Editor) -> EditorResult<()> {
    replay_render(action, editor, true)
}

fn replay_render(action: &HistoryAction, editor: &mut Editor, forward: bool) -> EditorResult<()> {
    match action {
        HistoryAction::Render(change) => {
            editor.restore_frames(std::slice::from_ref(change), forward);
        }
        HistoryAction::Renders { infos } => editor.restore_frames(infos, forward),
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor() -> Editor {
        Editor::new(EditorConfig::default()).unwrap()
    }

    fn div(id: &str) -> ElementDescriptor {
        ElementDescriptor::new("div").with_id(ElementId::intern(id)).named(id)
    }

    #[test]
    fn new_editor_has_complete_registry() {
        let editor = editor();
        assert!(editor.history().is_complete());
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn append_uses_default_frame_and_selects() {
        let mut editor = editor();
        let infos = editor.append(div("ed_a")).unwrap();
        let a = infos[0].id;
        assert_eq!(editor.selected_ids(), &[a]);
        assert_eq!(editor.frame(a), Some(&editor.config().default_frame.clone()));
        assert_eq!(
            editor.history().peek_undo().map(HistoryAction::kind),
            Some(ActionKind::CreateElements)
        );
        assert_eq!(editor.history().undo_len(), 1);
    }

    #[test]
    fn append_goes_after_last_selected() {
        let mut editor = editor();
        editor.append_many(vec![div("ap_a"), div("ap_b")]).unwrap();
        let a = ElementId::intern("ap_a");
        editor.set_selection(&[a]);
        editor.append(div("ap_c")).unwrap();
        assert_eq!(
            editor.scene().children_of(ElementId::root()),
            vec![a, ElementId::intern("ap_c"), ElementId::intern("ap_b")]
        );
    }

    #[test]
    fn remove_selects_neighbour() {
        let mut editor = editor();
        editor.append_many(vec![div("rm_a"), div("rm_b")]).unwrap();
        let a = ElementId::intern("rm_a");
        editor.remove(&[a]);
        assert_eq!(editor.selected_ids(), &[ElementId::intern("rm_b")]);
        assert!(editor.frame(a).is_none());
    }

    #[test]
    fn nudge_records_one_render() {
        let mut editor = editor();
        let a = editor.append(div("nd_a")).unwrap()[0].id;
        assert!(editor.handle_key(&KeyEvent::plain("ArrowRight")).unwrap());
        assert_eq!(editor.frame(a).and_then(|f| f.number("left")), Some(90.0));
        assert_eq!(
            editor.history().peek_undo().map(HistoryAction::kind),
            Some(ActionKind::Render)
        );
        editor.undo().unwrap();
        assert_eq!(editor.frame(a).and_then(|f| f.number("left")), Some(80.0));
    }

    #[test]
    fn set_text_undo_redo() {
        let mut editor = editor();
        let a = editor
            .append(div("tx_a").with_attr("contenteditable", "true"))
            .unwrap()[0]
            .id;
        editor.set_text(a, "hello").unwrap();
        editor.undo().unwrap();
        assert_eq!(editor.scene().get(a).map(|n| &n.content), Some(&Content::None));
        editor.redo().unwrap();
        assert_eq!(
            editor.scene().get(a).and_then(|n| n.content.inner_text()),
            Some("hello")
        );
    }

    #[test]
    fn set_text_undo_puts_markup_back() {
        let mut editor = editor();
        let a = editor
            .append(div("tx_html").with_content(Content::Html("<b>hi</b>".into())))
            .unwrap()[0]
            .id;
        let before = editor.save();

        editor.set_text(a, "plain").unwrap();
        assert_eq!(
            editor.history().peek_undo().map(HistoryAction::kind),
            Some(ActionKind::ChangeText)
        );
        assert_eq!(editor.undo().unwrap(), Some(ActionKind::ChangeText));
        assert_eq!(editor.save(), before);
        assert_eq!(
            editor.scene().get(a).and_then(|n| n.content.inner_html()),
            Some("<b>hi</b>")
        );

        editor.redo().unwrap();
        assert_eq!(
            editor.scene().get(a).map(|n| &n.content),
            Some(&Content::Text("plain".into()))
        );
    }

    #[test]
    fn set_text_to_same_content_records_nothing() {
        let mut editor = editor();
        let a = editor
            .append(div("tx_same").with_content(Content::Text("same".into())))
            .unwrap()[0]
            .id;
        let depth = editor.history().undo_len();
        editor.set_text(a, "same").unwrap();
        assert_eq!(editor.history().undo_len(), depth);
    }

    #[test]
    fn set_property_records_and_emits() {
        let mut editor = editor();
        let infos = editor.append_many(vec![div("sp_a"), div("sp_b")]).unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        editor.subscribe(move |ev| sink.borrow_mut().push(ev.clone()));

        let changes = editor.set_property(&[], "background", "red");
        assert_eq!(changes.len(), 2);
        assert_eq!(
            editor.history().peek_undo().map(HistoryAction::kind),
            Some(ActionKind::Renders)
        );
        assert!(matches!(events.borrow()[0], EditorEvent::Change { .. }));

        editor.undo().unwrap();
        assert_eq!(
            editor.frame(infos[1].id).and_then(|f| f.get("background")),
            Some(&FrameValue::from("#4af"))
        );
    }

    #[test]
    fn render_replay_skips_missing_frames() {
        let mut editor = editor();
        let infos = editor.append_many(vec![div("rp_a"), div("rp_b")]).unwrap();
        let (a, b) = (infos[0].id, infos[1].id);
        editor.set_property(&[a, b], "background", "red");
        assert_eq!(
            editor.history().peek_undo().map(HistoryAction::kind),
            Some(ActionKind::Renders)
        );

        // The frame of `a` goes away outside the history.
        assert!(editor.frames.remove_frame(a).is_some());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        editor.subscribe(move |ev| sink.borrow_mut().push(ev.clone()));

        assert_eq!(editor.undo().unwrap(), Some(ActionKind::Renders));
        assert!(editor.frame(a).is_none());
        assert_eq!(
            editor.frame(b).and_then(|f| f.get("background")),
            Some(&FrameValue::from("#4af"))
        );
        assert!(matches!(
            &events.borrow()[0],
            EditorEvent::Change { changes } if changes.len() == 1 && changes[0].id == b
        ));

        assert!(editor.history().can_redo());
        editor.redo().unwrap();
        assert_eq!(
            editor.frame(b).and_then(|f| f.get("background")),
            Some(&FrameValue::from("red"))
        );
    }

    #[test]
    fn tool_switch_ignores_selection_in_hand_mode() {
        let mut editor = editor();
        let a = editor.append(div("hm_a")).unwrap()[0].id;
        editor.set_selection(&[]);
        editor.handle_key(&KeyEvent::plain("h")).unwrap();
        assert_eq!(editor.controller().tool(), ToolMode::Hand);
        editor.handle_selection_event(&SelectionEvent::DragStart {
            target: Some(a),
            on_gizmo: false,
        });
        editor.handle_selection_event(&SelectionEvent::SelectEnd {
            selected: vec![a],
            is_drag_start: false,
        });
        assert!(editor.selected_ids().is_empty());
    }

    #[test]
    fn clipboard_cut_and_paste() {
        let mut editor = editor();
        editor.append(div("cb_a")).unwrap();
        assert!(editor.handle_key(&KeyEvent::command("x")).unwrap());
        assert!(editor.scene().is_empty());
        assert!(editor.clipboard().is_some());
        let pasted = editor.paste().unwrap();
        assert_eq!(pasted.len(), 1);
        assert_eq!(pasted[0].name, "cb_a");
        assert_eq!(editor.scene().len(), 1);
    }

    #[test]
    fn dispose_clears_state() {
        let mut editor = editor();
        editor.append(div("dp_a")).unwrap();
        editor.dispose();
        assert!(editor.selected_ids().is_empty());
        assert!(editor.frames().is_empty());
        assert!(!editor.history().can_undo());
        assert_eq!(editor.undo().unwrap(), None);
    }
}
