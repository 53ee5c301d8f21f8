//! Interaction controller.
//!
//! Turns selection-box and gizmo events into selection changes and frame
//! gestures. A gesture over one target commits as a single `render` action,
//! a gesture over several as one `renders` action.
//!
//! ## States
//!
//! | State | Entered on | Left on |
//! |-------|------------|---------|
//! | `Idle` | start, commit, abort | pointer down on empty canvas, gesture start |
//! | `Selecting` | pointer down outside the selection | select end |
//! | `SingleTransform` | gesture start with one target | end, abort |
//! | `GroupTransform` | gesture start with several targets | end, abort |

use crate::history::HistoryAction;
use crate::selection::SelectionSet;
use scena_core::{ElementId, FrameChange, GestureDelta, GestureKind, TransformStore};

/// The active tool determines how pointer input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    /// Select and transform elements.
    #[default]
    Move,
    /// Pan the canvas; element input is ignored.
    Hand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Selecting,
    SingleTransform(GestureKind),
    GroupTransform(GestureKind),
}

impl InteractionState {
    pub fn is_transforming(&self) -> bool {
        matches!(self, Self::SingleTransform(_) | Self::GroupTransform(_))
    }
}

#[derive(Debug, Default)]
pub struct InteractionController {
    tool: ToolMode,
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Switch tools. Any gesture in progress is rolled back.
    pub fn set_tool(&mut self, tool: ToolMode, store: &mut TransformStore) {
        if self.tool != tool {
            log::debug!("tool: {:?} -> {:?}", self.tool, tool);
            self.abort(store);
            self.state = InteractionState::Idle;
            self.tool = tool;
        }
    }

    // ─── Selection box ───────────────────────────────────────────────────

    /// Pointer pressed on the canvas. Returns whether the selection box
    /// takes over; pressing a gizmo handle or an already-selected element
    /// leaves the gesture to the gizmo.
    pub fn pointer_down(
        &mut self,
        target: Option<ElementId>,
        on_gizmo: bool,
        selection: &SelectionSet,
    ) -> bool {
        if self.tool == ToolMode::Hand || self.state.is_transforming() {
            return false;
        }
        if on_gizmo || target.is_some_and(|id| selection.contains(id)) {
            self.state = InteractionState::Idle;
            return false;
        }
        self.state = InteractionState::Selecting;
        true
    }

    /// Selection box released. Returns the candidates to select, or `None`
    /// when the event does not apply to the current tool.
    pub fn select_end(&mut self, selected: &[ElementId]) -> Option<Vec<ElementId>> {
        if self.tool == ToolMode::Hand || self.state.is_transforming() {
            return None;
        }
        self.state = InteractionState::Idle;
        Some(selected.to_vec())
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// Start a gesture. Returns the number of captured targets; zero leaves
    /// the controller idle.
    pub fn begin(
        &mut self,
        store: &mut TransformStore,
        kind: GestureKind,
        targets: &[ElementId],
    ) -> usize {
        if self.tool == ToolMode::Hand {
            return 0;
        }
        let count = store.gesture_start(kind, targets);
        self.state = match count {
            0 => InteractionState::Idle,
            1 => InteractionState::SingleTransform(kind),
            _ => InteractionState::GroupTransform(kind),
        };
        log::trace!("gesture {kind:?} start over {count} target(s)");
        count
    }

    pub fn update(&mut self, store: &mut TransformStore, delta: &GestureDelta) -> bool {
        if !self.state.is_transforming() {
            return false;
        }
        store.gesture_update(delta)
    }

    /// Finish the gesture and return the action that records it, or `None`
    /// if nothing changed.
    pub fn commit(&mut self, store: &mut TransformStore) -> Option<HistoryAction> {
        if !self.state.is_transforming() {
            return None;
        }
        self.state = InteractionState::Idle;
        Self::action_for(store.gesture_end())
    }

    /// Roll the gesture back. Nothing is recorded.
    pub fn abort(&mut self, store: &mut TransformStore) -> bool {
        if self.state.is_transforming() {
            self.state = InteractionState::Idle;
        }
        store.gesture_abort()
    }

    /// The history action recording a set of frame changes.
    pub fn action_for(mut changes: Vec<FrameChange>) -> Option<HistoryAction> {
        match changes.len() {
            0 => None,
            1 => changes.pop().map(HistoryAction::Render),
            _ => Some(HistoryAction::Renders { infos: changes }),
        }
    }

    pub fn reset(&mut self, store: &mut TransformStore) {
        self.abort(store);
        self.state = InteractionState::Idle;
        self.tool = ToolMode::Move;
    }
}
