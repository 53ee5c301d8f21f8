//! Undo/Redo history.
//!
//! Every externally visible mutation is recorded as a `HistoryAction`, a
//! tagged payload captured at the moment of the mutation. Each action kind
//! has exactly one undo handler and one redo handler, registered up front;
//! the table is checked for completeness before the editor accepts input.
//!
//! Handlers run with the `replaying` flag set, so any `add_action` they
//! trigger (directly or through editor operations) is dropped instead of
//! growing the history during replay.

use crate::error::{EditorError, EditorResult};
use scena_core::{Content, ElementId, ElementInfo, FrameChange, MoveTarget};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Action-type tag of a `HistoryAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    CreateElements,
    RemoveElements,
    SelectTargets,
    ChangeText,
    Move,
    Render,
    Renders,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::CreateElements,
        ActionKind::RemoveElements,
        ActionKind::SelectTargets,
        ActionKind::ChangeText,
        ActionKind::Move,
        ActionKind::Render,
        ActionKind::Renders,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateElements => "createElements",
            Self::RemoveElements => "removeElements",
            Self::SelectTargets => "selectTargets",
            Self::ChangeText => "changeText",
            Self::Move => "move",
            Self::Render => "render",
            Self::Renders => "renders",
        }
    }
}

/// A recorded, reversible action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HistoryAction {
    #[serde(rename_all = "camelCase")]
    CreateElements {
        infos: Vec<ElementInfo>,
        prev_selected: Vec<ElementId>,
    },
    #[serde(rename_all = "camelCase")]
    RemoveElements {
        infos: Vec<ElementInfo>,
        prev_selected: Vec<ElementId>,
    },
    SelectTargets {
        prevs: Vec<ElementId>,
        nexts: Vec<ElementId>,
    },
    /// Whole element content before and after, markup included.
    ChangeText {
        id: ElementId,
        prev: Content,
        next: Content,
    },
    Move {
        prev: Vec<MoveTarget>,
        next: Vec<MoveTarget>,
    },
    /// One element's frame changed (single-target gesture).
    Render(FrameChange),
    /// Several frames changed in one step (group gesture, property edit).
    Renders { infos: Vec<FrameChange> },
}

impl HistoryAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::CreateElements { .. } => ActionKind::CreateElements,
            Self::RemoveElements { .. } => ActionKind::RemoveElements,
            Self::SelectTargets { .. } => ActionKind::SelectTargets,
            Self::ChangeText { .. } => ActionKind::ChangeText,
            Self::Move { .. } => ActionKind::Move,
            Self::Render(_) => ActionKind::Render,
            Self::Renders { .. } => ActionKind::Renders,
        }
    }
}

/// Undo or redo handler. Receives the recorded payload and the editor
/// context it should restore.
pub type Handler<C> = fn(&HistoryAction, &mut C) -> EditorResult<()>;

/// Implemented by the context that owns the history, so replay can hand
/// handlers `&mut C` while the manager lives inside it.
pub trait HistoryContext: Sized {
    fn history_mut(&mut self) -> &mut HistoryManager<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replay {
    Undo,
    Redo,
}

pub struct HistoryManager<C> {
    handlers: HashMap<ActionKind, (Handler<C>, Handler<C>)>,
    undo_stack: Vec<HistoryAction>,
    redo_stack: Vec<HistoryAction>,
    /// Maximum undo depth.
    max_depth: usize,
    replaying: bool,
}

impl<C> HistoryManager<C> {
    pub fn new(max_depth: usize) -> Self {
        Self {
            handlers: HashMap::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            replaying: false,
        }
    }

    /// Associate undo/redo handlers with an action kind.
    ///
    /// # Errors
    /// `DuplicateActionType` if the kind already has handlers; the existing
    /// pair is kept.
    pub fn register_type(
        &mut self,
        kind: ActionKind,
        undo: Handler<C>,
        redo: Handler<C>,
    ) -> EditorResult<()> {
        if self.handlers.contains_key(&kind) {
            return Err(EditorError::DuplicateActionType(kind));
        }
        self.handlers.insert(kind, (undo, redo));
        Ok(())
    }

    pub fn missing_kinds(&self) -> Vec<ActionKind> {
        ActionKind::ALL
            .into_iter()
            .filter(|k| !self.handlers.contains_key(k))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_kinds().is_empty()
    }

    /// # Errors
    /// `IncompleteRegistry` listing every kind without handlers.
    pub fn ensure_complete(&self) -> EditorResult<()> {
        let missing = self.missing_kinds();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EditorError::IncompleteRegistry(missing))
        }
    }

    /// Record an action and invalidate the redo stack. Ignored while a
    /// replay is in progress; returns whether the action was recorded.
    pub fn add_action(&mut self, action: HistoryAction) -> bool {
        if self.replaying {
            log::trace!("history: dropping {} during replay", action.kind().name());
            return false;
        }
        log::debug!("history: + {}", action.kind().name());
        self.push_undo(action);
        self.redo_stack.clear();
        true
    }

    fn push_undo(&mut self, action: HistoryAction) {
        self.undo_stack.push(action);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// The action the next `undo` would replay.
    pub fn peek_undo(&self) -> Option<&HistoryAction> {
        self.undo_stack.last()
    }

    pub fn peek_redo(&self) -> Option<&HistoryAction> {
        self.redo_stack.last()
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.replaying = false;
    }
}

impl<C: HistoryContext> HistoryManager<C> {
    /// Replay the most recent action backwards.
    ///
    /// Returns `Ok(None)` when there is nothing to undo. A failing handler
    /// leaves the action consumed: it is not pushed to the redo stack.
    pub fn undo(ctx: &mut C) -> EditorResult<Option<ActionKind>> {
        Self::replay(ctx, Replay::Undo)
    }

    /// Replay the most recently undone action forwards.
    pub fn redo(ctx: &mut C) -> EditorResult<Option<ActionKind>> {
        Self::replay(ctx, Replay::Redo)
    }

    fn replay(ctx: &mut C, direction: Replay) -> EditorResult<Option<ActionKind>> {
        let history = ctx.history_mut();
        let popped = match direction {
            Replay::Undo => history.undo_stack.pop(),
            Replay::Redo => history.redo_stack.pop(),
        };
        let Some(action) = popped else {
            return Ok(None);
        };
        let kind = action.kind();
        let Some(&(undo, redo)) = history.handlers.get(&kind) else {
            log::warn!("history: no handlers for {}", kind.name());
            return Err(EditorError::IncompleteRegistry(vec![kind]));
        };
        let handler = match direction {
            Replay::Undo => undo,
            Replay::Redo => redo,
        };

        history.replaying = true;
        let result = handler(&action, ctx);
        let history = ctx.history_mut();
        history.replaying = false;

        match result {
            Ok(()) => {
                log::debug!("history: {:?} {}", direction, kind.name());
                match direction {
                    Replay::Undo => history.redo_stack.push(action),
                    Replay::Redo => history.push_undo(action),
                }
                Ok(Some(kind))
            }
            Err(err) => {
                log::warn!("history: {:?} {} failed: {err}", direction, kind.name());
                Err(err)
            }
        }
    }
}
