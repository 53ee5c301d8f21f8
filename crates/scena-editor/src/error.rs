//! Error types for editor operations.

use crate::history::ActionKind;
use scena_core::SceneError;
use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// A history action type was registered twice.
    #[error("history action type already registered: {}", .0.name())]
    DuplicateActionType(ActionKind),

    /// Some action types have no undo/redo handlers.
    #[error("history action types without handlers: {0:?}")]
    IncompleteRegistry(Vec<ActionKind>),

    /// Editor configuration could not be parsed.
    #[error("invalid editor config: {0}")]
    Config(#[from] serde_json::Error),
}
