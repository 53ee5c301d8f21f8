//! Error types for scene-model operations.

use crate::id::{ElementHandle, ElementId};
use thiserror::Error;

pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Debug, Error)]
pub enum SceneError {
    /// The operation referenced an id that is not in the scene.
    #[error("element not found: {0}")]
    NotFound(ElementId),

    /// An insertion or move targeted a scope that does not exist, or that
    /// would make a node its own ancestor.
    #[error("invalid scope: {0}")]
    InvalidScope(ElementId),

    /// A live-element handle is already bound to another element.
    #[error("handle {0:?} is bound to another element")]
    InvalidHandle(ElementHandle),

    /// Saved data could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
