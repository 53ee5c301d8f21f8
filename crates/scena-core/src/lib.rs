pub mod error;
pub mod frame;
pub mod id;
pub mod model;
pub mod saved;
pub mod transform;

pub use error::{SceneError, SceneResult};
pub use frame::{Frame, FrameValue, Transform};
pub use id::{ElementHandle, ElementId};
pub use model::*;
pub use saved::SavedData;
pub use transform::{FrameChange, GestureDelta, GestureKind, TransformStore};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
