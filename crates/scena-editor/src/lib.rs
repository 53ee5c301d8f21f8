pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod guides;
pub mod history;
pub mod input;
pub mod interaction;
pub mod selection;
pub mod shortcuts;

pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, EditorResult};
pub use events::{ChangedFrame, EditorEvent, ObserverId};
pub use history::{ActionKind, HistoryAction, HistoryContext, HistoryManager};
pub use input::{GestureEvent, GuideEvent, KeyEvent, Orientation, SelectionEvent};
pub use interaction::{InteractionController, InteractionState, ToolMode};
pub use selection::SelectionSet;
