//! Collaborator event shapes.
//!
//! The selection box, the transform gizmo, and the ruler guides are external
//! widgets. The editor only consumes the events they report, normalized into
//! the enums below.

use scena_core::{ElementId, GestureDelta, GestureKind};
use serde::{Deserialize, Serialize};

/// Events from the selection-box widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SelectionEvent {
    /// Pointer pressed on the canvas.
    #[serde(rename_all = "camelCase")]
    DragStart {
        /// Element under the pointer, if any.
        #[serde(default)]
        target: Option<ElementId>,
        /// The pointer landed on a gizmo handle.
        #[serde(default)]
        on_gizmo: bool,
    },
    /// Pointer moved while the selection box is active.
    Drag { dx: f64, dy: f64 },
    /// Pointer released; `selected` is the resolved hit set.
    #[serde(rename_all = "camelCase")]
    SelectEnd {
        selected: Vec<ElementId>,
        /// The selection was made by pressing on an element, so a drag
        /// gesture continues from here.
        #[serde(default)]
        is_drag_start: bool,
    },
}

/// Events from the transform gizmo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GestureEvent {
    /// A handle was grabbed. Empty `targets` means the current selection.
    Start {
        kind: GestureKind,
        #[serde(default)]
        targets: Vec<ElementId>,
    },
    /// Cumulative delta since `Start`.
    Update { delta: GestureDelta },
    /// Pointer released: commit.
    End,
    /// Pointer capture lost: roll back.
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Events from the ruler widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GuideEvent {
    /// The user added, moved, or removed guide lines on one ruler.
    Changed {
        orientation: Orientation,
        guides: Vec<f64>,
    },
}

/// A key press, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl KeyEvent {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    /// `key` with the platform command modifier (Ctrl; Meta is equivalent).
    pub fn command(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_event_json() {
        let ev: GestureEvent = serde_json::from_str(
            r#"{"type":"update","delta":{"kind":"drag","dx":10,"dy":-5}}"#,
        )
        .unwrap();
        assert_eq!(
            ev,
            GestureEvent::Update {
                delta: GestureDelta::Drag { dx: 10.0, dy: -5.0 }
            }
        );
        let ev: GestureEvent = serde_json::from_str(r#"{"type":"start","kind":"rotate"}"#).unwrap();
        assert_eq!(
            ev,
            GestureEvent::Start {
                kind: GestureKind::Rotate,
                targets: Vec::new()
            }
        );
    }

    #[test]
    fn selection_event_json() {
        let ev: SelectionEvent =
            serde_json::from_str(r#"{"type":"selectEnd","selected":["a","b"],"isDragStart":true}"#)
                .unwrap();
        assert_eq!(
            ev,
            SelectionEvent::SelectEnd {
                selected: vec![ElementId::intern("a"), ElementId::intern("b")],
                is_drag_start: true
            }
        );
    }
}
