//! Transform store: per-element frames and the gesture engine that mutates
//! them.
//!
//! Every element with a frame has an entry here; the store renders the
//! element's inline style from the frame whenever it changes. Gestures
//! (drag, resize, rotate, scale, clip) capture an origin frame per target at
//! start and recompute each target from `origin + cumulative delta` on every
//! update, so group members keep their relative offsets and an aborted
//! gesture can be rolled back exactly.

use crate::error::{SceneError, SceneResult};
use crate::frame::{Frame, FrameValue};
use crate::id::ElementId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Before/after frames of one element, as recorded in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameChange {
    pub id: ElementId,
    pub prev: Frame,
    pub next: Frame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GestureKind {
    Drag,
    Resize,
    Rotate,
    Scale,
    Clip,
}

/// Cumulative gesture delta, measured from gesture start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GestureDelta {
    Drag {
        dx: f64,
        dy: f64,
    },
    /// `dx`/`dy` shift the box when a top or left handle is dragged.
    Resize {
        dw: f64,
        dh: f64,
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        dy: f64,
    },
    Rotate {
        deg: f64,
    },
    Scale {
        sx: f64,
        sy: f64,
    },
    #[serde(rename_all = "camelCase")]
    Clip {
        clip_path: String,
    },
}

impl GestureDelta {
    pub fn kind(&self) -> GestureKind {
        match self {
            Self::Drag { .. } => GestureKind::Drag,
            Self::Resize { .. } => GestureKind::Resize,
            Self::Rotate { .. } => GestureKind::Rotate,
            Self::Scale { .. } => GestureKind::Scale,
            Self::Clip { .. } => GestureKind::Clip,
        }
    }

    /// Compute the frame a target should have, given its gesture origin.
    pub fn apply(&self, origin: &Frame) -> Frame {
        let mut next = origin.clone();
        match self {
            Self::Drag { dx, dy } => {
                next.set("left", origin.number("left").unwrap_or(0.0) + dx);
                next.set("top", origin.number("top").unwrap_or(0.0) + dy);
            }
            Self::Resize { dw, dh, dx, dy } => {
                let width = (origin.number("width").unwrap_or(0.0) + dw).max(0.0);
                let height = (origin.number("height").unwrap_or(0.0) + dh).max(0.0);
                next.set("width", width);
                next.set("height", height);
                if *dx != 0.0 {
                    next.set("left", origin.number("left").unwrap_or(0.0) + dx);
                }
                if *dy != 0.0 {
                    next.set("top", origin.number("top").unwrap_or(0.0) + dy);
                }
            }
            Self::Rotate { deg } => next.set_rotation(origin.rotation() + deg),
            Self::Scale { sx, sy } => {
                let [ox, oy] = origin.transform.scale.unwrap_or([1.0, 1.0]);
                next.transform.scale = Some([ox * sx, oy * sy]);
            }
            Self::Clip { clip_path } => next.set("clip-path", clip_path.as_str()),
        }
        next
    }
}

/// A gesture in progress.
#[derive(Debug, Clone)]
struct ActiveGesture {
    kind: GestureKind,
    origins: SmallVec<[(ElementId, Frame); 4]>,
}

#[derive(Debug, Default)]
pub struct TransformStore {
    frames: HashMap<ElementId, Frame>,
    /// Last rendered inline style per element.
    styles: HashMap<ElementId, String>,
    gesture: Option<ActiveGesture>,
}

impl TransformStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Frames ──────────────────────────────────────────────────────────

    /// Establish the frame of an element and render it. Replaces any
    /// existing frame.
    pub fn create_frame(&mut self, id: ElementId, frame: Frame) -> &str {
        self.frames.insert(id, frame);
        self.render(id).unwrap_or_default()
    }

    /// Destroy the frame of an element, returning its last value.
    pub fn remove_frame(&mut self, id: ElementId) -> Option<Frame> {
        self.styles.remove(&id);
        if let Some(gesture) = &mut self.gesture {
            gesture.origins.retain(|(target, _)| *target != id);
        }
        self.frames.remove(&id)
    }

    pub fn has_frame(&self, id: ElementId) -> bool {
        self.frames.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Frame> {
        self.frames.get(&id)
    }

    /// Merge `props` into the element's frame and re-render.
    pub fn set(&mut self, id: ElementId, props: &Frame) -> SceneResult<()> {
        let frame = self.frames.get_mut(&id).ok_or(SceneError::NotFound(id))?;
        frame.merge(props);
        self.render(id);
        Ok(())
    }

    /// Replace the element's frame wholesale and re-render.
    pub fn restore(&mut self, id: ElementId, frame: Frame) -> SceneResult<()> {
        let slot = self.frames.get_mut(&id).ok_or(SceneError::NotFound(id))?;
        *slot = frame;
        self.render(id);
        Ok(())
    }

    /// Recompute the inline style from the frame. Returns the style, or
    /// `None` if the element has no frame.
    pub fn render(&mut self, id: ElementId) -> Option<&str> {
        let style = self.frames.get(&id)?.to_style();
        log::trace!("render {id}: {style}");
        self.styles.insert(id, style);
        self.styles.get(&id).map(String::as_str)
    }

    /// The style string last applied to the element.
    pub fn style(&self, id: ElementId) -> Option<&str> {
        self.styles.get(&id).map(String::as_str)
    }

    /// Set one property on every listed element, returning the changes.
    /// Elements without a frame are skipped.
    pub fn set_property(
        &mut self,
        ids: &[ElementId],
        name: &str,
        value: &FrameValue,
    ) -> Vec<FrameChange> {
        let mut changes = Vec::with_capacity(ids.len());
        for &id in ids {
            let Some(frame) = self.frames.get_mut(&id) else {
                log::warn!("set_property: no frame for {id}");
                continue;
            };
            let prev = frame.clone();
            frame.set(name, value.clone());
            let next = frame.clone();
            self.render(id);
            changes.push(FrameChange { id, prev, next });
        }
        changes
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop every frame, style, and any gesture in progress.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.styles.clear();
        self.gesture = None;
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// Begin a gesture over `targets`, capturing each target's origin.
    /// A gesture already in progress is rolled back first. Targets without
    /// a frame are skipped; returns the number of captured targets.
    pub fn gesture_start(&mut self, kind: GestureKind, targets: &[ElementId]) -> usize {
        if self.gesture.is_some() {
            log::warn!("gesture_start while a gesture is active; rolling back");
            self.gesture_abort();
        }
        let origins: SmallVec<[(ElementId, Frame); 4]> = targets
            .iter()
            .filter_map(|&id| self.frames.get(&id).map(|f| (id, f.clone())))
            .collect();
        let count = origins.len();
        if count > 0 {
            self.gesture = Some(ActiveGesture { kind, origins });
        }
        count
    }

    /// Apply a cumulative delta to every target. Returns `false` when no
    /// gesture is active or the delta belongs to another gesture kind.
    pub fn gesture_update(&mut self, delta: &GestureDelta) -> bool {
        let Some(gesture) = &self.gesture else {
            return false;
        };
        if gesture.kind != delta.kind() {
            log::warn!(
                "ignoring {:?} delta during {:?} gesture",
                delta.kind(),
                gesture.kind
            );
            return false;
        }
        let updates: SmallVec<[(ElementId, Frame); 4]> = gesture
            .origins
            .iter()
            .map(|(id, origin)| (*id, delta.apply(origin)))
            .collect();
        for (id, next) in updates {
            if let Some(frame) = self.frames.get_mut(&id) {
                *frame = next;
                self.render(id);
            }
        }
        true
    }

    /// Finish the gesture, returning the changes of targets that actually
    /// moved.
    pub fn gesture_end(&mut self) -> Vec<FrameChange> {
        let Some(gesture) = self.gesture.take() else {
            return Vec::new();
        };
        gesture
            .origins
            .into_iter()
            .filter_map(|(id, prev)| {
                let next = self.frames.get(&id)?.clone();
                (next != prev).then_some(FrameChange { id, prev, next })
            })
            .collect()
    }

    /// Roll every target back to its origin. Returns `false` if no gesture
    /// was active.
    pub fn gesture_abort(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        for (id, origin) in gesture.origins {
            if let Some(frame) = self.frames.get_mut(&id) {
                *frame = origin;
                self.render(id);
            }
        }
        true
    }

    pub fn is_gesturing(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture_kind(&self) -> Option<GestureKind> {
        self.gesture.as_ref().map(|g| g.kind)
    }

    /// Frame `id` had when the active gesture started.
    pub fn gesture_origin(&self, id: ElementId) -> Option<&Frame> {
        self.gesture
            .as_ref()?
            .origins
            .iter()
            .find(|(target, _)| *target == id)
            .map(|(_, origin)| origin)
    }

    pub fn gesture_targets(&self) -> Vec<ElementId> {
        self.gesture
            .as_ref()
            .map(|g| g.origins.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default()
    }
}
