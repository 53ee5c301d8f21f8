//! WASM bridge for Scena: exposes the editor facade to a browser host.
//!
//! Compiled via `wasm-pack build --target web`. Every structured payload
//! crosses the boundary as a JSON string; events are delivered to a single
//! JS callback as JSON as well.

use scena_core::saved::{self, SavedData};
use scena_core::{ElementHandle, ElementId, FrameValue};
use scena_editor::events::ObserverId;
use scena_editor::guides::ruler_unit;
use scena_editor::{
    Editor, EditorConfig, GestureEvent, GuideEvent, KeyEvent, Orientation, SelectionEvent,
};
use wasm_bindgen::prelude::*;

/// The main WASM-facing editor controller.
#[wasm_bindgen]
pub struct ScenaEditor {
    editor: Editor,
    /// Observer forwarding events to the JS callback, if one is set.
    listener: Option<ObserverId>,
}

#[wasm_bindgen]
impl ScenaEditor {
    /// Create an editor for a viewport of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Result<ScenaEditor, JsValue> {
        console_error_panic_hook_setup();
        let config = EditorConfig {
            width,
            height,
            ..EditorConfig::default()
        };
        Self::from_config(config)
    }

    /// Create an editor from a JSON `EditorConfig`.
    pub fn with_config(json: &str) -> Result<ScenaEditor, JsValue> {
        console_error_panic_hook_setup();
        let config = EditorConfig::from_json(json).map_err(to_js)?;
        Self::from_config(config)
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// Forward every editor event to `callback` as a JSON string. Replaces
    /// any previous callback.
    pub fn on_event(&mut self, callback: js_sys::Function) {
        self.off_event();
        let id = self.editor.subscribe(move |event| match serde_json::to_string(event) {
            Ok(json) => {
                if callback.call1(&JsValue::NULL, &JsValue::from_str(&json)).is_err() {
                    log::warn!("event callback threw");
                }
            }
            Err(err) => log::warn!("event serialization failed: {err}"),
        });
        self.listener = Some(id);
    }

    pub fn off_event(&mut self) {
        if let Some(id) = self.listener.take() {
            self.editor.unsubscribe(id);
        }
    }

    // ─── Elements ────────────────────────────────────────────────────────

    /// Append elements given as a JSON array of saved data. Returns the new
    /// ids as a JSON array.
    pub fn append_json(&mut self, json: &str) -> Result<String, JsValue> {
        let datas = saved::from_json(json).map_err(to_js)?;
        let infos = self
            .editor
            .append_many(datas.into_iter().map(SavedData::into_descriptor).collect())
            .map_err(to_js)?;
        Ok(ids_json(infos.iter().map(|i| i.id)))
    }

    /// Remove the elements in a JSON id array. Returns the removed ids.
    pub fn remove_json(&mut self, ids: &str) -> Result<String, JsValue> {
        let ids = parse_ids(ids)?;
        let removed = self.editor.remove(&ids);
        Ok(ids_json(removed.iter().map(|i| i.id)))
    }

    /// Remove the selection. Returns true if anything was removed.
    pub fn delete_selected(&mut self) -> bool {
        let ids = self.editor.selected_ids().to_vec();
        !self.editor.remove(&ids).is_empty()
    }

    pub fn set_text(&mut self, id: &str, text: &str) -> bool {
        self.editor.set_text(ElementId::intern(id), text).is_ok()
    }

    /// Set a frame property on the selection. `value` is a JSON number or
    /// string.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<bool, JsValue> {
        let value: FrameValue = serde_json::from_str(value).map_err(to_js)?;
        Ok(!self.editor.set_property(&[], name, value).is_empty())
    }

    /// Attach the host's numeric handle for a live element to `id`.
    pub fn bind_handle(&mut self, id: &str, handle: f64) -> bool {
        self.editor
            .bind_handle(ElementId::intern(id), ElementHandle(handle as u64))
            .is_ok()
    }

    /// Id of the element bound to `handle`, if any.
    pub fn id_of_handle(&self, handle: f64) -> Option<String> {
        self.editor
            .id_of_handle(ElementHandle(handle as u64))
            .map(|id| id.as_str().to_string())
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Get the selected ids as a JSON array.
    pub fn get_selected_ids(&self) -> String {
        ids_json(self.editor.selected_ids().iter().copied())
    }

    pub fn set_selection_json(&mut self, ids: &str) -> Result<bool, JsValue> {
        let ids = parse_ids(ids)?;
        Ok(self.editor.set_selection(&ids))
    }

    pub fn select_all(&mut self) -> bool {
        self.editor.select_all()
    }

    /// Select the elements behind a JSON array of live handles.
    pub fn select_handles_json(&mut self, handles: &str) -> Result<bool, JsValue> {
        let handles: Vec<ElementHandle> = serde_json::from_str(handles).map_err(to_js)?;
        Ok(self.editor.select_handles(&handles))
    }

    // ─── Frames ──────────────────────────────────────────────────────────

    /// Inline style of an element, or an empty string.
    pub fn get_style(&self, id: &str) -> String {
        self.editor
            .style(ElementId::intern(id))
            .unwrap_or_default()
            .to_string()
    }

    /// Frame of an element as JSON, or `null`.
    pub fn get_frame_json(&self, id: &str) -> String {
        self.editor
            .frame(ElementId::intern(id))
            .and_then(|frame| serde_json::to_string(frame).ok())
            .unwrap_or_else(|| "null".to_string())
    }

    // ─── Save / load ─────────────────────────────────────────────────────

    pub fn save_json(&self) -> Result<String, JsValue> {
        self.editor.save_json().map_err(to_js)
    }

    /// Load saved data after the selection. Returns the new ids.
    pub fn load_json(&mut self, json: &str) -> Result<String, JsValue> {
        let infos = self.editor.load_json(json).map_err(to_js)?;
        Ok(ids_json(infos.iter().map(|i| i.id)))
    }

    pub fn copy(&mut self) -> Result<String, JsValue> {
        let copied = self.editor.copy().map_err(to_js)?;
        Ok(copied.unwrap_or_default())
    }

    pub fn cut(&mut self) -> Result<String, JsValue> {
        let copied = self.editor.cut().map_err(to_js)?;
        Ok(copied.unwrap_or_default())
    }

    pub fn paste(&mut self) -> Result<String, JsValue> {
        let infos = self.editor.paste().map_err(to_js)?;
        Ok(ids_json(infos.iter().map(|i| i.id)))
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Undo. Returns true if an action was replayed.
    pub fn undo(&mut self) -> bool {
        matches!(self.editor.undo(), Ok(Some(_)))
    }

    pub fn redo(&mut self) -> bool {
        matches!(self.editor.redo(), Ok(Some(_)))
    }

    pub fn can_undo(&self) -> bool {
        self.editor.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.history().can_redo()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Handle a key press. Returns true if a shortcut consumed it.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let event = KeyEvent {
            key: key.to_string(),
            ctrl,
            shift,
            alt,
            meta,
        };
        match self.editor.handle_key(&event) {
            Ok(handled) => handled,
            Err(err) => {
                log::warn!("shortcut {key} failed: {err}");
                true
            }
        }
    }

    pub fn handle_selection_event(&mut self, json: &str) -> Result<(), JsValue> {
        let event: SelectionEvent = serde_json::from_str(json).map_err(to_js)?;
        self.editor.handle_selection_event(&event);
        Ok(())
    }

    pub fn handle_gesture_event(&mut self, json: &str) -> Result<(), JsValue> {
        let event: GestureEvent = serde_json::from_str(json).map_err(to_js)?;
        self.editor.handle_gesture_event(&event);
        Ok(())
    }

    pub fn handle_guide_event(&mut self, json: &str) -> Result<(), JsValue> {
        let event: GuideEvent = serde_json::from_str(json).map_err(to_js)?;
        self.editor.handle_guide_event(&event);
        Ok(())
    }

    /// Snap lines of one ruler ("horizontal" or "vertical") as a JSON
    /// array, for drawing guidelines on the gizmo.
    pub fn snap_lines_json(&self, orientation: &str) -> Result<String, JsValue> {
        let orientation: Orientation =
            serde_json::from_value(serde_json::Value::from(orientation)).map_err(to_js)?;
        serde_json::to_string(&self.editor.guides().snap_lines(orientation)).map_err(to_js)
    }

    /// Get the active tool name ("move" or "hand").
    pub fn get_tool_name(&self) -> String {
        match self.editor.controller().tool() {
            scena_editor::ToolMode::Move => "move",
            scena_editor::ToolMode::Hand => "hand",
        }
        .to_string()
    }

    pub fn dispose(&mut self) {
        self.listener = None;
        self.editor.dispose();
    }
}

impl ScenaEditor {
    fn from_config(config: EditorConfig) -> Result<ScenaEditor, JsValue> {
        let editor = Editor::new(config).map_err(to_js)?;
        Ok(Self {
            editor,
            listener: None,
        })
    }
}

/// Ruler tick unit for a zoom level.
#[wasm_bindgen]
pub fn ruler_unit_for_zoom(zoom: f64) -> f64 {
    ruler_unit(zoom)
}

fn ids_json(ids: impl Iterator<Item = ElementId>) -> String {
    let ids: Vec<ElementId> = ids.collect();
    serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
}

fn parse_ids(json: &str) -> Result<Vec<ElementId>, JsValue> {
    serde_json::from_str(json).map_err(to_js)
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Scena WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
