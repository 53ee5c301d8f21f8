//! Portable saved-data format.
//!
//! `SavedData` is the recursive, id-free shape the editor exports and
//! imports. Content-editable elements save `innerText` and drop `innerHTML`;
//! everything else saves `innerHTML`.

use crate::error::SceneResult;
use crate::frame::Frame;
use crate::id::ElementId;
use crate::model::{Content, ElementDescriptor, ElementInfo, Scene, is_content_editable};
use crate::transform::TransformStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedData {
    pub name: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsx_id: Option<String>,
    #[serde(rename = "innerHTML", default, skip_serializing_if = "Option::is_none")]
    pub inner_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_text: Option<String>,
    pub tag_name: String,
    #[serde(default)]
    pub frame: Frame,
    #[serde(default)]
    pub children: Vec<SavedData>,
}

impl SavedData {
    /// Build saved data from a captured subtree. `frame_of` supplies the
    /// live frame; the captured frame is used when it returns `None`.
    pub fn from_info(info: &ElementInfo, frame_of: &impl Fn(ElementId) -> Option<Frame>) -> Self {
        let editable = is_content_editable(&info.attrs);
        let (inner_html, inner_text) = if editable {
            (None, info.content.inner_text().map(str::to_string))
        } else {
            (info.content.inner_html().map(str::to_string), None)
        };
        Self {
            name: info.name.clone(),
            attrs: info.attrs.clone(),
            component_id: info.component_id.clone(),
            jsx_id: info.jsx_id.clone(),
            inner_html,
            inner_text,
            tag_name: info.tag_name.clone(),
            frame: frame_of(info.id).unwrap_or_else(|| info.frame.clone()),
            children: info
                .children
                .iter()
                .map(|child| Self::from_info(child, frame_of))
                .collect(),
        }
    }

    /// Convert into an insertable descriptor. Ids are left unassigned.
    pub fn into_descriptor(self) -> ElementDescriptor {
        let content = match (self.inner_text, self.inner_html) {
            (Some(text), _) if is_content_editable(&self.attrs) => Content::Text(text),
            (_, Some(html)) => Content::Html(html),
            (Some(text), None) => Content::Text(text),
            (None, None) => Content::None,
        };
        ElementDescriptor {
            id: None,
            el: None,
            name: self.name,
            tag_name: self.tag_name,
            attrs: self.attrs,
            component_id: self.component_id,
            jsx_id: self.jsx_id,
            content,
            frame: self.frame,
            children: self
                .children
                .into_iter()
                .map(SavedData::into_descriptor)
                .collect(),
        }
    }
}

/// Save the subtrees rooted at `ids` with their live frames.
/// Unknown ids are skipped.
pub fn save(scene: &Scene, store: &TransformStore, ids: &[ElementId]) -> Vec<SavedData> {
    let frame_of = |id: ElementId| store.get(id).cloned();
    ids.iter()
        .filter_map(|id| scene.info(*id))
        .map(|info| SavedData::from_info(&info, &frame_of))
        .collect()
}

pub fn to_json(datas: &[SavedData]) -> SceneResult<String> {
    Ok(serde_json::to_string(datas)?)
}

pub fn from_json(json: &str) -> SceneResult<Vec<SavedData>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_field_names() {
        let data = SavedData {
            name: "Title".into(),
            attrs: BTreeMap::new(),
            component_id: None,
            jsx_id: Some("title".into()),
            inner_html: Some("<b>hi</b>".into()),
            inner_text: None,
            tag_name: "div".into(),
            frame: Frame::new().with("left", 1.0),
            children: Vec::new(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Title",
                "attrs": {},
                "jsxId": "title",
                "innerHTML": "<b>hi</b>",
                "tagName": "div",
                "frame": { "left": 1.0 },
                "children": []
            })
        );
    }

    #[test]
    fn editable_saves_text_only() {
        let mut scene = Scene::new();
        let store = TransformStore::new();
        scene
            .append_nodes(
                vec![
                    ElementDescriptor::new("div")
                        .with_id(ElementId::intern("sv_text"))
                        .with_attr("contenteditable", "true")
                        .with_content(Content::Text("hello".into())),
                ],
                None,
                None,
            )
            .unwrap();
        let saved = save(&scene, &store, &[ElementId::intern("sv_text")]);
        assert_eq!(saved[0].inner_text.as_deref(), Some("hello"));
        assert_eq!(saved[0].inner_html, None);

        let desc = saved[0].clone().into_descriptor();
        assert_eq!(desc.content, Content::Text("hello".into()));
        assert_eq!(desc.id, None);
    }

    #[test]
    fn editable_without_text_saves_no_text() {
        let mut scene = Scene::new();
        let store = TransformStore::new();
        let id = ElementId::intern("sv_empty");
        scene
            .append_nodes(
                vec![
                    ElementDescriptor::new("p")
                        .with_id(id)
                        .with_attr("contenteditable", "true"),
                ],
                None,
                None,
            )
            .unwrap();
        let saved = save(&scene, &store, &[id]);
        assert_eq!(saved[0].inner_text, None);
        assert_eq!(saved[0].inner_html, None);
        assert_eq!(saved[0].clone().into_descriptor().content, Content::None);
        let json = to_json(&saved).unwrap();
        assert!(!json.contains("innerText"));
    }

    #[test]
    fn live_frame_wins_over_captured() {
        let mut scene = Scene::new();
        let mut store = TransformStore::new();
        let id = ElementId::intern("sv_live");
        scene
            .append_nodes(
                vec![
                    ElementDescriptor::new("div")
                        .with_id(id)
                        .with_frame(Frame::rect(0.0, 0.0, 1.0, 1.0)),
                ],
                None,
                None,
            )
            .unwrap();
        store.create_frame(id, Frame::rect(9.0, 9.0, 1.0, 1.0));
        let saved = save(&scene, &store, &[id]);
        assert_eq!(saved[0].frame.number("left"), Some(9.0));
    }

    #[test]
    fn missing_optional_fields_default() {
        let datas = from_json(r#"[{"name":"x","tagName":"img"}]"#).unwrap();
        assert_eq!(datas[0].frame, Frame::new());
        assert!(datas[0].children.is_empty());
        assert_eq!(datas[0].clone().into_descriptor().content, Content::None);
    }
}
