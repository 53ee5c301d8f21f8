//! Editor configuration.

use crate::error::EditorResult;
use scena_core::Frame;
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::Editor`]. Every field has a default, so a
/// partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Viewport width in pixels.
    pub width: f64,
    /// Viewport height in pixels.
    pub height: f64,
    /// Maximum undo depth.
    pub history_depth: usize,
    /// Distance moved by one arrow-key nudge.
    pub nudge_step: f64,
    /// Snap distance for guides.
    pub snap_threshold: f64,
    /// Frame given to elements appended without one.
    pub default_frame: Frame,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            history_depth: 100,
            nudge_step: 10.0,
            snap_threshold: 5.0,
            default_frame: Frame::rect(80.0, 80.0, 320.0, 180.0).with("background", "#4af"),
        }
    }
}

impl EditorConfig {
    /// # Errors
    /// `Config` if `json` is not a valid config object.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
