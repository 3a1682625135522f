//! Editor tuning knobs. Every field has a default; a JSON file may override
//! any subset.

use crate::error::EditorError;
use ovl_core::{RichText, TextElement, ZoomLimits};
use ovl_render::HandleMetrics;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_LIMIT: usize = 500;
pub const NEW_LAYER_TEXT: &str = "Your Text Here";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub zoom: ZoomLimits,
    /// Oldest snapshots are evicted past this depth. `null` keeps everything.
    pub history_limit: Option<usize>,
    pub handles: HandleMetrics,
    /// Style and size for layers created by double-click or "Add Layer".
    /// `id` and `position` are ignored.
    pub new_layer: TextElement,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom: ZoomLimits::default(),
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            handles: HandleMetrics::default(),
            new_layer: TextElement {
                text: RichText::plain(NEW_LAYER_TEXT),
                ..TextElement::default()
            },
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let config: Self = serde_json::from_str(json).map_err(|e| EditorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        let z = &self.zoom;
        if z.min == 0 || z.min > z.max || z.step == 0 {
            return Err(EditorError::Config(format!(
                "zoom bounds {}..={} step {} are invalid",
                z.min, z.max, z.step
            )));
        }
        if self.history_limit == Some(0) {
            return Err(EditorError::Config("history_limit must be at least 1".into()));
        }
        Ok(())
    }
}
