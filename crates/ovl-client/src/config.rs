//! Service endpoints and HTTP settings.
//!
//! Defaults, then an optional JSON file, then environment overrides
//! (`OVL_API_BASE`, `OVL_FONT_CSS_BASE`).

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_API_BASE: &str = "OVL_API_BASE";
pub const ENV_FONT_CSS_BASE: &str = "OVL_FONT_CSS_BASE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Prefix for `/fonts`, `/overlays/generate` and `/overlays/composite`.
    pub api_base: String,
    /// Stylesheet endpoint taking `?family=<F>:wght@...`.
    pub font_css_base: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000/api".to_string(),
            font_css_base: "https://fonts.googleapis.com/css2".to_string(),
            timeout_secs: 30,
            user_agent: concat!("overlay-studio/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        serde_json::from_str(json).map_err(|e| ClientError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base) = lookup(ENV_API_BASE).filter(|v| !v.is_empty()) {
            log::debug!("{ENV_API_BASE} overrides api_base with {base}");
            self.api_base = base;
        }
        if let Some(base) = lookup(ENV_FONT_CSS_BASE).filter(|v| !v.is_empty()) {
            log::debug!("{ENV_FONT_CSS_BASE} overrides font_css_base with {base}");
            self.font_css_base = base;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `{api_base}/{path}` without doubled slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
