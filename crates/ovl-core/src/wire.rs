//! Request/response shapes of the external services the editor consumes.

use crate::model::{ElementPatch, TextElement};
use serde::{Deserialize, Serialize};

// ─── Font catalog ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontEntry {
    pub family: String,
    pub display: String,
}

impl FontEntry {
    pub fn new(family: &str, display: &str) -> Self {
        Self {
            family: family.to_string(),
            display: display.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontCatalogResponse {
    #[serde(default)]
    pub fonts: Vec<FontEntry>,
}

// ─── AI overlay generation ───────────────────────────────────────────────

/// Campaign context supplied by the host; its presence enables AI generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignData {
    pub content: String,
    pub hashtags: Vec<String>,
    #[serde(rename = "imagePrompt")]
    pub image_prompt: String,
    #[serde(rename = "imageDescription")]
    pub image_description: String,
    pub preferred_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiOverlayRequest {
    pub content: String,
    pub hashtags: Vec<String>,
    #[serde(rename = "imagePrompt")]
    pub image_prompt: String,
    #[serde(rename = "imageDescription")]
    pub image_description: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preferred_template: Option<String>,
}

impl AiOverlayRequest {
    pub fn new(campaign: &CampaignData, image_url: &str) -> Self {
        Self {
            content: campaign.content.clone(),
            hashtags: campaign.hashtags.clone(),
            image_prompt: campaign.image_prompt.clone(),
            image_description: campaign.image_description.clone(),
            image_url: image_url.to_string(),
            preferred_template: campaign.preferred_template.clone(),
        }
    }
}

/// One generated element. `position` is `[percentX, percentY]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiOverlayElement {
    pub position: [f64; 2],
    #[serde(flatten)]
    pub style: ElementPatch,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AiOverlayResponse {
    #[serde(default)]
    pub overlay_elements: Vec<AiOverlayElement>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub quality_score: Option<f64>,
}

// ─── Per-element compositing ─────────────────────────────────────────────

/// An image handed between compositing steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Url(String),
    /// Base64 payload without a `data:` prefix.
    Base64(String),
}

impl ImageRef {
    /// A URL the host can display: the URL itself, or a `data:` URL.
    pub fn to_url(&self) -> String {
        match self {
            ImageRef::Url(url) => url.clone(),
            ImageRef::Base64(data) => format!("data:image/png;base64,{data}"),
        }
    }
}

/// `{ image_base64 | image_url, text, position, ...style, rotation, width, height }`.
#[derive(Debug, Serialize)]
pub struct CompositeRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<&'a str>,
    #[serde(flatten)]
    pub element: &'a TextElement,
}

impl<'a> CompositeRequest<'a> {
    pub fn new(image: &'a ImageRef, element: &'a TextElement) -> Self {
        let (image_base64, image_url) = match image {
            ImageRef::Base64(data) => (Some(data.as_str()), None),
            ImageRef::Url(url) => (None, Some(url.as_str())),
        };
        Self {
            image_base64,
            image_url,
            element,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeResponse {
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl CompositeResponse {
    /// The produced image; base64 wins when both are present.
    pub fn into_image(self) -> Option<ImageRef> {
        match (self.image_base64, self.url) {
            (Some(data), _) if !data.is_empty() => Some(ImageRef::Base64(strip_data_prefix(data))),
            (_, Some(url)) if !url.is_empty() => Some(ImageRef::Url(url)),
            _ => None,
        }
    }
}

fn strip_data_prefix(data: String) -> String {
    match data.split_once(";base64,") {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload.to_string(),
        _ => data,
    }
}
