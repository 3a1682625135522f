//! `reqwest` implementations of the service traits.

use crate::config::ServiceConfig;
use crate::error::{ClientError, ServiceError};
use crate::services::{Compositor, FontCatalog, FontRegistrar, ImageFetcher, OverlayGenerator};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ovl_core::TextElement;
use ovl_core::wire::{
    AiOverlayRequest, AiOverlayResponse, CompositeRequest, CompositeResponse, FontCatalogResponse, FontEntry,
    ImageRef,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// One HTTP client shared by every service.
#[derive(Debug, Clone)]
pub struct HttpServices {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl HttpServices {
    pub fn new(config: ServiceConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Config(format!("HTTP client error: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> Result<Vec<u8>, ServiceError> {
        log::debug!("→ {url}");
        let response = request.send().await.map_err(|e| ServiceError::transport(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(|e| ServiceError::transport(url, e))?;
        log::debug!("← {url} {} ({} bytes)", status.as_u16(), body.len());
        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ServiceError> {
        let body = self.send(url, self.client.get(url)).await?;
        decode_json(url, &body)
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let body = self.send(url, self.client.post(url).json(body)).await?;
        decode_json(url, &body)
    }
}

fn decode_json<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(body).map_err(|e| ServiceError::decode(url, e))
}

const STYLESHEET_WEIGHTS: &str = "wght@300;400;500;600;700;800;900";

/// `{font_css_base}?family=<family>:wght@300;...;900`, form-encoded.
pub fn stylesheet_url(font_css_base: &str, family: &str) -> Result<String, ServiceError> {
    let family = format!("{}:{STYLESHEET_WEIGHTS}", family.trim());
    reqwest::Url::parse_with_params(font_css_base, &[("family", family)])
        .map(String::from)
        .map_err(|e| ServiceError::Other(format!("invalid font stylesheet base {font_css_base:?}: {e}")))
}

#[async_trait]
impl FontCatalog for HttpServices {
    async fn list(&self) -> Result<Vec<FontEntry>, ServiceError> {
        let url = self.config.endpoint("fonts");
        let response: FontCatalogResponse = self.get_json(&url).await?;
        Ok(response.fonts)
    }
}

#[async_trait]
impl FontRegistrar for HttpServices {
    /// Fetches the stylesheet so it is cached and known to resolve.
    async fn register(&self, family: &str, stylesheet_url: &str) -> Result<(), ServiceError> {
        let body = self.send(stylesheet_url, self.client.get(stylesheet_url)).await?;
        if body.is_empty() {
            return Err(ServiceError::decode(stylesheet_url, format!("empty stylesheet for {family}")));
        }
        Ok(())
    }
}

#[async_trait]
impl OverlayGenerator for HttpServices {
    async fn generate(&self, request: &AiOverlayRequest) -> Result<AiOverlayResponse, ServiceError> {
        let url = self.config.endpoint("overlays/generate");
        self.post_json(&url, request).await
    }
}

#[async_trait]
impl Compositor for HttpServices {
    async fn composite(&self, image: &ImageRef, element: &TextElement) -> Result<ImageRef, ServiceError> {
        let url = self.config.endpoint("overlays/composite");
        let response: CompositeResponse = self.post_json(&url, &CompositeRequest::new(image, element)).await?;
        let image = response.into_image().ok_or_else(|| ServiceError::EmptyResponse(url.clone()))?;
        if let ImageRef::Base64(data) = &image {
            STANDARD
                .decode(data.as_bytes())
                .map_err(|e| ServiceError::decode(&url, format!("invalid base64 image: {e}")))?;
        }
        Ok(image)
    }
}

#[async_trait]
impl ImageFetcher for HttpServices {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        if let Some(payload) = url.strip_prefix("data:").and_then(|rest| rest.split_once(";base64,")) {
            return STANDARD
                .decode(payload.1.as_bytes())
                .map_err(|e| ServiceError::decode("data: URL", e));
        }
        let body = self.send(url, self.client.get(url)).await?;
        if body.is_empty() {
            return Err(ServiceError::EmptyResponse(url.to_string()));
        }
        Ok(body)
    }
}
