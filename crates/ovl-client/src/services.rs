//! Seams to the external collaborators.
//!
//! The editor never talks HTTP directly; it goes through these traits so
//! hosts and tests can swap in their own implementations.

use crate::error::ServiceError;
use async_trait::async_trait;
use ovl_core::TextElement;
use ovl_core::wire::{AiOverlayRequest, AiOverlayResponse, FontEntry, ImageRef};

/// `GET {base}/fonts`.
#[async_trait]
pub trait FontCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<FontEntry>, ServiceError>;
}

/// Makes a font family's stylesheet available to the renderer.
#[async_trait]
pub trait FontRegistrar: Send + Sync {
    async fn register(&self, family: &str, stylesheet_url: &str) -> Result<(), ServiceError>;
}

/// `POST {base}/overlays/generate`.
#[async_trait]
pub trait OverlayGenerator: Send + Sync {
    async fn generate(&self, request: &AiOverlayRequest) -> Result<AiOverlayResponse, ServiceError>;
}

/// `POST {base}/overlays/composite`: draw one element onto an image.
#[async_trait]
pub trait Compositor: Send + Sync {
    async fn composite(&self, image: &ImageRef, element: &TextElement) -> Result<ImageRef, ServiceError>;
}

/// Loads the original image bytes.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError>;
}
