use ovl_core::ElementId;
use ovl_editor::EditorError;
use thiserror::Error;

/// A failed call to one of the external services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {detail}")]
    Decode { url: String, detail: String },

    #[error("{0} returned no image")]
    EmptyResponse(String),

    /// Failure reported by a non-HTTP implementation.
    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        ServiceError::Transport {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn decode(url: &str, detail: impl std::fmt::Display) -> Self {
        ServiceError::Decode {
            url: url.to_string(),
            detail: detail.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export could not start: {0}")]
    Editor(#[from] EditorError),

    #[error("could not fetch the original image: {0}")]
    Fetch(#[source] ServiceError),

    /// `step` counts from 1 in paint order.
    #[error("compositing step {step} (element {element}) failed: {source}")]
    Step {
        step: usize,
        element: ElementId,
        #[source]
        source: ServiceError,
    },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("invalid config: {0}")]
    Config(String),
}
