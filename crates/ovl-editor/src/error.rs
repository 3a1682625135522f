use ovl_core::CoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("no element is selected")]
    NoSelection,

    /// AI generation needs campaign data from the host.
    #[error("AI overlay generation is unavailable without campaign data")]
    AiUnavailable,

    #[error("font family {0:?} is not in the catalog")]
    UnknownFont(String),

    #[error("invalid editor config: {0}")]
    Config(String),
}
