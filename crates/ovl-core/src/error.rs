use crate::id::ElementId;
use thiserror::Error;

/// Errors raised by the element store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("no element with id {0}")]
    UnknownElement(ElementId),

    #[error("layer index {index} is out of range for {len} elements")]
    IndexOutOfRange { index: usize, len: usize },

    /// The list is frozen while an export walks it.
    #[error("the element list cannot change while an export is in flight")]
    ExportInFlight,
}
