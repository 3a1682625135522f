pub mod error;
pub mod history;
pub mod id;
pub mod model;
pub mod richtext;
pub mod store;
pub mod viewport;
pub mod wire;

pub use error::CoreError;
pub use history::{History, Snapshot};
pub use id::{ElementId, IdCounter};
pub use model::*;
pub use richtext::{InlineStyle, RichText, Span, SpanAttrs, TextRange};
pub use store::ElementStore;
pub use viewport::{Viewport, ZoomLimits};

// Re-export kurbo geometry so downstream crates share one set of types.
pub use kurbo::{Point, Rect, Size, Vec2};
