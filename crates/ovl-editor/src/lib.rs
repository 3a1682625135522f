pub mod ai;
pub mod config;
pub mod error;
pub mod frame;
pub mod input;
pub mod session;
pub mod shortcuts;
pub mod style;
pub mod transform;

pub use config::EditorConfig;
pub use error::EditorError;
pub use frame::{FrameThrottle, FrameToken, PendingUpdate};
pub use input::{InputEvent, Modifiers};
pub use session::{EditorSession, ExportJob, SessionInput};
pub use shortcuts::{Focus, ShortcutAction, ShortcutMap};
pub use style::{StyleChange, StyleEditor};
pub use transform::{Interaction, TransformEngine};
