pub mod config;
pub mod error;
pub mod export;
pub mod fonts;
pub mod http;
pub mod overlay;
pub mod services;

pub use config::ServiceConfig;
pub use error::{ClientError, ExportError, ServiceError};
pub use export::{ExportOutcome, export_session, run_export};
pub use fonts::{FontLoader, FontStatus, builtin_fonts, load_catalog};
pub use http::HttpServices;
pub use overlay::generate_overlays;
pub use services::{Compositor, FontCatalog, FontRegistrar, ImageFetcher, OverlayGenerator};
