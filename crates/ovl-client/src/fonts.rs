//! Font resource loader.
//!
//! Each family is registered at most once per loader, including while a
//! first registration is still in flight. A failed registration is recorded
//! and logged; text in that family renders with the fallback stack.

use crate::http::stylesheet_url;
use crate::services::{FontCatalog, FontRegistrar};
use ovl_core::TextElement;
use ovl_core::wire::FontEntry;
use std::collections::HashMap;
use std::sync::Mutex;

/// Shown when the catalog service is unreachable.
pub fn builtin_fonts() -> Vec<FontEntry> {
    vec![
        FontEntry::new("Inter", "Inter"),
        FontEntry::new("Roboto", "Roboto"),
        FontEntry::new("Playfair Display", "Playfair Display"),
    ]
}

/// Fetch the catalog, falling back to the built-in families.
pub async fn load_catalog(catalog: &dyn FontCatalog) -> Vec<FontEntry> {
    match catalog.list().await {
        Ok(fonts) if !fonts.is_empty() => fonts,
        Ok(_) => {
            log::warn!("font catalog is empty, using built-in families");
            builtin_fonts()
        }
        Err(e) => {
            log::warn!("font catalog unavailable ({e}), using built-in families");
            builtin_fonts()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontStatus {
    Loading,
    Ready,
    /// Registration failed; the family renders with the fallback stack.
    Fallback(String),
}

pub struct FontLoader<R> {
    registrar: R,
    css_base: String,
    registry: Mutex<HashMap<String, FontStatus>>,
}

impl<R: FontRegistrar> FontLoader<R> {
    pub fn new(registrar: R, css_base: impl Into<String>) -> Self {
        Self {
            registrar,
            css_base: css_base.into(),
            registry: Mutex::new(HashMap::new()),
        }
    }

    pub fn status(&self, family: &str) -> Option<FontStatus> {
        self.registry.lock().ok()?.get(family).cloned()
    }

    /// Claim `family` for registration. `Err` carries the existing status.
    fn claim(&self, family: &str) -> Result<(), FontStatus> {
        let Ok(mut registry) = self.registry.lock() else {
            return Err(FontStatus::Fallback("font registry poisoned".into()));
        };
        match registry.get(family) {
            Some(status) => Err(status.clone()),
            None => {
                registry.insert(family.to_string(), FontStatus::Loading);
                Ok(())
            }
        }
    }

    fn record(&self, family: &str, status: FontStatus) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.insert(family.to_string(), status);
        }
    }

    /// Register `family` once. Later calls return the recorded status
    /// without touching the registrar.
    pub async fn ensure(&self, family: &str) -> FontStatus {
        if let Err(status) = self.claim(family) {
            return status;
        }
        let registered = match stylesheet_url(&self.css_base, family) {
            Ok(url) => self.registrar.register(family, &url).await,
            Err(e) => Err(e),
        };
        let status = match registered {
            Ok(()) => {
                log::debug!("font {family} registered");
                FontStatus::Ready
            }
            Err(e) => {
                log::warn!("font {family} failed to load, using fallback: {e}");
                FontStatus::Fallback(e.to_string())
            }
        };
        self.record(family, status.clone());
        status
    }

    /// Ensure every family referenced by `elements`, in first-use order.
    pub async fn ensure_all(&self, elements: &[TextElement]) -> Vec<(String, FontStatus)> {
        let mut families: Vec<&str> = Vec::new();
        for el in elements {
            if !families.contains(&el.font_name.as_str()) {
                families.push(&el.font_name);
            }
        }
        let mut out = Vec::with_capacity(families.len());
        for family in families {
            out.push((family.to_string(), self.ensure(family).await));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use async_trait::async_trait;
    use ovl_core::{ElementId, Point, RichText};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Clone, Default)]
    struct CountingRegistrar {
        calls: Arc<AtomicUsize>,
        gate: Option<Arc<Notify>>,
        fail: bool,
    }

    #[async_trait]
    impl FontRegistrar for CountingRegistrar {
        async fn register(&self, _family: &str, url: &str) -> Result<(), ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(url.contains("%3Awght%40300%3B400%3B500%3B600%3B700%3B800%3B900"));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                Err(ServiceError::Other("offline".into()))
            } else {
                Ok(())
            }
        }
    }

    struct DownCatalog;

    #[async_trait]
    impl FontCatalog for DownCatalog {
        async fn list(&self) -> Result<Vec<FontEntry>, ServiceError> {
            Err(ServiceError::Other("503".into()))
        }
    }

    #[tokio::test]
    async fn registers_each_family_once() {
        let registrar = CountingRegistrar::default();
        let loader = FontLoader::new(registrar.clone(), "https://fonts/css2");
        assert_eq!(loader.ensure("Roboto").await, FontStatus::Ready);
        assert_eq!(loader.ensure("Roboto").await, FontStatus::Ready);
        assert_eq!(registrar.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn in_flight_registration_is_not_repeated() {
        let gate = Arc::new(Notify::new());
        let registrar = CountingRegistrar {
            gate: Some(gate.clone()),
            ..CountingRegistrar::default()
        };
        let loader = Arc::new(FontLoader::new(registrar.clone(), "https://fonts/css2"));

        let first = tokio::spawn({
            let loader = loader.clone();
            async move { loader.ensure("Inter").await }
        });
        while loader.status("Inter").is_none() {
            tokio::task::yield_now().await;
        }
        assert_eq!(loader.ensure("Inter").await, FontStatus::Loading);
        gate.notify_one();
        assert_eq!(first.await.unwrap(), FontStatus::Ready);
        assert_eq!(registrar.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_records_fallback() {
        let registrar = CountingRegistrar {
            fail: true,
            ..CountingRegistrar::default()
        };
        let loader = FontLoader::new(registrar, "https://fonts/css2");
        let els = [
            TextElement::new(ElementId(1), RichText::plain("a"), Point::ZERO),
            TextElement::new(ElementId(2), RichText::plain("b"), Point::ZERO),
        ];
        let statuses = loader.ensure_all(&els).await;
        assert_eq!(statuses.len(), 1);
        assert!(matches!(statuses[0].1, FontStatus::Fallback(_)));
        assert!(matches!(loader.status("Inter"), Some(FontStatus::Fallback(_))));
    }

    #[tokio::test]
    async fn catalog_falls_back_to_builtins() {
        let fonts = load_catalog(&DownCatalog).await;
        let families: Vec<_> = fonts.iter().map(|f| f.family.as_str()).collect();
        assert_eq!(families, ["Inter", "Roboto", "Playfair Display"]);
    }
}
