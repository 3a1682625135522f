//! Sequential export pipeline.
//!
//! The original image is fetched once, then every element is composited in
//! paint order: step N's output image is step N+1's input. Steps are awaited
//! one after another, never concurrently. Intermediate images live only in
//! this function; on failure they are dropped and the caller keeps the
//! original image URL.

use crate::error::ExportError;
use crate::services::{Compositor, ImageFetcher};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ovl_core::TextElement;
use ovl_core::wire::ImageRef;
use ovl_editor::{EditorSession, ExportJob};

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    /// Final composited image; a `data:` URL when the service returned base64.
    pub image_url: String,
    pub elements: Vec<TextElement>,
}

/// Run the pipeline over a frozen job.
pub async fn run_export(
    job: &ExportJob,
    fetcher: &dyn ImageFetcher,
    compositor: &dyn Compositor,
) -> Result<ExportOutcome, ExportError> {
    if job.elements.is_empty() {
        log::debug!("nothing to composite, keeping {}", job.image_url);
        return Ok(ExportOutcome {
            image_url: job.image_url.clone(),
            elements: Vec::new(),
        });
    }

    let original = fetcher.fetch(&job.image_url).await.map_err(|e| {
        log::error!("export aborted fetching {}: {e}", job.image_url);
        ExportError::Fetch(e)
    })?;
    let mut current = ImageRef::Base64(STANDARD.encode(&original));

    for (index, element) in job.elements.iter().enumerate() {
        let step = index + 1;
        log::debug!("compositing step {step}/{} (element {})", job.elements.len(), element.id);
        current = compositor.composite(&current, element).await.map_err(|source| {
            log::error!("export aborted at step {step} (element {}): {source}", element.id);
            ExportError::Step {
                step,
                element: element.id,
                source,
            }
        })?;
    }

    Ok(ExportOutcome {
        image_url: current.to_url(),
        elements: job.elements.clone(),
    })
}

/// Thaws the session when dropped, including when the export future is
/// cancelled mid-step.
struct Frozen<'a>(&'a mut EditorSession);

impl Drop for Frozen<'_> {
    fn drop(&mut self) {
        self.0.finish_export();
    }
}

/// Freeze the session, export, and thaw it again whatever the outcome,
/// even if the returned future is dropped before completing.
///
/// `on_apply` receives the final URL and the element list only on success.
/// On failure the session's error notice is set and nothing is applied.
pub async fn export_session<F>(
    session: &mut EditorSession,
    fetcher: &dyn ImageFetcher,
    compositor: &dyn Compositor,
    on_apply: F,
) -> Result<ExportOutcome, ExportError>
where
    F: FnOnce(&str, &[TextElement]),
{
    let job = session.begin_export()?;
    let frozen = Frozen(&mut *session);
    let result = run_export(&job, fetcher, compositor).await;
    drop(frozen);

    match result {
        Ok(outcome) => {
            session.clear_error();
            on_apply(&outcome.image_url, &outcome.elements);
            Ok(outcome)
        }
        Err(e) => {
            session.set_error(format!("export failed: {e}"));
            Err(e)
        }
    }
}
