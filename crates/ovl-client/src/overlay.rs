//! AI overlay generation flow.

use crate::error::ClientError;
use crate::services::OverlayGenerator;
use ovl_core::ElementId;
use ovl_editor::EditorSession;

/// Request overlays for the session's image and merge them in.
///
/// On any failure the element list and selection are left as they were and
/// the message is set as the session's error notice.
pub async fn generate_overlays(
    session: &mut EditorSession,
    generator: &dyn OverlayGenerator,
) -> Result<Vec<ElementId>, ClientError> {
    let request = session.ai_request()?;
    log::debug!("requesting AI overlays for {}", request.image_url);

    let response = match generator.generate(&request).await {
        Ok(response) => response,
        Err(e) => {
            session.set_error(format!("AI overlay generation failed: {e}"));
            return Err(e.into());
        }
    };
    match session.apply_ai_response(&response) {
        Ok(ids) => Ok(ids),
        Err(e) => {
            session.set_error(format!("could not add generated overlays: {e}"));
            Err(e.into())
        }
    }
}
