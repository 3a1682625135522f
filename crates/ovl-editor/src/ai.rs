//! Merge AI-generated overlays into the store.
//!
//! The service positions elements in percent of the image; they are
//! converted to natural pixels here and appended on top of whatever the user
//! already placed. Ids come from the store's counter, never the response.

use ovl_core::wire::{AiOverlayElement, AiOverlayResponse};
use ovl_core::{ElementId, ElementStore, Point, Size, TextElement};

/// Build an element from one generated entry. Missing style fields keep the
/// element defaults.
pub fn convert_element(entry: &AiOverlayElement, natural: Size, template_id: Option<&str>) -> TextElement {
    let [px, py] = entry.position;
    let mut el = TextElement {
        ai_generated: true,
        template_id: template_id.map(str::to_string),
        ..TextElement::default()
    };
    entry.style.apply(&mut el);
    el.position = Point::new(px * natural.width / 100.0, py * natural.height / 100.0);
    el.id = ElementId::UNASSIGNED;
    el.sanitize();
    el
}

pub fn convert(response: &AiOverlayResponse, natural: Size) -> Vec<TextElement> {
    let template = response.template_id.as_deref();
    response
        .overlay_elements
        .iter()
        .map(|entry| convert_element(entry, natural, template))
        .collect()
}

/// Append every generated element as one history entry and select the first.
/// An empty response changes nothing.
pub fn merge(
    store: &mut ElementStore,
    response: &AiOverlayResponse,
    natural: Size,
) -> Result<Vec<ElementId>, ovl_core::CoreError> {
    let elements = convert(response, natural);
    let ids = store.extend(elements)?;
    log::debug!(
        "merged {} AI elements (template {:?}, quality {:?})",
        ids.len(),
        response.template_id,
        response.quality_score
    );
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovl_core::RichText;
    use pretty_assertions::assert_eq;

    fn response() -> AiOverlayResponse {
        serde_json::from_str(
            r##"{
                "overlay_elements": [
                    {"position": [50, 10], "text": "Summer", "font_size": 72},
                    {"position": [25, 90], "text": "<i>now</i>", "color": "#FFCC00", "font_weight": "bold"}
                ],
                "template_id": "headline-cta",
                "quality_score": 0.9
            }"##,
        )
        .unwrap()
    }

    #[test]
    fn converts_percent_to_pixels() {
        let els = convert(&response(), Size::new(1000.0, 800.0));
        assert_eq!(els[0].position, Point::new(500.0, 80.0));
        assert_eq!(els[1].position, Point::new(250.0, 720.0));
        assert_eq!(els[0].font_size, 72.0);
        assert_eq!(els[1].font_size, 48.0);
        assert!(els.iter().all(|e| e.ai_generated));
        assert_eq!(els[1].template_id.as_deref(), Some("headline-cta"));
    }

    #[test]
    fn merge_appends_and_selects_first() {
        let mut store = ElementStore::new();
        let manual = store
            .add(TextElement::new(ElementId::UNASSIGNED, RichText::plain("mine"), Point::ZERO))
            .unwrap();
        let before = store.history().len();

        let ids = merge(&mut store, &response(), Size::new(1000.0, 800.0)).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(store.len(), 3);
        assert_eq!(store.elements()[0].id, manual);
        assert!(!ids.contains(&manual));
        assert_eq!(store.selected_id(), Some(ids[0]));
        assert_eq!(store.history().len(), before + 1);
    }

    #[test]
    fn empty_response_is_noop() {
        let mut store = ElementStore::new();
        let before = store.history().len();
        let ids = merge(&mut store, &AiOverlayResponse::default(), Size::new(10.0, 10.0)).unwrap();
        assert!(ids.is_empty());
        assert_eq!(store.history().len(), before);
    }
}
