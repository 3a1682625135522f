//! The editing session: one image, its element list, and everything needed
//! to edit it interactively.
//!
//! The session owns the store, the viewport, the transform engine, the frame
//! throttle and the style editor, and routes host input between them. State
//! is single-threaded; the async service calls live in the client crate and
//! talk to the session through `ai_request` / `apply_ai_response` and
//! `begin_export` / `finish_export`.

use crate::ai;
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::frame::{FrameThrottle, FrameToken};
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{Focus, ShortcutAction, ShortcutMap};
use crate::style::{StyleChange, StyleEditor};
use crate::transform::{Interaction, TransformEngine};
use ovl_core::wire::{AiOverlayRequest, AiOverlayResponse, CampaignData, FontEntry};
use ovl_core::{
    CoreError, ElementId, ElementStore, InlineStyle, Point, Rect, Size, TextElement, TextRange, Viewport,
};
use ovl_render::{HitTarget, PaintOp, hit_test, paint_scene};
use serde::{Deserialize, Serialize};

/// What the host hands the editor when it opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInput {
    pub image_url: String,
    pub image_width: f64,
    pub image_height: f64,
    #[serde(default)]
    pub elements: Vec<TextElement>,
    #[serde(default)]
    pub campaign: Option<CampaignData>,
}

impl SessionInput {
    pub fn new(image_url: impl Into<String>, natural: Size) -> Self {
        Self {
            image_url: image_url.into(),
            image_width: natural.width,
            image_height: natural.height,
            elements: Vec::new(),
            campaign: None,
        }
    }

    pub fn natural_size(&self) -> Size {
        Size::new(self.image_width, self.image_height)
    }
}

/// A frozen copy of the composition for the export pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    pub image_url: String,
    pub elements: Vec<TextElement>,
}

#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    image_url: String,
    store: ElementStore,
    viewport: Viewport,
    transform: TransformEngine,
    throttle: FrameThrottle,
    style: StyleEditor,
    focus: Focus,
    campaign: Option<CampaignData>,
    error: Option<String>,
}

impl EditorSession {
    pub fn new(input: SessionInput, config: EditorConfig) -> Self {
        let natural = input.natural_size();
        let store = ElementStore::load(input.elements, config.history_limit);
        let viewport = Viewport::new(natural).with_limits(config.zoom);
        log::debug!(
            "session opened on {} ({}×{}), {} elements",
            input.image_url,
            natural.width,
            natural.height,
            store.len()
        );
        Self {
            transform: TransformEngine::new(config.handles),
            config,
            image_url: input.image_url,
            store,
            viewport,
            throttle: FrameThrottle::new(),
            style: StyleEditor::default(),
            focus: Focus::Canvas,
            campaign: input.campaign,
            error: None,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn elements(&self) -> &[TextElement] {
        self.store.elements()
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.store.selected_id()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Re-fit the image when the host's canvas area changes size.
    pub fn set_available_area(&mut self, area: Rect) {
        self.viewport.set_layout_fit(area);
    }

    pub fn interaction(&self) -> &Interaction {
        self.transform.interaction()
    }

    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.throttle.pending_token()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    /// The user-visible error notice, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.error = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_exporting(&self) -> bool {
        self.store.is_frozen()
    }

    pub fn set_font_catalog(&mut self, catalog: Vec<FontEntry>) {
        self.style.set_catalog(catalog);
    }

    pub fn font_catalog(&self) -> &[FontEntry] {
        self.style.catalog()
    }

    /// The display list for the current frame.
    pub fn paint(&self) -> Vec<PaintOp> {
        paint_scene(
            self.store.elements(),
            self.store.selected_id(),
            &self.viewport,
            self.transform.metrics(),
        )
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent) -> Result<(), EditorError> {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(Point::new(*x, *y)),
            InputEvent::PointerMove { x, y } => {
                self.pointer_move(Point::new(*x, *y));
                Ok(())
            }
            InputEvent::PointerUp { .. } => self.pointer_up().map(|_| ()),
            InputEvent::DoubleClick { x, y } => self.double_click(Point::new(*x, *y)).map(|_| ()),
            InputEvent::Wheel { delta_y } => {
                self.viewport.wheel(*delta_y);
                Ok(())
            }
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers).map(|_| ()),
        }
    }

    /// Start a gesture. A gesture still open because its pointer-up never
    /// arrived is ended first.
    pub fn pointer_down(&mut self, p: Point) -> Result<(), EditorError> {
        if self.store.is_frozen() {
            return Err(CoreError::ExportInFlight.into());
        }
        if !self.transform.interaction().is_idle() {
            log::debug!("closing {} left open by a lost pointer-up", self.transform.interaction().name());
            self.pointer_up()?;
        }
        self.focus = Focus::Canvas;
        if self.transform.pointer_down(&mut self.store, &self.viewport, p).is_some() {
            self.store.begin_gesture();
        }
        Ok(())
    }

    /// Compute the move and schedule it for the next frame.
    pub fn pointer_move(&mut self, p: Point) -> Option<FrameToken> {
        let (id, patch) = self.transform.pointer_move(&mut self.viewport, p)?;
        Some(self.throttle.schedule(id, patch))
    }

    /// Apply the pending preview, if any. Returns whether anything changed.
    pub fn on_animation_frame(&mut self) -> Result<bool, EditorError> {
        match self.throttle.take() {
            Some(update) => {
                self.store.preview_update(update.id, &update.patch)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// End the gesture: flush the last computed patch, cancel the frame,
    /// and commit one history entry if the element changed.
    pub fn pointer_up(&mut self) -> Result<bool, EditorError> {
        let finished = self.transform.pointer_up();
        let flushed = self.throttle.take();
        self.throttle.cancel();
        if finished.target().is_none() {
            return Ok(false);
        }
        if let Some(update) = flushed {
            if let Err(e) = self.store.preview_update(update.id, &update.patch) {
                self.store.end_gesture();
                return Err(e.into());
            }
        }
        let committed = self.store.end_gesture();
        log::debug!("{} ended, committed: {committed}", finished.name());
        Ok(committed)
    }

    /// Double-click on empty canvas creates a layer there; on an element it
    /// enters text editing.
    pub fn double_click(&mut self, p: Point) -> Result<Option<ElementId>, EditorError> {
        let target = hit_test(
            self.store.elements(),
            self.store.selected_id(),
            &self.viewport,
            self.transform.metrics(),
            p,
        );
        match target {
            HitTarget::Body(id) | HitTarget::Handle(id, _) => {
                self.store.select(id)?;
                self.focus = Focus::TextRegion;
                Ok(None)
            }
            HitTarget::Canvas => {
                let position = self.viewport.screen_to_pixels(p);
                self.add_layer_at(position).map(Some)
            }
        }
    }

    /// "Add Layer": a new element at the image center.
    pub fn add_layer(&mut self) -> Result<ElementId, EditorError> {
        let natural = self.viewport.natural_size();
        self.add_layer_at(Point::new(natural.width / 2.0, natural.height / 2.0))
    }

    fn add_layer_at(&mut self, position: Point) -> Result<ElementId, EditorError> {
        let element = TextElement {
            id: ElementId::UNASSIGNED,
            position,
            ai_generated: false,
            template_id: None,
            ..self.config.new_layer.clone()
        };
        Ok(self.store.add(element)?)
    }

    pub fn delete_selected(&mut self) -> Result<ElementId, EditorError> {
        let id = self.store.selected_id().ok_or(EditorError::NoSelection)?;
        self.store.remove(id)?;
        Ok(id)
    }

    /// Resolve and run a keyboard shortcut. Returns the action taken.
    pub fn key(&mut self, key: &str, modifiers: Modifiers) -> Result<Option<ShortcutAction>, EditorError> {
        let Some(action) = ShortcutMap::resolve(key, modifiers, self.focus) else {
            return Ok(None);
        };
        match action {
            ShortcutAction::Undo => {
                self.undo()?;
            }
            ShortcutAction::Redo => {
                self.redo()?;
            }
            ShortcutAction::Delete => {
                if self.store.selected_id().is_some() {
                    self.delete_selected()?;
                }
            }
            ShortcutAction::Deselect => {
                self.store.deselect();
                self.focus = Focus::Canvas;
            }
            ShortcutAction::AddLayer => {
                self.add_layer()?;
            }
            ShortcutAction::ZoomIn => {
                self.viewport.zoom_in();
            }
            ShortcutAction::ZoomOut => {
                self.viewport.zoom_out();
            }
            ShortcutAction::ZoomReset => self.viewport.reset_zoom(),
            ShortcutAction::BringForward => {
                if let Some(id) = self.store.selected_id() {
                    self.store.raise(id)?;
                }
            }
            ShortcutAction::SendBackward => {
                if let Some(id) = self.store.selected_id() {
                    self.store.lower(id)?;
                }
            }
        }
        Ok(Some(action))
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> u16 {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> u16 {
        self.viewport.zoom_out()
    }

    pub fn set_zoom(&mut self, percent: i32) -> u16 {
        self.viewport.set_zoom(percent)
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset_zoom();
    }

    // ─── Store ───────────────────────────────────────────────────────────

    pub fn select(&mut self, id: ElementId) -> Result<(), EditorError> {
        Ok(self.store.select(id)?)
    }

    pub fn deselect(&mut self) {
        self.store.deselect();
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), EditorError> {
        Ok(self.store.reorder(from, to)?)
    }

    /// No-op at the oldest snapshot and while a gesture is open.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        Ok(self.store.undo()?)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        Ok(self.store.redo()?)
    }

    // ─── Style ───────────────────────────────────────────────────────────

    pub fn set_style(&mut self, change: StyleChange) -> Result<(), EditorError> {
        self.style.apply(&mut self.store, change)
    }

    pub fn begin_slider(&mut self) -> Result<(), EditorError> {
        self.style.begin_slider(&mut self.store)
    }

    pub fn end_slider(&mut self) -> bool {
        self.style.end_slider(&mut self.store)
    }

    pub fn toggle_shadow(&mut self) -> Result<bool, EditorError> {
        self.style.toggle_shadow(&mut self.store)
    }

    pub fn apply_inline(&mut self, range: TextRange, style: InlineStyle) -> Result<(), EditorError> {
        self.style.apply_inline(&mut self.store, range, style)
    }

    // ─── AI overlays ─────────────────────────────────────────────────────

    pub fn campaign(&self) -> Option<&CampaignData> {
        self.campaign.as_ref()
    }

    pub fn ai_available(&self) -> bool {
        self.campaign.is_some()
    }

    /// The generation request for this image, if campaign data is present.
    pub fn ai_request(&self) -> Result<AiOverlayRequest, EditorError> {
        let campaign = self.campaign.as_ref().ok_or(EditorError::AiUnavailable)?;
        Ok(AiOverlayRequest::new(campaign, &self.image_url))
    }

    pub fn apply_ai_response(&mut self, response: &AiOverlayResponse) -> Result<Vec<ElementId>, EditorError> {
        let ids = ai::merge(&mut self.store, response, self.viewport.natural_size())?;
        self.error = None;
        Ok(ids)
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Freeze the list and hand back what the pipeline needs. Any open
    /// gesture or slider drag is closed first.
    pub fn begin_export(&mut self) -> Result<ExportJob, EditorError> {
        if !self.transform.interaction().is_idle() {
            self.pointer_up()?;
        }
        self.style.end_slider(&mut self.store);
        let elements = self.store.freeze()?;
        log::debug!("export started with {} elements", elements.len());
        Ok(ExportJob {
            image_url: self.image_url.clone(),
            elements,
        })
    }

    /// Unfreeze after the pipeline finished, successfully or not.
    pub fn finish_export(&mut self) {
        self.store.thaw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovl_core::RichText;
    use pretty_assertions::assert_eq;

    fn session() -> EditorSession {
        EditorSession::new(
            SessionInput::new("https://cdn/photo.png", Size::new(1000.0, 800.0)),
            EditorConfig::default(),
        )
    }

    #[test]
    fn double_click_on_element_enters_text_editing() {
        let mut s = session();
        let id = s.double_click(Point::new(500.0, 400.0)).unwrap().unwrap();
        s.deselect();
        assert_eq!(s.double_click(Point::new(510.0, 400.0)).unwrap(), None);
        assert_eq!(s.selected_id(), Some(id));
        assert_eq!(s.focus(), Focus::TextRegion);
        assert_eq!(s.elements().len(), 1);
    }

    #[test]
    fn delete_key_ignored_while_typing() {
        let mut s = session();
        s.add_layer().unwrap();
        s.set_focus(Focus::TextRegion);
        assert_eq!(s.key("Backspace", Modifiers::NONE).unwrap(), None);
        assert_eq!(s.elements().len(), 1);
        s.set_focus(Focus::Canvas);
        assert_eq!(s.key("Delete", Modifiers::NONE).unwrap(), Some(ShortcutAction::Delete));
        assert!(s.elements().is_empty());
    }

    #[test]
    fn frames_apply_at_most_one_preview() {
        let mut s = session();
        let id = s.add_layer().unwrap();
        s.pointer_down(Point::new(500.0, 400.0)).unwrap();
        s.pointer_move(Point::new(510.0, 400.0));
        s.pointer_move(Point::new(520.0, 400.0));
        s.pointer_move(Point::new(530.0, 400.0));
        assert!(s.on_animation_frame().unwrap());
        assert!(!s.on_animation_frame().unwrap());
        assert_eq!(s.store().get(id).unwrap().position, Point::new(530.0, 400.0));
    }

    #[test]
    fn pointer_up_flushes_pending_move() {
        let mut s = session();
        let id = s.add_layer().unwrap();
        s.pointer_down(Point::new(500.0, 400.0)).unwrap();
        s.pointer_move(Point::new(540.0, 430.0));
        assert!(s.pointer_up().unwrap());
        assert_eq!(s.pending_frame(), None);
        assert_eq!(s.store().get(id).unwrap().position, Point::new(540.0, 430.0));
    }

    #[test]
    fn ai_needs_campaign() {
        let mut s = session();
        assert!(!s.ai_available());
        assert_eq!(s.ai_request().unwrap_err(), EditorError::AiUnavailable);

        let mut input = SessionInput::new("u", Size::new(10.0, 10.0));
        input.campaign = Some(CampaignData {
            content: "Big sale".into(),
            ..CampaignData::default()
        });
        s = EditorSession::new(input, EditorConfig::default());
        assert_eq!(s.ai_request().unwrap().content, "Big sale");
    }

    #[test]
    fn export_freezes_until_finished() {
        let mut s = session();
        s.add_layer().unwrap();
        let job = s.begin_export().unwrap();
        assert_eq!(job.elements.len(), 1);
        assert_eq!(job.image_url, "https://cdn/photo.png");
        assert!(s.is_exporting());
        assert_eq!(s.add_layer(), Err(EditorError::Core(CoreError::ExportInFlight)));
        assert_eq!(s.undo(), Err(EditorError::Core(CoreError::ExportInFlight)));
        assert!(s.pointer_down(Point::new(1.0, 1.0)).is_err());
        s.finish_export();
        assert!(s.add_layer().is_ok());
    }

    #[test]
    fn inverted_zoom_config_is_normalized() {
        let config = EditorConfig {
            zoom: ovl_core::ZoomLimits {
                min: 150,
                max: 100,
                step: 10,
            },
            ..EditorConfig::default()
        };
        let mut s = EditorSession::new(SessionInput::new("u", Size::new(100.0, 100.0)), config);
        assert_eq!(s.viewport().zoom(), 100);
        for _ in 0..6 {
            s.zoom_in();
        }
        assert_eq!(s.viewport().zoom(), 150);
    }

    #[test]
    fn loads_initial_elements_and_seeds_ids() {
        let mut input = SessionInput::new("u", Size::new(100.0, 100.0));
        input.elements = vec![TextElement::new(ElementId(7), RichText::plain("old"), Point::ZERO)];
        let mut s = EditorSession::new(input, EditorConfig::default());
        assert_eq!(s.add_layer().unwrap(), ElementId(8));
        assert!(!s.store().can_redo());
    }
}
