//! Pointer gestures as a single state machine.
//!
//! Exactly one [`Interaction`] is active at a time. Pointer-down picks the
//! interaction from the hit target; every move computes a fresh
//! [`ElementPatch`] relative to the state captured at gesture start (never
//! incrementally), which the session schedules for the next animation frame.
//! Pointer-up returns to `Idle`.

use kurbo::{Point, Vec2};
use ovl_core::{ElementId, ElementPatch, ElementStore, TextElement, Viewport, limits, normalize_rotation};
use ovl_render::{Handle, HandleMetrics, HitTarget, ResizeHandle, hit_test};

#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Idle,
    Dragging {
        id: ElementId,
        /// Pointer minus the element's screen anchor at gesture start.
        grab_offset: Vec2,
    },
    Resizing {
        id: ElementId,
        handle: ResizeHandle,
        start_pointer: Point,
        start_width: f64,
        start_height: f64,
        start_font_size: f64,
    },
    Rotating {
        id: ElementId,
        /// Element center in screen space.
        center: Point,
        start_angle: f64,
        start_rotation: f64,
    },
    Panning {
        last: Point,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// The element being transformed, if any.
    pub fn target(&self) -> Option<ElementId> {
        match self {
            Interaction::Dragging { id, .. }
            | Interaction::Resizing { id, .. }
            | Interaction::Rotating { id, .. } => Some(*id),
            Interaction::Idle | Interaction::Panning { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::Dragging { .. } => "dragging",
            Interaction::Resizing { .. } => "resizing",
            Interaction::Rotating { .. } => "rotating",
            Interaction::Panning { .. } => "panning",
        }
    }
}

/// Angle in degrees from `center` to `p`, screen space (y down).
fn pointer_angle(center: Point, p: Point) -> f64 {
    let d = p - center;
    d.y.atan2(d.x).to_degrees()
}

/// Corner handles scale the font. The delta's direction picks the sign:
/// toward bottom/right grows, anything else shrinks.
pub fn corner_font_size(start_font_size: f64, delta: Vec2) -> f64 {
    let sign = if delta.x + delta.y > 0.0 { 1.0 } else { -1.0 };
    (start_font_size + sign * 0.5 * delta.hypot()).max(limits::MIN_FONT_SIZE)
}

/// Edge handles change one dimension; `delta` is in image pixels.
pub fn edge_resize(handle: ResizeHandle, width: f64, height: f64, delta: Vec2) -> ElementPatch {
    let floor = limits::MIN_BOX_SIZE;
    match handle {
        ResizeHandle::Right => ElementPatch::resized(Some((width + delta.x).max(floor)), None),
        ResizeHandle::Left => ElementPatch::resized(Some((width - delta.x).max(floor)), None),
        ResizeHandle::Bottom => ElementPatch::resized(None, Some((height + delta.y).max(floor))),
        ResizeHandle::Top => ElementPatch::resized(None, Some((height - delta.y).max(floor))),
        _ => ElementPatch::default(),
    }
}

#[derive(Debug, Clone)]
pub struct TransformEngine {
    interaction: Interaction,
    metrics: HandleMetrics,
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new(HandleMetrics::default())
    }
}

impl TransformEngine {
    pub fn new(metrics: HandleMetrics) -> Self {
        Self {
            interaction: Interaction::Idle,
            metrics,
        }
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn metrics(&self) -> &HandleMetrics {
        &self.metrics
    }

    /// Start a gesture at screen point `p`.
    ///
    /// Selects (or deselects) as a side effect. Returns the element a
    /// transform was started on, so the caller can open a history batch.
    pub fn pointer_down(&mut self, store: &mut ElementStore, viewport: &Viewport, p: Point) -> Option<ElementId> {
        let target = hit_test(store.elements(), store.selected_id(), viewport, &self.metrics, p);
        self.interaction = match target {
            HitTarget::Handle(id, handle) => match store.get(id) {
                Some(el) => Self::start_handle(el, handle, viewport, p),
                None => Interaction::Idle,
            },
            HitTarget::Body(id) => match store.get(id) {
                Some(el) => Interaction::Dragging {
                    id,
                    grab_offset: p - viewport.pixels_to_screen(el.position),
                },
                None => Interaction::Idle,
            },
            HitTarget::Canvas => Interaction::Panning { last: p },
        };

        match self.interaction.target() {
            Some(id) => {
                // The id came from the hit test over the same list.
                let _ = store.select(id);
            }
            None => store.deselect(),
        }
        log::debug!("pointer down {:?} → {}", target, self.interaction.name());
        self.interaction.target()
    }

    fn start_handle(el: &TextElement, handle: Handle, viewport: &Viewport, p: Point) -> Interaction {
        match handle {
            Handle::Rotate => {
                let center = viewport.pixels_to_screen(el.position);
                Interaction::Rotating {
                    id: el.id,
                    center,
                    start_angle: pointer_angle(center, p),
                    start_rotation: el.rotation,
                }
            }
            Handle::Resize(handle) => Interaction::Resizing {
                id: el.id,
                handle,
                start_pointer: p,
                start_width: el.width,
                start_height: el.height,
                start_font_size: el.font_size,
            },
        }
    }

    /// Compute the update for a pointer at `p`.
    ///
    /// Panning applies straight to the viewport and yields nothing; element
    /// transforms yield the patch to preview on the next frame.
    pub fn pointer_move(&mut self, viewport: &mut Viewport, p: Point) -> Option<(ElementId, ElementPatch)> {
        let update = match &mut self.interaction {
            Interaction::Idle => None,
            Interaction::Panning { last } => {
                viewport.pan_by(p - *last);
                *last = p;
                None
            }
            Interaction::Dragging { id, grab_offset } => {
                let position = viewport.screen_to_pixels(p - *grab_offset);
                Some((*id, ElementPatch::moved_to(position)))
            }
            Interaction::Resizing {
                id,
                handle,
                start_pointer,
                start_width,
                start_height,
                start_font_size,
            } => {
                let delta = p - *start_pointer;
                let patch = if handle.is_corner() {
                    ElementPatch::font_size(corner_font_size(*start_font_size, delta))
                } else {
                    let delta = viewport.screen_delta_to_pixels(delta);
                    edge_resize(*handle, *start_width, *start_height, delta)
                };
                Some((*id, patch))
            }
            Interaction::Rotating {
                id,
                center,
                start_angle,
                start_rotation,
            } => {
                let angle = pointer_angle(*center, p);
                let rotation = normalize_rotation(*start_rotation + (angle - *start_angle));
                Some((*id, ElementPatch::rotated(rotation)))
            }
        };
        if let Some((id, patch)) = &update {
            log::trace!("{} {id}: {patch:?}", self.interaction.name());
        }
        update
    }

    /// End the gesture. Returns the interaction that just finished.
    pub fn pointer_up(&mut self) -> Interaction {
        std::mem::replace(&mut self.interaction, Interaction::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use ovl_core::RichText;
    use pretty_assertions::assert_eq;

    fn setup() -> (ElementStore, Viewport, ElementId) {
        let mut store = ElementStore::new();
        let el = TextElement {
            width: 200.0,
            height: 100.0,
            ..TextElement::new(ElementId::UNASSIGNED, RichText::plain("Hi"), Point::new(500.0, 400.0))
        };
        let id = store.add(el).unwrap();
        store.deselect();
        (store, Viewport::new(Size::new(1000.0, 800.0)), id)
    }

    #[test]
    fn body_press_drags_and_selects() {
        let (mut store, mut vp, id) = setup();
        let mut engine = TransformEngine::default();
        assert_eq!(engine.pointer_down(&mut store, &vp, Point::new(520.0, 410.0)), Some(id));
        assert_eq!(store.selected_id(), Some(id));

        let (target, patch) = engine.pointer_move(&mut vp, Point::new(620.0, 410.0)).unwrap();
        assert_eq!(target, id);
        assert_eq!(patch.position, Some(Point::new(600.0, 400.0)));
        assert!(matches!(engine.pointer_up(), Interaction::Dragging { .. }));
        assert!(engine.interaction().is_idle());
    }

    #[test]
    fn canvas_press_pans_and_deselects() {
        let (mut store, mut vp, id) = setup();
        store.select(id).unwrap();
        let mut engine = TransformEngine::default();
        assert_eq!(engine.pointer_down(&mut store, &vp, Point::new(10.0, 10.0)), None);
        assert_eq!(store.selected_id(), None);
        assert!(engine.pointer_move(&mut vp, Point::new(30.0, 5.0)).is_none());
        assert!(engine.pointer_move(&mut vp, Point::new(40.0, 5.0)).is_none());
        assert_eq!(vp.pan(), Vec2::new(30.0, -5.0));
        assert_eq!(store.get(id).unwrap().position, Point::new(500.0, 400.0));
    }

    #[test]
    fn corner_resize_scales_font_by_direction() {
        assert_eq!(corner_font_size(48.0, Vec2::new(30.0, 40.0)), 73.0);
        assert_eq!(corner_font_size(48.0, Vec2::new(-30.0, -40.0)), 23.0);
        assert_eq!(corner_font_size(20.0, Vec2::new(-300.0, 0.0)), limits::MIN_FONT_SIZE);
    }

    #[test]
    fn edge_resize_respects_floor() {
        let patch = edge_resize(ResizeHandle::Left, 200.0, 100.0, Vec2::new(40.0, 0.0));
        assert_eq!(patch.width, Some(160.0));
        let patch = edge_resize(ResizeHandle::Top, 200.0, 100.0, Vec2::new(0.0, 90.0));
        assert_eq!(patch.height, Some(limits::MIN_BOX_SIZE));
        assert_eq!(patch.width, None);
    }

    #[test]
    fn edge_resize_converts_screen_delta() {
        let (mut store, mut vp, id) = setup();
        store.select(id).unwrap();
        vp.set_zoom(200);
        let mut engine = TransformEngine::default();
        // Right edge of a 200-wide box at 2× sits 200 screen px right of center.
        engine.pointer_down(&mut store, &vp, Point::new(700.0, 400.0));
        assert!(matches!(
            engine.interaction(),
            Interaction::Resizing { handle: ResizeHandle::Right, .. }
        ));
        let (_, patch) = engine.pointer_move(&mut vp, Point::new(800.0, 400.0)).unwrap();
        assert_eq!(patch.width, Some(250.0));
    }

    #[test]
    fn rotate_handle_tracks_pointer_angle() {
        let (mut store, mut vp, id) = setup();
        store.select(id).unwrap();
        let mut engine = TransformEngine::default();
        // Rotate handle: 30 px above the top edge, straight up from center.
        engine.pointer_down(&mut store, &vp, Point::new(500.0, 320.0));
        assert!(matches!(engine.interaction(), Interaction::Rotating { .. }));
        // A quarter turn clockwise: pointer to the right of center.
        let (_, patch) = engine.pointer_move(&mut vp, Point::new(600.0, 400.0)).unwrap();
        let rotation = patch.rotation.unwrap();
        assert!((rotation - 90.0).abs() < 1e-9, "{rotation}");
        // Past the seam at ±180 the value normalizes.
        let (_, patch) = engine.pointer_move(&mut vp, Point::new(499.0, 500.0)).unwrap();
        let rotation = patch.rotation.unwrap();
        assert!(rotation < -179.0 && rotation > -180.0, "{rotation}");
    }
}
