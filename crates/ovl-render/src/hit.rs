//! Hit testing: screen point → element, resize handle, or rotate handle.
//!
//! Elements are tested front-to-back (last in the list first). Handles are
//! only live on the selected element and take priority over every body, so a
//! handle overlapping a higher element still grabs the handle.

use kurbo::{Affine, Point, Size};
use ovl_core::{ElementId, TextElement, Viewport};
use serde::{Deserialize, Serialize};

/// One of the eight resize handles around an element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::Top,
        ResizeHandle::TopRight,
        ResizeHandle::Right,
        ResizeHandle::BottomRight,
        ResizeHandle::Bottom,
        ResizeHandle::BottomLeft,
        ResizeHandle::Left,
    ];

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopLeft
                | ResizeHandle::TopRight
                | ResizeHandle::BottomRight
                | ResizeHandle::BottomLeft
        )
    }

    /// Position relative to the box center, in half-extents (−1, 0, or 1).
    pub fn unit_offset(self) -> (f64, f64) {
        match self {
            ResizeHandle::TopLeft => (-1.0, -1.0),
            ResizeHandle::Top => (0.0, -1.0),
            ResizeHandle::TopRight => (1.0, -1.0),
            ResizeHandle::Right => (1.0, 0.0),
            ResizeHandle::BottomRight => (1.0, 1.0),
            ResizeHandle::Bottom => (0.0, 1.0),
            ResizeHandle::BottomLeft => (-1.0, 1.0),
            ResizeHandle::Left => (-1.0, 0.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeHandle::TopLeft => "top-left",
            ResizeHandle::Top => "top",
            ResizeHandle::TopRight => "top-right",
            ResizeHandle::Right => "right",
            ResizeHandle::BottomRight => "bottom-right",
            ResizeHandle::Bottom => "bottom",
            ResizeHandle::BottomLeft => "bottom-left",
            ResizeHandle::Left => "left",
        }
    }
}

/// A grabbable decoration on the selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Resize(ResizeHandle),
    Rotate,
}

/// What a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Handle(ElementId, Handle),
    Body(ElementId),
    Canvas,
}

/// Handle sizing, in screen pixels so handles stay grabbable at any zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleMetrics {
    /// Pointer distance within which a handle counts as hit.
    pub hit_radius: f64,
    /// Distance of the rotate handle above the top edge.
    pub rotate_offset: f64,
}

impl Default for HandleMetrics {
    fn default() -> Self {
        Self {
            hit_radius: 8.0,
            rotate_offset: 30.0,
        }
    }
}

/// Screen-space placement of one element: center, size, and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementFrame {
    pub center: Point,
    pub size: Size,
    /// Radians, clockwise in screen space (y down).
    pub angle: f64,
}

impl ElementFrame {
    pub fn of(element: &TextElement, viewport: &Viewport) -> Self {
        let scale = viewport.display_scale();
        Self {
            center: viewport.pixels_to_screen(element.position),
            size: element.size() * scale,
            angle: element.rotation.to_radians(),
        }
    }

    /// Box-local (origin at center, unrotated) → screen.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.center.to_vec2()) * Affine::rotate(self.angle)
    }

    fn local(&self, x: f64, y: f64) -> Point {
        self.transform() * Point::new(x, y)
    }

    pub fn contains(&self, screen: Point) -> bool {
        let p = self.transform().inverse() * screen;
        p.x.abs() <= self.size.width / 2.0 && p.y.abs() <= self.size.height / 2.0
    }

    /// Corners clockwise from top-left.
    pub fn corners(&self) -> [Point; 4] {
        let (hw, hh) = (self.size.width / 2.0, self.size.height / 2.0);
        [
            self.local(-hw, -hh),
            self.local(hw, -hh),
            self.local(hw, hh),
            self.local(-hw, hh),
        ]
    }

    pub fn handle_position(&self, handle: ResizeHandle) -> Point {
        let (ux, uy) = handle.unit_offset();
        self.local(ux * self.size.width / 2.0, uy * self.size.height / 2.0)
    }

    pub fn rotate_handle_position(&self, metrics: &HandleMetrics) -> Point {
        self.local(0.0, -self.size.height / 2.0 - metrics.rotate_offset)
    }
}

fn within(a: Point, b: Point, radius: f64) -> bool {
    (a - b).hypot() <= radius
}

/// Which handle of `frame` (if any) is under `screen`.
pub fn hit_handle(frame: &ElementFrame, metrics: &HandleMetrics, screen: Point) -> Option<Handle> {
    if within(frame.rotate_handle_position(metrics), screen, metrics.hit_radius) {
        return Some(Handle::Rotate);
    }
    ResizeHandle::ALL
        .into_iter()
        .find(|&h| within(frame.handle_position(h), screen, metrics.hit_radius))
        .map(Handle::Resize)
}

/// Topmost element whose body contains `screen`.
pub fn hit_test_body(elements: &[TextElement], viewport: &Viewport, screen: Point) -> Option<ElementId> {
    elements
        .iter()
        .rev()
        .find(|el| ElementFrame::of(el, viewport).contains(screen))
        .map(|el| el.id)
}

/// Resolve a pointer position against the selection's handles, then bodies.
pub fn hit_test(
    elements: &[TextElement],
    selected: Option<ElementId>,
    viewport: &Viewport,
    metrics: &HandleMetrics,
    screen: Point,
) -> HitTarget {
    if let Some(el) = selected.and_then(|id| elements.iter().find(|e| e.id == id)) {
        let frame = ElementFrame::of(el, viewport);
        if let Some(handle) = hit_handle(&frame, metrics, screen) {
            return HitTarget::Handle(el.id, handle);
        }
    }
    match hit_test_body(elements, viewport, screen) {
        Some(id) => HitTarget::Body(id),
        None => HitTarget::Canvas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ovl_core::RichText;

    fn element(id: u64, x: f64, y: f64, rotation: f64) -> TextElement {
        TextElement {
            width: 200.0,
            height: 100.0,
            rotation,
            ..TextElement::new(ElementId(id), RichText::plain("t"), Point::new(x, y))
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(Size::new(1000.0, 800.0))
    }

    #[test]
    fn topmost_body_wins_ties() {
        let els = [element(1, 500.0, 400.0, 0.0), element(2, 520.0, 400.0, 0.0)];
        let vp = viewport();
        assert_eq!(hit_test_body(&els, &vp, Point::new(510.0, 400.0)), Some(ElementId(2)));
        assert_eq!(hit_test_body(&els, &vp, Point::new(405.0, 400.0)), Some(ElementId(1)));
        assert_eq!(hit_test_body(&els, &vp, Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn rotated_body_uses_rotated_box() {
        let els = [element(1, 500.0, 400.0, 90.0)];
        let vp = viewport();
        // After 90° the box is 100 wide and 200 tall.
        assert_eq!(hit_test_body(&els, &vp, Point::new(500.0, 490.0)), Some(ElementId(1)));
        assert_eq!(hit_test_body(&els, &vp, Point::new(590.0, 400.0)), None);
    }

    #[test]
    fn handles_only_on_selected() {
        let els = [element(1, 500.0, 400.0, 0.0)];
        let vp = viewport();
        let m = HandleMetrics::default();
        let corner = Point::new(600.0, 450.0);
        assert_eq!(hit_test(&els, None, &vp, &m, corner), HitTarget::Body(ElementId(1)));
        assert_eq!(
            hit_test(&els, Some(ElementId(1)), &vp, &m, corner),
            HitTarget::Handle(ElementId(1), Handle::Resize(ResizeHandle::BottomRight))
        );
        assert_eq!(
            hit_test(&els, Some(ElementId(1)), &vp, &m, Point::new(500.0, 320.0)),
            HitTarget::Handle(ElementId(1), Handle::Rotate)
        );
        assert_eq!(
            hit_test(&els, Some(ElementId(1)), &vp, &m, Point::new(403.0, 398.0)),
            HitTarget::Handle(ElementId(1), Handle::Resize(ResizeHandle::Left))
        );
    }

    #[test]
    fn frame_follows_zoom() {
        let el = element(1, 500.0, 400.0, 0.0);
        let mut vp = viewport();
        vp.set_zoom(200);
        let frame = ElementFrame::of(&el, &vp);
        assert_eq!(frame.center, Point::new(500.0, 400.0));
        assert_eq!(frame.size, Size::new(400.0, 200.0));
        let top_left = frame.handle_position(ResizeHandle::TopLeft);
        assert!((top_left - Point::new(300.0, 300.0)).hypot() < 1e-9);
    }
}
