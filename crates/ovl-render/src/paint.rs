//! Element list → display list.
//!
//! The host owns the actual drawing surface. This module walks the elements
//! in z-order and emits [`PaintOp`]s with every geometric quantity already in
//! screen pixels, so the host only has to replay them.

use crate::hit::{ElementFrame, HandleMetrics, ResizeHandle};
use kurbo::{Affine, Point, Rect, Size};
use ovl_core::{
    Background, Color, ElementId, FontStyle, Span, TextAlign, TextDecoration, TextElement, Viewport,
};

/// `'Family', system-ui, sans-serif`: the family with the platform fallback.
pub fn font_stack(family: &str) -> String {
    format!("'{}', system-ui, sans-serif", family.replace('\'', ""))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub blur: f64,
    pub offset: (f64, f64),
}

/// Text styling scaled into screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_stack: String,
    pub font_size: f64,
    pub font_weight: u16,
    pub font_style: FontStyle,
    pub decoration: TextDecoration,
    pub align: TextAlign,
    pub color: Color,
    pub stroke: Option<(f64, Color)>,
    pub shadow: Option<Shadow>,
    pub letter_spacing: f64,
    pub line_height: f64,
    /// Element opacity as 0.0–1.0.
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    /// The base image filling the surface rect.
    Image { rect: Rect },
    /// A box fill behind an element's text.
    Background {
        id: ElementId,
        transform: Affine,
        size: Size,
        color: Color,
    },
    /// An element's text. `transform` maps box-local coordinates (origin
    /// at the box center) to screen.
    Text {
        id: ElementId,
        transform: Affine,
        size: Size,
        spans: Vec<Span>,
        style: TextStyle,
    },
    /// Outline and handles around the selected element.
    Selection {
        id: ElementId,
        corners: [Point; 4],
        handles: [(ResizeHandle, Point); 8],
        rotate_handle: Point,
    },
}

fn text_style(el: &TextElement, scale: f64) -> TextStyle {
    TextStyle {
        font_stack: font_stack(&el.font_name),
        font_size: el.font_size * scale,
        font_weight: el.font_weight,
        font_style: el.font_style,
        decoration: el.text_decoration,
        align: el.text_align,
        color: el.color,
        stroke: (el.stroke_width > 0.0).then(|| (el.stroke_width * scale, el.stroke_color)),
        shadow: el.shadow_enabled.then(|| Shadow {
            color: el.shadow_color,
            blur: el.shadow_blur * scale,
            offset: (el.shadow_offset_x * scale, el.shadow_offset_y * scale),
        }),
        letter_spacing: el.letter_spacing * scale,
        line_height: el.line_height,
        alpha: el.opacity / 100.0,
    }
}

fn paint_element(ops: &mut Vec<PaintOp>, el: &TextElement, viewport: &Viewport) {
    let frame = ElementFrame::of(el, viewport);
    let transform = frame.transform();

    if let Background::Solid(color) = el.background_color {
        ops.push(PaintOp::Background {
            id: el.id,
            transform,
            size: frame.size,
            color: color.with_opacity(el.background_opacity),
        });
    }

    log::trace!(
        "TEXT {} {:?} at ({:.1}, {:.1}) rot {}",
        el.id,
        el.text.plain_text(),
        frame.center.x,
        frame.center.y,
        el.rotation
    );
    ops.push(PaintOp::Text {
        id: el.id,
        transform,
        size: frame.size,
        spans: el.text.spans().to_vec(),
        style: text_style(el, viewport.display_scale()),
    });
}

fn paint_selection(el: &TextElement, viewport: &Viewport, metrics: &HandleMetrics) -> PaintOp {
    let frame = ElementFrame::of(el, viewport);
    PaintOp::Selection {
        id: el.id,
        corners: frame.corners(),
        handles: ResizeHandle::ALL.map(|h| (h, frame.handle_position(h))),
        rotate_handle: frame.rotate_handle_position(metrics),
    }
}

/// Build the display list for one frame.
///
/// Order: image, then each element bottom to top, then the selection
/// decoration last so handles are never covered.
pub fn paint_scene(
    elements: &[TextElement],
    selected: Option<ElementId>,
    viewport: &Viewport,
    metrics: &HandleMetrics,
) -> Vec<PaintOp> {
    let mut ops = Vec::with_capacity(elements.len() + 2);
    ops.push(PaintOp::Image {
        rect: viewport.surface_rect(),
    });
    for el in elements {
        paint_element(&mut ops, el, viewport);
    }
    if let Some(el) = selected.and_then(|id| elements.iter().find(|e| e.id == id)) {
        ops.push(paint_selection(el, viewport, metrics));
    }
    ops
}
