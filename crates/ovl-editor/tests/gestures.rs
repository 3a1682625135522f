//! Integration tests: full pointer gestures through the editing session.
//!
//! Each gesture must land in history as exactly one entry, regardless of
//! how many moves or frames it spanned.

use ovl_core::{Point, Size, Vec2};
use ovl_editor::{EditorConfig, EditorSession, InputEvent, Interaction, Modifiers, SessionInput, StyleChange};
use pretty_assertions::assert_eq;

fn session(width: f64, height: f64) -> EditorSession {
    EditorSession::new(
        SessionInput::new("https://cdn/base.png", Size::new(width, height)),
        EditorConfig::default(),
    )
}

fn drag(s: &mut EditorSession, from: Point, to: Point, steps: usize) {
    s.handle(&InputEvent::PointerDown { x: from.x, y: from.y }).unwrap();
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let p = from.lerp(to, t);
        s.handle(&InputEvent::PointerMove { x: p.x, y: p.y }).unwrap();
        s.on_animation_frame().unwrap();
    }
    s.handle(&InputEvent::PointerUp { x: to.x, y: to.y }).unwrap();
}

// ─── Example scenario ───────────────────────────────────────────────────

#[test]
fn double_click_then_drag_at_one_to_one() {
    let mut s = session(1000.0, 800.0);
    let surface = s.viewport().surface_rect();
    let center = surface.center();

    s.handle(&InputEvent::DoubleClick { x: center.x, y: center.y }).unwrap();
    assert_eq!(s.elements().len(), 1);
    assert_eq!(s.elements()[0].position, Point::new(500.0, 400.0));

    drag(&mut s, center, center + Vec2::new(100.0, 0.0), 4);
    assert_eq!(s.elements()[0].position, Point::new(600.0, 400.0));
}

// ─── One history entry per gesture ──────────────────────────────────────

#[test]
fn drag_is_one_undo_step() {
    let mut s = session(1000.0, 800.0);
    s.add_layer().unwrap();
    let after_add = s.store().history().len();

    drag(&mut s, Point::new(500.0, 400.0), Point::new(300.0, 200.0), 10);
    assert_eq!(s.store().history().len(), after_add + 1);
    assert_eq!(s.elements()[0].position, Point::new(300.0, 200.0));

    assert!(s.undo().unwrap());
    assert_eq!(s.elements()[0].position, Point::new(500.0, 400.0));
    assert!(s.redo().unwrap());
    assert_eq!(s.elements()[0].position, Point::new(300.0, 200.0));
}

#[test]
fn click_without_move_commits_nothing() {
    let mut s = session(1000.0, 800.0);
    s.add_layer().unwrap();
    let len = s.store().history().len();
    drag(&mut s, Point::new(500.0, 400.0), Point::new(500.0, 400.0), 0);
    assert_eq!(s.store().history().len(), len);
    assert!(matches!(s.interaction(), Interaction::Idle));
}

#[test]
fn lost_pointer_up_does_not_leave_gesture_open() {
    let mut s = session(1000.0, 800.0);
    s.add_layer().unwrap();
    let after_add = s.store().history().len();

    s.handle(&InputEvent::PointerDown { x: 500.0, y: 400.0 }).unwrap();
    // The host never delivered the matching pointer-up.
    s.handle(&InputEvent::PointerDown { x: 500.0, y: 400.0 }).unwrap();
    s.handle(&InputEvent::PointerMove { x: 550.0, y: 400.0 }).unwrap();
    s.on_animation_frame().unwrap();
    s.handle(&InputEvent::PointerUp { x: 550.0, y: 400.0 }).unwrap();

    assert!(!s.store().in_gesture());
    assert_eq!(s.store().history().len(), after_add + 1);

    s.set_style(StyleChange::FontSize(77.0)).unwrap();
    assert_eq!(s.store().history().len(), after_add + 2);
    assert!(s.undo().unwrap());
    assert_eq!(s.elements()[0].position, Point::new(550.0, 400.0));
    assert!(s.undo().unwrap());
    assert_eq!(s.elements()[0].position, Point::new(500.0, 400.0));
}

#[test]
fn corner_resize_floors_font_size() {
    let mut s = session(1000.0, 800.0);
    s.add_layer().unwrap();
    // Default layer is 400×100 centered at (500, 400): top-left corner at (300, 350).
    drag(&mut s, Point::new(300.0, 350.0), Point::new(100.0, 150.0), 5);
    assert_eq!(s.elements()[0].font_size, 12.0);
    assert_eq!(s.store().history().len(), 3);
}

#[test]
fn edge_resize_floors_box() {
    let mut s = session(1000.0, 800.0);
    s.add_layer().unwrap();
    // Right edge handle at (700, 400); drag far left past the left edge.
    drag(&mut s, Point::new(700.0, 400.0), Point::new(100.0, 400.0), 3);
    assert_eq!(s.elements()[0].width, 50.0);
    assert_eq!(s.elements()[0].height, 100.0);
}

#[test]
fn pan_never_moves_elements() {
    let mut s = session(1000.0, 800.0);
    s.add_layer().unwrap();
    let before = s.elements().to_vec();
    let history = s.store().history().len();

    drag(&mut s, Point::new(50.0, 50.0), Point::new(150.0, 90.0), 3);
    assert!((s.viewport().pan() - Vec2::new(100.0, 40.0)).hypot() < 1e-9);
    assert_eq!(s.elements(), before.as_slice());
    assert_eq!(s.store().history().len(), history);
    // Canvas press also cleared the selection.
    assert_eq!(s.selected_id(), None);
}

#[test]
fn zoom_keys_and_wheel_clamp() {
    let mut s = session(400.0, 400.0);
    let cmd = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    for _ in 0..15 {
        s.handle(&InputEvent::key("=", cmd)).unwrap();
    }
    assert_eq!(s.viewport().zoom(), 200);
    for _ in 0..40 {
        s.handle(&InputEvent::Wheel { delta_y: 1.0 }).unwrap();
    }
    assert_eq!(s.viewport().zoom(), 50);
    s.handle(&InputEvent::key("0", cmd)).unwrap();
    assert_eq!(s.viewport().zoom(), 100);
}

#[test]
fn drag_at_double_zoom_moves_half_as_far() {
    let mut s = session(1000.0, 800.0);
    s.add_layer().unwrap();
    s.set_zoom(200);
    // The image center stays put under a centered zoom.
    drag(&mut s, Point::new(500.0, 400.0), Point::new(600.0, 400.0), 2);
    let moved = s.elements()[0].position;
    assert!((moved - Point::new(550.0, 400.0)).hypot() < 1e-9, "{moved:?}");
}
