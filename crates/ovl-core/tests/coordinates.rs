//! Property tests: coordinate round-trips, rotation normalization, and
//! element floors under arbitrary patches.

use ovl_core::model::{ElementPatch, TextElement, limits, normalize_rotation};
use ovl_core::{Point, Rect, Size, Vec2, Viewport};
use proptest::prelude::*;

fn viewport_strategy() -> impl Strategy<Value = Viewport> {
    (
        100.0..4000.0f64,
        100.0..4000.0f64,
        200.0..1600.0f64,
        200.0..1200.0f64,
        50i32..=200,
        -300.0..300.0f64,
        -300.0..300.0f64,
    )
        .prop_map(|(w, h, avail_w, avail_h, zoom, px, py)| {
            let mut vp = Viewport::fit_within(Size::new(w, h), Rect::new(0.0, 0.0, avail_w, avail_h));
            vp.set_zoom(zoom);
            vp.pan_by(Vec2::new(px, py));
            vp
        })
}

proptest! {
    #[test]
    fn pixel_percent_pixel_roundtrip(vp in viewport_strategy(), fx in 0.0..=1.0f64, fy in 0.0..=1.0f64) {
        let natural = vp.natural_size();
        let px = Point::new(fx * natural.width, fy * natural.height);
        let back = vp.percent_to_pixels(vp.pixels_to_percent(px));
        prop_assert!((back - px).hypot() < 1e-6);
    }

    #[test]
    fn pixel_screen_pixel_roundtrip(vp in viewport_strategy(), fx in 0.0..=1.0f64, fy in 0.0..=1.0f64) {
        let natural = vp.natural_size();
        let px = Point::new(fx * natural.width, fy * natural.height);
        let back = vp.screen_to_pixels(vp.pixels_to_screen(px));
        prop_assert!((back - px).hypot() < 1e-6, "{px:?} came back as {back:?}");
    }

    #[test]
    fn rotation_always_in_half_open_range(deg in -1.0e6..1.0e6f64) {
        let r = normalize_rotation(deg);
        prop_assert!(r > -180.0 && r <= 180.0, "{deg} → {r}");
    }

    #[test]
    fn patches_never_break_floors(w in -1000.0..1000.0f64, h in -1000.0..1000.0f64, fs in -100.0..300.0f64, rot in -2000.0..2000.0f64) {
        let mut el = TextElement::default();
        ElementPatch {
            width: Some(w),
            height: Some(h),
            font_size: Some(fs),
            rotation: Some(rot),
            ..ElementPatch::default()
        }
        .apply(&mut el);
        prop_assert!(el.width >= limits::MIN_BOX_SIZE);
        prop_assert!(el.height >= limits::MIN_BOX_SIZE);
        prop_assert!(el.font_size >= limits::MIN_FONT_SIZE);
        prop_assert!(el.rotation > -180.0 && el.rotation <= 180.0);
    }
}
