//! Screen ↔ image coordinate mapping.
//!
//! The image is laid out once at a *fitted* display size (zoom 100 %), then
//! scaled about its center by the zoom factor and translated by the pan
//! offset. Everything stored on elements is natural image pixels; this module
//! is the only place that knows about screen pixels.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom bounds and step, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    pub min: u16,
    pub max: u16,
    pub step: u16,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 50,
            max: 200,
            step: 10,
        }
    }
}

impl ZoomLimits {
    /// Swap inverted bounds and keep `min` and `step` at 1 or more.
    pub fn normalized(self) -> Self {
        let (min, max) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        let min = min.max(1);
        Self {
            min,
            max: max.max(min),
            step: self.step.max(1),
        }
    }
}

pub const DEFAULT_ZOOM: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Natural size of the loaded image.
    natural: Size,
    /// Screen position of the fitted display box's top-left at 100 % / no pan.
    origin: Point,
    /// Fitted display size at 100 %.
    display: Size,
    zoom: u16,
    pan: Vec2,
    limits: ZoomLimits,
}

impl Viewport {
    /// A 1:1 layout: the image is shown at natural size with its top-left at
    /// the screen origin.
    pub fn new(natural: Size) -> Self {
        Self::with_layout(natural, Point::ZERO, natural)
    }

    pub fn with_layout(natural: Size, origin: Point, display: Size) -> Self {
        Self {
            natural,
            origin,
            display,
            zoom: DEFAULT_ZOOM,
            pan: Vec2::ZERO,
            limits: ZoomLimits::default(),
        }
    }

    /// Fit the image inside `available` (contain), centered.
    pub fn fit_within(natural: Size, available: Rect) -> Self {
        let mut vp = Self::new(natural);
        vp.set_layout_fit(available);
        vp
    }

    pub fn with_limits(mut self, limits: ZoomLimits) -> Self {
        let limits = limits.normalized();
        self.limits = limits;
        self.zoom = self.zoom.clamp(limits.min, limits.max);
        self
    }

    pub fn set_layout(&mut self, origin: Point, display: Size) {
        self.origin = origin;
        self.display = display;
    }

    pub fn set_layout_fit(&mut self, available: Rect) {
        let scale = if self.natural.width > 0.0 && self.natural.height > 0.0 {
            (available.width() / self.natural.width).min(available.height() / self.natural.height)
        } else {
            1.0
        };
        let display = self.natural * scale;
        let origin = available.center() - display.to_vec2() / 2.0;
        self.set_layout(origin, display);
    }

    pub fn natural_size(&self) -> Size {
        self.natural
    }

    pub fn zoom(&self) -> u16 {
        self.zoom
    }

    pub fn zoom_factor(&self) -> f64 {
        f64::from(self.zoom) / 100.0
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    // ─── Zoom / pan ──────────────────────────────────────────────────────

    /// Set zoom in percent, clamped to the limits. Returns the applied value.
    pub fn set_zoom(&mut self, percent: i32) -> u16 {
        let clamped = percent.clamp(i32::from(self.limits.min), i32::from(self.limits.max));
        self.zoom = clamped as u16;
        self.zoom
    }

    pub fn zoom_in(&mut self) -> u16 {
        self.set_zoom(i32::from(self.zoom) + i32::from(self.limits.step))
    }

    pub fn zoom_out(&mut self) -> u16 {
        self.set_zoom(i32::from(self.zoom) - i32::from(self.limits.step))
    }

    /// One wheel tick: scrolling up (`delta_y < 0`) zooms in.
    pub fn wheel(&mut self, delta_y: f64) -> u16 {
        if delta_y < 0.0 {
            self.zoom_in()
        } else if delta_y > 0.0 {
            self.zoom_out()
        } else {
            self.zoom
        }
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Back to 100 % with no pan.
    pub fn reset_zoom(&mut self) {
        self.zoom = DEFAULT_ZOOM.clamp(self.limits.min, self.limits.max);
        self.pan = Vec2::ZERO;
    }

    // ─── Mapping ─────────────────────────────────────────────────────────

    /// On-screen rectangle of the rendered image at the current zoom/pan.
    pub fn surface_rect(&self) -> Rect {
        let center = self.origin + self.display.to_vec2() / 2.0 + self.pan;
        Rect::from_center_size(center, self.display * self.zoom_factor())
    }

    /// Screen pixels per natural image pixel (horizontal axis).
    pub fn display_scale(&self) -> f64 {
        if self.natural.width > 0.0 {
            self.surface_rect().width() / self.natural.width
        } else {
            1.0
        }
    }

    /// Screen point → percentage of the image, each axis clamped to [0, 100].
    pub fn screen_to_percent(&self, screen: Point) -> Point {
        let rect = self.surface_rect();
        let pct = |v: f64, lo: f64, len: f64| {
            if len > 0.0 {
                ((v - lo) / len * 100.0).clamp(0.0, 100.0)
            } else {
                0.0
            }
        };
        Point::new(
            pct(screen.x, rect.x0, rect.width()),
            pct(screen.y, rect.y0, rect.height()),
        )
    }

    pub fn percent_to_pixels(&self, percent: Point) -> Point {
        Point::new(
            percent.x / 100.0 * self.natural.width,
            percent.y / 100.0 * self.natural.height,
        )
    }

    pub fn pixels_to_percent(&self, pixels: Point) -> Point {
        let pct = |v: f64, len: f64| if len > 0.0 { v / len * 100.0 } else { 0.0 };
        Point::new(
            pct(pixels.x, self.natural.width),
            pct(pixels.y, self.natural.height),
        )
    }

    /// Screen point → natural pixels, clamped to the image. Computed from the
    /// surface fraction directly rather than through percentages.
    pub fn screen_to_pixels(&self, screen: Point) -> Point {
        let rect = self.surface_rect();
        let px = |v: f64, lo: f64, len: f64, natural: f64| {
            if len > 0.0 {
                ((v - lo) / len).clamp(0.0, 1.0) * natural
            } else {
                0.0
            }
        };
        Point::new(
            px(screen.x, rect.x0, rect.width(), self.natural.width),
            px(screen.y, rect.y0, rect.height(), self.natural.height),
        )
    }

    pub fn pixels_to_screen(&self, pixels: Point) -> Point {
        let rect = self.surface_rect();
        let pct = self.pixels_to_percent(pixels);
        Point::new(
            rect.x0 + pct.x / 100.0 * rect.width(),
            rect.y0 + pct.y / 100.0 * rect.height(),
        )
    }

    /// Convert a screen-space displacement into image pixels.
    pub fn screen_delta_to_pixels(&self, delta: Vec2) -> Vec2 {
        let scale = self.display_scale();
        if scale > 0.0 { delta / scale } else { delta }
    }

    pub fn pixels_to_screen_len(&self, len: f64) -> f64 {
        len * self.display_scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-6
    }

    #[test]
    fn one_to_one_layout_maps_identity() {
        let vp = Viewport::new(Size::new(1000.0, 800.0));
        assert!(close(vp.screen_to_percent(Point::new(500.0, 400.0)), Point::new(50.0, 50.0)));
        assert!(close(vp.screen_to_pixels(Point::new(250.0, 80.0)), Point::new(250.0, 80.0)));
        assert_eq!(vp.display_scale(), 1.0);
    }

    #[test]
    fn zoom_scales_about_center_and_keeps_percentages() {
        let mut vp = Viewport::new(Size::new(1000.0, 800.0));
        vp.set_zoom(200);
        let rect = vp.surface_rect();
        assert_eq!(rect, Rect::new(-500.0, -400.0, 1500.0, 1200.0));
        // The image center stays at the same screen point.
        assert!(close(vp.screen_to_percent(Point::new(500.0, 400.0)), Point::new(50.0, 50.0)));
        assert!(close(
            vp.screen_delta_to_pixels(Vec2::new(100.0, 0.0)).to_point(),
            Point::new(50.0, 0.0)
        ));
    }

    #[test]
    fn inverted_limits_are_normalized() {
        let limits = ZoomLimits {
            min: 150,
            max: 100,
            step: 0,
        };
        let mut vp = Viewport::new(Size::new(100.0, 100.0)).with_limits(limits);
        assert_eq!(vp.zoom(), 100);
        assert_eq!(vp.set_zoom(400), 150);
        assert_eq!(vp.zoom_out(), 149);

        let zeroed = ZoomLimits { min: 0, max: 0, step: 10 }.normalized();
        assert_eq!(zeroed, ZoomLimits { min: 1, max: 1, step: 10 });
    }

    #[test]
    fn zoom_is_clamped_and_stepped() {
        let mut vp = Viewport::new(Size::new(100.0, 100.0));
        for _ in 0..20 {
            vp.zoom_in();
        }
        assert_eq!(vp.zoom(), 200);
        for _ in 0..30 {
            vp.wheel(1.0);
        }
        assert_eq!(vp.zoom(), 50);
        assert_eq!(vp.set_zoom(-20), 50);
        vp.wheel(-3.0);
        assert_eq!(vp.zoom(), 60);
    }

    #[test]
    fn pan_moves_surface_but_not_pixels() {
        let mut vp = Viewport::new(Size::new(400.0, 400.0));
        let before = vp.screen_to_pixels(Point::new(100.0, 100.0));
        vp.pan_by(Vec2::new(50.0, -20.0));
        let shifted = vp.screen_to_pixels(Point::new(150.0, 80.0));
        assert!(close(before, shifted));
        vp.reset_zoom();
        assert_eq!(vp.pan(), Vec2::ZERO);
        assert_eq!(vp.zoom(), DEFAULT_ZOOM);
    }

    #[test]
    fn percent_is_clamped_to_image() {
        let vp = Viewport::new(Size::new(200.0, 100.0));
        assert!(close(vp.screen_to_percent(Point::new(-50.0, 500.0)), Point::new(0.0, 100.0)));
    }

    #[test]
    fn fit_within_contains_and_centers() {
        let vp = Viewport::fit_within(Size::new(2000.0, 1000.0), Rect::new(0.0, 0.0, 1000.0, 1000.0));
        assert_eq!(vp.surface_rect(), Rect::new(0.0, 250.0, 1000.0, 750.0));
        assert_eq!(vp.display_scale(), 0.5);
        assert!(close(vp.pixels_to_screen(Point::new(1000.0, 500.0)), Point::new(500.0, 500.0)));
    }
}
