pub mod hit;
pub mod paint;

pub use hit::{ElementFrame, Handle, HandleMetrics, HitTarget, ResizeHandle, hit_test};
pub use paint::{PaintOp, paint_scene};
