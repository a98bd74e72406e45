//! Pixel producers: points, lines, circles and the scan-line polygon filler.
//!
//! Every routine here consumes vertices that are already in pixel space and
//! writes through a [`Pen`], which carries the draw color and decides
//! whether writes are depth tested.

pub mod circle;
pub mod line;
pub mod polygon;

pub use polygon::ScanlineFiller;

use crate::display::{Color, Framebuffer};
use crate::math3d::Vertex;

/// Pixel coordinates are clamped to this distance from the origin before
/// any integer rasterization math, so far off-screen geometry cannot
/// overflow `i32` offsets or deltas.
pub const GUARD_BAND: i32 = 1 << 24;

/// Pixel-space float to pixel coordinate, clamped to the guard band
#[inline]
pub fn to_pixel(v: f32) -> i32 {
    (v.floor() as i32).clamp(-GUARD_BAND, GUARD_BAND)
}

/// Round half up, used for scan-line bookkeeping
#[inline]
pub fn round_half_up(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

/// Write handle over a framebuffer with the current draw state baked in
pub struct Pen<'a> {
    fb: &'a mut Framebuffer,
    color: Color,
    depth_test: bool,
}

impl<'a> Pen<'a> {
    pub fn new(fb: &'a mut Framebuffer, color: Color, depth_test: bool) -> Self {
        Self {
            fb,
            color,
            depth_test,
        }
    }

    #[inline]
    pub fn plot(&mut self, x: i32, y: i32, z: f32) {
        if self.depth_test {
            self.fb.set_pixel_depth(x, y, z, self.color);
        } else {
            self.fb.set_pixel(x, y, self.color);
        }
    }

    /// Inclusive span on row `y`, depth running from `z1` at `x1` to `z2` at `x2`
    #[inline]
    pub fn span(&mut self, x1: i32, x2: i32, y: i32, z1: f32, z2: f32) {
        if self.depth_test {
            self.fb.hline_depth(x1, x2, y, z1, z2, self.color);
        } else {
            self.fb.hline(x1, x2, y, self.color);
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.fb.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.fb.height()
    }
}

/// Plot every vertex as a square point of the given size.
///
/// Sizes below 2 plot one pixel; larger sizes cover the square of
/// half-width `floor(size / 2)` centered on the vertex pixel.
pub fn points(pen: &mut Pen, vertices: &[Vertex], size: f32) {
    let half = ((size / 2.0).max(0.0) as i32).min(GUARD_BAND);
    let (width, height) = (pen.width() as i32, pen.height() as i32);
    for v in vertices {
        let (x, y) = (to_pixel(v.x), to_pixel(v.y));
        let (left, right) = ((x - half).max(-1), (x + half).min(width));
        if left > right {
            continue;
        }
        for row in (y - half).max(0)..=(y + half).min(height - 1) {
            pen.span(left, right, row, v.z, v.z);
        }
    }
}
