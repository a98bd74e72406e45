use super::{ClearMask, Color};

/// Depth value a freshly created or cleared depth buffer holds
pub const DEPTH_FAR: f32 = f32::INFINITY;

// ============================================================================
// Framebuffer
// ============================================================================

/// Color buffer plus a parallel depth buffer, both `width * height` long.
///
/// Pixel (x, y) lives at `y * width + x`. The color buffer stores three
/// floats per pixel in row-major order. Writes outside the surface are
/// dropped without touching any stored pixel.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    colors: Vec<f32>,
    depth: Vec<f32>,
    width: u32,
    height: u32,
}

impl Framebuffer {
    /// Create a black framebuffer with the depth buffer at [`DEPTH_FAR`]
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            colors: vec![0.0; pixel_count * 3],
            depth: vec![DEPTH_FAR; pixel_count],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Pixel index for in-bounds coordinates
    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    fn write_color(&mut self, idx: usize, color: Color) {
        self.colors[idx * 3..idx * 3 + 3].copy_from_slice(&color.to_array());
    }

    /// Reset the buffers selected by `mask`
    pub fn clear(&mut self, mask: ClearMask, color: Color) {
        if mask.color {
            self.clear_color(color);
        }
        if mask.depth {
            self.clear_depth();
        }
    }

    /// Fill the whole color buffer with one color
    pub fn clear_color(&mut self, color: Color) {
        let rgb = color.to_array();
        for px in self.colors.chunks_exact_mut(3) {
            px.copy_from_slice(&rgb);
        }
    }

    /// Reset depth buffer to [`DEPTH_FAR`]
    pub fn clear_depth(&mut self) {
        self.depth.fill(DEPTH_FAR);
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            self.write_color(idx, color);
        }
    }

    /// Depth-tested pixel write: writes only if z is strictly nearer than
    /// the stored depth, then updates the depth. Returns whether it wrote.
    #[inline]
    pub fn set_pixel_depth(&mut self, x: i32, y: i32, z: f32, color: Color) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        if z < self.depth[idx] {
            self.depth[idx] = z;
            self.write_color(idx, color);
            true
        } else {
            false
        }
    }

    /// Horizontal span from x1 to x2 inclusive, clipped to the surface
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, color: Color) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let first = self.index(start, y);
        let count = (end - start + 1) as usize;
        let rgb = color.to_array();
        for px in self.colors[first * 3..(first + count) * 3].chunks_exact_mut(3) {
            px.copy_from_slice(&rgb);
        }
    }

    /// Depth-tested horizontal span. Depth is interpolated linearly from
    /// `z1` at `x1` to `z2` at `x2`.
    pub fn hline_depth(&mut self, x1: i32, x2: i32, y: i32, z1: f32, z2: f32, color: Color) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2, z1, z2) = if x1 <= x2 {
            (x1, x2, z1, z2)
        } else {
            (x2, x1, z2, z1)
        };
        let dz = if x2 > x1 {
            (z2 - z1) / (x2 as f32 - x1 as f32)
        } else {
            0.0
        };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        for x in start..=end {
            let z = z1 + dz * (x as f32 - x1 as f32);
            self.set_pixel_depth(x, y, z, color);
        }
    }

    /// Read a pixel. Returns None if out of bounds.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.index(x, y) * 3;
        Some(Color::new(
            self.colors[idx],
            self.colors[idx + 1],
            self.colors[idx + 2],
        ))
    }

    /// Read depth value at (x, y). Returns None if out of bounds.
    #[inline]
    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        if self.in_bounds(x, y) {
            Some(self.depth[self.index(x, y)])
        } else {
            None
        }
    }

    /// Raw color buffer: `width * height * 3` floats, row-major RGB
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.colors
    }

    /// Raw depth buffer: `width * height` floats, row-major
    #[inline]
    pub fn depth_slice(&self) -> &[f32] {
        &self.depth
    }
}
