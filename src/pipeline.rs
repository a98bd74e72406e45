//! Vertex transformation: model-view and projection matrices, their save
//! stacks, the memoized combined matrix, and the viewport mapping into
//! pixel space.

use serde::{Deserialize, Serialize};
use std::cell::Cell;

use crate::error::{RasterError, RasterResult};
use crate::math3d::{Matrix, Vertex};

/// Which matrix matrix operations apply to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatrixMode {
    ModelView,
    Projection,
}

/// Pixel rectangle the [-1, 1] range is mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> RasterResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::geometry(format!(
                "viewport must have a non-zero size, got {width}x{height}"
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Viewport covering a whole surface
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// One named matrix with its save stack and a version bumped on every write
#[derive(Debug, Clone)]
struct Slot {
    matrix: Matrix,
    version: u64,
    stack: Vec<Matrix>,
}

impl Slot {
    fn new() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            version: 0,
            stack: Vec::new(),
        }
    }

    fn set(&mut self, matrix: Matrix) {
        self.matrix = matrix;
        self.version = self.version.wrapping_add(1);
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedCombined {
    model_view: u64,
    projection: u64,
    matrix: Matrix,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    mode: MatrixMode,
    model_view: Slot,
    projection: Slot,
    combined: Cell<Option<CachedCombined>>,
    viewport: Viewport,
}

impl Pipeline {
    /// Identity matrices, model-view mode, the given viewport
    pub fn new(viewport: Viewport) -> Self {
        Self {
            mode: MatrixMode::ModelView,
            model_view: Slot::new(),
            projection: Slot::new(),
            combined: Cell::new(None),
            viewport,
        }
    }

    #[inline]
    pub fn mode(&self) -> MatrixMode {
        self.mode
    }

    #[inline]
    pub fn set_mode(&mut self, mode: MatrixMode) {
        self.mode = mode;
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn slot(&self, mode: MatrixMode) -> &Slot {
        match mode {
            MatrixMode::ModelView => &self.model_view,
            MatrixMode::Projection => &self.projection,
        }
    }

    fn slot_mut(&mut self, mode: MatrixMode) -> &mut Slot {
        match mode {
            MatrixMode::ModelView => &mut self.model_view,
            MatrixMode::Projection => &mut self.projection,
        }
    }

    /// The named matrix
    #[inline]
    pub fn matrix(&self, mode: MatrixMode) -> Matrix {
        self.slot(mode).matrix
    }

    /// The matrix of the current mode
    #[inline]
    pub fn current(&self) -> Matrix {
        self.matrix(self.mode)
    }

    /// Commit `matrix` into the named slot
    pub fn set_matrix(&mut self, mode: MatrixMode, matrix: Matrix) {
        self.slot_mut(mode).set(matrix);
    }

    /// Replace the current mode's matrix
    pub fn load(&mut self, matrix: Matrix) {
        self.set_matrix(self.mode, matrix);
    }

    /// Post-multiply the current mode's matrix: `current = current * matrix`
    pub fn multiply(&mut self, matrix: Matrix) {
        let slot = self.slot_mut(self.mode);
        let product = slot.matrix * matrix;
        slot.set(product);
    }

    pub fn push(&mut self) {
        let slot = self.slot_mut(self.mode);
        slot.stack.push(slot.matrix);
    }

    pub fn pop(&mut self) -> RasterResult<()> {
        let mode = self.mode;
        let slot = self.slot_mut(mode);
        let saved = slot
            .stack
            .pop()
            .ok_or(RasterError::MatrixStackUnderflow(mode))?;
        slot.set(saved);
        Ok(())
    }

    /// Saved matrices on the named stack
    pub fn stack_depth(&self, mode: MatrixMode) -> usize {
        self.slot(mode).stack.len()
    }

    /// `projection * model_view`, recomputed only when either input changed
    /// since the last read
    pub fn combined(&self) -> Matrix {
        let versions = (self.model_view.version, self.projection.version);
        if let Some(cached) = self.combined.get() {
            if (cached.model_view, cached.projection) == versions {
                return cached.matrix;
            }
        }

        let matrix = self.projection.matrix * self.model_view.matrix;
        self.combined.set(Some(CachedCombined {
            model_view: versions.0,
            projection: versions.1,
            matrix,
        }));
        matrix
    }

    /// Apply the combined matrix. The result stays homogeneous: no
    /// division by w is performed.
    #[inline]
    pub fn transform(&self, v: Vertex) -> Vertex {
        self.combined() * v
    }

    /// Map x and y from [-1, 1] onto the viewport; z and w pass through
    #[inline]
    pub fn normalize(&self, v: Vertex) -> Vertex {
        let vp = self.viewport;
        Vertex {
            x: (v.x + 1.0) * vp.width as f32 / 2.0 + vp.x as f32,
            y: (v.y + 1.0) * vp.height as f32 / 2.0 + vp.y as f32,
            ..v
        }
    }

    /// Object space straight to pixel space
    #[inline]
    pub fn to_pixel_space(&self, v: Vertex) -> Vertex {
        self.normalize(self.transform(v))
    }

    /// Length in pixels of a unit length in object space, taken from the
    /// XY area scale of the combined matrix stretched onto the viewport
    pub fn pixel_scale(&self) -> f32 {
        let vp = self.viewport;
        self.combined()
            .xy_area_scale(vp.width as f32 / 2.0, vp.height as f32 / 2.0)
            .abs()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn pipeline() -> Pipeline {
        Pipeline::new(Viewport::full(100, 50))
    }

    #[test]
    fn test_identity_maps_ndc_corners_to_viewport() {
        let p = pipeline();
        let lo = p.to_pixel_space(Vertex::new_2d(-1.0, -1.0));
        let hi = p.to_pixel_space(Vertex::new_2d(1.0, 1.0));
        assert!(lo.approx_eq(&Vertex::new_2d(0.0, 0.0), 1e-5));
        assert!(hi.approx_eq(&Vertex::new_2d(100.0, 50.0), 1e-5));
    }

    #[test]
    fn test_normalize_applies_origin() {
        let mut p = pipeline();
        p.set_viewport(Viewport::new(10, 20, 40, 40).unwrap());
        let v = p.normalize(Vertex::new(0.0, 0.0, 3.0));
        assert!(v.approx_eq(&Vertex::new(30.0, 40.0, 3.0), 1e-5));
    }

    #[test]
    fn test_transform_matches_direct_multiplication() {
        let mut p = pipeline();
        p.set_matrix(MatrixMode::ModelView, Matrix::rotation(0.3));
        p.set_matrix(
            MatrixMode::Projection,
            Matrix::ortho(-2.0, 2.0, -1.0, 1.0, -1.0, 1.0),
        );
        let m = p.matrix(MatrixMode::Projection) * p.matrix(MatrixMode::ModelView);
        for v in [
            Vertex::new(0.5, -0.25, 0.0),
            Vertex::new(-1.0, 2.0, 0.5),
            Vertex::with_w(3.0, 1.0, -2.0, 2.0),
        ] {
            assert_eq!(p.transform(v), m * v);
        }
    }

    #[test]
    fn test_combined_is_recomputed_after_any_write() {
        let mut p = pipeline();
        let v = Vertex::new_2d(1.0, 0.0);
        assert_eq!(p.transform(v), v);

        p.set_mode(MatrixMode::Projection);
        p.multiply(Matrix::scaling(2.0, 2.0, 1.0));
        assert!(p.transform(v).approx_eq(&Vertex::new_2d(2.0, 0.0), 1e-6));

        p.set_mode(MatrixMode::ModelView);
        p.multiply(Matrix::translation(1.0, 0.0, 0.0));
        assert!(p.transform(v).approx_eq(&Vertex::new_2d(4.0, 0.0), 1e-6));

        p.load(Matrix::IDENTITY);
        assert!(p.transform(v).approx_eq(&Vertex::new_2d(2.0, 0.0), 1e-6));
    }

    #[test]
    fn test_multiply_post_multiplies() {
        let mut p = pipeline();
        p.multiply(Matrix::translation(1.0, 0.0, 0.0));
        p.multiply(Matrix::rotation(FRAC_PI_2));
        // rotation applies first, then the translation
        let v = p.transform(Vertex::new_2d(1.0, 0.0));
        assert!(v.approx_eq(&Vertex::new_2d(1.0, 1.0), 1e-6));
    }

    #[test]
    fn test_stacks_are_independent_per_mode() {
        let mut p = pipeline();
        p.multiply(Matrix::translation(5.0, 0.0, 0.0));
        p.push();

        p.set_mode(MatrixMode::Projection);
        assert_eq!(p.stack_depth(MatrixMode::Projection), 0);
        assert_eq!(p.pop(), Err(RasterError::MatrixStackUnderflow(MatrixMode::Projection)));

        p.set_mode(MatrixMode::ModelView);
        p.load(Matrix::NULL);
        p.pop().unwrap();
        assert_eq!(p.current(), Matrix::translation(5.0, 0.0, 0.0));
        assert_eq!(p.stack_depth(MatrixMode::ModelView), 0);
    }

    #[test]
    fn test_pop_invalidates_combined() {
        let mut p = pipeline();
        p.push();
        p.multiply(Matrix::scaling(3.0, 3.0, 1.0));
        let v = Vertex::new_2d(1.0, 1.0);
        assert!(p.transform(v).approx_eq(&Vertex::new_2d(3.0, 3.0), 1e-6));
        p.pop().unwrap();
        assert_eq!(p.transform(v), v);
    }

    #[test]
    fn test_pixel_scale_follows_viewport_and_matrix() {
        let mut p = Pipeline::new(Viewport::full(200, 200));
        assert!((p.pixel_scale() - 100.0).abs() < 1e-4);
        p.multiply(Matrix::scaling(0.5, 0.5, 1.0));
        assert!((p.pixel_scale() - 50.0).abs() < 1e-4);
        p.multiply(Matrix::rotation(1.0));
        assert!((p.pixel_scale() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_viewport_is_rejected() {
        assert!(Viewport::new(0, 0, 0, 10).is_err());
        assert!(Viewport::new(0, 0, 10, 0).is_err());
    }
}
