//! Homogeneous vertices and 4x4 matrices
//!
//! Matrices are row-major. A vertex is transformed as a column vector with
//! the matrix on the left (`v' = M * v`), so `A * B` applies `B` first.

use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Homogeneous vertex (x, y, z, w)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vertex {
    /// 3D vertex with w = 1
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    /// 2D vertex on the z = 0 plane
    #[inline]
    pub const fn new_2d(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0)
    }

    #[inline]
    pub const fn with_w(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    #[inline]
    pub fn set_x(&mut self, x: f32) {
        self.x = x;
    }

    #[inline]
    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    #[inline]
    pub fn set_z(&mut self, z: f32) {
        self.z = z;
    }

    #[inline]
    pub fn set_w(&mut self, w: f32) {
        self.w = w;
    }

    /// Approximate equality check for floating point comparison (ignores w)
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

// ============================================================================
// Matrix
// ============================================================================

/// 4x4 matrix, 16 floats in row-major order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    m: [f32; 16],
}

impl Matrix {
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub const NULL: Self = Self { m: [0.0; 16] };

    #[inline]
    pub const fn from_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// All-zero matrix
    #[inline]
    pub const fn null() -> Self {
        Self::NULL
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Self::from_array([
            1.0, 0.0, 0.0, x, //
            0.0, 1.0, 0.0, y, //
            0.0, 0.0, 1.0, z, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Counter-clockwise rotation about the Z axis through the origin
    pub fn rotation(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_array([
            c, -s, 0.0, 0.0, //
            s, c, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about the Y axis through the origin
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_array([
            c, 0.0, s, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            -s, 0.0, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Non-uniform scale
    pub fn scaling(sx: f32, sy: f32, sz: f32) -> Self {
        Self::from_array([
            sx, 0.0, 0.0, 0.0, //
            0.0, sy, 0.0, 0.0, //
            0.0, 0.0, sz, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Orthographic projection mapping the given box onto [-1, 1]^3.
    ///
    /// Callers must ensure no pair of opposite planes coincides.
    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rl = right - left;
        let tb = top - bottom;
        let f_n = far - near;
        Self::from_array([
            2.0 / rl, 0.0, 0.0, -(right + left) / rl, //
            0.0, 2.0 / tb, 0.0, -(top + bottom) / tb, //
            0.0, 0.0, -2.0 / f_n, -(far + near) / f_n, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Element at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.m[row * 4 + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.m[row * 4 + col] = value;
    }

    #[inline]
    pub fn as_array(&self) -> &[f32; 16] {
        &self.m
    }

    /// Determinant of the upper-left 2x2 block after scaling the rows by
    /// `sx` and `sy`. This is the area scale the matrix applies in the XY
    /// plane once a viewport stretch of (sx, sy) is included.
    #[inline]
    pub fn xy_area_scale(&self, sx: f32, sy: f32) -> f32 {
        (sx * self.m[0]) * (sy * self.m[5]) - (sx * self.m[1]) * (sy * self.m[4])
    }

    /// `self * v` with `v` as a column vector
    #[inline]
    pub fn transform(&self, v: Vertex) -> Vertex {
        let m = &self.m;
        Vertex {
            x: m[0] * v.x + m[1] * v.y + m[2] * v.z + m[3] * v.w,
            y: m[4] * v.x + m[5] * v.y + m[6] * v.z + m[7] * v.w,
            z: m[8] * v.x + m[9] * v.y + m[10] * v.z + m[11] * v.w,
            w: m[12] * v.x + m[13] * v.y + m[14] * v.z + m[15] * v.w,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = [0.0f32; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[row * 4 + col] = (0..4)
                    .map(|k| self.m[row * 4 + k] * rhs.m[k * 4 + col])
                    .sum();
            }
        }
        Self { m: out }
    }
}

impl Mul<Vertex> for Matrix {
    type Output = Vertex;

    #[inline]
    fn mul(self, v: Vertex) -> Vertex {
        self.transform(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_vertex_defaults_w_to_one() {
        assert_eq!(Vertex::new_2d(1.0, 2.0).w, 1.0);
        assert_eq!(Vertex::new(1.0, 2.0, 3.0).w, 1.0);
        assert_eq!(Vertex::new_2d(1.0, 2.0).z, 0.0);
    }

    #[test]
    fn test_identity_is_neutral() {
        let t = Matrix::translation(3.0, -2.0, 1.0);
        assert_eq!(Matrix::IDENTITY * t, t);
        assert_eq!(t * Matrix::IDENTITY, t);
    }

    #[test]
    fn test_null_collapses_vertices() {
        let v = Matrix::null() * Vertex::new(5.0, 6.0, 7.0);
        assert_eq!(v, Vertex::with_w(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_translation_moves_point() {
        let v = Matrix::translation(1.0, 2.0, 3.0) * Vertex::new(1.0, 1.0, 1.0);
        assert!(v.approx_eq(&Vertex::new(2.0, 3.0, 4.0), 1e-6));
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let v = Matrix::rotation(FRAC_PI_2) * Vertex::new_2d(1.0, 0.0);
        assert!(v.approx_eq(&Vertex::new_2d(0.0, 1.0), 1e-6));
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        let v = Matrix::rotation_y(FRAC_PI_2) * Vertex::new(0.0, 0.0, 1.0);
        assert!(v.approx_eq(&Vertex::new(1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_composition_is_not_commutative() {
        let t = Matrix::translation(1.0, 0.0, 0.0);
        let s = Matrix::scaling(2.0, 2.0, 2.0);
        let p = Vertex::new_2d(1.0, 0.0);
        // t * s scales first, s * t translates first
        assert!(((t * s) * p).approx_eq(&Vertex::new_2d(3.0, 0.0), 1e-6));
        assert!(((s * t) * p).approx_eq(&Vertex::new_2d(4.0, 0.0), 1e-6));
    }

    #[test]
    fn test_ortho_maps_box_corners() {
        let m = Matrix::ortho(0.0, 10.0, 0.0, 20.0, -1.0, 1.0);
        assert!((m * Vertex::new_2d(0.0, 0.0)).approx_eq(&Vertex::new_2d(-1.0, -1.0), 1e-6));
        assert!((m * Vertex::new_2d(10.0, 20.0)).approx_eq(&Vertex::new_2d(1.0, 1.0), 1e-6));
    }

    #[test]
    fn test_xy_area_scale() {
        let m = Matrix::scaling(2.0, 3.0, 1.0);
        assert!((m.xy_area_scale(1.0, 1.0) - 6.0).abs() < 1e-6);
        assert!((m.xy_area_scale(10.0, 10.0) - 600.0).abs() < 1e-3);
    }
}
