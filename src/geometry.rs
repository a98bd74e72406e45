//! Shape descriptors for the circle, arc and ellipse helpers, and the
//! tessellation that turns arcs and ellipses into vertex chains

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::error::{RasterError, RasterResult};
use crate::math3d::Vertex;

/// Segments a full-turn arc is cut into
pub const ARC_SEGMENTS: u32 = 40;
/// Equal-angle samples around an ellipse
pub const ELLIPSE_SEGMENTS: u32 = 40;

fn positive(value: f32, what: &str) -> RasterResult<f32> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(RasterError::geometry(format!(
            "{what} must be positive and finite, got {value}"
        )))
    }
}

/// Circle in object space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vertex,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vertex, radius: f32) -> RasterResult<Self> {
        Ok(Self {
            center,
            radius: positive(radius, "circle radius")?,
        })
    }
}

/// Circular arc swept counter-clockwise from `from` to `to` (radians)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Vertex,
    pub radius: f32,
    pub from: f32,
    pub to: f32,
}

impl Arc {
    /// An end angle below the start wraps once around the circle; equal
    /// angles sweep nothing and are rejected.
    pub fn new(center: Vertex, radius: f32, from: f32, to: f32) -> RasterResult<Self> {
        let radius = positive(radius, "arc radius")?;
        if !from.is_finite() || !to.is_finite() || from == to {
            return Err(RasterError::geometry(format!(
                "arc sweep from {from} to {to} is empty"
            )));
        }
        let to = if to < from { to + TAU } else { to };
        Ok(Self {
            center,
            radius,
            from,
            to,
        })
    }

    #[inline]
    pub fn sweep(&self) -> f32 {
        self.to - self.from
    }

    /// Number of segments: the full-turn budget scaled by the swept fraction
    pub fn segment_count(&self) -> u32 {
        ((ARC_SEGMENTS as f32 * (self.sweep() / TAU)).ceil() as u32).max(1)
    }

    /// Open chain of `segment_count() + 1` points from `from` to `to`
    pub fn tessellate(&self) -> Vec<Vertex> {
        let n = self.segment_count();
        let step = self.sweep() / n as f32;
        (0..=n)
            .map(|k| {
                let t = if k == n {
                    self.to
                } else {
                    self.from + step * k as f32
                };
                let (s, c) = t.sin_cos();
                Vertex::new(
                    self.center.x + self.radius * c,
                    self.center.y + self.radius * s,
                    self.center.z,
                )
            })
            .collect()
    }
}

/// Axis-aligned ellipse with semi-axes `a` (x) and `b` (y)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Vertex,
    pub a: f32,
    pub b: f32,
}

impl Ellipse {
    pub fn new(center: Vertex, a: f32, b: f32) -> RasterResult<Self> {
        Ok(Self {
            center,
            a: positive(a, "ellipse semi-axis a")?,
            b: positive(b, "ellipse semi-axis b")?,
        })
    }

    /// Closed ring of [`ELLIPSE_SEGMENTS`] points (the last does not repeat the first)
    pub fn tessellate(&self) -> Vec<Vertex> {
        (0..ELLIPSE_SEGMENTS)
            .map(|i| {
                let t = i as f32 / ELLIPSE_SEGMENTS as f32 * TAU;
                let (s, c) = t.sin_cos();
                Vertex::new(
                    self.center.x + self.a * c,
                    self.center.y + self.b * s,
                    self.center.z,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_non_positive_sizes_are_rejected() {
        let c = Vertex::new_2d(0.0, 0.0);
        assert!(Circle::new(c, 0.0).is_err());
        assert!(Circle::new(c, -1.0).is_err());
        assert!(Circle::new(c, f32::NAN).is_err());
        assert!(Arc::new(c, 0.0, 0.0, 1.0).is_err());
        assert!(Ellipse::new(c, 1.0, 0.0).is_err());
        assert!(Ellipse::new(c, -2.0, 1.0).is_err());
        assert!(Circle::new(c, 0.5).is_ok());
    }

    #[test]
    fn test_arc_segment_budget() {
        let c = Vertex::new_2d(0.0, 0.0);
        assert_eq!(Arc::new(c, 1.0, 0.0, TAU).unwrap().segment_count(), 40);
        assert_eq!(Arc::new(c, 1.0, 0.0, PI).unwrap().segment_count(), 20);
        assert_eq!(Arc::new(c, 1.0, 0.0, 0.01).unwrap().segment_count(), 1);
    }

    #[test]
    fn test_arc_endpoints() {
        let arc = Arc::new(Vertex::new_2d(2.0, 3.0), 5.0, 0.0, FRAC_PI_2).unwrap();
        let pts = arc.tessellate();
        assert_eq!(pts.len(), arc.segment_count() as usize + 1);
        assert!(pts[0].approx_eq(&Vertex::new_2d(7.0, 3.0), 1e-4));
        assert!(pts[pts.len() - 1].approx_eq(&Vertex::new_2d(2.0, 8.0), 1e-4));
        for p in &pts {
            let r = ((p.x - 2.0).powi(2) + (p.y - 3.0).powi(2)).sqrt();
            assert!((r - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_arc_wraps_reversed_angles() {
        let arc = Arc::new(Vertex::new_2d(0.0, 0.0), 1.0, PI, FRAC_PI_2).unwrap();
        assert!((arc.sweep() - 1.5 * PI).abs() < 1e-5);
        assert!(Arc::new(Vertex::new_2d(0.0, 0.0), 1.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_ellipse_ring() {
        let e = Ellipse::new(Vertex::new(1.0, 1.0, 2.0), 4.0, 2.0).unwrap();
        let pts = e.tessellate();
        assert_eq!(pts.len(), ELLIPSE_SEGMENTS as usize);
        assert!(pts[0].approx_eq(&Vertex::new(5.0, 1.0, 2.0), 1e-5));
        for p in &pts {
            let k = ((p.x - 1.0) / 4.0).powi(2) + ((p.y - 1.0) / 2.0).powi(2);
            assert!((k - 1.0).abs() < 1e-4);
        }
    }
}
