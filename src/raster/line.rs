//! Bresenham line rasterization and the chain walkers built on it

use super::{to_pixel, Pen};
use crate::error::{RasterError, RasterResult};
use crate::math3d::Vertex;

/// Draw one segment with integer Bresenham stepping.
///
/// Steep segments swap x/y so the loop always runs along the major axis,
/// and endpoints are ordered so it advances from smaller to larger x. Both
/// endpoints are plotted, every pixel exactly once. Depth is interpolated
/// linearly along the major axis.
pub fn segment(pen: &mut Pen, a: Vertex, b: Vertex) {
    let (mut x1, mut y1, mut z1) = (to_pixel(a.x), to_pixel(a.y), a.z);
    let (mut x2, mut y2, mut z2) = (to_pixel(b.x), to_pixel(b.y), b.z);

    let steep = (y2 - y1).abs() > (x2 - x1).abs();
    if steep {
        std::mem::swap(&mut x1, &mut y1);
        std::mem::swap(&mut x2, &mut y2);
    }
    if x1 > x2 {
        std::mem::swap(&mut x1, &mut x2);
        std::mem::swap(&mut y1, &mut y2);
        std::mem::swap(&mut z1, &mut z2);
    }

    let dx = x2 - x1;
    let dy = (y2 - y1).abs();
    let y_step = if y1 < y2 { 1 } else { -1 };
    let dz = if dx > 0 { (z2 - z1) / dx as f32 } else { 0.0 };

    let mut err = 0;
    let mut y = y1;
    for x in x1..=x2 {
        let z = z1 + dz * (x - x1) as f32;
        if steep {
            pen.plot(y, x, z);
        } else {
            pen.plot(x, y, z);
        }
        err += dy;
        if 2 * err >= dx {
            y += y_step;
            err -= dx;
        }
    }
}

fn require(vertices: &[Vertex], min: usize, what: &str) -> RasterResult<()> {
    if vertices.len() < min {
        return Err(RasterError::geometry(format!(
            "{what} needs at least {min} vertices, got {}",
            vertices.len()
        )));
    }
    Ok(())
}

/// Independent segments from consecutive pairs; an odd trailing vertex is ignored
pub fn segments(pen: &mut Pen, vertices: &[Vertex]) -> RasterResult<()> {
    require(vertices, 2, "line segments")?;
    for pair in vertices.chunks_exact(2) {
        segment(pen, pair[0], pair[1]);
    }
    Ok(())
}

/// Connected segments through every vertex in order
pub fn strip(pen: &mut Pen, vertices: &[Vertex]) -> RasterResult<()> {
    require(vertices, 2, "line strip")?;
    for pair in vertices.windows(2) {
        segment(pen, pair[0], pair[1]);
    }
    Ok(())
}

/// A strip closed back to its first vertex
pub fn line_loop(pen: &mut Pen, vertices: &[Vertex]) -> RasterResult<()> {
    strip(pen, vertices)?;
    if let (Some(&last), Some(&first)) = (vertices.last(), vertices.first()) {
        segment(pen, last, first);
    }
    Ok(())
}
