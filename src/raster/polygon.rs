//! Scan-line polygon fill driven by an active edge table.
//!
//! Edges live in an arena and move through three states: pending (not yet
//! reached by the scan-line), active (crossing the current scan-line) and
//! retired. Each scan-line runs the same fixed sequence:
//!
//! 1. activate every pending edge whose rounded start equals the scan-line
//! 2. retire every active edge whose rounded end equals the scan-line
//! 3. step the remaining active edges to the scan-line
//! 4. sort them by x and fill between consecutive pairs
//!
//! Retiring before stepping keeps an edge from being stepped past its last
//! scan-line. Sampling happens at pixel centers, so polygons sharing an edge
//! neither overlap nor leave a gap between them.
//!
//! The scan starts at row 0 at the earliest. An edge that begins above the
//! surface is positioned directly on the row before the first scanned one
//! when it is activated, so rows above the surface cost nothing.

use super::{round_half_up, Pen};
use crate::error::{RasterError, RasterResult};
use crate::math3d::Vertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeState {
    Pending,
    Active,
    Retired,
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    /// x and z at the center of the last scan-line this edge was stepped to
    x: f32,
    z: f32,
    /// per scan-line increments
    dx: f32,
    dz: f32,
    /// upper endpoint
    start_x: f32,
    start_y: f32,
    start_z: f32,
    /// rounded start, the first scan-line the edge covers
    first_line: i32,
    /// rounded end, the first scan-line the edge no longer covers
    end_line: i32,
    state: EdgeState,
}

impl Edge {
    /// Edge between two pixel-space vertices, or None when it is horizontal
    fn new(a: Vertex, b: Vertex) -> Option<Self> {
        let (a, b) = if b.y < a.y { (b, a) } else { (a, b) };
        let dy = b.y - a.y;
        if dy == 0.0 || !dy.is_finite() {
            return None;
        }

        let first_line = round_half_up(a.y);
        let mut edge = Self {
            x: a.x,
            z: a.z,
            dx: (b.x - a.x) / dy,
            dz: (b.z - a.z) / dy,
            start_x: a.x,
            start_y: a.y,
            start_z: a.z,
            first_line,
            end_line: round_half_up(b.y),
            state: EdgeState::Pending,
        };
        edge.prime(first_line);
        Some(edge)
    }

    /// Position the edge on the center of the row before `y`, so the step
    /// taken on activation at `y` lands exactly on that row's center.
    /// Computed in f64 from the endpoint: the lead can span millions of rows.
    fn prime(&mut self, y: i32) {
        let lead = (f64::from(y) - 0.5) - f64::from(self.start_y);
        self.x = (f64::from(self.start_x) + lead * f64::from(self.dx)) as f32;
        self.z = (f64::from(self.start_z) + lead * f64::from(self.dz)) as f32;
    }

    #[inline]
    fn step(&mut self) {
        self.x += self.dx;
        self.z += self.dz;
    }
}

/// Reusable polygon filler. Buffers are kept between calls so filling does
/// not allocate once warmed up.
#[derive(Debug, Clone, Default)]
pub struct ScanlineFiller {
    edges: Vec<Edge>,
    pending: Vec<usize>,
    active: Vec<usize>,
}

impl ScanlineFiller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the closed polygon through `vertices` (pixel space).
    ///
    /// The polygon is assumed simple. An odd number of active edges on any
    /// scan-line means the input broke that assumption and is reported as
    /// [`RasterError::InvalidGeometry`]; spans already written stay written.
    /// A closed chain of finite vertices always crosses a scan-line an even
    /// number of times, so in practice the odd case comes from non-finite
    /// coordinates whose edges were dropped.
    pub fn fill(&mut self, pen: &mut Pen, vertices: &[Vertex]) -> RasterResult<()> {
        let result = self.scan(pen, vertices);
        self.edges.clear();
        self.pending.clear();
        self.active.clear();
        result
    }

    fn build_edges(&mut self, vertices: &[Vertex]) {
        let closing = vertices.last().zip(vertices.first());
        let pairs = vertices
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing.map(|(&a, &b)| (a, b)));

        self.edges.extend(pairs.filter_map(|(a, b)| Edge::new(a, b)));
        self.pending.extend(0..self.edges.len());

        let edges = &self.edges;
        self.pending
            .sort_by(|&a, &b| edges[a].start_y.total_cmp(&edges[b].start_y));
    }

    fn scan(&mut self, pen: &mut Pen, vertices: &[Vertex]) -> RasterResult<()> {
        if vertices.len() < 3 {
            return Err(RasterError::geometry(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }

        self.build_edges(vertices);
        self.run(pen)
    }

    /// Walk the scan-lines over the edges already in the arena
    fn run(&mut self, pen: &mut Pen) -> RasterResult<()> {
        let Self {
            edges,
            pending,
            active,
        } = self;

        // Every edge was horizontal: nothing has area
        let Some(&first) = pending.first() else {
            return Ok(());
        };
        let min_y = edges[first].first_line;
        let max_y = edges.iter().map(|e| e.end_line).max().unwrap_or(min_y);
        let height = pen.height() as i32;

        tracing::trace!(edges = edges.len(), min_y, max_y, "filling polygon");

        let mut next_pending = 0;
        for y in min_y.max(0)..max_y {
            if y >= height {
                break;
            }

            while let Some(&idx) = pending.get(next_pending) {
                if edges[idx].first_line > y {
                    break;
                }
                if edges[idx].first_line < y {
                    edges[idx].prime(y);
                }
                edges[idx].state = EdgeState::Active;
                active.push(idx);
                next_pending += 1;
            }

            active.retain(|&idx| {
                let edge = &mut edges[idx];
                if edge.end_line <= y {
                    edge.state = EdgeState::Retired;
                    false
                } else {
                    true
                }
            });

            if active.is_empty() {
                continue;
            }

            for &idx in active.iter() {
                debug_assert_eq!(edges[idx].state, EdgeState::Active);
                edges[idx].step();
            }

            if active.len() % 2 != 0 {
                return Err(RasterError::geometry(format!(
                    "{} active edges on scan-line {y}; polygon is not simple",
                    active.len()
                )));
            }

            active.sort_by(|&a, &b| edges[a].x.total_cmp(&edges[b].x));

            for pair in active.chunks_exact(2) {
                fill_span(pen, &edges[pair[0]], &edges[pair[1]], y);
            }
        }

        Ok(())
    }
}

/// Fill the pixels of row `y` whose centers lie in `[left.x, right.x)`,
/// clipped to the surface
fn fill_span(pen: &mut Pen, left: &Edge, right: &Edge, y: i32) {
    let (xl, xr) = (left.x, right.x);
    let width = pen.width() as f32;
    let first = (xl - 0.5).ceil().max(0.0);
    let last = ((xr - 0.5).ceil() - 1.0).min(width - 1.0);
    if first > last {
        return;
    }
    let (first, last) = (first as i32, last as i32);

    let slope = if xr > xl {
        (right.z - left.z) / (xr - xl)
    } else {
        0.0
    };
    let z_at = |px: i32| left.z + ((px as f32 + 0.5) - xl) * slope;
    pen.span(first, last, y, z_at(first), z_at(last));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Color, Framebuffer};
    use std::collections::HashSet;

    fn poly(points: &[(f32, f32)]) -> Vec<Vertex> {
        points.iter().map(|&(x, y)| Vertex::new_2d(x, y)).collect()
    }

    fn fill_into(fb: &mut Framebuffer, color: Color, points: &[(f32, f32)]) {
        let mut filler = ScanlineFiller::new();
        filler
            .fill(&mut Pen::new(fb, color, false), &poly(points))
            .unwrap();
    }

    fn pixels_of(fb: &Framebuffer, color: Color) -> HashSet<(i32, i32)> {
        let mut out = HashSet::new();
        for y in 0..fb.height() as i32 {
            for x in 0..fb.width() as i32 {
                if fb.pixel(x, y) == Some(color) {
                    out.insert((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_edge_skips_horizontal() {
        assert!(Edge::new(Vertex::new_2d(0.0, 3.0), Vertex::new_2d(9.0, 3.0)).is_none());
        let e = Edge::new(Vertex::new_2d(4.0, 10.0), Vertex::new_2d(0.0, 2.0)).unwrap();
        assert_eq!(e.first_line, 2);
        assert_eq!(e.end_line, 10);
        assert_eq!(e.dx, 0.5);
    }

    #[test]
    fn test_rectangle_fills_exact_area() {
        let mut fb = Framebuffer::new(16, 16);
        fill_into(
            &mut fb,
            Color::WHITE,
            &[(2.0, 2.0), (10.0, 2.0), (10.0, 8.0), (2.0, 8.0)],
        );
        let px = pixels_of(&fb, Color::WHITE);
        assert_eq!(px.len(), 48);
        assert!(px.contains(&(2, 2)));
        assert!(px.contains(&(9, 7)));
        assert!(!px.contains(&(10, 7)));
        assert!(!px.contains(&(2, 8)));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape: the notch must stay empty
        let mut fb = Framebuffer::new(16, 16);
        fill_into(
            &mut fb,
            Color::WHITE,
            &[
                (0.0, 0.0),
                (12.0, 0.0),
                (12.0, 10.0),
                (8.0, 10.0),
                (8.0, 4.0),
                (4.0, 4.0),
                (4.0, 10.0),
                (0.0, 10.0),
            ],
        );
        let px = pixels_of(&fb, Color::WHITE);
        assert_eq!(px.len(), 96);
        assert!(!px.contains(&(6, 6)));
        assert!(px.contains(&(2, 6)));
        assert!(px.contains(&(10, 6)));
    }

    #[test]
    fn test_spans_are_contiguous_per_row() {
        let mut fb = Framebuffer::new(16, 16);
        fill_into(
            &mut fb,
            Color::WHITE,
            &[(1.3, 2.7), (12.2, 3.1), (10.6, 11.8), (3.4, 9.9)],
        );
        let px = pixels_of(&fb, Color::WHITE);
        for y in 0..16 {
            let row: Vec<i32> = (0..16).filter(|&x| px.contains(&(x, y))).collect();
            if let (Some(first), Some(last)) = (row.first(), row.last()) {
                assert_eq!(row.len() as i32, last - first + 1, "gap in row {y}");
            }
        }
        // shoelace area is 71.66
        assert!((px.len() as f32 - 71.66).abs() < 9.0);
    }

    #[test]
    fn test_shared_edge_has_no_seam_or_overlap() {
        let quad = [(0.3, 0.2), (9.7, 1.1), (8.8, 9.6), (1.2, 8.3)];

        let mut whole = Framebuffer::new(16, 16);
        fill_into(&mut whole, Color::WHITE, &quad);

        let mut split = Framebuffer::new(16, 16);
        fill_into(&mut split, Color::RED, &[quad[0], quad[1], quad[2]]);
        let red = pixels_of(&split, Color::RED);
        fill_into(&mut split, Color::BLUE, &[quad[0], quad[2], quad[3]]);
        let blue = pixels_of(&split, Color::BLUE);

        // blue overwrote nothing red, and together they match the whole
        assert_eq!(pixels_of(&split, Color::RED), red);
        let union: HashSet<_> = red.union(&blue).copied().collect();
        assert_eq!(union, pixels_of(&whole, Color::WHITE));
    }

    #[test]
    fn test_degenerate_inputs() {
        let mut fb = Framebuffer::new(8, 8);
        let mut filler = ScanlineFiller::new();
        let mut pen = Pen::new(&mut fb, Color::WHITE, false);

        assert!(matches!(
            filler.fill(&mut pen, &[]),
            Err(RasterError::InvalidGeometry(_))
        ));
        assert!(matches!(
            filler.fill(&mut pen, &poly(&[(0.0, 0.0), (4.0, 4.0)])),
            Err(RasterError::InvalidGeometry(_))
        ));
        // collinear horizontal: no edges survive, nothing drawn
        assert!(filler
            .fill(&mut pen, &poly(&[(0.0, 2.0), (3.0, 2.0), (6.0, 2.0)]))
            .is_ok());
        assert!(pixels_of(&fb, Color::WHITE).is_empty());
    }

    #[test]
    fn test_broken_chain_reports_odd_crossing() {
        let mut fb = Framebuffer::new(8, 8);
        let mut filler = ScanlineFiller::new();
        let result = filler.fill(
            &mut Pen::new(&mut fb, Color::WHITE, false),
            &poly(&[(1.0, 1.0), (6.0, 1.0), (6.0, 6.0), (3.0, f32::NAN)]),
        );
        assert!(matches!(result, Err(RasterError::InvalidGeometry(_))));
    }

    #[test]
    fn test_unpaired_edge_set_reports_odd_crossing() {
        let mut fb = Framebuffer::new(8, 8);
        let mut filler = ScanlineFiller::new();
        filler.edges.extend(
            [
                Edge::new(Vertex::new_2d(1.0, 1.0), Vertex::new_2d(1.0, 6.0)),
                Edge::new(Vertex::new_2d(6.0, 1.0), Vertex::new_2d(6.0, 6.0)),
                Edge::new(Vertex::new_2d(3.0, 3.0), Vertex::new_2d(4.0, 5.0)),
            ]
            .into_iter()
            .flatten(),
        );
        filler.pending.extend(0..3);

        let result = filler.run(&mut Pen::new(&mut fb, Color::WHITE, false));
        assert!(matches!(result, Err(RasterError::InvalidGeometry(_))));
        // rows 1 and 2 had a valid pair before the third edge arrived
        assert_eq!(pixels_of(&fb, Color::WHITE).len(), 10);
    }

    #[test]
    fn test_far_offscreen_vertices_are_clipped() {
        let mut fb = Framebuffer::new(16, 16);
        fill_into(
            &mut fb,
            Color::WHITE,
            &[(-3e9, 2.0), (3e9, 2.0), (3e9, 6.0), (-3e9, 6.0)],
        );
        let px = pixels_of(&fb, Color::WHITE);
        assert_eq!(px.len(), 64);
        assert!((2..6).all(|y| px.contains(&(0, y)) && px.contains(&(15, y))));
    }

    #[test]
    fn test_edge_starting_far_above_is_positioned_on_first_row() {
        let mut fb = Framebuffer::new(16, 16);
        fill_into(&mut fb, Color::WHITE, &[(0.0, -3e9), (16.0, 8.0), (0.0, 8.0)]);
        let px = pixels_of(&fb, Color::WHITE);
        assert_eq!(px.len(), 128);
        assert!(px.contains(&(15, 7)));
        assert!(!px.contains(&(0, 8)));
    }

    #[test]
    fn test_filler_is_reusable() {
        let tri = [(1.0, 1.0), (7.0, 2.0), (3.0, 7.0)];
        let mut filler = ScanlineFiller::new();

        let mut a = Framebuffer::new(8, 8);
        filler
            .fill(&mut Pen::new(&mut a, Color::WHITE, false), &poly(&tri))
            .unwrap();
        let mut b = Framebuffer::new(8, 8);
        filler
            .fill(&mut Pen::new(&mut b, Color::WHITE, false), &poly(&tri))
            .unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_depth_interpolates_across_span() {
        let mut fb = Framebuffer::new(8, 4);
        let verts = [
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(8.0, 0.0, 8.0),
            Vertex::new(8.0, 4.0, 8.0),
            Vertex::new(0.0, 4.0, 0.0),
        ];
        ScanlineFiller::new()
            .fill(&mut Pen::new(&mut fb, Color::WHITE, true), &verts)
            .unwrap();
        for x in 0..8 {
            let z = fb.depth_at(x, 2).unwrap();
            assert!((z - (x as f32 + 0.5)).abs() < 1e-4, "x {x}: z {z}");
        }
    }

    #[test]
    fn test_offscreen_rows_are_skipped() {
        let mut fb = Framebuffer::new(8, 8);
        fill_into(
            &mut fb,
            Color::WHITE,
            &[(-4.0, -6.0), (12.0, -6.0), (12.0, 3.0), (-4.0, 3.0)],
        );
        assert_eq!(pixels_of(&fb, Color::WHITE).len(), 24);
    }
}
