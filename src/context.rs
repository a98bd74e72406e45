//! A drawing surface: framebuffer, transform pipeline, vertex capture and
//! the draw state that decides how captured vertices become pixels.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::SurfaceConfig;
use crate::display::{ClearMask, Color, Framebuffer};
use crate::error::{RasterError, RasterResult};
use crate::geometry::{Arc, Circle, Ellipse};
use crate::math3d::{Matrix, Vertex};
use crate::pipeline::{MatrixMode, Pipeline, Viewport};
use crate::raster::{self, circle, line, Pen, ScanlineFiller};

/// How captured vertices are grouped into primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    Polygon,
}

/// How closed shapes are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaMode {
    /// Vertices only
    Point,
    /// Outline
    Line,
    #[default]
    Fill,
}

#[derive(Debug, Clone)]
pub struct Context {
    framebuffer: Framebuffer,
    pipeline: Pipeline,
    vertices: Vec<Vertex>,
    filler: ScanlineFiller,
    color: Color,
    clear_color: Color,
    point_size: f32,
    draw_mode: Option<DrawMode>,
    area_mode: AreaMode,
    depth_test: bool,
}

impl Context {
    pub fn new(width: u32, height: u32) -> RasterResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::geometry(format!(
                "surface must have a non-zero size, got {width}x{height}"
            )));
        }
        Ok(Self {
            framebuffer: Framebuffer::new(width, height),
            pipeline: Pipeline::new(Viewport::full(width, height)),
            vertices: Vec::new(),
            filler: ScanlineFiller::new(),
            color: Color::WHITE,
            clear_color: Color::BLACK,
            point_size: 1.0,
            draw_mode: None,
            area_mode: AreaMode::default(),
            depth_test: false,
        })
    }

    pub fn from_config(config: &SurfaceConfig) -> RasterResult<Self> {
        config.validate()?;
        let mut ctx = Self::new(config.width, config.height)?;
        if let Some(viewport) = config.viewport {
            ctx.set_viewport(viewport.x, viewport.y, viewport.width, viewport.height)?;
        }
        ctx.set_clear_color(config.clear_color);
        ctx.set_point_size(config.point_size)?;
        ctx.set_depth_test(config.depth_test);
        ctx.set_area_mode(config.area_mode);
        ctx.clear(ClearMask::ALL);
        Ok(ctx)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.framebuffer.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.framebuffer.height()
    }

    /// Row-major RGB floats, `width * height * 3` long
    #[inline]
    pub fn color_buffer(&self) -> &[f32] {
        self.framebuffer.as_slice()
    }

    #[inline]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.framebuffer.pixel(x, y)
    }

    #[inline]
    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        self.framebuffer.depth_at(x, y)
    }

    // ------------------------------------------------------------------
    // Draw state
    // ------------------------------------------------------------------

    pub fn set_color(&mut self, r: f32, g: f32, b: f32) {
        self.color = Color::new(r, g, b);
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn set_point_size(&mut self, size: f32) -> RasterResult<()> {
        if !(size > 0.0 && size.is_finite()) {
            return Err(RasterError::geometry(format!(
                "point size must be positive, got {size}"
            )));
        }
        self.point_size = size;
        Ok(())
    }

    #[inline]
    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    pub fn set_area_mode(&mut self, mode: AreaMode) {
        self.area_mode = mode;
    }

    #[inline]
    pub fn area_mode(&self) -> AreaMode {
        self.area_mode
    }

    pub fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    #[inline]
    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    /// Mode of the open capture, if any
    #[inline]
    pub fn draw_mode(&self) -> Option<DrawMode> {
        self.draw_mode
    }

    #[inline]
    pub fn is_capturing(&self) -> bool {
        self.draw_mode.is_some()
    }

    pub fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) -> RasterResult<()> {
        self.pipeline.set_viewport(Viewport::new(x, y, width, height)?);
        Ok(())
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.pipeline.viewport()
    }

    pub fn clear(&mut self, mask: ClearMask) {
        self.framebuffer.clear(mask, self.clear_color);
    }

    // ------------------------------------------------------------------
    // Matrices
    // ------------------------------------------------------------------

    #[inline]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn set_matrix_mode(&mut self, mode: MatrixMode) {
        self.pipeline.set_mode(mode);
    }

    #[inline]
    pub fn matrix_mode(&self) -> MatrixMode {
        self.pipeline.mode()
    }

    /// Commit `matrix` into the named slot regardless of the current mode
    pub fn set_matrix(&mut self, mode: MatrixMode, matrix: Matrix) {
        self.pipeline.set_matrix(mode, matrix);
    }

    pub fn load_identity(&mut self) {
        self.pipeline.load(Matrix::IDENTITY);
    }

    pub fn load_null(&mut self) {
        self.pipeline.load(Matrix::NULL);
    }

    pub fn load_matrix(&mut self, matrix: Matrix) {
        self.pipeline.load(matrix);
    }

    pub fn mult_matrix(&mut self, matrix: Matrix) {
        self.pipeline.multiply(matrix);
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.pipeline.multiply(Matrix::translation(x, y, z));
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.pipeline.multiply(Matrix::scaling(sx, sy, sz));
    }

    /// Rotate about the Z axis through the origin
    pub fn rotate(&mut self, angle: f32) {
        self.pipeline.multiply(Matrix::rotation(angle));
    }

    /// Rotate in the XY plane about `(cx, cy)`
    pub fn rotate_2d(&mut self, angle: f32, cx: f32, cy: f32) {
        self.pipeline.multiply(
            Matrix::translation(cx, cy, 0.0)
                * Matrix::rotation(angle)
                * Matrix::translation(-cx, -cy, 0.0),
        );
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.pipeline.multiply(Matrix::rotation_y(angle));
    }

    pub fn ortho(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> RasterResult<()> {
        if left == right || bottom == top || near == far {
            return Err(RasterError::geometry(format!(
                "degenerate ortho volume [{left}, {right}] x [{bottom}, {top}] x [{near}, {far}]"
            )));
        }
        self.pipeline
            .multiply(Matrix::ortho(left, right, bottom, top, near, far));
        Ok(())
    }

    pub fn push_matrix(&mut self) {
        self.pipeline.push();
    }

    pub fn pop_matrix(&mut self) -> RasterResult<()> {
        self.pipeline.pop()
    }

    /// Save the current mode's matrix, run `f`, then restore it whether or
    /// not `f` succeeded. The restore targets the stack that was pushed even
    /// if `f` switched matrix modes.
    pub fn with_pushed_matrix<T, F>(&mut self, f: F) -> RasterResult<T>
    where
        F: FnOnce(&mut Self) -> RasterResult<T>,
    {
        let mode = self.pipeline.mode();
        self.pipeline.push();
        let result = f(self);

        let active = self.pipeline.mode();
        self.pipeline.set_mode(mode);
        let restored = self.pipeline.pop();
        self.pipeline.set_mode(active);

        let value = result?;
        restored?;
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Capture
    // ------------------------------------------------------------------

    pub fn begin(&mut self, mode: DrawMode) -> RasterResult<()> {
        if self.draw_mode.is_some() {
            return Err(RasterError::OverlappingCapture);
        }
        self.vertices.clear();
        self.draw_mode = Some(mode);
        Ok(())
    }

    /// Transform `v` into pixel space and append it to the open capture
    pub fn add_vertex(&mut self, v: Vertex) -> RasterResult<()> {
        if self.draw_mode.is_none() {
            return Err(RasterError::NoActiveCapture);
        }
        self.vertices.push(self.pipeline.to_pixel_space(v));
        Ok(())
    }

    pub fn vertex_2d(&mut self, x: f32, y: f32) -> RasterResult<()> {
        self.add_vertex(Vertex::new_2d(x, y))
    }

    pub fn vertex_3d(&mut self, x: f32, y: f32, z: f32) -> RasterResult<()> {
        self.add_vertex(Vertex::new(x, y, z))
    }

    /// Rasterize the captured vertices. The capture is closed and the
    /// vertex buffer emptied even when rasterization fails.
    pub fn end(&mut self) -> RasterResult<()> {
        let mode = self.draw_mode.take().ok_or(RasterError::NoActiveCapture)?;
        debug!(?mode, area = ?self.area_mode, vertices = self.vertices.len(), "rasterizing primitive");

        let result = self.dispatch(mode);
        self.vertices.clear();
        if let Err(err) = &result {
            warn!(?mode, %err, "primitive rejected");
        }
        result
    }

    fn dispatch(&mut self, mode: DrawMode) -> RasterResult<()> {
        let Self {
            framebuffer,
            vertices,
            filler,
            color,
            point_size,
            area_mode,
            depth_test,
            ..
        } = self;
        let vertices = vertices.as_slice();
        let mut pen = Pen::new(framebuffer, *color, *depth_test);

        match mode {
            DrawMode::Points => {
                raster::points(&mut pen, vertices, *point_size);
                Ok(())
            }
            DrawMode::Lines => line::segments(&mut pen, vertices),
            DrawMode::LineStrip => line::strip(&mut pen, vertices),
            DrawMode::LineLoop => line::line_loop(&mut pen, vertices),
            DrawMode::Polygon => closed_shape(&mut pen, filler, vertices, *area_mode, *point_size),
            DrawMode::Triangles => {
                if vertices.len() < 3 {
                    return Err(RasterError::geometry(format!(
                        "triangles need at least 3 vertices, got {}",
                        vertices.len()
                    )));
                }
                for triangle in vertices.chunks_exact(3) {
                    closed_shape(&mut pen, filler, triangle, *area_mode, *point_size)?;
                }
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Shape helpers
    // ------------------------------------------------------------------

    fn require_idle(&self) -> RasterResult<()> {
        if self.draw_mode.is_some() {
            Err(RasterError::OverlappingCapture)
        } else {
            Ok(())
        }
    }

    fn pen(&mut self) -> Pen<'_> {
        Pen::new(&mut self.framebuffer, self.color, self.depth_test)
    }

    /// Circle with the midpoint rasterizer, outlined or filled
    pub fn add_circle(&mut self, shape: &Circle, filled: bool) -> RasterResult<()> {
        self.circle_with(shape, if filled { AreaMode::Fill } else { AreaMode::Line })
    }

    /// Circle rendered according to the current area mode
    pub fn draw_circle(&mut self, shape: &Circle) -> RasterResult<()> {
        self.circle_with(shape, self.area_mode)
    }

    fn circle_with(&mut self, shape: &Circle, area: AreaMode) -> RasterResult<()> {
        self.require_idle()?;
        let center = self.pipeline.to_pixel_space(shape.center);
        let pixel_radius = self.pipeline.pixel_scale() * shape.radius;
        if pixel_radius.is_nan() || pixel_radius > raster::GUARD_BAND as f32 {
            return Err(RasterError::geometry(format!(
                "circle radius of {pixel_radius} pixels is out of range"
            )));
        }
        let radius = pixel_radius as i32;
        let (cx, cy) = (raster::to_pixel(center.x), raster::to_pixel(center.y));
        trace!(cx, cy, radius, ?area, "circle");

        let point_size = self.point_size;
        let mut pen = self.pen();
        match area {
            AreaMode::Point => raster::points(&mut pen, &[center], point_size),
            AreaMode::Line => circle::outline(&mut pen, cx, cy, radius, center.z),
            AreaMode::Fill => circle::filled(&mut pen, cx, cy, radius, center.z),
        }
        Ok(())
    }

    /// Arc outline, or the pie slice closed through the center when filled
    pub fn add_arc(&mut self, shape: &Arc, filled: bool) -> RasterResult<()> {
        self.arc_with(shape, if filled { AreaMode::Fill } else { AreaMode::Line })
    }

    pub fn draw_arc(&mut self, shape: &Arc) -> RasterResult<()> {
        self.arc_with(shape, self.area_mode)
    }

    fn arc_with(&mut self, shape: &Arc, area: AreaMode) -> RasterResult<()> {
        self.require_idle()?;
        let mut chain = shape.tessellate();
        if area == AreaMode::Fill {
            chain.push(shape.center);
        }
        trace!(segments = shape.segment_count(), ?area, "arc");

        match area {
            AreaMode::Point => self.shape(DrawMode::Points, &chain),
            AreaMode::Line => self.shape(DrawMode::LineStrip, &chain),
            AreaMode::Fill => self.shape(DrawMode::Polygon, &chain),
        }
    }

    pub fn add_ellipse(&mut self, shape: &Ellipse, filled: bool) -> RasterResult<()> {
        self.ellipse_with(shape, if filled { AreaMode::Fill } else { AreaMode::Line })
    }

    pub fn draw_ellipse(&mut self, shape: &Ellipse) -> RasterResult<()> {
        self.ellipse_with(shape, self.area_mode)
    }

    fn ellipse_with(&mut self, shape: &Ellipse, area: AreaMode) -> RasterResult<()> {
        self.require_idle()?;
        let ring = shape.tessellate();
        match area {
            AreaMode::Point => self.shape(DrawMode::Points, &ring),
            AreaMode::Line => self.shape(DrawMode::LineLoop, &ring),
            AreaMode::Fill => self.shape(DrawMode::Polygon, &ring),
        }
    }

    /// Run a whole capture over object-space `vertices`; polygon mode fills
    fn shape(&mut self, mode: DrawMode, vertices: &[Vertex]) -> RasterResult<()> {
        let area = std::mem::replace(&mut self.area_mode, AreaMode::Fill);
        let result = self.capture(mode, vertices);
        self.area_mode = area;
        result
    }

    fn capture(&mut self, mode: DrawMode, vertices: &[Vertex]) -> RasterResult<()> {
        self.begin(mode)?;
        let pipeline = &self.pipeline;
        self.vertices
            .extend(vertices.iter().map(|&v| pipeline.to_pixel_space(v)));
        self.end()
    }
}

/// Polygon or triangle rendered per area mode
fn closed_shape(
    pen: &mut Pen,
    filler: &mut ScanlineFiller,
    vertices: &[Vertex],
    area: AreaMode,
    point_size: f32,
) -> RasterResult<()> {
    match area {
        AreaMode::Point => {
            raster::points(pen, vertices, point_size);
            Ok(())
        }
        AreaMode::Line => line::line_loop(pen, vertices),
        AreaMode::Fill => filler.fill(pen, vertices),
    }
}
