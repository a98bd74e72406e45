//! Software rasterizer core.
//!
//! A [`Context`] is one drawing surface: an RGB float framebuffer with a
//! depth buffer, a model-view/projection transform pipeline, and an
//! immediate-mode vertex capture. Captured vertices are transformed into
//! pixel space on submission and turned into pixels when the capture
//! ends, by Bresenham lines, midpoint circles, or an active-edge
//! scan-line polygon fill. A [`SurfaceRegistry`] owns many surfaces behind
//! generation-checked handles.
//!
//! ```
//! use rastercore::{Context, DrawMode, MatrixMode};
//!
//! let mut ctx = Context::new(64, 64)?;
//! ctx.set_matrix_mode(MatrixMode::Projection);
//! ctx.ortho(0.0, 64.0, 0.0, 64.0, -1.0, 1.0)?;
//! ctx.set_matrix_mode(MatrixMode::ModelView);
//!
//! ctx.begin(DrawMode::Polygon)?;
//! for (x, y) in [(8.0, 8.0), (56.0, 8.0), (32.0, 48.0)] {
//!     ctx.vertex_2d(x, y)?;
//! }
//! ctx.end()?;
//! assert_eq!(ctx.color_buffer().len(), 64 * 64 * 3);
//! # Ok::<(), rastercore::RasterError>(())
//! ```

pub mod config;
pub mod context;
pub mod display;
pub mod error;
pub mod geometry;
pub mod math3d;
pub mod pipeline;
pub mod raster;
pub mod registry;

pub use config::SurfaceConfig;
pub use context::{AreaMode, Context, DrawMode};
pub use display::{ClearMask, Color, Framebuffer, DEPTH_FAR};
pub use error::{RasterError, RasterResult};
pub use geometry::{Arc, Circle, Ellipse};
pub use math3d::{Matrix, Vertex};
pub use pipeline::{MatrixMode, Pipeline, Viewport};
pub use registry::{SurfaceHandle, SurfaceRegistry};
