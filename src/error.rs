use crate::pipeline::MatrixMode;

/// Convenience result type used across the rasterizer.
pub type RasterResult<T> = Result<T, RasterError>;

/// Error taxonomy for drawing, matrix and surface operations.
///
/// Writes that fall outside the framebuffer are not part of this enum:
/// they are dropped silently by [`crate::Framebuffer`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RasterError {
    /// Geometry the rasterizer cannot turn into pixels.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A registry handle that was destroyed or never issued.
    #[error("invalid surface handle (index {index}, generation {generation})")]
    InvalidHandle { index: u32, generation: u32 },

    /// A primitive capture was begun while another one was still open.
    #[error("a primitive capture is already in progress")]
    OverlappingCapture,

    /// A vertex or completion was submitted with no capture open.
    #[error("no primitive capture is in progress")]
    NoActiveCapture,

    /// Pop on an empty matrix stack.
    #[error("matrix stack underflow in {0:?} mode")]
    MatrixStackUnderflow(MatrixMode),

    /// Reading, parsing or writing a surface configuration failed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RasterError {
    /// Build a [`RasterError::InvalidGeometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Build a [`RasterError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
