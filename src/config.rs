//! Surface construction parameters, stored as JSON

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::context::AreaMode;
use crate::display::Color;
use crate::error::{RasterError, RasterResult};
use crate::pipeline::Viewport;

fn default_point_size() -> f32 {
    1.0
}

/// Everything needed to build a ready-to-draw surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    /// Defaults to the whole surface
    #[serde(default)]
    pub viewport: Option<Viewport>,
    #[serde(default)]
    pub clear_color: Color,
    #[serde(default = "default_point_size")]
    pub point_size: f32,
    #[serde(default)]
    pub depth_test: bool,
    #[serde(default)]
    pub area_mode: AreaMode,
}

impl SurfaceConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            viewport: None,
            clear_color: Color::BLACK,
            point_size: default_point_size(),
            depth_test: false,
            area_mode: AreaMode::default(),
        }
    }

    pub fn validate(&self) -> RasterResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::geometry(format!(
                "surface must have a non-zero size, got {}x{}",
                self.width, self.height
            )));
        }
        if let Some(vp) = self.viewport {
            if vp.width == 0 || vp.height == 0 {
                return Err(RasterError::geometry(format!(
                    "viewport must have a non-zero size, got {}x{}",
                    vp.width, vp.height
                )));
            }
        }
        if !(self.point_size > 0.0 && self.point_size.is_finite()) {
            return Err(RasterError::geometry(format!(
                "point size must be positive, got {}",
                self.point_size
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> RasterResult<Self> {
        serde_json::from_str(json).map_err(|e| RasterError::config(e.to_string()))
    }

    pub fn to_json(&self) -> RasterResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RasterError::config(e.to_string()))
    }

    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> RasterResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .map_err(|e| RasterError::config(format!("{}: {e}", path.display())))
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> RasterResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| RasterError::config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self::new(640, 480)
    }
}
