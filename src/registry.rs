//! Owns every live surface and tracks which one is current.
//!
//! Handles carry a generation so a handle kept past `destroy` is reported
//! as invalid instead of silently reaching whichever surface reused its slot.

use tracing::debug;

use crate::config::SurfaceConfig;
use crate::context::Context;
use crate::error::{RasterError, RasterResult};

/// Opaque reference to a surface in a [`SurfaceRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle {
    index: u32,
    generation: u32,
}

impl SurfaceHandle {
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }

    fn invalid(self) -> RasterError {
        RasterError::InvalidHandle {
            index: self.index,
            generation: self.generation,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    surface: Option<Context>,
}

#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    current: Option<SurfaceHandle>,
    live: usize,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `width` x `height` surface
    pub fn create(&mut self, width: u32, height: u32) -> RasterResult<SurfaceHandle> {
        let surface = Context::new(width, height)?;
        Ok(self.insert(surface))
    }

    pub fn create_from_config(&mut self, config: &SurfaceConfig) -> RasterResult<SurfaceHandle> {
        let surface = Context::from_config(config)?;
        Ok(self.insert(surface))
    }

    fn insert(&mut self, surface: Context) -> SurfaceHandle {
        let (width, height) = (surface.width(), surface.height());
        let handle = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.surface = Some(surface);
            SurfaceHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                surface: Some(surface),
            });
            SurfaceHandle {
                index,
                generation: 0,
            }
        };
        self.live += 1;
        debug!(index = handle.index, generation = handle.generation, width, height, "surface created");
        handle
    }

    /// Release a surface and both of its buffers. Destroying the current
    /// surface leaves no surface current.
    pub fn destroy(&mut self, handle: SurfaceHandle) -> RasterResult<()> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.surface.is_some())
            .ok_or_else(|| handle.invalid())?;
        slot.surface = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;

        if self.current == Some(handle) {
            self.current = None;
        }
        debug!(index = handle.index, generation = handle.generation, "surface destroyed");
        Ok(())
    }

    pub fn contains(&self, handle: SurfaceHandle) -> bool {
        self.get(handle).is_ok()
    }

    pub fn get(&self, handle: SurfaceHandle) -> RasterResult<&Context> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.surface.as_ref())
            .ok_or_else(|| handle.invalid())
    }

    pub fn get_mut(&mut self, handle: SurfaceHandle) -> RasterResult<&mut Context> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.surface.as_mut())
            .ok_or_else(|| handle.invalid())
    }

    pub fn set_current(&mut self, handle: SurfaceHandle) -> RasterResult<()> {
        self.get(handle)?;
        self.current = Some(handle);
        debug!(index = handle.index, generation = handle.generation, "current surface switched");
        Ok(())
    }

    #[inline]
    pub fn current_handle(&self) -> Option<SurfaceHandle> {
        self.current
    }

    pub fn current(&self) -> Option<&Context> {
        self.current.and_then(|h| self.get(h).ok())
    }

    pub fn current_mut(&mut self) -> Option<&mut Context> {
        let handle = self.current?;
        self.get_mut(handle).ok()
    }

    /// Live surfaces
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
