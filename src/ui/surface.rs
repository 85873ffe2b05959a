use std::error::Error;
use std::fmt;

use crate::MAX_SURFACE_PIXELS;
use crate::game::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    TooLarge(SurfaceSize),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::TooLarge(size) => {
                write!(f, "surface {}x{} exceeds pixel cap", size.width, size.height)
            }
        }
    }
}

impl Error for SurfaceError {}

/// A drawing target measured in surface units.
pub trait Surface {
    fn size(&self) -> SurfaceSize;
    fn resize(&mut self, size: SurfaceSize) -> Result<(), SurfaceError>;
    fn clear(&mut self);
    /// Fills the rectangle, clipped to the surface.
    fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgb);
}

/// In-memory surface. Unpainted pixels are transparent (`None`).
#[derive(Debug, Clone)]
pub struct PixelSurface {
    size: SurfaceSize,
    pixels: Vec<Option<Rgb>>,
}

impl PixelSurface {
    pub fn new(size: SurfaceSize) -> Self {
        let mut surface = Self {
            size: SurfaceSize::default(),
            pixels: Vec::new(),
        };
        // An oversized request leaves an empty surface; drawing then clips away.
        let _ = surface.resize(size);
        surface
    }

    pub fn pixel(&self, x: i64, y: i64) -> Option<Rgb> {
        if x < 0 || y < 0 || x >= self.size.width as i64 || y >= self.size.height as i64 {
            return None;
        }
        self.pixels[y as usize * self.size.width as usize + x as usize]
    }

    #[cfg(test)]
    pub fn painted(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_some()).count()
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), SurfaceError> {
        if size.pixel_count() > MAX_SURFACE_PIXELS {
            return Err(SurfaceError::TooLarge(size));
        }
        self.size = size;
        self.pixels.clear();
        self.pixels.resize(size.pixel_count(), None);
        Ok(())
    }

    fn clear(&mut self) {
        self.pixels.fill(None);
    }

    fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgb) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width as i64).min(self.size.width as i64);
        let y1 = (y + height as i64).min(self.size.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let stride = self.size.width as usize;
        for row in y0 as usize..y1 as usize {
            self.pixels[row * stride + x0 as usize..row * stride + x1 as usize].fill(Some(color));
        }
    }
}
