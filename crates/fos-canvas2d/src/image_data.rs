//! ImageData
//!
//! Owned RGBA8888 pixel buffers for pixel read/write. Straight (not
//! premultiplied) alpha, rows top to bottom, no padding.

use crate::paint::Color;
use crate::raster::Bitmap;
use crate::{CanvasError, Result};

/// Largest buffer, in pixels
pub const MAX_PIXELS: u64 = 16384 * 16384;

/// ImageData - raw pixel data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl ImageData {
    /// Transparent black buffer. Zero dimensions or more than
    /// [`MAX_PIXELS`] are an index-size error.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = byte_len(width, height).ok_or(CanvasError::IndexSize)?;
        Ok(Self { data: vec![0; len], width, height })
    }

    /// Wrap existing RGBA bytes; the length must be `width * height * 4`
    pub fn from_data(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if byte_len(width, height) != Some(data.len()) {
            return Err(CanvasError::IndexSize);
        }
        Ok(Self { data, width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pixel at (x, y), `None` outside the buffer
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        let idx = self.index(x, y)?;
        let px = &self.data[idx..idx + 4];
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }

    /// Set pixel at (x, y); ignored outside the buffer
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.data[idx..idx + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Premultiplied bitmap with the same pixels
    pub fn to_bitmap(&self) -> Option<Bitmap> {
        Bitmap::from_rgba8(self.width, self.height, &self.data)
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }
}

/// Buffer size in bytes; `None` when empty or over the pixel limit
fn byte_len(width: u32, height: u32) -> Option<usize> {
    let pixels = width as u64 * height as u64;
    if pixels == 0 || pixels > MAX_PIXELS {
        return None;
    }
    usize::try_from(pixels * 4).ok()
}
