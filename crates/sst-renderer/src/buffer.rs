//! Owned RGBA pixel buffers.

use crate::error::{RenderError, RenderResult};

/// Mutable RGBA raster, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height * 4],
        }
    }

    /// Buffer where every pixel is `rgba`.
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Take ownership of raw RGBA bytes, e.g. from a decoded image.
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> RenderResult<Self> {
        if data.len() != width * height * 4 {
            return Err(RenderError::InvalidBuffer(format!(
                "{} bytes for {}x{} RGBA (expected {})",
                data.len(),
                width,
                height,
                width * height * 4
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// One row of RGBA bytes.
    pub fn row(&self, y: usize) -> &[u8] {
        let stride = self.width * 4;
        &self.data[y * stride..(y + 1) * stride]
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Overwrite the pixel at `(x, y)`. Out-of-range writes are ignored.
    #[inline]
    pub fn put(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }
}
