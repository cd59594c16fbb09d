use crate::foundation::error::{SpriteforgeError, SpriteforgeResult};

/// One RGBA8 pixel, channel order `[r, g, b, a]`.
pub type Rgba8 = [u8; 4];

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Row-major RGBA8 pixels.
///
/// Buffers produced by the compositor hold straight alpha unless `premultiplied` is set, in which
/// case every color channel has already been multiplied by its alpha.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl PixelBuffer {
    /// Fully transparent black buffer.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; pixel_len(width, height)],
            premultiplied: false,
        }
    }

    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> SpriteforgeResult<Self> {
        if data.len() != pixel_len(width, height) {
            return Err(SpriteforgeError::validation(format!(
                "pixel buffer of {width}x{height} needs {} bytes, got {}",
                pixel_len(width, height),
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied: false,
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Copy `src` into this buffer with its top-left corner at `(x, y)`.
    ///
    /// The source must fit entirely; callers lay out cells before copying.
    pub fn blit(&mut self, src: &PixelBuffer, x: u32, y: u32) -> SpriteforgeResult<()> {
        if x.saturating_add(src.width) > self.width || y.saturating_add(src.height) > self.height {
            return Err(SpriteforgeError::validation(format!(
                "blit of {}x{} at ({x}, {y}) exceeds {}x{} target",
                src.width, src.height, self.width, self.height
            )));
        }
        let row_len = (src.width as usize) * 4;
        for row in 0..src.height as usize {
            let s = row * row_len;
            let d = ((y as usize + row) * (self.width as usize) + x as usize) * 4;
            self.data[d..d + row_len].copy_from_slice(&src.data[s..s + row_len]);
        }
        Ok(())
    }

    /// Hand the pixels to the `image` crate, e.g. for saving or GPU upload.
    pub fn to_rgba_image(&self) -> SpriteforgeResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            SpriteforgeError::validation("pixel data does not match buffer dimensions")
        })
    }
}

pub(crate) fn pixel_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * 4
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
