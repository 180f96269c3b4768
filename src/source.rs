//! Pixel access boundary.
//!
//! The quantizer never decodes images itself. Anything that can report its
//! dimensions and hand out per-pixel colors implements [`PixelSource`];
//! adapters for `imgref` buffers live here, decoder-backed ones in
//! `image_source` behind the `image` feature.

use imgref::ImgRef;
use rgb::{RGB8, RGBA8};

/// Alpha value of a fully opaque pixel.
pub const ALPHA_OPAQUE: u8 = 0;
/// Alpha value of a fully transparent pixel.
pub const ALPHA_TRANSPARENT: u8 = 127;

/// One pixel as seen by the histogram builder.
///
/// Alpha runs from 0 (opaque) to 127 (transparent), the reverse of the usual
/// 0-255 straight alpha. Use [`PixelColor::from_rgba8`] to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl PixelColor {
    pub const fn opaque(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: ALPHA_OPAQUE,
        }
    }

    /// Convert from 0-255 straight alpha (255 = opaque).
    pub fn from_rgba8(p: RGBA8) -> Self {
        let scaled = (p.a as u32 * ALPHA_TRANSPARENT as u32 + 127) / 255;
        Self {
            red: p.r,
            green: p.g,
            blue: p.b,
            alpha: ALPHA_TRANSPARENT - scaled as u8,
        }
    }

    pub fn rgb(self) -> RGB8 {
        RGB8::new(self.red, self.green, self.blue)
    }
}

/// A readable raster image.
pub trait PixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Color at `(x, y)`; callers stay within `width() x height()`.
    fn pixel_at(&self, x: u32, y: u32) -> PixelColor;
}

impl<S: PixelSource + ?Sized> PixelSource for &S {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn pixel_at(&self, x: u32, y: u32) -> PixelColor {
        (**self).pixel_at(x, y)
    }
}

impl PixelSource for ImgRef<'_, RGBA8> {
    fn width(&self) -> u32 {
        imgref::Img::width(self) as u32
    }

    fn height(&self) -> u32 {
        imgref::Img::height(self) as u32
    }

    fn pixel_at(&self, x: u32, y: u32) -> PixelColor {
        let idx = y as usize * self.stride() + x as usize;
        PixelColor::from_rgba8(self.buf()[idx])
    }
}

impl PixelSource for ImgRef<'_, RGB8> {
    fn width(&self) -> u32 {
        imgref::Img::width(self) as u32
    }

    fn height(&self) -> u32 {
        imgref::Img::height(self) as u32
    }

    fn pixel_at(&self, x: u32, y: u32) -> PixelColor {
        let p = self.buf()[y as usize * self.stride() + x as usize];
        PixelColor::opaque(p.r, p.g, p.b)
    }
}

/// Rectangular region of the image to sample.
///
/// Missing extents default to the remainder of the image past the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Area {
    pub x: u32,
    pub y: u32,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Area {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width: Some(width),
            height: Some(height),
        }
    }

    /// Everything right of and below `(x, y)`.
    pub fn from_origin(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate alloc;
    use alloc::vec;

    #[test]
    fn alpha_conversion_is_reversed() {
        let opaque = PixelColor::from_rgba8(RGBA8::new(1, 2, 3, 255));
        assert_eq!(opaque.alpha, ALPHA_OPAQUE);
        let clear = PixelColor::from_rgba8(RGBA8::new(1, 2, 3, 0));
        assert_eq!(clear.alpha, ALPHA_TRANSPARENT);
        let half = PixelColor::from_rgba8(RGBA8::new(1, 2, 3, 128));
        assert_eq!(half.alpha, 63);
        assert_eq!(half.rgb(), RGB8::new(1, 2, 3));
    }

    #[test]
    fn imgref_respects_stride() {
        // 2x2 image stored with a stride of 3
        let buf = vec![
            RGB8::new(1, 0, 0),
            RGB8::new(2, 0, 0),
            RGB8::new(99, 99, 99),
            RGB8::new(3, 0, 0),
            RGB8::new(4, 0, 0),
            RGB8::new(99, 99, 99),
        ];
        let img = imgref::Img::new_stride(&buf[..], 2, 2, 3);
        assert_eq!(PixelSource::width(&img), 2);
        assert_eq!(PixelSource::height(&img), 2);
        assert_eq!(img.pixel_at(0, 1), PixelColor::opaque(3, 0, 0));
        assert_eq!(img.pixel_at(1, 1), PixelColor::opaque(4, 0, 0));
    }

    #[test]
    fn area_defaults() {
        let area = Area::from_origin(3, 4).height(2);
        assert_eq!(area.width, None);
        assert_eq!(area.height, Some(2));
        assert_eq!(Area::new(1, 2, 3, 4).width, Some(3));
    }
}
