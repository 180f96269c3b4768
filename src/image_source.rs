//! [`PixelSource`] adapters and loaders backed by the `image` crate.

use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageError, RgbImage, RgbaImage};
use rgb::RGBA8;

use crate::error::{PaletteError, SourceError};
use crate::palette::Palette;
use crate::source::{PixelColor, PixelSource};
use crate::{PaletteConfig, get_palette};

impl PixelSource for RgbaImage {
    fn width(&self) -> u32 {
        image::ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        image::ImageBuffer::height(self)
    }

    fn pixel_at(&self, x: u32, y: u32) -> PixelColor {
        let [r, g, b, a] = self.get_pixel(x, y).0;
        PixelColor::from_rgba8(RGBA8::new(r, g, b, a))
    }
}

impl PixelSource for RgbImage {
    fn width(&self) -> u32 {
        image::ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        image::ImageBuffer::height(self)
    }

    fn pixel_at(&self, x: u32, y: u32) -> PixelColor {
        let [r, g, b] = self.get_pixel(x, y).0;
        PixelColor::opaque(r, g, b)
    }
}

impl PixelSource for DynamicImage {
    fn width(&self) -> u32 {
        DynamicImage::width(self)
    }

    fn height(&self) -> u32 {
        DynamicImage::height(self)
    }

    fn pixel_at(&self, x: u32, y: u32) -> PixelColor {
        let [r, g, b, a] = GenericImageView::get_pixel(self, x, y).0;
        PixelColor::from_rgba8(RGBA8::new(r, g, b, a))
    }
}

impl From<ImageError> for SourceError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Unsupported(_) => SourceError::NotSupported {
                message: err.to_string(),
            },
            _ => SourceError::NotReadable {
                message: err.to_string(),
            },
        }
    }
}

/// Decode an image file into 8-bit RGBA.
pub fn open_path(path: impl AsRef<Path>) -> Result<RgbaImage, SourceError> {
    let path = path.as_ref();
    let image = image::open(path).map_err(SourceError::from)?;
    log::debug!(
        "decoded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image.into_rgba8())
}

/// Decode an encoded image held in memory into 8-bit RGBA.
pub fn open_memory(bytes: &[u8]) -> Result<RgbaImage, SourceError> {
    let image = image::load_from_memory(bytes).map_err(SourceError::from)?;
    Ok(image.into_rgba8())
}

/// [`get_palette`] for an image file.
///
/// Arguments are checked before the file is opened.
pub fn get_palette_from_path(
    path: impl AsRef<Path>,
    config: &PaletteConfig,
) -> Result<Palette, PaletteError> {
    config.validate()?;
    let image = open_path(path)?;
    get_palette(&image, config)
}

/// [`get_palette`] for an encoded image held in memory.
pub fn get_palette_from_memory(
    bytes: &[u8],
    config: &PaletteConfig,
) -> Result<Palette, PaletteError> {
    config.validate()?;
    let image = open_memory(bytes)?;
    get_palette(&image, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_png(image: &RgbaImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn rgba_alpha_is_converted() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([10, 20, 30, 255]));
        img.put_pixel(1, 0, image::Rgba([10, 20, 30, 0]));
        assert_eq!(img.pixel_at(0, 0), PixelColor::opaque(10, 20, 30));
        assert_eq!(img.pixel_at(1, 0).alpha, 127);
        let dynamic = DynamicImage::ImageRgba8(img);
        assert_eq!(PixelSource::width(&dynamic), 2);
        assert_eq!(dynamic.pixel_at(1, 0).alpha, 127);
    }

    #[test]
    fn palette_from_png_bytes() {
        let img = RgbaImage::from_fn(16, 16, |x, _| {
            if x < 8 {
                image::Rgba([200, 30, 30, 255])
            } else {
                image::Rgba([30, 30, 200, 255])
            }
        });
        let bytes = encode_png(&img);
        let config = PaletteConfig::new().color_count(2).quality(1);
        let palette = get_palette_from_memory(&bytes, &config).unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.colors()[0], rgb::RGB8::new(204, 28, 28));
        assert_eq!(palette.colors()[1], rgb::RGB8::new(28, 28, 204));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = get_palette_from_memory(b"definitely not an image", &PaletteConfig::new())
            .unwrap_err();
        assert!(matches!(err, PaletteError::Source(_)), "{err:?}");
    }

    #[test]
    fn arguments_checked_before_opening() {
        let config = PaletteConfig::new().color_count(1);
        let err = get_palette_from_path("/does/not/exist.png", &config).unwrap_err();
        assert!(matches!(err, PaletteError::InvalidColorCount(1)));
        let err = get_palette_from_path("/does/not/exist.png", &PaletteConfig::new()).unwrap_err();
        assert!(matches!(
            err,
            PaletteError::Source(SourceError::NotReadable { .. })
        ));
    }
}
