//! Dominant color and palette extraction by modified median cut quantization.
//!
//! Pixels are sampled into a 5-bit-per-channel color histogram, the populated
//! part of color space is recursively cut at population medians, and each
//! resulting box contributes its average color to the palette.
//!
//! ```
//! use median_palette::{PaletteConfig, get_palette};
//! use rgb::RGB8;
//!
//! let pixels = vec![RGB8::new(200, 30, 30); 64];
//! let image = imgref::Img::new(&pixels[..], 8, 8);
//! let palette = get_palette(&image, &PaletteConfig::new().color_count(4))?;
//! assert_eq!(palette.dominant(), Some(RGB8::new(204, 28, 28)));
//! # Ok::<(), median_palette::PaletteError>(())
//! ```
#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod color;
pub mod error;
pub mod histogram;
#[cfg(feature = "image")]
pub mod image_source;
pub mod median_cut;
pub mod palette;
pub mod quantize;
pub mod queue;
pub mod source;
pub mod vbox;

pub use color::{ColorFormat, FormattedColor};
pub use error::{PaletteError, Result, SourceError};
pub use histogram::Histogram;
#[cfg(feature = "image")]
pub use image_source::{get_palette_from_memory, get_palette_from_path};
pub use palette::Palette;
pub use source::{Area, PixelColor, PixelSource};

use rgb::RGB8;

use quantize::{MAX_COLORS, MIN_COLORS};

/// Palette size used by [`get_color`].
const DOMINANT_COLOR_COUNT: u32 = 5;

/// Configuration for palette extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteConfig {
    /// Number of palette colors (2..=256).
    pub color_count: u32,
    /// Sampling stride: 1 reads every pixel, 10 every tenth. Must be at least 1.
    pub quality: u32,
    /// Restrict sampling to part of the image.
    pub area: Option<Area>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            color_count: 10,
            quality: 10,
            area: None,
        }
    }
}

impl PaletteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_count(mut self, n: u32) -> Self {
        self.color_count = n;
        self
    }

    pub fn quality(mut self, q: u32) -> Self {
        self.quality = q;
        self
    }

    pub fn area(mut self, area: Area) -> Self {
        self.area = Some(area);
        self
    }

    /// Check the arguments without touching any pixel.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_COLORS..=MAX_COLORS).contains(&self.color_count) {
            return Err(PaletteError::InvalidColorCount(self.color_count));
        }
        if self.quality < 1 {
            return Err(PaletteError::InvalidQuality(self.quality));
        }
        Ok(())
    }
}

/// Extract a palette of `config.color_count` representative colors.
///
/// The palette holds fewer colors only when the sampled pixels occupy fewer
/// histogram buckets than requested; see [`Palette::shortfall`].
pub fn get_palette<S>(source: &S, config: &PaletteConfig) -> Result<Palette>
where
    S: PixelSource + ?Sized,
{
    config.validate()?;
    let sampled = histogram::build_histogram(source, config.quality, config.area.as_ref())?;
    quantize::quantize(sampled.useful_pixels, config.color_count, &sampled.histogram)
}

/// The single most representative color of the image.
pub fn get_color<S>(source: &S, quality: u32, area: Option<Area>) -> Result<Option<RGB8>>
where
    S: PixelSource + ?Sized,
{
    let config = PaletteConfig {
        color_count: DOMINANT_COLOR_COUNT,
        quality,
        area,
    };
    Ok(get_palette(source, &config)?.dominant())
}
