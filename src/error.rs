extern crate alloc;
use alloc::string::String;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, PaletteError>;

/// Errors raised by a [`PixelSource`](crate::source::PixelSource) collaborator.
///
/// These are passed through [`PaletteError::Source`] unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("image is not readable: {message}")]
    NotReadable { message: String },

    #[error("image is not supported: {message}")]
    NotSupported { message: String },
}

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("the number of palette colors must be between 2 and 256 inclusive, got {0}")]
    InvalidColorCount(u32),

    #[error("the quality argument must be an integer greater than zero, got {0}")]
    InvalidQuality(u32),

    #[error(
        "area {x},{y} {width}x{height} is out of image bounds {image_width}x{image_height}"
    )]
    AreaOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("area has no pixels")]
    EmptyArea,

    #[error("color format ({0}) is not supported")]
    UnsupportedFormat(String),

    #[error("unable to compute the color palette of a blank or transparent image")]
    BlankImage,

    #[error("zero usable pixels found in image")]
    NoPixels,

    #[error("image produced an empty histogram")]
    EmptyHistogram,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl PaletteError {
    /// True for errors caused by the caller's arguments rather than the image.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidColorCount(_)
                | Self::InvalidQuality(_)
                | Self::AreaOutOfBounds { .. }
                | Self::EmptyArea
                | Self::UnsupportedFormat(_)
        )
    }

    /// True when the image had nothing left to cluster after filtering.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::BlankImage | Self::NoPixels | Self::EmptyHistogram)
    }
}
