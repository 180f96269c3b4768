extern crate alloc;
use alloc::format;
use alloc::string::String;

use core::fmt;
use core::str::FromStr;

use rgb::RGB8;

use crate::error::PaletteError;

/// Significant bits kept per channel in histogram buckets.
pub const SIGBITS: u32 = 5;
/// Shift turning an 8-bit channel into a bucket coordinate.
pub const RSHIFT: u32 = 8 - SIGBITS;
/// Number of buckets along one axis.
pub const BUCKETS_PER_AXIS: usize = 1 << SIGBITS;
/// Total number of histogram buckets.
pub const BUCKET_COUNT: usize = 1 << (3 * SIGBITS);

/// Pack three 8-bit channels into one integer, keeping `sig_bits` bits of each.
///
/// With `sig_bits == SIGBITS` this is the histogram bucket of the color, with
/// `sig_bits == 8` it is the usual `0xRRGGBB` value.
#[inline]
pub fn color_index(r: u8, g: u8, b: u8, sig_bits: u32) -> u32 {
    debug_assert!((1..=8).contains(&sig_bits));
    let shift = 8 - sig_bits;
    ((r as u32 >> shift) << (2 * sig_bits))
        | ((g as u32 >> shift) << sig_bits)
        | (b as u32 >> shift)
}

/// Inverse of [`color_index`]: channel values carrying `sig_bits` bits each.
#[inline]
pub fn colors_from_index(index: u32, sig_bits: u32) -> [u8; 3] {
    let mask = (1u32 << sig_bits) - 1;
    [
        ((index >> (2 * sig_bits)) & mask) as u8,
        ((index >> sig_bits) & mask) as u8,
        (index & mask) as u8,
    ]
}

/// Histogram index of already truncated bucket coordinates.
#[inline]
pub(crate) fn bucket_index(r: u8, g: u8, b: u8) -> usize {
    ((r as usize) << (2 * SIGBITS)) | ((g as usize) << SIGBITS) | b as usize
}

/// `#rrggbb`-style hex string with the given prefix.
pub fn to_hex(color: RGB8, prefix: &str) -> String {
    format!("{prefix}{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// `0xRRGGBB` integer value.
pub fn to_int(color: RGB8) -> u32 {
    color_index(color.r, color.g, color.b, 8)
}

/// CSS `rgb(r, g, b)` notation.
pub fn to_rgb_string(color: RGB8) -> String {
    format!("rgb({}, {}, {})", color.r, color.g, color.b)
}

/// Output representation for palette colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorFormat {
    /// Raw `[r, g, b]` triple.
    #[default]
    Array,
    /// `#fd2a98`
    Hex,
    /// `rgb(253, 42, 152)`
    Rgb,
    /// `16591512`
    Int,
    /// The color value itself.
    Obj,
}

impl ColorFormat {
    pub fn apply(self, color: RGB8) -> FormattedColor {
        match self {
            Self::Array => FormattedColor::Array([color.r, color.g, color.b]),
            Self::Hex => FormattedColor::Hex(to_hex(color, "#")),
            Self::Rgb => FormattedColor::Rgb(to_rgb_string(color)),
            Self::Int => FormattedColor::Int(to_int(color)),
            Self::Obj => FormattedColor::Obj(color),
        }
    }
}

impl FromStr for ColorFormat {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "array" => Ok(Self::Array),
            "hex" => Ok(Self::Hex),
            "rgb" => Ok(Self::Rgb),
            "int" => Ok(Self::Int),
            "obj" => Ok(Self::Obj),
            _ => Err(PaletteError::UnsupportedFormat(s.into())),
        }
    }
}

/// A palette color rendered in one of the [`ColorFormat`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedColor {
    Array([u8; 3]),
    Hex(String),
    Rgb(String),
    Int(u32),
    Obj(RGB8),
}

impl fmt::Display for FormattedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array([r, g, b]) => write!(f, "[{r}, {g}, {b}]"),
            Self::Obj(c) => write!(f, "[{}, {}, {}]", c.r, c.g, c.b),
            Self::Hex(s) | Self::Rgb(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
        }
    }
}
