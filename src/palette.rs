extern crate alloc;
use alloc::vec::Vec;

use rgb::RGB8;

use crate::color::{ColorFormat, FormattedColor};

/// Representative colors of an image, most significant first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<RGB8>,
    requested: u32,
}

impl Palette {
    pub(crate) fn new(colors: Vec<RGB8>, requested: u32) -> Self {
        Self { colors, requested }
    }

    pub fn colors(&self) -> &[RGB8] {
        &self.colors
    }

    /// The first and most representative color.
    pub fn dominant(&self) -> Option<RGB8> {
        self.colors.first().copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Number of colors that was asked for.
    pub fn requested(&self) -> u32 {
        self.requested
    }

    /// How many colors short of the request the palette is.
    ///
    /// Non-zero only when the sampled pixels fall into fewer distinct
    /// histogram buckets than requested.
    pub fn shortfall(&self) -> usize {
        (self.requested as usize).saturating_sub(self.colors.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = RGB8> + '_ {
        self.colors.iter().copied()
    }

    /// Render every color in `format`.
    pub fn formatted(&self, format: ColorFormat) -> Vec<FormattedColor> {
        self.iter().map(|c| format.apply(c)).collect()
    }

    pub fn into_vec(self) -> Vec<RGB8> {
        self.colors
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a RGB8;
    type IntoIter = core::slice::Iter<'a, RGB8>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}
