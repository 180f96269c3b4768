extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;

use crate::color::{BUCKET_COUNT, SIGBITS, color_index, colors_from_index};
use crate::error::{PaletteError, Result};
use crate::source::{Area, PixelSource};

/// Pixels more transparent than this (0 = opaque, 127 = transparent) are skipped.
pub const ALPHA_THRESHOLD: u8 = 62;
/// Pixels with all three channels above this are treated as background white.
pub const WHITE_THRESHOLD: u8 = 250;

/// Pixel counts per 5-bit color bucket.
///
/// Dense storage indexed by bucket, plus the sorted list of populated buckets
/// so that sparse boxes can be counted without probing every cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: Vec<u32>,
    populated: Vec<u16>,
}

impl Histogram {
    /// Build a histogram from `(bucket index, count)` pairs.
    ///
    /// Repeated indices accumulate, zero counts are ignored.
    ///
    /// # Panics
    ///
    /// If an index is not a 5-bit bucket index (`>= BUCKET_COUNT`).
    pub fn from_counts<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut counts = vec![0u32; BUCKET_COUNT];
        for (index, count) in entries {
            assert!((index as usize) < BUCKET_COUNT, "bucket index {index} out of range");
            let slot = &mut counts[index as usize];
            *slot = slot.saturating_add(count);
        }
        Self::from_dense(counts)
    }

    fn from_dense(counts: Vec<u32>) -> Self {
        let populated = counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(i, _)| i as u16)
            .collect();
        Self { counts, populated }
    }

    /// Count for a bucket index; absent buckets are zero.
    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        self.counts[index]
    }

    /// Populated bucket indices in ascending order.
    pub fn populated(&self) -> &[u16] {
        &self.populated
    }

    /// Number of populated buckets.
    pub fn len(&self) -> usize {
        self.populated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populated.is_empty()
    }

    /// Iterate `(bucket index, count)` over populated buckets.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.populated
            .iter()
            .map(|&i| (i as u32, self.counts[i as usize]))
    }

    /// Inclusive `[min, max]` bucket coordinate per axis over populated buckets.
    pub fn bounds(&self) -> Option<[[u8; 2]; 3]> {
        let mut iter = self.populated.iter();
        let first = colors_from_index(*iter.next()? as u32, SIGBITS);
        let mut bounds = [
            [first[0], first[0]],
            [first[1], first[1]],
            [first[2], first[2]],
        ];
        for &idx in iter {
            let rgb = colors_from_index(idx as u32, SIGBITS);
            for (b, c) in bounds.iter_mut().zip(rgb) {
                b[0] = b[0].min(c);
                b[1] = b[1].max(c);
            }
        }
        Some(bounds)
    }
}

/// Histogram plus the number of pixels that went into it.
#[derive(Debug, Clone)]
pub struct Sampled {
    pub histogram: Histogram,
    pub useful_pixels: u64,
}

/// The resolved sampling rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fill in area defaults and check it fits in `width x height`.
pub(crate) fn resolve_area(area: Option<&Area>, width: u32, height: u32) -> Result<Rect> {
    let Some(area) = area else {
        return Ok(Rect {
            x: 0,
            y: 0,
            width,
            height,
        });
    };

    let out_of_bounds = |w: u32, h: u32| PaletteError::AreaOutOfBounds {
        x: area.x,
        y: area.y,
        width: w,
        height: h,
        image_width: width,
        image_height: height,
    };

    let w = match area.width {
        Some(w) => w,
        None => width
            .checked_sub(area.x)
            .ok_or_else(|| out_of_bounds(0, area.height.unwrap_or(0)))?,
    };
    let h = match area.height {
        Some(h) => h,
        None => height
            .checked_sub(area.y)
            .ok_or_else(|| out_of_bounds(w, 0))?,
    };

    let fits = |origin: u32, extent: u32, limit: u32| {
        origin.checked_add(extent).is_some_and(|end| end <= limit)
    };
    if !fits(area.x, w, width) || !fits(area.y, h, height) {
        return Err(out_of_bounds(w, h));
    }
    if w == 0 || h == 0 {
        return Err(PaletteError::EmptyArea);
    }

    Ok(Rect {
        x: area.x,
        y: area.y,
        width: w,
        height: h,
    })
}

/// Sample every `quality`-th pixel of the area into a color histogram.
///
/// Transparent pixels and near-white pixels are not counted. Fails with
/// [`PaletteError::BlankImage`] when nothing survives the filters.
pub fn build_histogram<S>(source: &S, quality: u32, area: Option<&Area>) -> Result<Sampled>
where
    S: PixelSource + ?Sized,
{
    if quality == 0 {
        return Err(PaletteError::InvalidQuality(quality));
    }
    let rect = resolve_area(area, source.width(), source.height())?;

    let mut counts = vec![0u32; BUCKET_COUNT];
    let mut useful_pixels = 0u64;
    let pixel_count = rect.width as u64 * rect.height as u64;

    let mut i = 0u64;
    while i < pixel_count {
        let x = rect.x + (i % rect.width as u64) as u32;
        let y = rect.y + (i / rect.width as u64) as u32;
        i += quality as u64;

        let color = source.pixel_at(x, y);
        if color.alpha > ALPHA_THRESHOLD {
            continue;
        }
        if color.red > WHITE_THRESHOLD
            && color.green > WHITE_THRESHOLD
            && color.blue > WHITE_THRESHOLD
        {
            continue;
        }

        useful_pixels += 1;
        let slot = &mut counts[color_index(color.red, color.green, color.blue, SIGBITS) as usize];
        *slot = slot.saturating_add(1);
    }

    if useful_pixels == 0 {
        return Err(PaletteError::BlankImage);
    }

    let histogram = Histogram::from_dense(counts);
    log::debug!(
        "sampled {}x{} area with stride {}: {} useful pixels in {} buckets",
        rect.width,
        rect.height,
        quality,
        useful_pixels,
        histogram.len()
    );

    Ok(Sampled {
        histogram,
        useful_pixels,
    })
}
