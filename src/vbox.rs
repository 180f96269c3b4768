use core::cell::OnceCell;
use core::cmp::Reverse;
use core::fmt;

use rgb::RGB8;

use crate::color::{BUCKETS_PER_AXIS, RSHIFT, SIGBITS, bucket_index, colors_from_index};
use crate::histogram::Histogram;

/// A color channel, used to address one dimension of a [`VBox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Red,
    Green,
    Blue,
}

impl Axis {
    /// Scan order, which is also the tie-break priority.
    pub const ALL: [Axis; 3] = [Axis::Red, Axis::Green, Axis::Blue];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::Red => 0,
            Axis::Green => 1,
            Axis::Blue => 2,
        }
    }
}

/// An axis-aligned box of histogram buckets.
///
/// Bounds are inclusive bucket coordinates (`0..=31`). The histogram is
/// borrowed, never copied; volume, population and average are computed on
/// first use and cached until the bounds change.
pub struct VBox<'h> {
    bounds: [[u8; 2]; 3],
    histogram: &'h Histogram,
    volume: OnceCell<u32>,
    count: OnceCell<u64>,
    avg: OnceCell<RGB8>,
}

impl<'h> VBox<'h> {
    /// # Panics
    ///
    /// If any axis has `lo > hi` or a bound outside the bucket range.
    pub fn new(bounds: [[u8; 2]; 3], histogram: &'h Histogram) -> Self {
        for [lo, hi] in bounds {
            assert!(
                lo <= hi && (hi as usize) < BUCKETS_PER_AXIS,
                "invalid box bounds {lo}..={hi}"
            );
        }
        Self {
            bounds,
            histogram,
            volume: OnceCell::new(),
            count: OnceCell::new(),
            avg: OnceCell::new(),
        }
    }

    /// The smallest box holding every populated bucket, or `None` for an empty histogram.
    pub fn from_histogram(histogram: &'h Histogram) -> Option<Self> {
        histogram.bounds().map(|bounds| Self::new(bounds, histogram))
    }

    /// Same bounds and histogram, nothing cached.
    pub fn copy(&self) -> Self {
        Self::new(self.bounds, self.histogram)
    }

    pub fn histogram(&self) -> &'h Histogram {
        self.histogram
    }

    pub fn bounds(&self) -> [[u8; 2]; 3] {
        self.bounds
    }

    /// Inclusive `(lo, hi)` along `axis`.
    #[inline]
    pub fn range(&self, axis: Axis) -> (u8, u8) {
        let [lo, hi] = self.bounds[axis.index()];
        (lo, hi)
    }

    /// Replace the bounds along `axis`, dropping cached values.
    pub fn set_range(&mut self, axis: Axis, lo: u8, hi: u8) {
        assert!(
            lo <= hi && (hi as usize) < BUCKETS_PER_AXIS,
            "invalid box bounds {lo}..={hi}"
        );
        self.bounds[axis.index()] = [lo, hi];
        self.volume = OnceCell::new();
        self.count = OnceCell::new();
        self.avg = OnceCell::new();
    }

    /// `hi - lo` along `axis`.
    #[inline]
    pub fn extent(&self, axis: Axis) -> u8 {
        let (lo, hi) = self.range(axis);
        hi - lo
    }

    /// Number of buckets covered.
    pub fn volume(&self) -> u32 {
        *self.volume.get_or_init(|| {
            self.bounds
                .iter()
                .map(|[lo, hi]| (hi - lo) as u32 + 1)
                .product()
        })
    }

    /// Number of pixels inside the box.
    pub fn count(&self) -> u64 {
        *self.count.get_or_init(|| {
            let mut total = 0u64;
            self.for_each_populated(|_, n| total += u64::from(n));
            total
        })
    }

    /// Population-weighted mean color, or the box center when empty.
    pub fn avg(&self) -> RGB8 {
        *self.avg.get_or_init(|| {
            let mult = (1u32 << RSHIFT) as f64;
            let mut total = 0u64;
            let mut sums = [0f64; 3];
            self.for_each_populated(|buckets, n| {
                total += n as u64;
                for (sum, bucket) in sums.iter_mut().zip(buckets) {
                    *sum += n as f64 * (bucket as f64 + 0.5) * mult;
                }
            });

            let channel = |i: usize| -> u8 {
                let v = if total > 0 {
                    sums[i] / total as f64
                } else {
                    let [lo, hi] = self.bounds[i];
                    mult * (lo as f64 + hi as f64 + 1.0) / 2.0
                };
                v.min(255.0) as u8
            };
            RGB8::new(channel(0), channel(1), channel(2))
        })
    }

    /// Whether the bucket of `rgb` (channels shifted right by `shift`) lies in the box.
    pub fn contains(&self, rgb: RGB8, shift: u32) -> bool {
        self.contains_buckets([rgb.r >> shift, rgb.g >> shift, rgb.b >> shift])
    }

    #[inline]
    fn contains_buckets(&self, buckets: [u8; 3]) -> bool {
        self.bounds
            .iter()
            .zip(buckets)
            .all(|([lo, hi], c)| (*lo..=*hi).contains(&c))
    }

    /// Axis with the greatest extent; ties go to red, then green.
    pub fn longest_axis(&self) -> Axis {
        let [r, g, b] = Axis::ALL.map(|a| self.extent(a));
        if r >= g && r >= b {
            Axis::Red
        } else if g >= b {
            Axis::Green
        } else {
            Axis::Blue
        }
    }

    /// All axes from longest to shortest, ties in red, green, blue order.
    pub fn axes_by_extent(&self) -> [Axis; 3] {
        let mut axes = Axis::ALL;
        axes.sort_unstable_by_key(|&a| (Reverse(self.extent(a)), a.index()));
        axes
    }

    /// Visit `(bucket coordinates, count)` for every populated bucket in the box.
    ///
    /// Walks whichever is smaller: the populated bucket list or the box itself.
    pub(crate) fn for_each_populated(&self, mut f: impl FnMut([u8; 3], u32)) {
        if self.volume() as usize > self.histogram.len() {
            for (index, n) in self.histogram.iter() {
                let buckets = colors_from_index(index, SIGBITS);
                if self.contains_buckets(buckets) {
                    f(buckets, n);
                }
            }
        } else {
            let [[r1, r2], [g1, g2], [b1, b2]] = self.bounds;
            for r in r1..=r2 {
                for g in g1..=g2 {
                    for b in b1..=b2 {
                        let n = self.histogram.get(bucket_index(r, g, b));
                        if n > 0 {
                            f([r, g, b], n);
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Debug for VBox<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [[r1, r2], [g1, g2], [b1, b2]] = self.bounds;
        f.debug_struct("VBox")
            .field("r", &(r1..=r2))
            .field("g", &(g1..=g2))
            .field("b", &(b1..=b2))
            .field("count", &self.count.get())
            .finish()
    }
}
