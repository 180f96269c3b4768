//! Population-weighted median cut of a single [`VBox`].

use crate::color::BUCKETS_PER_AXIS;
use crate::vbox::{Axis, VBox};

/// Outcome of a split attempt on a non-empty box.
#[derive(Debug)]
pub enum Cut<'h> {
    /// The box cannot be divided further (one pixel, or one populated bucket).
    Unsplittable(VBox<'h>),
    /// Low and high halves along the cut axis.
    Split(VBox<'h>, VBox<'h>),
}

/// Cumulative population of a box along one axis.
///
/// `cumulative[c]` holds the pixels in slices `lo..=c`, indexed by absolute
/// bucket coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialSums {
    lo: u8,
    hi: u8,
    cumulative: [u64; BUCKETS_PER_AXIS],
    total: u64,
}

impl PartialSums {
    /// Sum the box population slice by slice along `axis`.
    pub fn along(vbox: &VBox<'_>, axis: Axis) -> Self {
        let (lo, hi) = vbox.range(axis);
        let mut slices = [0u64; BUCKETS_PER_AXIS];
        vbox.for_each_populated(|buckets, n| {
            slices[buckets[axis.index()] as usize] += u64::from(n);
        });

        let mut cumulative = [0u64; BUCKETS_PER_AXIS];
        let mut total = 0u64;
        for c in lo as usize..=hi as usize {
            total += slices[c];
            cumulative[c] = total;
        }
        Self {
            lo,
            hi,
            cumulative,
            total,
        }
    }

    /// Wrap precomputed running totals for slices `lo..=hi`.
    ///
    /// # Panics
    ///
    /// If `running.len() != hi - lo + 1` or `hi` is out of the bucket range.
    pub fn from_running_totals(lo: u8, hi: u8, running: &[u64]) -> Self {
        assert!(lo <= hi && (hi as usize) < BUCKETS_PER_AXIS);
        assert_eq!(running.len(), (hi - lo) as usize + 1);
        let mut cumulative = [0u64; BUCKETS_PER_AXIS];
        cumulative[lo as usize..=hi as usize].copy_from_slice(running);
        Self {
            lo,
            hi,
            cumulative,
            total: running.last().copied().unwrap_or(0),
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Last slice of the low half, or `None` if the population sits in a single slice.
    ///
    /// The cut is placed beyond the median slice, towards the larger remaining
    /// side, then moved so that neither half is empty. The result always lies
    /// in `lo..hi`.
    pub fn cut_point(&self) -> Option<u8> {
        if self.lo == self.hi || self.total == 0 {
            return None;
        }
        let (lo, hi) = (self.lo as i32, self.hi as i32);
        let at = |c: i32| self.cumulative[c as usize];
        let total = self.total;

        let i = (lo..=hi).find(|&c| 2 * at(c) > total)?;
        let left = i - lo;
        let right = hi - i;

        let mut d2 = if left <= right {
            (hi - 1).min(i + right / 2)
        } else {
            lo.max((2 * (i - 1) - left) / 2)
        };

        // Nothing on the low side yet.
        while d2 < hi - 1 && at(d2) == 0 {
            d2 += 1;
        }
        // Nothing left for the high side.
        while d2 > lo && at(d2) >= total {
            d2 -= 1;
        }

        let low = at(d2);
        if low == 0 || low >= total {
            return None;
        }
        Some(d2 as u8)
    }
}

/// Divide `vbox` at `d2` along `axis`: `[lo, d2]` and `[d2 + 1, hi]`.
pub fn split_at<'h>(vbox: &VBox<'h>, axis: Axis, d2: u8) -> (VBox<'h>, VBox<'h>) {
    let (lo, hi) = vbox.range(axis);
    debug_assert!(lo <= d2 && d2 < hi);
    let mut low = vbox.copy();
    low.set_range(axis, lo, d2);
    let mut high = vbox.copy();
    high.set_range(axis, d2 + 1, hi);
    (low, high)
}

/// Try to split `vbox` at the population median of its longest axis.
///
/// Returns `None` for an empty box. When the longest axis holds every pixel in
/// one slice, the remaining axes are tried from longest to shortest; a box
/// whose pixels all share one bucket comes back as [`Cut::Unsplittable`].
pub fn median_cut_apply<'h>(vbox: &VBox<'h>) -> Option<Cut<'h>> {
    match vbox.count() {
        0 => return None,
        1 => return Some(Cut::Unsplittable(vbox.copy())),
        _ => {}
    }

    for axis in vbox.axes_by_extent() {
        if vbox.extent(axis) == 0 {
            break;
        }
        let sums = PartialSums::along(vbox, axis);
        if let Some(d2) = sums.cut_point() {
            log::trace!("cut {vbox:?} along {axis:?} after slice {d2}");
            let (low, high) = split_at(vbox, axis, d2);
            return Some(Cut::Split(low, high));
        }
    }

    Some(Cut::Unsplittable(vbox.copy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{SIGBITS, color_index};
    use crate::histogram::Histogram;
    use alloc::vec::Vec;

    fn hist(colors: &[(u8, u8, u8, u32)]) -> Histogram {
        Histogram::from_counts(
            colors
                .iter()
                .map(|&(r, g, b, n)| (color_index(r, g, b, SIGBITS), n)),
        )
    }

    /// Deterministic pseudo-random histogram.
    fn noisy_hist(seed: u32, buckets: usize) -> Histogram {
        let mut state = seed;
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            state >> 8
        };
        Histogram::from_counts((0..buckets).map(|_| (next() % 32768, next() % 50 + 1)))
    }

    #[test]
    fn cut_left_not_greater_than_right() {
        let running = [
            38, 149, 556, 1222, 1830, 2656, 3638, 4744, 6039, 7412, 9039, 10686, 12244, 13715,
            15091, 16355, 17599, 18768, 19771, 20925, 22257, 24094, 25782, 27585, 28796, 29794,
            30258, 30290, 30298, 30301, 30301, 30301,
        ];
        let sums = PartialSums::from_running_totals(0, 31, &running);
        assert_eq!(sums.total(), 30301);
        assert_eq!(sums.cut_point(), Some(23));
    }

    #[test]
    fn cut_left_greater_than_right() {
        let running = [
            38, 149, 512, 1151, 1741, 2554, 3530, 4624, 5899, 7247, 8788, 10261, 11645, 12906,
            13969, 14871, 15654, 16329,
        ];
        let sums = PartialSums::from_running_totals(0, 17, &running);
        assert_eq!(sums.cut_point(), Some(4));
    }

    #[test]
    fn cut_skips_empty_low_slices() {
        // Median lands early, but slices 0..=5 are empty.
        let running = [0, 0, 0, 0, 0, 0, 10, 10, 10, 11];
        let sums = PartialSums::from_running_totals(0, 9, &running);
        let d2 = sums.cut_point().unwrap();
        assert!((6..9).contains(&d2), "{d2}");
    }

    #[test]
    fn cut_never_empties_high_side() {
        // All but one pixel in the first slice, the last one at the top.
        let running = [100, 100, 100, 100, 101];
        let sums = PartialSums::from_running_totals(0, 4, &running);
        let d2 = sums.cut_point().unwrap();
        assert!(d2 < 4);
        assert!(running[d2 as usize] < 101);
    }

    #[test]
    fn single_slice_has_no_cut() {
        let sums = PartialSums::from_running_totals(3, 7, &[0, 0, 5, 5, 5]);
        assert_eq!(sums.cut_point(), None);
        let sums = PartialSums::from_running_totals(3, 7, &[5, 5, 5, 5, 5]);
        assert_eq!(sums.cut_point(), None);
        let sums = PartialSums::from_running_totals(3, 7, &[0, 0, 0, 0, 5]);
        assert_eq!(sums.cut_point(), None);
    }

    #[test]
    fn partial_sums_along_axis() {
        let h = hist(&[(0, 0, 0, 2), (16, 8, 0, 3), (16, 16, 8, 5)]);
        let vbox = VBox::from_histogram(&h).unwrap();
        let sums = PartialSums::along(&vbox, Axis::Green);
        assert_eq!(sums, PartialSums::from_running_totals(0, 2, &[2, 5, 10]));
        let sums = PartialSums::along(&vbox, Axis::Red);
        assert_eq!(sums, PartialSums::from_running_totals(0, 2, &[2, 2, 10]));
    }

    #[test]
    fn empty_box_cannot_split() {
        let h = hist(&[(255, 0, 0, 1)]);
        let vbox = VBox::new([[0, 3]; 3], &h);
        assert!(median_cut_apply(&vbox).is_none());
    }

    #[test]
    fn single_pixel_is_unsplittable() {
        let h = hist(&[(100, 100, 100, 1)]);
        let vbox = VBox::new([[0, 31]; 3], &h);
        assert!(matches!(median_cut_apply(&vbox), Some(Cut::Unsplittable(_))));
    }

    #[test]
    fn single_bucket_is_unsplittable() {
        let h = hist(&[(100, 100, 100, 40)]);
        let vbox = VBox::from_histogram(&h).unwrap();
        assert_eq!(vbox.volume(), 1);
        let Some(Cut::Unsplittable(same)) = median_cut_apply(&vbox) else {
            panic!("expected unsplittable");
        };
        assert_eq!(same.bounds(), vbox.bounds());
        assert_eq!(same.count(), 40);

        // A wide box whose pixels share one bucket is no different.
        let wide = VBox::new([[0, 31]; 3], &h);
        assert!(matches!(median_cut_apply(&wide), Some(Cut::Unsplittable(_))));
    }

    #[test]
    fn falls_back_to_next_axis() {
        // Red spans the whole range but every pixel has red bucket 0.
        let h = hist(&[(0, 0, 0, 5), (0, 80, 0, 5)]);
        let vbox = VBox::new([[0, 31], [0, 10], [0, 0]], &h);
        assert_eq!(vbox.longest_axis(), Axis::Red);
        let Some(Cut::Split(low, high)) = median_cut_apply(&vbox) else {
            panic!("expected a split");
        };
        assert_eq!(low.range(Axis::Red), (0, 31));
        assert_eq!(low.count(), 5);
        assert_eq!(high.count(), 5);
        assert_eq!(low.range(Axis::Green).1 + 1, high.range(Axis::Green).0);
    }

    #[test]
    fn two_colors_split_apart() {
        let h = hist(&[(255, 0, 0, 1), (0, 0, 255, 1)]);
        let vbox = VBox::from_histogram(&h).unwrap();
        let Some(Cut::Split(low, high)) = median_cut_apply(&vbox) else {
            panic!("expected a split");
        };
        assert_eq!(low.count(), 1);
        assert_eq!(high.count(), 1);
    }

    #[test]
    fn splits_conserve_volume_and_population() {
        for seed in 1..20u32 {
            let h = noisy_hist(seed, (seed as usize * 37) % 400 + 2);
            let mut pending: Vec<VBox<'_>> = Vec::new();
            pending.push(VBox::from_histogram(&h).unwrap());
            let mut splits = 0;
            while let Some(vbox) = pending.pop() {
                match median_cut_apply(&vbox).unwrap() {
                    Cut::Unsplittable(same) => {
                        assert_eq!(same.bounds(), vbox.bounds());
                        assert!(vbox.count() == 1 || vbox.for_each_bucket_count() == 1);
                    }
                    Cut::Split(low, high) => {
                        splits += 1;
                        assert!(low.volume() >= 1 && high.volume() >= 1);
                        assert_eq!(low.volume() + high.volume(), vbox.volume());
                        assert_eq!(low.count() + high.count(), vbox.count());
                        assert!(low.count() > 0 && high.count() > 0);
                        pending.push(low);
                        pending.push(high);
                    }
                }
            }
            // Every populated bucket ends up in its own leaf.
            assert_eq!(splits + 1, h.len(), "seed {seed}");
        }
    }

    impl VBox<'_> {
        fn for_each_bucket_count(&self) -> usize {
            let mut n = 0;
            self.for_each_populated(|_, _| n += 1);
            n
        }
    }
}
