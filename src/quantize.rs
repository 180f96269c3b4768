//! Two-phase modified median cut over a color histogram.

extern crate alloc;
use alloc::vec::Vec;

use crate::error::{PaletteError, Result};
use crate::histogram::Histogram;
use crate::median_cut::{Cut, median_cut_apply};
use crate::palette::Palette;
use crate::queue::{BoxQueue, Priority};
use crate::vbox::VBox;

/// Pass limit for each iteration phase.
pub const MAX_ITERATIONS: u32 = 1000;
/// Share of the requested colors produced by population ordering alone.
pub const FRACT_BY_POPULATIONS: f64 = 0.75;

/// Smallest and largest palette sizes accepted.
pub const MIN_COLORS: u32 = 2;
pub const MAX_COLORS: u32 = 256;

/// Why an iteration phase stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEnd {
    /// The box count reached the target.
    Reached,
    /// Every remaining box is settled; no further split is possible.
    Exhausted,
    /// [`MAX_ITERATIONS`] passes were spent.
    BudgetSpent,
}

/// Leaves of the partition: boxes still eligible for splitting plus settled ones.
#[derive(Debug)]
pub struct Partition<'h> {
    pub queue: BoxQueue<'h>,
    pub settled: Vec<VBox<'h>>,
}

impl<'h> Partition<'h> {
    pub fn new(queue: BoxQueue<'h>) -> Self {
        Self {
            queue,
            settled: Vec::new(),
        }
    }

    /// Distinct leaf boxes.
    pub fn len(&self) -> usize {
        self.queue.len() + self.settled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every leaf, ready to be ranked under another priority.
    pub fn into_boxes(self) -> Vec<VBox<'h>> {
        let mut boxes = self.queue.into_sorted_vec();
        boxes.extend(self.settled);
        boxes
    }
}

/// Split the top box of the queue until the partition holds `target` leaves.
///
/// A box the splitter cannot divide is moved to `settled`: it remains a leaf
/// but is never popped again, so one stubborn box cannot burn the budget.
pub fn quantize_iter(partition: &mut Partition<'_>, target: usize) -> Result<PhaseEnd> {
    let mut iterations = 0u32;

    while iterations < MAX_ITERATIONS {
        iterations += 1;

        if partition.len() >= target {
            return Ok(PhaseEnd::Reached);
        }
        let Some(vbox) = partition.queue.pop() else {
            return Ok(PhaseEnd::Exhausted);
        };

        if vbox.count() == 0 {
            log::warn!("parking empty box {vbox:?}");
            partition.settled.push(vbox);
            continue;
        }

        match median_cut_apply(&vbox) {
            Some(Cut::Split(low, high)) => {
                partition.queue.push(low);
                partition.queue.push(high);
            }
            Some(Cut::Unsplittable(leaf)) => partition.settled.push(leaf),
            None => {
                return Err(PaletteError::Internal(
                    "median cut gave no result for a populated box",
                ));
            }
        }
    }

    if partition.len() >= target {
        return Ok(PhaseEnd::Reached);
    }
    log::warn!(
        "median cut stopped after {MAX_ITERATIONS} iterations with {} of {target} boxes",
        partition.len()
    );
    Ok(PhaseEnd::BudgetSpent)
}

/// Reduce a histogram to at most `max_colors` representative colors.
///
/// Colors come out most significant first (largest population x volume).
pub fn quantize(num_pixels: u64, max_colors: u32, histogram: &Histogram) -> Result<Palette> {
    if num_pixels == 0 {
        return Err(PaletteError::NoPixels);
    }
    if !(MIN_COLORS..=MAX_COLORS).contains(&max_colors) {
        return Err(PaletteError::InvalidColorCount(max_colors));
    }
    let Some(initial) = VBox::from_histogram(histogram) else {
        return Err(PaletteError::EmptyHistogram);
    };

    let target = max_colors as usize;
    let scaled = FRACT_BY_POPULATIONS * max_colors as f64;
    let first_target = scaled as usize + usize::from((scaled as usize as f64) < scaled);

    let mut queue = BoxQueue::new(Priority::Population);
    queue.push(initial);
    let mut partition = Partition::new(queue);
    let first = quantize_iter(&mut partition, first_target)?;
    log::debug!("population phase: {first:?} with {} boxes", partition.len());

    let Partition { queue, settled } = partition;
    let mut partition = Partition {
        queue: BoxQueue::from_boxes(queue.into_sorted_vec(), Priority::PopulationVolume),
        settled,
    };
    let second = quantize_iter(&mut partition, target)?;
    log::debug!("population x volume phase: {second:?} with {} boxes", partition.len());

    let mut leaves = BoxQueue::from_boxes(partition.into_boxes(), Priority::PopulationVolume);
    let mut colors = leaves.map(VBox::avg);
    colors.reverse();

    Ok(Palette::new(colors, max_colors))
}
