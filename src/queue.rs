extern crate alloc;
use alloc::vec::Vec;

use crate::vbox::VBox;

/// Ordering key used to pick the next box to split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Most pixels first.
    Population,
    /// Largest pixels x volume product first.
    PopulationVolume,
}

impl Priority {
    pub fn key(self, vbox: &VBox<'_>) -> u64 {
        match self {
            Self::Population => vbox.count(),
            Self::PopulationVolume => vbox.count() * u64::from(vbox.volume()),
        }
    }
}

/// Boxes kept in ascending priority order, sorted only when read.
///
/// The priority is fixed for the lifetime of the queue; re-rank under a new
/// priority with [`BoxQueue::into_sorted_vec`] followed by [`BoxQueue::from_boxes`].
#[derive(Debug)]
pub struct BoxQueue<'h> {
    boxes: Vec<VBox<'h>>,
    priority: Priority,
    sorted: bool,
}

impl<'h> BoxQueue<'h> {
    pub fn new(priority: Priority) -> Self {
        Self {
            boxes: Vec::new(),
            priority,
            sorted: true,
        }
    }

    pub fn from_boxes(boxes: Vec<VBox<'h>>, priority: Priority) -> Self {
        Self {
            boxes,
            priority,
            sorted: false,
        }
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    fn sort(&mut self) {
        if !self.sorted {
            let priority = self.priority;
            // Stable: equal keys keep insertion order.
            self.boxes.sort_by_key(|b| priority.key(b));
            self.sorted = true;
        }
    }

    pub fn push(&mut self, vbox: VBox<'h>) {
        self.boxes.push(vbox);
        self.sorted = false;
    }

    /// Remove the box with the highest key.
    pub fn pop(&mut self) -> Option<VBox<'h>> {
        self.sort();
        self.boxes.pop()
    }

    /// Box at `rank` in ascending key order; `None` means the top.
    pub fn peek(&mut self, rank: Option<usize>) -> Option<&VBox<'h>> {
        self.sort();
        let rank = rank.or_else(|| self.boxes.len().checked_sub(1))?;
        self.boxes.get(rank)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Apply `f` to every box in ascending key order.
    pub fn map<T>(&mut self, f: impl FnMut(&VBox<'h>) -> T) -> Vec<T> {
        self.sort();
        self.boxes.iter().map(f).collect()
    }

    /// All boxes in ascending key order.
    pub fn into_sorted_vec(mut self) -> Vec<VBox<'h>> {
        self.sort();
        self.boxes
    }
}
