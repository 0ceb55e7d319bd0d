//! "Load more" paging over a filtered result.

use serde::Serialize;

/// Number of schedules revealed per step.
pub const PAGE_SIZE: usize = 6;

/// Tracks how many results are currently shown.
///
/// `display_count` only grows and never exceeds `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pager {
    display_count: usize,
    total: usize,
}

impl Pager {
    pub fn new(total: usize) -> Self {
        Self {
            display_count: PAGE_SIZE.min(total),
            total,
        }
    }

    /// Restores a pager from a count reported by the client.
    ///
    /// The count is clamped into the valid range for `total`.
    pub fn resume(total: usize, shown: usize) -> Self {
        let floor = PAGE_SIZE.min(total);
        Self {
            display_count: shown.clamp(floor, total),
            total,
        }
    }

    pub fn load_more(&mut self) {
        self.display_count = (self.display_count + PAGE_SIZE).min(self.total);
    }

    pub fn load_all(&mut self) {
        self.display_count = self.total;
    }

    pub fn display_count(&self) -> usize {
        self.display_count
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.display_count < self.total
    }

    pub fn remaining(&self) -> usize {
        self.total - self.display_count
    }

    /// Percentage of results shown, rounded. An empty result counts as fully loaded.
    pub fn percent_loaded(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.display_count as f64 / self.total as f64) * 100.0).round() as u32
    }

    /// Returns the visible prefix of `items`.
    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.display_count.min(items.len())]
    }
}
