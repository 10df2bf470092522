// Visible-range computation over a long sequence of non-uniform rows.
//
// Heights start as estimates and are replaced by measurements as rows get
// rendered. Measurements are cached until the row set changes, at which point
// the owner calls `reset_heights` with fresh estimates. Every reset (and every
// `abandon_pending`) bumps a generation number; measurements carry the
// generation they were taken under and are dropped when it no longer matches.

use std::ops::Range;

use tracing::debug;

use super::prefix::PrefixHeights;

/// Compute the half-open range of rows to render.
///
/// `start` is the first row not entirely above `scroll_offset`; `end` is one
/// past the last row that begins before `scroll_offset + viewport_height`.
/// Both are then widened by `overscan` rows and clamped to the sequence.
///
/// Guarantees `0 <= start <= end <= len`, `offset_of(start) <= scroll_offset`
/// and every row at or after `end` begins at or beyond the viewport bottom.
pub fn visible_range(
    heights: &PrefixHeights,
    scroll_offset: u64,
    viewport_height: u32,
    overscan: usize,
) -> Range<usize> {
    let n = heights.len();
    if n == 0 {
        return 0..0;
    }

    let start = heights.rows_within(scroll_offset).min(n);
    let bottom = scroll_offset.saturating_add(u64::from(viewport_height));
    let end = if bottom == 0 {
        0
    } else {
        (heights.rows_within(bottom - 1) + 1).min(n)
    };
    let end = end.max(start);

    start.saturating_sub(overscan)..end.saturating_add(overscan).min(n)
}

/// Windowing state for one list instance.
#[derive(Debug, Clone)]
pub struct WindowModel {
    heights: PrefixHeights,
    measured: Vec<bool>,
    overscan: usize,
    viewport_height: u32,
    scroll_offset: u64,
    generation: u64,
}

impl WindowModel {
    pub fn new(overscan: usize) -> Self {
        WindowModel {
            heights: PrefixHeights::default(),
            measured: Vec::new(),
            overscan,
            viewport_height: 0,
            scroll_offset: 0,
            generation: 0,
        }
    }

    /// Replace every height with a fresh estimate and forget all
    /// measurements. Call whenever the set of rows changes.
    pub fn reset_heights<I>(&mut self, estimates: I)
    where
        I: IntoIterator<Item = u32>,
    {
        let estimates: Vec<u32> = estimates.into_iter().collect();
        self.measured = vec![false; estimates.len()];
        self.heights = PrefixHeights::from_heights(&estimates);
        self.generation = self.generation.wrapping_add(1);
        self.clamp_scroll();
        debug!(
            rows = estimates.len(),
            generation = self.generation,
            "window heights reset"
        );
    }

    /// Invalidate outstanding measurement requests without touching the
    /// cached heights.
    pub fn abandon_pending(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Generation that measurements must be tagged with to be accepted.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record the measured height of row `index`. Returns `true` if the
    /// cache changed. Measurements from another generation are ignored.
    pub fn measure(&mut self, generation: u64, index: usize, height: u32) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                index,
                "dropping stale measurement"
            );
            return false;
        }
        if index >= self.measured.len() {
            return false;
        }
        self.measured[index] = true;
        let changed = self.heights.set(index, height);
        if changed {
            self.clamp_scroll();
        }
        changed
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn height_of(&self, index: usize) -> Option<u32> {
        self.heights.get(index)
    }

    pub fn offset_of(&self, index: usize) -> u64 {
        self.heights.offset_of(index)
    }

    pub fn total_height(&self) -> u64 {
        self.heights.total()
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height;
        self.clamp_scroll();
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    /// Rows to render at the current scroll position.
    pub fn visible_range(&self) -> Range<usize> {
        visible_range(
            &self.heights,
            self.scroll_offset,
            self.viewport_height,
            self.overscan,
        )
    }

    /// Adjust the scroll offset so row `index` is fully inside the viewport.
    pub fn ensure_visible(&mut self, index: usize) {
        let Some(height) = self.heights.get(index) else {
            return;
        };
        let top = self.heights.offset_of(index);
        let bottom = top + u64::from(height);
        let viewport = u64::from(self.viewport_height);
        if top < self.scroll_offset {
            self.scroll_offset = top;
        } else if bottom > self.scroll_offset + viewport {
            self.scroll_offset = bottom.saturating_sub(viewport);
        }
        self.clamp_scroll();
    }

    /// Height of the listbox: content height capped at `max_rows` rows of
    /// `row_height`, plus `padding` above and below.
    pub fn listbox_height(&self, max_rows: usize, row_height: u32, padding: u32) -> u64 {
        let cap = max_rows as u64 * u64::from(row_height);
        self.total_height().min(cap) + 2 * u64::from(padding)
    }

    fn clamp_scroll(&mut self) {
        let max = self
            .total_height()
            .saturating_sub(u64::from(self.viewport_height));
        if self.scroll_offset > max {
            self.scroll_offset = max;
        }
    }
}
