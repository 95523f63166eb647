//! Per-column height bookkeeping.

/// Tracks the accumulated height of each column.
///
/// The tracker always holds exactly `column_count()` heights. Queries that
/// pick a column break ties toward the lowest index.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTracker {
    heights: Vec<f32>,
}

impl ColumnTracker {
    /// Creates a tracker with `column_count` empty columns.
    ///
    /// A count of zero is treated as one column.
    pub fn new(column_count: usize) -> Self {
        Self {
            heights: vec![0.0; column_count.max(1)],
        }
    }

    /// Reinitializes the tracker to `column_count` empty columns.
    pub fn reset(&mut self, column_count: usize) {
        self.heights.clear();
        self.heights.resize(column_count.max(1), 0.0);
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.heights.len()
    }

    /// Index of the column with the smallest height.
    pub fn shortest_column(&self) -> usize {
        let mut best = 0;
        for (index, &height) in self.heights.iter().enumerate().skip(1) {
            if height < self.heights[best] {
                best = index;
            }
        }
        best
    }

    /// Index of the column with the largest height.
    pub fn longest_column(&self) -> usize {
        let mut best = 0;
        for (index, &height) in self.heights.iter().enumerate().skip(1) {
            if height > self.heights[best] {
                best = index;
            }
        }
        best
    }

    /// Overall grid height, the height of the longest column.
    pub fn height(&self) -> f32 {
        self.heights[self.longest_column()]
    }

    /// Height of column `index`, or `None` if out of range.
    pub fn column_height(&self, index: usize) -> Option<f32> {
        self.heights.get(index).copied()
    }

    /// All column heights, by column index.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Adds `delta` to column `index`. Out-of-range indices are ignored.
    pub fn add_height(&mut self, index: usize, delta: f32) {
        if let Some(height) = self.heights.get_mut(index) {
            *height += delta;
        }
    }
}

impl Default for ColumnTracker {
    fn default() -> Self {
        Self::new(1)
    }
}
