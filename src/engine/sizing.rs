//! Column width computation.

use std::collections::BTreeMap;

use super::GridOptions;
use crate::grid::{ColumnWidths, GridModel};

/// Computes display widths from the longest value of each column.
#[derive(Debug, Clone)]
pub struct ColumnSizer {
    padding: f64,
    min_width: f64,
    max_width: f64,
    empty_width: f64,
}

impl ColumnSizer {
    /// Create a sizer from grid options.
    pub fn new(options: &GridOptions) -> Self {
        Self {
            padding: options.column_padding,
            min_width: options.min_column_width,
            max_width: options.max_column_width,
            empty_width: options.empty_column_width,
        }
    }

    /// Width of every column from 1 to the grid's `max_column`.
    ///
    /// Only cells not covered by another cell's merge count; lengths are
    /// measured in characters.
    pub fn size(&self, grid: &GridModel) -> ColumnWidths {
        let mut longest: BTreeMap<u32, usize> = BTreeMap::new();
        for (row, cells) in grid.rows() {
            for (&col, cell) in cells {
                if cell.is_empty() || grid.is_covered(row, col) {
                    continue;
                }
                let len = cell.value.chars().count();
                let entry = longest.entry(col).or_insert(0);
                *entry = (*entry).max(len);
            }
        }

        let mut widths = ColumnWidths::new();
        for col in 1..=grid.max_column() {
            let width = match longest.get(&col) {
                Some(&len) => self.width_for(len),
                None => self.empty_width,
            };
            widths.set(col, width);
        }
        widths
    }

    /// Width for a column whose longest value has `len` characters.
    pub fn width_for(&self, len: usize) -> f64 {
        (len as f64 + self.padding).clamp(self.min_width, self.max_width)
    }
}
