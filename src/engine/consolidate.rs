//! Empty-run consolidation for flowing positional rows.

use crate::grid::{Diagnostics, GridModel, MergeRegion};

/// Extends content cells of eligible rows across the empty cells that
/// follow them.
///
/// Runs after every row of a grid is placed, since the trailing run of a
/// row reaches up to the final [`GridModel::max_column`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GridConsolidator;

impl GridConsolidator {
    /// Create a consolidator.
    pub fn new() -> Self {
        Self
    }

    /// Consolidate every row flagged for consolidation.
    ///
    /// Returns the number of merges performed. Running it again on the
    /// same grid performs none.
    pub fn consolidate(&self, grid: &mut GridModel, diagnostics: &mut Diagnostics) -> usize {
        let rows: Vec<u32> = grid.consolidation_rows().iter().copied().collect();
        let merged: usize = rows
            .into_iter()
            .map(|row| self.consolidate_row(grid, row, diagnostics))
            .sum();

        if merged > 0 {
            log::debug!("GridConsolidator: {} merges", merged);
        }
        merged
    }

    fn consolidate_row(&self, grid: &mut GridModel, row: u32, diagnostics: &mut Diagnostics) -> usize {
        let content_cols = content_columns(grid, row);
        let max_column = grid.max_column();
        let mut merged = 0;

        for (i, &col) in content_cols.iter().enumerate() {
            let run_end = match content_cols.get(i + 1) {
                Some(&next) => next - 1,
                None => max_column,
            };
            let span_end = grid
                .region_at(row, col)
                .filter(|m| m.origin() == (row, col))
                .map_or(col, |m| m.col_end);
            if span_end >= run_end {
                continue;
            }
            if !(span_end + 1..=run_end).all(|c| grid.is_blank(row, c)) {
                continue;
            }
            if grid.merge(MergeRegion::horizontal(row, col, run_end), diagnostics) {
                merged += 1;
            }
        }

        merged
    }
}

/// Columns of a row holding text that is not merged away.
fn content_columns(grid: &GridModel, row: u32) -> Vec<u32> {
    grid.row(row)
        .map(|cells| {
            cells
                .iter()
                .filter(|(col, cell)| !cell.is_empty() && !grid.is_covered(row, **col))
                .map(|(col, _)| *col)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn six_column_grid() -> GridModel {
        let mut grid = GridModel::new();
        grid.set_cell(1, 2, Cell::new("left"));
        grid.set_cell(1, 5, Cell::new("right"));
        grid.set_cell(2, 6, Cell::new("edge"));
        grid.mark_for_consolidation(1);
        grid
    }

    #[test]
    fn test_gaps_merge_into_content_cells() {
        let mut grid = six_column_grid();
        let mut diags = Diagnostics::new();

        let merged = GridConsolidator::new().consolidate(&mut grid, &mut diags);

        assert_eq!(merged, 2);
        assert_eq!(
            grid.merges(),
            &[MergeRegion::horizontal(1, 2, 4), MergeRegion::horizontal(1, 5, 6)]
        );
        assert_eq!(grid.cell(1, 2).unwrap().col_span, 3);
        assert_eq!(grid.cell(1, 5).unwrap().col_span, 2);
        assert!(grid.cell(1, 1).is_none());
        assert!(diags.is_empty());
    }

    #[test]
    fn test_consolidation_is_idempotent() {
        let mut grid = six_column_grid();
        let mut diags = Diagnostics::new();
        let consolidator = GridConsolidator::new();

        consolidator.consolidate(&mut grid, &mut diags);
        let once = grid.clone();
        assert_eq!(consolidator.consolidate(&mut grid, &mut diags), 0);
        assert_eq!(grid, once);
    }

    #[test]
    fn test_existing_region_grows() {
        let mut grid = GridModel::new();
        let mut diags = Diagnostics::new();
        grid.set_cell(1, 1, Cell::new("flowing text"));
        grid.merge(MergeRegion::horizontal(1, 1, 2), &mut diags);
        grid.set_cell(2, 5, Cell::new("x"));
        grid.mark_for_consolidation(1);

        assert_eq!(GridConsolidator::new().consolidate(&mut grid, &mut diags), 1);
        assert_eq!(grid.merges(), &[MergeRegion::horizontal(1, 1, 5)]);
        assert_eq!(grid.cell(1, 1).unwrap().col_span, 5);
    }

    #[test]
    fn test_run_blocked_by_other_row_merge() {
        let mut grid = GridModel::new();
        let mut diags = Diagnostics::new();
        grid.set_cell(1, 3, Cell::new("tall"));
        grid.merge(MergeRegion::new(1, 3, 2, 3), &mut diags);
        grid.set_cell(2, 1, Cell::new("a"));
        grid.mark_for_consolidation(2);

        assert_eq!(GridConsolidator::new().consolidate(&mut grid, &mut diags), 0);
        assert_eq!(grid.merges().len(), 1);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_ineligible_rows_untouched() {
        let mut grid = six_column_grid();
        let mut diags = Diagnostics::new();
        grid.set_cell(3, 1, Cell::new("tabular"));

        GridConsolidator::new().consolidate(&mut grid, &mut diags);
        assert!(grid.region_at(3, 1).is_none());
        assert!(grid.region_at(2, 6).is_none());
    }
}
