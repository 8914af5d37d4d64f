//! Row classification: flowing text versus tabular positional rows.

use std::collections::BTreeSet;

use super::{GridOptions, VisualRow};
use crate::grid::{Cell, Diagnostic, Diagnostics, GridModel, MergeRegion, RowSource};

/// How a positional row is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Few columns: collapsed into one wide cell
    Flowing,
    /// Many columns: cells kept separate
    Tabular,
}

/// Writes visual rows into the grid and merges flowing rows.
#[derive(Debug, Clone)]
pub struct RowClassifier {
    tabular_column_threshold: usize,
    row_height: Option<f64>,
}

impl RowClassifier {
    /// Create a classifier from grid options.
    pub fn new(options: &GridOptions) -> Self {
        Self {
            tabular_column_threshold: options.tabular_column_threshold,
            row_height: options.row_height,
        }
    }

    /// Classify a row by its number of distinct columns.
    pub fn classify(&self, used_columns: usize) -> RowKind {
        if used_columns >= self.tabular_column_threshold {
            RowKind::Tabular
        } else {
            RowKind::Flowing
        }
    }

    /// Place one visual row at grid row `row` and return the columns used.
    pub fn place(
        &self,
        visual_row: &VisualRow<'_>,
        grid: &mut GridModel,
        row: u32,
        diagnostics: &mut Diagnostics,
    ) -> BTreeSet<u32> {
        let mut used = BTreeSet::new();
        for clustered in &visual_row.fragments {
            let fragment = clustered.fragment;
            grid.append_text(row, clustered.column, fragment.text.trim(), &fragment.style);
            used.insert(clustered.column);
        }

        grid.set_row_source(row, RowSource::Positional);
        if let Some(height) = self.row_height {
            grid.set_row_height(row, height);
        }

        if self.classify(used.len()) == RowKind::Flowing {
            self.collapse(grid, row, &used, diagnostics);
            grid.mark_for_consolidation(row);
        }

        used
    }

    /// Concatenate a flowing row into its first column and merge across.
    fn collapse(
        &self,
        grid: &mut GridModel,
        row: u32,
        used: &BTreeSet<u32>,
        diagnostics: &mut Diagnostics,
    ) {
        let (Some(&first), Some(&last)) = (used.first(), used.last()) else {
            return;
        };
        if first == last {
            return;
        }

        let region = MergeRegion::horizontal(row, first, last);
        if let Some(existing) = grid.find_conflict(&region) {
            diagnostics.push(Diagnostic::MergeConflict {
                requested: region,
                existing,
            });
            return;
        }

        let mut combined: Option<Cell> = None;
        for &col in used {
            let Some(cell) = grid.take_cell(row, col) else {
                continue;
            };
            match combined.as_mut() {
                None => combined = Some(cell),
                Some(target) => {
                    if !cell.is_empty() {
                        if !target.is_empty() {
                            target.value.push(' ');
                        }
                        target.value.push_str(&cell.value);
                    }
                    target.style.absorb(&cell.style);
                }
            }
        }
        if let Some(cell) = combined {
            grid.set_cell(row, first, cell);
        }
        grid.merge(region, diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SpatialClusterer;
    use crate::model::{PositionedFragment, StyleAttrs};

    fn place_row(frags: &[PositionedFragment]) -> (GridModel, BTreeSet<u32>, Diagnostics) {
        let options = GridOptions::default();
        let rows = SpatialClusterer::new(&options).cluster(frags);
        let classifier = RowClassifier::new(&options);
        let mut grid = GridModel::new();
        let mut diags = Diagnostics::new();
        let used = classifier.place(&rows[0], &mut grid, 1, &mut diags);
        (grid, used, diags)
    }

    #[test]
    fn test_classify_threshold() {
        let classifier = RowClassifier::new(&GridOptions::default());
        assert_eq!(classifier.classify(1), RowKind::Flowing);
        assert_eq!(classifier.classify(2), RowKind::Flowing);
        assert_eq!(classifier.classify(3), RowKind::Tabular);
    }

    #[test]
    fn test_flowing_row_collapses_into_one_cell() {
        let (grid, used, diags) = place_row(&[
            PositionedFragment::new("Hello", 10.0, 10.0),
            PositionedFragment::new("big", 10.0, 200.0),
            PositionedFragment::new("world", 10.0, 205.0),
        ]);

        assert_eq!(used.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(grid.value(1, 1), "Hello big world");
        assert!(grid.cell(1, 2).is_none());
        assert_eq!(grid.merges(), &[MergeRegion::horizontal(1, 1, 2)]);
        assert_eq!(grid.row_source(1), Some(RowSource::Positional));
        assert!(grid.consolidation_rows().contains(&1));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_tabular_row_keeps_cells() {
        let (grid, used, _) = place_row(&[
            PositionedFragment::new("a", 10.0, 10.0),
            PositionedFragment::new("b", 10.0, 100.0),
            PositionedFragment::new("c", 10.0, 200.0),
            PositionedFragment::new("d", 10.0, 300.0),
        ]);

        assert_eq!(used.len(), 4);
        assert_eq!(grid.value(1, 3), "c");
        assert!(grid.merges().is_empty());
        assert!(grid.consolidation_rows().is_empty());
    }

    #[test]
    fn test_emphasis_is_or_combined() {
        let (grid, _, _) = place_row(&[
            PositionedFragment::new("plain", 10.0, 10.0)
                .with_style(StyleAttrs::default().with_font_size(8.0)),
            PositionedFragment::new("bold", 10.0, 20.0).with_style(StyleAttrs::bold()),
        ]);

        let cell = grid.cell(1, 1).unwrap();
        assert_eq!(cell.value, "plain bold");
        assert!(cell.style.bold);
        assert_eq!(cell.style.font_size_pt, 8.0);
    }

    #[test]
    fn test_conflicting_merge_leaves_row_ungrouped() {
        let options = GridOptions::default();
        let frags = [
            PositionedFragment::new("left", 10.0, 10.0),
            PositionedFragment::new("right", 10.0, 200.0),
        ];
        let rows = SpatialClusterer::new(&options).cluster(&frags);
        let mut grid = GridModel::new();
        let mut diags = Diagnostics::new();
        grid.merge(MergeRegion::new(1, 2, 1, 3), &mut diags);

        RowClassifier::new(&options).place(&rows[0], &mut grid, 1, &mut diags);

        assert_eq!(diags.merge_conflicts(), 1);
        assert_eq!(grid.value(1, 1), "left");
        assert_eq!(grid.value(1, 2), "right");
    }

    #[test]
    fn test_row_height_recorded() {
        let options = GridOptions::default().with_row_height(20.0);
        let frags = [PositionedFragment::new("x", 0.0, 0.0)];
        let rows = SpatialClusterer::new(&options).cluster(&frags);
        let mut grid = GridModel::new();
        RowClassifier::new(&options).place(&rows[0], &mut grid, 4, &mut Diagnostics::new());
        assert_eq!(grid.row_height(4), Some(20.0));
    }
}
