//! Sparse grid types: cells, merge regions and the grid itself.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Diagnostic, Diagnostics};
use crate::model::StyleAttrs;

/// Which writer produced a grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowSource {
    /// Row placed by the structural walker
    Structural,
    /// Row placed from clustered positioned fragments
    Positional,
}

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell text
    pub value: String,

    /// Rows covered when this cell is a merge origin
    pub row_span: u32,

    /// Columns covered when this cell is a merge origin
    pub col_span: u32,

    /// Cell styling
    pub style: StyleAttrs,

    /// Whether a merge region is rooted at this cell
    pub is_merge_origin: bool,
}

impl Cell {
    /// Create a cell with a value and default style.
    pub fn new(value: impl Into<String>) -> Self {
        Self::styled(value, StyleAttrs::default())
    }

    /// Create a cell with a value and style.
    pub fn styled(value: impl Into<String>, style: StyleAttrs) -> Self {
        Self {
            value: value.into(),
            row_span: 1,
            col_span: 1,
            style,
            is_merge_origin: false,
        }
    }

    /// Check if the cell holds no text.
    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// A rectangular block of grid addresses represented by its top-left cell.
///
/// Bounds are 1-indexed and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeRegion {
    /// First row
    pub row_start: u32,
    /// First column
    pub col_start: u32,
    /// Last row
    pub row_end: u32,
    /// Last column
    pub col_end: u32,
}

impl MergeRegion {
    /// Create a region; bounds are reordered if given backwards.
    pub fn new(row_start: u32, col_start: u32, row_end: u32, col_end: u32) -> Self {
        Self {
            row_start: row_start.min(row_end),
            col_start: col_start.min(col_end),
            row_end: row_start.max(row_end),
            col_end: col_start.max(col_end),
        }
    }

    /// Create a region spanning columns of a single row.
    pub fn horizontal(row: u32, col_start: u32, col_end: u32) -> Self {
        Self::new(row, col_start, row, col_end)
    }

    /// Top-left address as (row, column).
    pub fn origin(&self) -> (u32, u32) {
        (self.row_start, self.col_start)
    }

    /// Number of rows covered.
    pub fn rows(&self) -> u32 {
        self.row_end - self.row_start + 1
    }

    /// Number of columns covered.
    pub fn columns(&self) -> u32 {
        self.col_end - self.col_start + 1
    }

    /// Number of addresses covered.
    pub fn cell_count(&self) -> u64 {
        self.rows() as u64 * self.columns() as u64
    }

    /// Check if an address lies inside the region.
    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.row_start..=self.row_end).contains(&row)
            && (self.col_start..=self.col_end).contains(&col)
    }

    /// Check if another region lies entirely inside this one.
    pub fn encloses(&self, other: &MergeRegion) -> bool {
        self.contains(other.row_start, other.col_start) && self.contains(other.row_end, other.col_end)
    }

    /// Check if two regions share at least one address.
    pub fn overlaps(&self, other: &MergeRegion) -> bool {
        self.row_start <= other.row_end
            && other.row_start <= self.row_end
            && self.col_start <= other.col_end
            && other.col_start <= self.col_end
    }
}

impl fmt::Display for MergeRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{}]-[{},{}]",
            self.row_start, self.col_start, self.row_end, self.col_end
        )
    }
}

/// Sparse, 1-indexed grid built for one page (or one combined document).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "GridParts")]
pub struct GridModel {
    rows: BTreeMap<u32, BTreeMap<u32, Cell>>,
    max_column: u32,
    row_source: BTreeMap<u32, RowSource>,
    merges: Vec<MergeRegion>,
    consolidation_rows: BTreeSet<u32>,
    row_heights: BTreeMap<u32, f64>,
    // row -> positions in `merges` of the regions touching that row
    #[serde(skip)]
    merge_index: BTreeMap<u32, Vec<usize>>,
}

/// Serialized form of a grid; the merge index is rebuilt on load.
#[derive(Deserialize)]
struct GridParts {
    rows: BTreeMap<u32, BTreeMap<u32, Cell>>,
    max_column: u32,
    row_source: BTreeMap<u32, RowSource>,
    merges: Vec<MergeRegion>,
    consolidation_rows: BTreeSet<u32>,
    row_heights: BTreeMap<u32, f64>,
}

impl From<GridParts> for GridModel {
    fn from(parts: GridParts) -> Self {
        let mut grid = Self {
            rows: parts.rows,
            max_column: parts.max_column,
            row_source: parts.row_source,
            merges: Vec::new(),
            consolidation_rows: parts.consolidation_rows,
            row_heights: parts.row_heights,
            merge_index: BTreeMap::new(),
        };
        for region in parts.merges {
            grid.push_region(region);
        }
        grid
    }
}

impl GridModel {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no cell has been placed.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest column index used so far. Never decreases.
    pub fn max_column(&self) -> u32 {
        self.max_column
    }

    /// Highest row index holding a cell or a row source.
    pub fn row_count(&self) -> u32 {
        let cells = self.rows.keys().next_back().copied().unwrap_or(0);
        let sources = self.row_source.keys().next_back().copied().unwrap_or(0);
        cells.max(sources)
    }

    /// Get a cell.
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Get a cell's text, or an empty string.
    pub fn value(&self, row: u32, col: u32) -> &str {
        self.cell(row, col).map(|c| c.value.as_str()).unwrap_or("")
    }

    /// Get the cells of one row, keyed by column.
    pub fn row(&self, row: u32) -> Option<&BTreeMap<u32, Cell>> {
        self.rows.get(&row)
    }

    /// Iterate over populated rows in ascending order.
    pub fn rows(&self) -> impl Iterator<Item = (u32, &BTreeMap<u32, Cell>)> {
        self.rows.iter().map(|(r, cells)| (*r, cells))
    }

    /// Place a cell, replacing any previous one at the address.
    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.max_column = self.max_column.max(col);
        self.rows.entry(row).or_default().insert(col, cell);
    }

    /// Append text to a cell, space-joining with any existing value.
    ///
    /// Emphasis from `style` is folded into an existing cell; the first
    /// writer's size and color win.
    pub fn append_text(&mut self, row: u32, col: u32, text: &str, style: &StyleAttrs) {
        self.max_column = self.max_column.max(col);
        let cells = self.rows.entry(row).or_default();
        match cells.get_mut(&col) {
            Some(cell) if !cell.is_empty() => {
                cell.value.push(' ');
                cell.value.push_str(text);
                cell.style.absorb(style);
            }
            Some(cell) => {
                cell.value = text.to_string();
                cell.style = style.clone();
            }
            None => {
                cells.insert(col, Cell::styled(text, style.clone()));
            }
        }
    }

    /// Remove a cell from the grid.
    pub fn take_cell(&mut self, row: u32, col: u32) -> Option<Cell> {
        let cells = self.rows.get_mut(&row)?;
        let cell = cells.remove(&col)?;
        if cells.is_empty() {
            self.rows.remove(&row);
        }
        Some(cell)
    }

    /// Remove a cell and return its value.
    pub fn take_value(&mut self, row: u32, col: u32) -> Option<String> {
        self.take_cell(row, col).map(|cell| cell.value)
    }

    /// Get mutable access to a cell.
    pub fn cell_mut(&mut self, row: u32, col: u32) -> Option<&mut Cell> {
        self.rows.get_mut(&row).and_then(|r| r.get_mut(&col))
    }

    /// Record which writer produced a row.
    pub fn set_row_source(&mut self, row: u32, source: RowSource) {
        self.row_source.insert(row, source);
    }

    /// Which writer produced a row, if any.
    pub fn row_source(&self, row: u32) -> Option<RowSource> {
        self.row_source.get(&row).copied()
    }

    /// Iterate over row sources in ascending row order.
    pub fn row_sources(&self) -> impl Iterator<Item = (u32, RowSource)> + '_ {
        self.row_source.iter().map(|(r, s)| (*r, *s))
    }

    /// Flag a positional row for empty-run consolidation.
    pub fn mark_for_consolidation(&mut self, row: u32) {
        self.consolidation_rows.insert(row);
    }

    /// Rows flagged for consolidation.
    pub fn consolidation_rows(&self) -> &BTreeSet<u32> {
        &self.consolidation_rows
    }

    /// Set a fixed display height for a row.
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    /// Fixed display height of a row, if one was set.
    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    /// All merge regions in creation order.
    pub fn merges(&self) -> &[MergeRegion] {
        &self.merges
    }

    /// Merge regions touching a row, in creation order.
    pub fn regions_in_row(&self, row: u32) -> impl Iterator<Item = &MergeRegion> + '_ {
        self.merge_index
            .get(&row)
            .into_iter()
            .flatten()
            .map(move |&i| &self.merges[i])
    }

    /// The merge region covering an address, if any.
    pub fn region_at(&self, row: u32, col: u32) -> Option<&MergeRegion> {
        self.regions_in_row(row).find(|m| m.contains(row, col))
    }

    /// Check if an address is covered by a merge rooted elsewhere.
    pub fn is_covered(&self, row: u32, col: u32) -> bool {
        self.region_at(row, col)
            .is_some_and(|m| m.origin() != (row, col))
    }

    /// Check if an address holds no text and is not part of any merge.
    pub fn is_blank(&self, row: u32, col: u32) -> bool {
        self.cell(row, col).map_or(true, Cell::is_empty) && self.region_at(row, col).is_none()
    }

    /// Find an existing region that would block `region`.
    ///
    /// A region rooted at the same origin and enclosed by `region` does not
    /// block it; merging grows that region instead.
    pub fn find_conflict(&self, region: &MergeRegion) -> Option<MergeRegion> {
        (region.row_start..=region.row_end)
            .flat_map(|row| self.regions_in_row(row))
            .find(|m| m.overlaps(region) && !(m.origin() == region.origin() && region.encloses(m)))
            .copied()
    }

    fn push_region(&mut self, region: MergeRegion) {
        let pos = self.merges.len();
        self.merges.push(region);
        for row in region.row_start..=region.row_end {
            self.merge_index.entry(row).or_default().push(pos);
        }
    }

    /// Replace the region at `pos` with one that encloses it.
    fn grow_region(&mut self, pos: usize, region: MergeRegion) {
        let old = std::mem::replace(&mut self.merges[pos], region);
        for row in old.row_end + 1..=region.row_end {
            let positions = self.merge_index.entry(row).or_default();
            // keep creation order within the row
            let at = positions.partition_point(|&p| p < pos);
            positions.insert(at, pos);
        }
    }

    /// Merge a region into its top-left cell.
    ///
    /// Returns `false` without touching the grid when the region covers a
    /// single address or overlaps an existing merge; the latter is recorded
    /// as a [`Diagnostic::MergeConflict`].
    pub fn merge(&mut self, region: MergeRegion, diagnostics: &mut Diagnostics) -> bool {
        if region.cell_count() <= 1 {
            return false;
        }
        if let Some(existing) = self.find_conflict(&region) {
            diagnostics.push(Diagnostic::MergeConflict {
                requested: region,
                existing,
            });
            return false;
        }

        let origin = region.origin();
        let grown = self
            .merge_index
            .get(&region.row_start)
            .and_then(|positions| {
                positions
                    .iter()
                    .copied()
                    .find(|&i| self.merges[i].origin() == origin)
            });

        for row in region.row_start..=region.row_end {
            if let Some(cells) = self.rows.get_mut(&row) {
                cells.retain(|col, _| !region.contains(row, *col) || (row, *col) == origin);
                if cells.is_empty() {
                    self.rows.remove(&row);
                }
            }
        }

        let cell = self
            .rows
            .entry(region.row_start)
            .or_default()
            .entry(region.col_start)
            .or_insert_with(|| Cell::new(""));
        cell.row_span = region.rows();
        cell.col_span = region.columns();
        cell.is_merge_origin = true;

        self.max_column = self.max_column.max(region.col_end);
        match grown {
            Some(pos) => self.grow_region(pos, region),
            None => self.push_region(region),
        }
        true
    }
}

/// Display width per column, keyed by 1-indexed column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnWidths(BTreeMap<u32, f64>);

impl ColumnWidths {
    /// Create an empty width table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the width of a column.
    pub fn set(&mut self, col: u32, width: f64) {
        self.0.insert(col, width);
    }

    /// Width of a column, if sized.
    pub fn get(&self, col: u32) -> Option<f64> {
        self.0.get(&col).copied()
    }

    /// Number of sized columns.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no column was sized.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (column, width) in ascending column order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(c, w)| (*c, *w))
    }
}
