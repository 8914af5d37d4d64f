//! Structural walker: places tables, lists, headings and paragraphs.
//!
//! Every node is written at an explicit cursor row; the walker returns the
//! next free row so callers can interleave positional content below it.

use std::collections::{BTreeMap, BTreeSet};

use super::GridOptions;
use crate::grid::{Cell, Diagnostic, Diagnostics, GridModel, MergeRegion, RowSource};
use crate::model::{
    image_placeholder, inline_text, ContentNode, List, StyleAttrs, Table, TableCell,
    UNSUPPORTED_PLACEHOLDER,
};

/// Prefix written before unordered list items.
pub const BULLET_PREFIX: &str = "• ";

/// Smallest font size assigned to a heading.
pub const MIN_HEADING_FONT_PT: f64 = 10.0;

/// Font size for a heading level: `18 - 2 * level`, floored.
pub fn heading_font_size(level: u8) -> f64 {
    let level = level.clamp(1, 6) as f64;
    (18.0 - 2.0 * level).max(MIN_HEADING_FONT_PT)
}

/// Writes structural content nodes into a grid.
pub struct StructuralWalker<'a> {
    grid: &'a mut GridModel,
    diagnostics: &'a mut Diagnostics,
    options: &'a GridOptions,
}

impl<'a> StructuralWalker<'a> {
    /// Create a walker over a grid.
    pub fn new(
        grid: &'a mut GridModel,
        diagnostics: &'a mut Diagnostics,
        options: &'a GridOptions,
    ) -> Self {
        Self {
            grid,
            diagnostics,
            options,
        }
    }

    /// Walk one node starting at `row`, with content placed at column
    /// `indent + 1`. Returns the next free row.
    pub fn walk(&mut self, node: &ContentNode, row: u32, indent: u32) -> u32 {
        match node {
            ContentNode::Table(table) => self.walk_table(table, row, indent),
            ContentNode::List(list) => self.walk_list(list, row, indent),
            ContentNode::Heading { level, text } => {
                let style = StyleAttrs::bold().with_font_size(heading_font_size(*level));
                self.place(row, indent + 1, text.trim(), style)
            }
            ContentNode::Paragraph { children } => self.walk_paragraph(children, row, indent),
            ContentNode::InlineRun(run) => {
                self.place(row, indent + 1, run.text.trim(), run.style.clone())
            }
            ContentNode::PositionedFragment(frag) => {
                self.place(row, indent + 1, frag.text.trim(), frag.style.clone())
            }
            ContentNode::Image { alt_text } => {
                let text = image_placeholder(alt_text.as_deref());
                self.place(row, indent + 1, &text, StyleAttrs::italic())
            }
            ContentNode::LineBreak => row + 1,
            ContentNode::Unsupported => {
                let col = indent + 1;
                self.diagnostics
                    .push(Diagnostic::UnsupportedNode { row, column: col });
                self.place(row, col, UNSUPPORTED_PLACEHOLDER, StyleAttrs::default())
            }
        }
    }

    /// Write one non-empty text cell and claim its row.
    fn place(&mut self, row: u32, col: u32, text: &str, style: StyleAttrs) -> u32 {
        if text.is_empty() {
            return row;
        }
        self.grid.set_cell(row, col, Cell::styled(text, style));
        self.grid.set_row_source(row, RowSource::Structural);
        row + 1
    }

    fn walk_table(&mut self, table: &Table, start_row: u32, indent: u32) -> u32 {
        let base_col = indent + 1;
        let total_rows = table.rows.len() as u32;
        // column -> table rows still reserved by a rowspan from above
        let mut reserved: BTreeMap<u32, u32> = BTreeMap::new();
        let mut row = start_row;

        for (i, table_row) in table.rows.iter().enumerate() {
            let rows_left = total_rows - i as u32;
            let mut pending: BTreeSet<u32> = reserved.keys().copied().collect();
            let mut col = base_col;

            for cell in &table_row.cells {
                col = skip_reserved(&mut reserved, &mut pending, col);
                let (row_span, col_span) = self.clamp_span(cell, row, col, rows_left);

                self.grid
                    .set_cell(row, col, Cell::styled(cell.plain_text(), cell_style(cell)));
                let unsupported: usize =
                    cell.content.iter().map(ContentNode::unsupported_count).sum();
                for _ in 0..unsupported {
                    self.diagnostics
                        .push(Diagnostic::UnsupportedNode { row, column: col });
                }
                if row_span > 1 || col_span > 1 {
                    let region =
                        MergeRegion::new(row, col, row + row_span - 1, col + col_span - 1);
                    self.grid.merge(region, self.diagnostics);
                }
                if row_span > 1 {
                    for c in col..col + col_span {
                        reserved.insert(c, row_span - 1);
                        pending.remove(&c);
                    }
                }
                col += col_span;
            }

            // Reserved columns this row never reached still lose a row.
            for c in pending {
                release_row(&mut reserved, c);
            }

            self.grid.set_row_source(row, RowSource::Structural);
            row += 1;
        }

        row
    }

    /// Clamp a cell's span to at least 1x1, the rows left in the table and
    /// the configured column limit.
    fn clamp_span(&mut self, cell: &TableCell, row: u32, col: u32, rows_left: u32) -> (u32, u32) {
        let cols_left = self
            .options
            .max_column_limit
            .saturating_sub(col)
            .saturating_add(1)
            .max(1);
        let row_span = clamp_one(cell.row_span, rows_left);
        let col_span = clamp_one(cell.col_span, cols_left);

        if i64::from(row_span) != i64::from(cell.row_span)
            || i64::from(col_span) != i64::from(cell.col_span)
        {
            self.diagnostics.push(Diagnostic::MalformedSpan {
                row,
                column: col,
                requested: (cell.row_span, cell.col_span),
                applied: (row_span, col_span),
            });
        }

        (row_span, col_span)
    }

    fn walk_list(&mut self, list: &List, mut row: u32, indent: u32) -> u32 {
        let col = indent + 1;

        for (i, item) in list.items.iter().enumerate() {
            let prefix = if list.ordered {
                format!("{}. ", list.start.saturating_add(i as u32))
            } else {
                BULLET_PREFIX.to_string()
            };
            let style = item
                .children
                .iter()
                .find_map(ContentNode::inline_style)
                .cloned()
                .unwrap_or_default();

            self.grid.set_cell(
                row,
                col,
                Cell::styled(format!("{}{}", prefix, item.own_text()), style),
            );
            self.grid.set_row_source(row, RowSource::Structural);
            row += 1;

            for child in item.children.iter().filter(|c| c.is_block()) {
                row = match child {
                    ContentNode::List(nested) => self.walk_list(nested, row, indent + 2),
                    other => self.walk(other, row, indent + 1),
                };
            }
            if let Some(nested) = &item.nested {
                row = self.walk_list(nested, row, indent + 2);
            }
        }

        row
    }

    fn walk_paragraph(&mut self, children: &[ContentNode], row: u32, indent: u32) -> u32 {
        if !children.iter().any(ContentNode::is_block) {
            return self.place_inline(children, row, indent + 1);
        }

        let mut row = row;
        let mut run_start = 0;
        for (i, child) in children.iter().enumerate() {
            if child.is_block() || matches!(child, ContentNode::LineBreak) {
                row = self.place_inline(&children[run_start..i], row, indent + 1);
                row = self.walk(child, row, indent);
                run_start = i + 1;
            }
        }
        self.place_inline(&children[run_start..], row, indent + 1)
    }

    /// Concatenate inline nodes into a single cell.
    fn place_inline(&mut self, nodes: &[ContentNode], row: u32, col: u32) -> u32 {
        let text = inline_text(nodes);
        let style = nodes
            .iter()
            .find_map(ContentNode::inline_style)
            .cloned()
            .unwrap_or_default();
        self.place(row, col, &text, style)
    }
}

fn cell_style(cell: &TableCell) -> StyleAttrs {
    let mut style = cell.style.clone();
    if let Some(inline) = cell.content.iter().find_map(ContentNode::inline_style) {
        style.absorb(inline);
    }
    if cell.is_header {
        style.bold = true;
    }
    if let Some(align) = cell.align {
        style.text_align = Some(align);
    }
    style
}

fn clamp_one(span: i32, max: u32) -> u32 {
    if span < 1 {
        1
    } else {
        (span as u32).min(max.max(1))
    }
}

/// Advance past columns reserved by rowspans, charging each one row.
fn skip_reserved(reserved: &mut BTreeMap<u32, u32>, pending: &mut BTreeSet<u32>, mut col: u32) -> u32 {
    while reserved.contains_key(&col) {
        pending.remove(&col);
        release_row(reserved, col);
        col += 1;
    }
    col
}

fn release_row(reserved: &mut BTreeMap<u32, u32>, col: u32) {
    if let Some(remaining) = reserved.get_mut(&col) {
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            reserved.remove(&col);
        }
    }
}
