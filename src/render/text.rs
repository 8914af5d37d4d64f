//! Tab-separated plain text rendering for built workbooks.

use crate::engine::{Sheet, Workbook};

/// Convert a workbook to tab-separated text, one block per sheet.
///
/// Each block starts with a `== name ==` line. Rows run from 1 to the
/// grid's last row and columns from 1 to its `max_column`; addresses
/// covered by a merge are written empty.
pub fn to_text(workbook: &Workbook) -> String {
    let blocks: Vec<String> = workbook.sheets.iter().map(sheet_text).collect();
    blocks.join("\n")
}

/// Render a single sheet.
pub fn sheet_text(sheet: &Sheet) -> String {
    let grid = &sheet.grid;
    let mut output = format!("== {} ==\n", sheet.name);

    for row in 1..=grid.row_count() {
        let fields: Vec<String> = (1..=grid.max_column())
            .map(|col| {
                if grid.is_covered(row, col) {
                    String::new()
                } else {
                    escape_field(grid.value(row, col))
                }
            })
            .collect();
        output.push_str(fields.join("\t").trim_end_matches('\t'));
        output.push('\n');
    }

    output
}

fn escape_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
