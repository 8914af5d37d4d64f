//! Grid construction for pages and whole documents.
//!
//! A [`PageBuilder`] owns one grid and runs the passes in order: structural
//! nodes and buffered fragments are placed at a shared row cursor, then
//! [`PageBuilder::finish`] consolidates flowing rows and sizes columns.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{
    ColumnSizer, GridConsolidator, GridOptions, RowClassifier, SpatialClusterer, StructuralWalker,
};
use crate::error::Result;
use crate::grid::{Cell, ColumnWidths, Diagnostics, GridModel};
use crate::model::{ContentNode, Document, PageContent, PositionedFragment};

/// Name of the sheet built in single-sheet mode.
pub const COMBINED_SHEET_NAME: &str = "Document";

/// One finished grid with its column widths and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name
    pub name: String,

    /// Source page number (None for a combined sheet)
    pub page: Option<u32>,

    /// Finished grid
    pub grid: GridModel,

    /// Column display widths
    pub widths: ColumnWidths,

    /// Conditions recovered during construction
    pub diagnostics: Diagnostics,
}

impl Sheet {
    /// Sheet name for a page number.
    pub fn page_name(page: u32) -> String {
        format!("Page_{}", page)
    }

    /// Check if the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

/// All sheets built from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    /// Document title
    pub title: Option<String>,

    /// Sheets in page order
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Find a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Total number of diagnostics across sheets.
    pub fn diagnostic_count(&self) -> usize {
        self.sheets.iter().map(|s| s.diagnostics.len()).sum()
    }

    /// Check if every sheet is empty.
    pub fn is_empty(&self) -> bool {
        self.sheets.iter().all(Sheet::is_empty)
    }
}

/// Builds one grid from page content.
pub struct PageBuilder<'a> {
    options: &'a GridOptions,
    clusterer: SpatialClusterer,
    classifier: RowClassifier,
    grid: GridModel,
    diagnostics: Diagnostics,
    cursor: u32,
    buffered: Vec<&'a PositionedFragment>,
}

impl<'a> PageBuilder<'a> {
    /// Create a builder with its cursor at row 1.
    pub fn new(options: &'a GridOptions) -> Self {
        Self {
            options,
            clusterer: SpatialClusterer::new(options),
            classifier: RowClassifier::new(options),
            grid: GridModel::new(),
            diagnostics: Diagnostics::new(),
            cursor: 1,
            buffered: Vec::new(),
        }
    }

    /// Next free row.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Add a page's blocks in order, then its loose fragments.
    pub fn add_page(&mut self, page: &'a PageContent) {
        for block in &page.blocks {
            self.add_block(block);
        }
        self.add_fragments(&page.fragments);
    }

    /// Add one top-level block.
    ///
    /// Consecutive positioned fragments are clustered together; any other
    /// node first flushes them so they land above it.
    pub fn add_block(&mut self, node: &'a ContentNode) {
        if let ContentNode::PositionedFragment(fragment) = node {
            self.buffered.push(fragment);
            return;
        }
        self.flush();
        let mut walker = StructuralWalker::new(&mut self.grid, &mut self.diagnostics, self.options);
        self.cursor = walker.walk(node, self.cursor, 0);
    }

    /// Add loose fragments and place them below everything added so far.
    pub fn add_fragments<I>(&mut self, fragments: I)
    where
        I: IntoIterator<Item = &'a PositionedFragment>,
    {
        self.buffered.extend(fragments);
        self.flush();
    }

    /// Cluster buffered fragments and place one grid row per visual row.
    fn flush(&mut self) {
        if self.buffered.is_empty() {
            return;
        }
        let fragments = std::mem::take(&mut self.buffered);
        let rows = self.clusterer.cluster(fragments);
        for visual_row in &rows {
            self.classifier
                .place(visual_row, &mut self.grid, self.cursor, &mut self.diagnostics);
            self.cursor += 1;
        }
    }

    /// Consolidate flowing rows and size the columns.
    pub fn finish(mut self) -> (GridModel, ColumnWidths, Diagnostics) {
        self.flush();
        GridConsolidator::new().consolidate(&mut self.grid, &mut self.diagnostics);
        let widths = ColumnSizer::new(self.options).size(&self.grid);
        (self.grid, widths, self.diagnostics)
    }
}

/// Build the sheet for one page.
pub fn build_page(page: &PageContent, options: &GridOptions) -> Result<Sheet> {
    options.validate()?;
    Ok(page_sheet(page, options))
}

fn page_sheet(page: &PageContent, options: &GridOptions) -> Sheet {
    let mut builder = PageBuilder::new(options);
    builder.add_page(page);
    let (grid, widths, diagnostics) = builder.finish();

    log::debug!(
        "Page {}: {} rows, {} columns, {} merges, {} diagnostics",
        page.number,
        grid.row_count(),
        grid.max_column(),
        grid.merges().len(),
        diagnostics.len()
    );

    Sheet {
        name: Sheet::page_name(page.number),
        page: Some(page.number),
        grid,
        widths,
        diagnostics,
    }
}

/// Build a workbook from the selected pages of a document.
pub fn build_workbook(document: &Document, options: &GridOptions) -> Result<Workbook> {
    options.validate()?;

    let pages: Vec<&PageContent> = document
        .pages
        .iter()
        .filter(|p| options.pages.includes(p.number))
        .collect();
    log::debug!(
        "Building {} of {} pages ({})",
        pages.len(),
        document.page_count(),
        if options.single_sheet { "single sheet" } else { "sheet per page" }
    );

    let mut sheets: Vec<Sheet> = if options.single_sheet {
        vec![combined_sheet(&pages, options)]
    } else if options.parallel && pages.len() > 1 {
        pages
            .par_iter()
            .map(|page| page_sheet(page, options))
            .collect()
    } else {
        pages.iter().map(|page| page_sheet(page, options)).collect()
    };

    if let Some(placeholder) = &options.empty_placeholder {
        if sheets.iter().all(Sheet::is_empty) {
            if sheets.is_empty() {
                sheets.push(empty_sheet(options));
            }
            write_placeholder(&mut sheets[0], placeholder, options);
        }
    }

    Ok(Workbook {
        title: document.title.clone(),
        sheets,
    })
}

fn combined_sheet(pages: &[&PageContent], options: &GridOptions) -> Sheet {
    let mut builder = PageBuilder::new(options);
    for page in pages {
        builder.add_page(page);
    }
    let (grid, widths, diagnostics) = builder.finish();

    log::debug!(
        "Combined sheet: {} rows, {} columns from {} pages",
        grid.row_count(),
        grid.max_column(),
        pages.len()
    );

    Sheet {
        name: COMBINED_SHEET_NAME.to_string(),
        page: None,
        grid,
        widths,
        diagnostics,
    }
}

fn empty_sheet(options: &GridOptions) -> Sheet {
    let name = if options.single_sheet {
        COMBINED_SHEET_NAME.to_string()
    } else {
        Sheet::page_name(1)
    };
    Sheet {
        name,
        page: None,
        grid: GridModel::new(),
        widths: ColumnWidths::new(),
        diagnostics: Diagnostics::new(),
    }
}

fn write_placeholder(sheet: &mut Sheet, text: &str, options: &GridOptions) {
    sheet.grid.set_cell(1, 1, Cell::new(text));
    sheet.widths = ColumnSizer::new(options).size(&sheet.grid);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PageSelection;
    use crate::grid::{MergeRegion, RowSource};
    use crate::model::{List, ListItem, Table, TableRow};

    fn mixed_page() -> PageContent {
        PageContent::new(1)
            .with_block(ContentNode::heading(1, "Report"))
            .with_block(ContentNode::PositionedFragment(PositionedFragment::new(
                "intro", 50.0, 10.0,
            )))
            .with_block(ContentNode::PositionedFragment(PositionedFragment::new(
                "text", 50.0, 60.0,
            )))
            .with_block(Table::new().with_row(TableRow::from_strings(["a", "b", "c"])))
            .with_fragment(PositionedFragment::new("footer", 700.0, 10.0))
    }

    #[test]
    fn test_blocks_and_fragments_share_cursor() {
        let sheet = build_page(&mixed_page(), &GridOptions::default()).unwrap();
        let grid = &sheet.grid;

        assert_eq!(sheet.name, "Page_1");
        assert_eq!(grid.value(1, 1), "Report");
        assert_eq!(grid.value(2, 1), "intro text");
        assert_eq!(grid.row_source(2), Some(RowSource::Positional));
        assert_eq!(grid.value(3, 3), "c");
        assert_eq!(grid.row_source(3), Some(RowSource::Structural));
        assert_eq!(grid.value(4, 1), "footer");
        assert_eq!(grid.row_count(), 4);
    }

    #[test]
    fn test_flowing_rows_consolidated_to_max_column() {
        let sheet = build_page(&mixed_page(), &GridOptions::default()).unwrap();
        let grid = &sheet.grid;

        assert_eq!(grid.region_at(2, 1), Some(&MergeRegion::horizontal(2, 1, 3)));
        assert_eq!(grid.region_at(4, 1), Some(&MergeRegion::horizontal(4, 1, 3)));
        assert!(grid.region_at(1, 1).is_none());
        assert_eq!(sheet.widths.len(), 3);
    }

    #[test]
    fn test_empty_page_builds_empty_grid() {
        let sheet = build_page(&PageContent::new(3), &GridOptions::default()).unwrap();
        assert!(sheet.is_empty());
        assert!(sheet.diagnostics.is_empty());
        assert!(sheet.widths.is_empty());
        assert_eq!(sheet.name, "Page_3");
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = GridOptions::default().with_tabular_threshold(0);
        assert!(build_page(&PageContent::new(1), &options).is_err());
    }

    fn three_page_document() -> Document {
        let mut doc = Document::new().with_title("Quarterly");
        for i in 1..=3 {
            let list = List::unordered().with_item(ListItem::new(format!("item {}", i)));
            doc.add_page(PageContent::new(i).with_block(list));
        }
        doc
    }

    #[test]
    fn test_workbook_page_order_and_selection() {
        let doc = three_page_document();
        let options = GridOptions::default().with_pages(PageSelection::Pages(vec![1, 3]));
        let workbook = build_workbook(&doc, &options).unwrap();

        assert_eq!(workbook.title.as_deref(), Some("Quarterly"));
        let names: Vec<_> = workbook.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Page_1", "Page_3"]);
        assert_eq!(workbook.sheet("Page_3").unwrap().grid.value(1, 1), "• item 3");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let doc = three_page_document();
        let parallel = build_workbook(&doc, &GridOptions::default()).unwrap();
        let sequential = build_workbook(&doc, &GridOptions::default().sequential()).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_single_sheet_continues_rows() {
        let doc = three_page_document();
        let workbook = build_workbook(&doc, &GridOptions::default().single_sheet()).unwrap();

        assert_eq!(workbook.sheet_count(), 1);
        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.name, COMBINED_SHEET_NAME);
        assert_eq!(sheet.page, None);
        assert_eq!(sheet.grid.value(3, 1), "• item 3");
    }

    #[test]
    fn test_empty_placeholder() {
        let doc = Document::new();
        let options = GridOptions::default().with_empty_placeholder("No content");
        let workbook = build_workbook(&doc, &options).unwrap();

        assert_eq!(workbook.sheet_count(), 1);
        assert_eq!(workbook.sheets[0].grid.value(1, 1), "No content");
        assert_eq!(workbook.sheets[0].widths.get(1), Some(12.0));

        let without = build_workbook(&doc, &GridOptions::default()).unwrap();
        assert_eq!(without.sheet_count(), 0);
    }
}
