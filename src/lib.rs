//! # pagegrid
//!
//! Reconstructs spreadsheet-style grids from page content.
//!
//! Each page arrives as a tree of structural nodes (tables, lists, headings,
//! paragraphs) plus loose text fragments known only by their coordinates.
//! The engine places both into one sparse grid of rows, columns and merge
//! regions, then computes column widths, ready for a spreadsheet writer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagegrid::{load_file, render, GridOptions};
//!
//! fn main() -> pagegrid::Result<()> {
//!     // Load page content exported as JSON
//!     let doc = load_file("content.json")?;
//!
//!     // Build one sheet per page
//!     let workbook = pagegrid::convert(&doc, &GridOptions::default())?;
//!     println!("{}", render::to_text(&workbook));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Structural placement**: tables with row/column spans, nested lists, headings
//! - **Spatial clustering**: positioned fragments grouped into rows and columns
//! - **Flowing text detection**: sparse rows merged into wide cells
//! - **Diagnostics**: merge conflicts and malformed spans recovered and reported
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod engine;
pub mod error;
pub mod grid;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use engine::{
    build_page, build_workbook, GridOptions, PageBuilder, PageSelection, Sheet, Workbook,
};
pub use error::{Error, Result};
pub use grid::{Cell, ColumnWidths, Diagnostic, Diagnostics, GridModel, MergeRegion, RowSource};
pub use model::{
    ContentNode, Document, InlineRun, List, ListItem, PageContent, PositionedFragment,
    StyleAttrs, Table, TableCell, TableRow, TextAlign, UNSUPPORTED_PLACEHOLDER,
};
pub use render::JsonFormat;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Load a document from a JSON file.
///
/// # Example
///
/// ```no_run
/// use pagegrid::load_file;
///
/// let doc = load_file("content.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let file = File::open(path)?;
    load_reader(BufReader::new(file))
}

/// Load a document from a JSON string.
pub fn load_str(json: &str) -> Result<Document> {
    let mut doc: Document = serde_json::from_str(json)?;
    doc.normalize_numbers();
    log::debug!("Loaded document with {} pages", doc.page_count());
    Ok(doc)
}

/// Load a document from a reader yielding JSON.
pub fn load_reader<R: Read>(reader: R) -> Result<Document> {
    let mut doc: Document = serde_json::from_reader(reader)?;
    doc.normalize_numbers();
    log::debug!("Loaded document with {} pages", doc.page_count());
    Ok(doc)
}

/// Build a workbook from a document.
///
/// # Example
///
/// ```
/// use pagegrid::{convert, Document, GridOptions, PageContent, PositionedFragment};
///
/// let mut doc = Document::new();
/// doc.add_page(PageContent::new(1).with_fragment(PositionedFragment::new("Total", 10.0, 20.0)));
///
/// let workbook = convert(&doc, &GridOptions::default()).unwrap();
/// assert_eq!(workbook.sheets[0].grid.value(1, 1), "Total");
/// ```
pub fn convert(document: &Document, options: &GridOptions) -> Result<Workbook> {
    build_workbook(document, options)
}

/// Build the sheet for a single page of a document.
pub fn convert_page(document: &Document, page: u32, options: &GridOptions) -> Result<Sheet> {
    let content = document
        .page(page)
        .ok_or(Error::PageOutOfRange(page, document.page_count()))?;
    build_page(content, options)
}

/// Convert a JSON content file straight to grid JSON.
pub fn file_to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = load_file(path)?;
    let workbook = convert(&doc, &GridOptions::default())?;
    render::to_json(&workbook, format)
}

/// Builder for loading and converting documents.
///
/// # Example
///
/// ```no_run
/// use pagegrid::GridConverter;
///
/// let text = GridConverter::new()
///     .with_row_tolerance(8.0)
///     .single_sheet()
///     .load("content.json")?
///     .to_text()?;
/// # Ok::<(), pagegrid::Error>(())
/// ```
pub struct GridConverter {
    options: GridOptions,
}

impl GridConverter {
    /// Create a new converter with default options.
    pub fn new() -> Self {
        Self {
            options: GridOptions::default(),
        }
    }

    /// Create a converter from existing options.
    pub fn with_options(options: GridOptions) -> Self {
        Self { options }
    }

    /// Set the row tolerance.
    pub fn with_row_tolerance(mut self, tolerance: f64) -> Self {
        self.options = self.options.with_row_tolerance(tolerance);
        self
    }

    /// Set the column tolerance.
    pub fn with_column_tolerance(mut self, tolerance: f64) -> Self {
        self.options = self.options.with_column_tolerance(tolerance);
        self
    }

    /// Set the tabular column threshold.
    pub fn with_tabular_threshold(mut self, threshold: usize) -> Self {
        self.options = self.options.with_tabular_threshold(threshold);
        self
    }

    /// Combine all pages into one sheet.
    pub fn single_sheet(mut self) -> Self {
        self.options = self.options.single_sheet();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Set the placeholder written when the document has no content.
    pub fn with_empty_placeholder(mut self, text: impl Into<String>) -> Self {
        self.options = self.options.with_empty_placeholder(text);
        self
    }

    /// Current options.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Load a JSON content file and build its workbook.
    pub fn load<P: AsRef<Path>>(self, path: P) -> Result<ConvertedWorkbook> {
        let doc = load_file(path)?;
        self.convert(&doc)
    }

    /// Build the workbook for a document.
    pub fn convert(self, document: &Document) -> Result<ConvertedWorkbook> {
        let workbook = build_workbook(document, &self.options)?;
        Ok(ConvertedWorkbook { workbook })
    }
}

impl Default for GridConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a conversion.
pub struct ConvertedWorkbook {
    /// The built workbook
    pub workbook: Workbook,
}

impl ConvertedWorkbook {
    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.workbook, format)
    }

    /// Convert to tab-separated text.
    pub fn to_text(&self) -> Result<String> {
        Ok(render::to_text(&self.workbook))
    }

    /// All diagnostics, tagged with their sheet name.
    pub fn diagnostics(&self) -> Vec<(&str, &Diagnostic)> {
        self.workbook
            .sheets
            .iter()
            .flat_map(|s| s.diagnostics.iter().map(move |d| (s.name.as_str(), d)))
            .collect()
    }

    /// Get the workbook.
    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_builder() {
        let converter = GridConverter::new()
            .with_row_tolerance(6.0)
            .with_column_tolerance(20.0)
            .with_tabular_threshold(4)
            .single_sheet()
            .sequential();

        assert_eq!(converter.options.row_tolerance, 6.0);
        assert_eq!(converter.options.column_tolerance, 20.0);
        assert_eq!(converter.options.tabular_column_threshold, 4);
        assert!(converter.options.single_sheet);
        assert!(!converter.options.parallel);
    }

    #[test]
    fn test_converter_default() {
        let converter = GridConverter::default();
        assert!(!converter.options().single_sheet);
        assert!(matches!(converter.options().pages, PageSelection::All));
    }

    // ==================== Loading Tests ====================

    #[test]
    fn test_load_str_numbers_pages() {
        let doc = load_str(r#"{"pages": [{"blocks": []}, {"number": 7}]}"#).unwrap();
        assert_eq!(doc.pages[0].number, 1);
        assert_eq!(doc.pages[1].number, 7);
    }

    #[test]
    fn test_load_str_invalid_json() {
        assert!(matches!(load_str("{not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_load_reader() {
        let json = br#"{"title": "T", "pages": [{"fragments": [{"text": "x", "top": 1, "left": 2}]}]}"#;
        let doc = load_reader(&json[..]).unwrap();
        assert_eq!(doc.title.as_deref(), Some("T"));
        assert_eq!(doc.pages[0].fragments.len(), 1);
    }

    #[test]
    fn test_load_file_missing() {
        assert!(matches!(
            load_file("definitely/not/here.json"),
            Err(Error::Io(_))
        ));
    }

    // ==================== Conversion Tests ====================

    #[test]
    fn test_convert_page_out_of_range() {
        let mut doc = Document::new();
        doc.add_page(PageContent::new(1));
        let result = convert_page(&doc, 4, &GridOptions::default());
        assert!(matches!(result, Err(Error::PageOutOfRange(4, 1))));
    }

    #[test]
    fn test_convert_page() {
        let mut doc = Document::new();
        doc.add_page(PageContent::new(1));
        doc.add_page(PageContent::new(2).with_block(ContentNode::heading(2, "Second")));
        let sheet = convert_page(&doc, 2, &GridOptions::default()).unwrap();
        assert_eq!(sheet.name, "Page_2");
        assert_eq!(sheet.grid.value(1, 1), "Second");
    }

    #[test]
    fn test_converted_workbook_outputs() {
        let mut doc = Document::new();
        doc.add_page(PageContent::new(1).with_block(ContentNode::paragraph("Hello")));
        let converted = GridConverter::new().convert(&doc).unwrap();

        assert!(converted.to_text().unwrap().contains("Hello"));
        assert!(converted
            .to_json(JsonFormat::Compact)
            .unwrap()
            .contains("Page_1"));
        assert!(converted.diagnostics().is_empty());
    }

    #[test]
    fn test_invalid_options_surface_as_error() {
        let doc = Document::new();
        let result = GridConverter::new().with_tabular_threshold(0).convert(&doc);
        assert!(matches!(result, Err(Error::InvalidOptions(_))));
    }
}
